use serde::Serialize;

/// 上市公司目录记录，ticker 唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub name: String,
    pub ticker: String,
    pub sector: String,
    pub subsector: String,
}

impl Company {
    pub fn new(name: &str, ticker: &str, sector: &str, subsector: &str) -> Self {
        Self {
            name: name.to_string(),
            ticker: ticker.to_string(),
            sector: sector.to_string(),
            subsector: subsector.to_string(),
        }
    }
}
