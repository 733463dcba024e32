use crate::errors::Result;
use crate::models::price::PricePoint;
use crate::store::Store;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

/// 某 ticker 已入库的最新日期，无数据时为空（所有抓取到的数据都是新的）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Watermark(Option<NaiveDate>);

impl Watermark {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn at(date: NaiveDate) -> Self {
        Self(Some(date))
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.0
    }

    /// 仅接受严格晚于水位线的日期
    pub fn admits(&self, date: NaiveDate) -> bool {
        match self.0 {
            Some(latest) => date > latest,
            None => true,
        }
    }

    /// 过滤出需要写入的数据，保持原始顺序；同一日期只保留第一条
    pub fn filter_new(&self, points: Vec<PricePoint>) -> Vec<PricePoint> {
        let mut seen = HashSet::new();
        points
            .into_iter()
            .filter(|p| self.admits(p.date) && seen.insert(p.date))
            .collect()
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(date) => write!(f, "{}", date),
            None => f.write_str("none"),
        }
    }
}

/// 从存储中读取某 ticker 的水位线
pub async fn current_watermark<S>(store: &mut S, ticker: &str) -> Result<Watermark>
where
    S: Store + ?Sized,
{
    Ok(Watermark(store.max_date(ticker).await?))
}
