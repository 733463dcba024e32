use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// 日线数据，(ticker, date) 唯一
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}
