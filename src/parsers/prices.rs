//! 行情接口 JSON 解析
//!
//! 接口返回对象数组，字段为 `Date, Open, High, Low, Close, Volume`，
//! 按原始顺序输出，不重新排序，也不校验数值范围。

use crate::errors::{DataHubError, Result};
use crate::models::price::PricePoint;
use crate::util;
use serde_json::Value;

const FIELDS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

pub fn parse_price_series(ticker: &str, body: &str) -> Result<Vec<PricePoint>> {
    let json: Value = serde_json::from_str(body)?;

    let items = json.as_array().ok_or_else(|| {
        DataHubError::parse(format!("Price data for {} is not a JSON array", ticker))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_price_item(ticker, index, item))
        .collect()
}

fn parse_price_item(ticker: &str, index: usize, item: &Value) -> Result<PricePoint> {
    let object = item.as_object().ok_or_else(|| {
        DataHubError::parse(format!("Price entry {} for {} is not an object", index, ticker))
    })?;

    if let Some(missing) = FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(DataHubError::parse(format!(
            "Price entry {} for {} is missing field {}",
            index, ticker, missing
        )));
    }

    let date = match &object["Date"] {
        Value::String(s) => util::parse_price_date(s)?,
        other => {
            return Err(DataHubError::parse(format!("Invalid Date value: {}", other)));
        }
    };

    Ok(PricePoint {
        ticker: ticker.to_string(),
        date,
        open: util::value_to_decimal(&object["Open"], "Open")?,
        high: util::value_to_decimal(&object["High"], "High")?,
        low: util::value_to_decimal(&object["Low"], "Low")?,
        close: util::value_to_decimal(&object["Close"], "Close")?,
        volume: util::value_to_volume(&object["Volume"])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn keeps_original_order() {
        let body = r#"[
            {"Date": "2020-01-10", "Open": 10.5, "High": 11, "Low": "10.25", "Close": 10.75, "Volume": 1200},
            {"Date": "2020-01-09", "Open": 10, "High": 10.5, "Low": 9.9, "Close": 10.5, "Volume": 800}
        ]"#;

        let points = parse_price_series("AC", body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2020, 1, 10).unwrap());
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2020, 1, 9).unwrap());
        assert_eq!(points[0].low, Decimal::new(1025, 2));
        assert_eq!(points[0].volume, 1200);
        assert!(points.iter().all(|p| p.ticker == "AC"));
    }

    #[test]
    fn values_pass_through_unvalidated() {
        let body = r#"[{"Date": "2020-01-10", "Open": -1, "High": 0, "Low": 5, "Close": 0, "Volume": -3}]"#;
        let points = parse_price_series("AC", body).unwrap();
        assert_eq!(points[0].open, Decimal::from(-1));
        assert_eq!(points[0].volume, -3);
    }

    #[test]
    fn empty_array_is_empty_series() {
        assert!(parse_price_series("AC", "[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_price_series("AC", "<html>error</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = parse_price_series("AC", r#"{"error": "no data"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn missing_field_is_parse_error() {
        let body = r#"[{"Date": "2020-01-10", "Open": 1, "High": 1, "Low": 1, "Close": 1}]"#;
        let err = parse_price_series("AC", body).unwrap_err();
        assert!(err.to_string().contains("Volume"), "{}", err);
    }
}
