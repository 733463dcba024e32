use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use crate::errors::{Result, DataHubError};

// 行情接口出现过的日期格式
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

// 日期转换工具
pub fn parse_price_date(date_str: &str) -> Result<NaiveDate> {
    let s = date_str.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(DataHubError::parse(format!("Invalid date format: {}", date_str)))
}

/// 数值或数字字符串转为 Decimal
pub fn value_to_decimal(value: &Value, field: &str) -> Result<Decimal> {
    match value {
        Value::Number(n) => {
            // 按十进制文本转换，避免 f64 二进制误差
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|e| DataHubError::parse(format!("Invalid {} value {}: {}", field, n, e)))
        }
        Value::String(s) => Decimal::from_str(s.trim().replace(',', "").as_str())
            .map_err(|e| DataHubError::parse(format!("Invalid {} value {:?}: {}", field, s, e))),
        other => Err(DataHubError::parse(format!("Invalid {} value: {}", field, other))),
    }
}

/// 成交量：整数、浮点（截断）或数字字符串
pub fn value_to_volume(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| DataHubError::parse(format!("Invalid Volume value: {}", n))),
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            cleaned
                .parse::<i64>()
                .or_else(|_| cleaned.parse::<f64>().map(|f| f.trunc() as i64))
                .map_err(|_| DataHubError::parse(format!("Invalid Volume value {:?}", s)))
        }
        other => Err(DataHubError::parse(format!("Invalid Volume value: {}", other))),
    }
}
