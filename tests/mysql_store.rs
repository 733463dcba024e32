//! 需要可用的 MySQL 实例（按 MYSQL_* 环境变量连接，表结构见 sql/schema.sql），
//! 默认忽略：`cargo test -- --ignored`

use chrono::NaiveDate;
use pse_datahub::config::Config;
use pse_datahub::models::company::Company;
use pse_datahub::models::price::PricePoint;
use pse_datahub::store::{MySqlStore, Store};
use rust_decimal_macros::dec;

#[tokio::test]
#[ignore]
async fn uncommitted_writes_roll_back_on_close() {
    let config = Config::from_env().unwrap();
    let ticker = "ZZTEST";

    let mut store = MySqlStore::connect(&config).await.unwrap();
    store
        .insert_company(&Company::new("Rollback Test", ticker, "Test", "Test"))
        .await
        .unwrap();
    store
        .insert_price(&PricePoint {
            ticker: ticker.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
            open: dec!(1.5),
            high: dec!(1.6),
            low: dec!(1.4),
            close: dec!(1.55),
            volume: 1000,
        })
        .await
        .unwrap();
    assert!(store.exists_company(ticker).await.unwrap());
    assert_eq!(
        store.max_date(ticker).await.unwrap(),
        NaiveDate::from_ymd_opt(2020, 1, 10)
    );
    store.close().await.unwrap();

    let mut store = MySqlStore::connect(&config).await.unwrap();
    assert!(!store.exists_company(ticker).await.unwrap());
    assert_eq!(store.max_date(ticker).await.unwrap(), None);
    store.commit().await.unwrap();
}
