use crate::config::Config;
use crate::errors::{DataHubError, Result};
use crate::models::company::Company;
use crate::models::price::PricePoint;
use crate::store::Store;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, Transaction};

/// MySQL 存储
///
/// 首条语句时开启事务，`commit()` 提交；未提交即释放时事务回滚。
/// 表结构见 `sql/schema.sql`。
pub struct MySqlStore {
    pool: MySqlPool,
    tx: Option<Transaction<'static, MySql>>,
}

impl MySqlStore {
    pub async fn connect(config: &Config) -> Result<Self> {
        info!("Connecting to {}", config.redacted_database_url());

        let options = MySqlConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port)
            .username(&config.db_user)
            .password(&config.db_password)
            .database(&config.db_name);

        // 单连接，两个加载器顺序共用
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool, tx: None })
    }

    async fn tx(&mut self) -> Result<&mut Transaction<'static, MySql>> {
        if self.tx.is_none() {
            debug!("Opening transaction");
            self.tx = Some(self.pool.begin().await?);
        }
        self.tx
            .as_mut()
            .ok_or_else(|| DataHubError::StoreError("Transaction not available".to_string()))
    }

    /// 回滚未提交的写入并关闭连接
    pub async fn close(mut self) -> Result<()> {
        let result = self.rollback().await;
        self.pool.close().await;
        result
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn exists_company(&mut self, ticker: &str) -> Result<bool> {
        let tx = self.tx().await?;
        let row = sqlx::query("SELECT 1 FROM Company WHERE ticker = ? LIMIT 1")
            .bind(ticker)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_company(&mut self, company: &Company) -> Result<()> {
        let tx = self.tx().await?;
        sqlx::query("INSERT INTO Company (name, ticker, sector, subsector) VALUES (?, ?, ?, ?)")
            .bind(&company.name)
            .bind(&company.ticker)
            .bind(&company.sector)
            .bind(&company.subsector)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn select_tickers(&mut self) -> Result<Vec<String>> {
        let tx = self.tx().await?;
        let tickers = sqlx::query_scalar::<_, String>("SELECT ticker FROM Company ORDER BY ticker")
            .fetch_all(&mut **tx)
            .await?;
        Ok(tickers)
    }

    async fn max_date(&mut self, ticker: &str) -> Result<Option<NaiveDate>> {
        let tx = self.tx().await?;
        let date = sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT MAX(date) FROM Price WHERE ticker = ?",
        )
        .bind(ticker)
        .fetch_one(&mut **tx)
        .await?;
        Ok(date)
    }

    async fn insert_price(&mut self, price: &PricePoint) -> Result<()> {
        let tx = self.tx().await?;
        sqlx::query(
            r#"
            INSERT INTO Price (ticker, date, open, high, low, close, volume)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&price.ticker)
        .bind(price.date)
        .bind(price.open)
        .bind(price.high)
        .bind(price.low)
        .bind(price.close)
        .bind(price.volume)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => {
                tx.commit().await?;
                debug!("Transaction committed");
            }
            None => debug!("Nothing to commit"),
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            debug!("Transaction rolled back");
        }
        Ok(())
    }
}
