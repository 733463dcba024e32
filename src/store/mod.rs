//! 存储层
//!
//! 加载器只通过 [`Store`] 访问数据库，单连接顺序读写，不需要加锁。
//! 写入在 `commit()` 之前不持久，`rollback()` 丢弃：
//! [`MySqlStore`] 每个加载阶段一个事务，[`MemoryStore`] 暂存到提交为止。

pub mod memory;
pub mod mysql;

use crate::errors::Result;
use crate::models::company::Company;
use crate::models::price::PricePoint;
use async_trait::async_trait;
use chrono::NaiveDate;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait Store: Send {
    /// 公司是否已入库
    async fn exists_company(&mut self, ticker: &str) -> Result<bool>;

    async fn insert_company(&mut self, company: &Company) -> Result<()>;

    /// 全部 ticker，按字典序升序
    async fn select_tickers(&mut self) -> Result<Vec<String>>;

    /// 该 ticker 已入库的最大日期，无数据时返回 None
    async fn max_date(&mut self, ticker: &str) -> Result<Option<NaiveDate>>;

    async fn insert_price(&mut self, price: &PricePoint) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    /// 丢弃自上次提交以来的写入
    async fn rollback(&mut self) -> Result<()>;
}
