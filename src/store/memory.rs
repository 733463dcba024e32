use crate::errors::{DataHubError, Result};
use crate::models::company::Company;
use crate::models::price::PricePoint;
use crate::store::Store;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
struct Tables {
    companies: BTreeMap<String, Company>,
    prices: BTreeMap<(String, NaiveDate), PricePoint>,
}

/// 内存存储
///
/// 写入先进入工作副本，对后续读取可见；`commit()` 后才成为已提交数据，
/// `rollback()` 丢弃未提交的写入。主键冲突返回 `StoreError`，与数据库行为一致。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Tables,
    working: Tables,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入已提交数据，用于准备初始状态
    pub fn seed_company(&mut self, company: Company) {
        self.committed.companies.insert(company.ticker.clone(), company);
        self.working = self.committed.clone();
    }

    pub fn seed_price(&mut self, price: PricePoint) {
        self.committed
            .prices
            .insert((price.ticker.clone(), price.date), price);
        self.working = self.committed.clone();
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub fn has_pending_changes(&self) -> bool {
        self.working != self.committed
    }

    /// 已提交的公司，按 ticker 排序
    pub fn companies(&self) -> Vec<Company> {
        self.committed.companies.values().cloned().collect()
    }

    /// 已提交的某 ticker 日线，按日期升序
    pub fn prices(&self, ticker: &str) -> Vec<PricePoint> {
        self.committed
            .prices
            .values()
            .filter(|p| p.ticker == ticker)
            .cloned()
            .collect()
    }

    pub fn price_count(&self) -> usize {
        self.committed.prices.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn exists_company(&mut self, ticker: &str) -> Result<bool> {
        Ok(self.working.companies.contains_key(ticker))
    }

    async fn insert_company(&mut self, company: &Company) -> Result<()> {
        if self.working.companies.contains_key(&company.ticker) {
            return Err(DataHubError::StoreError(format!(
                "Duplicate company ticker {}",
                company.ticker
            )));
        }
        self.working
            .companies
            .insert(company.ticker.clone(), company.clone());
        Ok(())
    }

    async fn select_tickers(&mut self) -> Result<Vec<String>> {
        Ok(self.working.companies.keys().cloned().collect())
    }

    async fn max_date(&mut self, ticker: &str) -> Result<Option<NaiveDate>> {
        Ok(self
            .working
            .prices
            .keys()
            .filter(|(t, _)| t == ticker)
            .map(|(_, date)| *date)
            .max())
    }

    async fn insert_price(&mut self, price: &PricePoint) -> Result<()> {
        if !self.working.companies.contains_key(&price.ticker) {
            return Err(DataHubError::StoreError(format!(
                "Unknown company ticker {}",
                price.ticker
            )));
        }

        let key = (price.ticker.clone(), price.date);
        if self.working.prices.contains_key(&key) {
            return Err(DataHubError::StoreError(format!(
                "Duplicate price for {} at {}",
                price.ticker, price.date
            )));
        }
        self.working.prices.insert(key, price.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.committed = self.working.clone();
        self.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.working = self.committed.clone();
        Ok(())
    }
}
