use crate::errors::Result;
use async_trait::async_trait;

/// Base trait for exchange scrapers
///
/// 只负责网络请求，返回原始文档；解析由 `parsers` 完成。
#[async_trait]
pub trait ExchangeScraper: Send + Sync {
    /// Get the exchange code this scraper is for
    fn exchange_code(&self) -> &'static str;

    /// Fetch one page (1-based) of the company directory as raw HTML
    async fn fetch_directory_page(&self, page_no: u32) -> Result<String>;

    /// Fetch the daily price history for a symbol as raw JSON
    async fn fetch_price_history(&self, symbol: &str) -> Result<String>;
}
