use crate::errors::Result;
use crate::scrapers::base::ExchangeScraper;
use crate::services::company_loader::{CompanyLoadReport, CompanyLoader};
use crate::services::price_loader::{PriceLoadReport, PriceLoader};
use crate::store::Store;
use log::{error, info};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub companies: CompanyLoadReport,
    pub prices: PriceLoadReport,
}

/// 入库流程：先加载公司目录并提交，再加载行情
///
/// 不持有进程级状态，每次调用都从第一页开始。
pub struct Pipeline<'a, C: ?Sized, S: ?Sized> {
    scraper: &'a C,
    store: &'a mut S,
}

impl<'a, C, S> Pipeline<'a, C, S>
where
    C: ExchangeScraper + ?Sized,
    S: Store + ?Sized,
{
    pub fn new(scraper: &'a C, store: &'a mut S) -> Self {
        Self { scraper, store }
    }

    pub async fn run(&mut self) -> Result<PipelineReport> {
        info!("Starting {} pipeline", self.scraper.exchange_code());

        // 公司阶段失败时不加载行情
        let companies = self.load_companies().await?;
        let prices = self.load_prices().await?;

        Ok(PipelineReport { companies, prices })
    }

    pub async fn load_companies(&mut self) -> Result<CompanyLoadReport> {
        CompanyLoader::new(self.scraper, &mut *self.store)
            .load_all()
            .await
            .map_err(|e| {
                error!("Company directory load failed ({}): {}", e.kind(), e);
                e
            })
    }

    pub async fn load_prices(&mut self) -> Result<PriceLoadReport> {
        PriceLoader::new(self.scraper, &mut *self.store).load_all().await
    }

    pub async fn load_prices_for(&mut self, tickers: &[String]) -> Result<PriceLoadReport> {
        PriceLoader::new(self.scraper, &mut *self.store)
            .load_tickers(tickers)
            .await
    }
}

/// 执行一次完整流程
pub async fn run_pipeline<C, S>(scraper: &C, store: &mut S) -> Result<PipelineReport>
where
    C: ExchangeScraper + ?Sized,
    S: Store + ?Sized,
{
    Pipeline::new(scraper, store).run().await
}
