use crate::errors::{ErrorKind, Result};
use crate::parsers::prices::parse_price_series;
use crate::scrapers::base::ExchangeScraper;
use crate::services::watermark::current_watermark;
use crate::store::Store;
use log::{info, warn};
use serde::Serialize;

/// 单个 ticker 的失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerFailure {
    pub ticker: String,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceLoadReport {
    pub tickers: usize,
    pub inserted: usize,
    /// 早于或等于水位线而被丢弃的条数
    pub filtered: usize,
    pub failures: Vec<TickerFailure>,
}

impl PriceLoadReport {
    pub fn failed_tickers(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.ticker.as_str()).collect()
    }
}

/// 日线行情加载器
///
/// 按 ticker 字典序逐个抓取，只写入晚于水位线的数据，整轮结束后提交一次。
/// 单个 ticker 的抓取或解析失败只记录日志并继续；存储错误直接返回。
pub struct PriceLoader<'a, C: ?Sized, S: ?Sized> {
    scraper: &'a C,
    store: &'a mut S,
}

impl<'a, C, S> PriceLoader<'a, C, S>
where
    C: ExchangeScraper + ?Sized,
    S: Store + ?Sized,
{
    pub fn new(scraper: &'a C, store: &'a mut S) -> Self {
        Self { scraper, store }
    }

    pub async fn load_all(&mut self) -> Result<PriceLoadReport> {
        let tickers = self.store.select_tickers().await?;
        info!("Loading prices for {} tickers", tickers.len());
        self.sweep(&tickers).await
    }

    /// 只处理指定的 ticker，未入库的公司会被跳过
    pub async fn load_tickers(&mut self, requested: &[String]) -> Result<PriceLoadReport> {
        let known = self.store.select_tickers().await?;

        let mut tickers: Vec<String> = Vec::new();
        for ticker in requested {
            if !known.contains(ticker) {
                warn!("{} is not a known company, skipping", ticker);
            } else if !tickers.contains(ticker) {
                tickers.push(ticker.clone());
            }
        }
        tickers.sort();

        self.sweep(&tickers).await
    }

    async fn sweep(&mut self, tickers: &[String]) -> Result<PriceLoadReport> {
        let mut report = PriceLoadReport::default();

        for ticker in tickers {
            report.tickers += 1;

            match self.load_ticker(ticker).await {
                Ok((inserted, filtered)) => {
                    report.inserted += inserted;
                    report.filtered += filtered;
                }
                Err(e) if e.kind() == ErrorKind::Store => {
                    if let Err(rollback_err) = self.store.rollback().await {
                        warn!("Rollback after store failure also failed: {}", rollback_err);
                    }
                    return Err(e);
                }
                Err(e) => {
                    match e.kind() {
                        ErrorKind::Parse => warn!("Failed to parse the data for {}: {}", ticker, e),
                        _ => warn!("Failed to load prices for {}: {}", ticker, e),
                    }
                    report.failures.push(TickerFailure {
                        ticker: ticker.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.store.commit().await?;
        info!(
            "Price sweep finished: {} tickers, {} saved, {} already stored, {} failed",
            report.tickers,
            report.inserted,
            report.filtered,
            report.failures.len()
        );
        Ok(report)
    }

    // 返回 (写入条数, 被水位线过滤的条数)
    async fn load_ticker(&mut self, ticker: &str) -> Result<(usize, usize)> {
        let body = self.scraper.fetch_price_history(ticker).await?;
        let series = parse_price_series(ticker, &body)?;

        let watermark = current_watermark(&mut *self.store, ticker).await?;
        info!("Latest available date for {} is {}", ticker, watermark);

        let fetched = series.len();
        let fresh = watermark.filter_new(series);

        for price in &fresh {
            self.store.insert_price(price).await?;
            info!("Saved price for {} at {}", ticker, price.date);
        }

        Ok((fresh.len(), fetched - fresh.len()))
    }
}
