use crate::config::Config;
use crate::errors::{DataHubError, Result};
use crate::scrapers::base::ExchangeScraper;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 菲律宾证券交易所数据抓取器
///
/// 公司目录来自 PSE EDGE，日线行情来自 COL Financial 图表接口。
pub struct PSEScraper {
    client: Client,
    directory_url: String,
    price_url: String,
    request_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl PSEScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(DataHubError::RequestError)?;

        Ok(Self {
            client,
            directory_url: config.directory_url.clone(),
            price_url: config.price_url.clone(),
            request_interval: config.request_interval,
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        if self.request_interval.is_zero() {
            return;
        }

        let now = Instant::now();
        let should_wait = {
            let mut last = match self.last_request.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let should_wait = (*last).and_then(|instant| {
                let elapsed = instant.elapsed();
                (elapsed < self.request_interval).then(|| self.request_interval - elapsed)
            });
            // 记录实际发送时刻（等待结束后）
            *last = Some(now + should_wait.unwrap_or_default());
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} before next request", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    // 非 2xx 状态视为抓取失败
    async fn read_body(url: &str, response: Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(DataHubError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ExchangeScraper for PSEScraper {
    fn exchange_code(&self) -> &'static str {
        "PSE"
    }

    async fn fetch_directory_page(&self, page_no: u32) -> Result<String> {
        info!("Fetching company directory page {}", page_no);

        self.wait_for_rate_limit().await;

        let page = page_no.to_string();
        let response = self
            .client
            .post(&self.directory_url)
            .form(&[("sector", "ALL"), ("subsector", "ALL"), ("pageNo", page.as_str())])
            .send()
            .await?;

        Self::read_body(&self.directory_url, response).await
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<String> {
        debug!("Fetching price history for {}", symbol);

        self.wait_for_rate_limit().await;

        let response = self
            .client
            .get(&self.price_url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        Self::read_body(&self.price_url, response).await
    }
}
