use crate::errors::{DataHubError, Result};
use crate::models::company::Company;
use crate::parsers::directory::{parse_directory_page, PageCount};
use crate::scrapers::base::ExchangeScraper;
use crate::store::Store;
use log::{info, warn};
use serde::Serialize;

/// 分页加载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// 尚未抓取任何页
    Fetching,
    HasMore,
    Exhausted,
}

/// 分页进度，仅在一次加载中有效，不持久化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for PaginationState {
    // total_pages 初始为 1，保证至少抓取一次
    fn default() -> Self {
        Self { current_page: 0, total_pages: 1 }
    }
}

impl PaginationState {
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn next_page(&self) -> u32 {
        self.current_page + 1
    }

    /// 按页面上的分页标记推进
    ///
    /// 标记已到末页（current >= total）时直接结束；否则页码必须前进，避免死循环。
    pub fn advance(&mut self, count: PageCount) -> Result<()> {
        if count.has_more() && count.current <= self.current_page {
            return Err(DataHubError::parse(format!(
                "Pagination did not advance: at page {}, marker reports [{}/{}]",
                self.current_page, count.current, count.total
            )));
        }
        self.current_page = count.current;
        self.total_pages = count.total;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyLoadReport {
    pub pages_fetched: u32,
    pub inserted: usize,
    pub skipped: usize,
}

/// 公司目录加载器
///
/// 逐页抓取直到分页结束，已存在的 ticker 跳过（不更新），最后统一提交一次。
/// 任一页抓取或解析失败都会中止本次加载，回滚已写入的行，不提交。
pub struct CompanyLoader<'a, C: ?Sized, S: ?Sized> {
    scraper: &'a C,
    store: &'a mut S,
    pagination: PaginationState,
    fetched_any: bool,
}

impl<'a, C, S> CompanyLoader<'a, C, S>
where
    C: ExchangeScraper + ?Sized,
    S: Store + ?Sized,
{
    pub fn new(scraper: &'a C, store: &'a mut S) -> Self {
        Self {
            scraper,
            store,
            pagination: PaginationState::default(),
            fetched_any: false,
        }
    }

    pub fn state(&self) -> LoaderState {
        if !self.fetched_any {
            LoaderState::Fetching
        } else if self.pagination.has_more() {
            LoaderState::HasMore
        } else {
            LoaderState::Exhausted
        }
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    /// 加载全部分页并提交；失败时回滚本阶段已写入的公司
    pub async fn load_all(&mut self) -> Result<CompanyLoadReport> {
        match self.load_pages().await {
            Ok(report) => Ok(report),
            Err(e) => {
                if let Err(rollback_err) = self.store.rollback().await {
                    warn!("Rollback after failed directory load also failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn load_pages(&mut self) -> Result<CompanyLoadReport> {
        let mut report = CompanyLoadReport::default();

        while self.state() != LoaderState::Exhausted {
            let page_no = self.pagination.next_page();
            let html = self.scraper.fetch_directory_page(page_no).await?;
            let page = parse_directory_page(&html)?;

            self.pagination.advance(page.page_count)?;
            self.fetched_any = true;
            report.pages_fetched += 1;
            info!(
                "Parsed directory page {}/{} with {} companies",
                self.pagination.current_page,
                self.pagination.total_pages,
                page.companies.len()
            );

            self.save_companies(&page.companies, &mut report).await?;
        }

        self.store.commit().await?;
        info!(
            "Company directory loaded: {} pages, {} saved, {} skipped",
            report.pages_fetched, report.inserted, report.skipped
        );
        Ok(report)
    }

    async fn save_companies(&mut self, companies: &[Company], report: &mut CompanyLoadReport) -> Result<()> {
        for company in companies {
            if self.store.exists_company(&company.ticker).await? {
                info!("{} is already present, skipping", company.ticker);
                report.skipped += 1;
            } else {
                self.store.insert_company(company).await?;
                info!("Saved company: {}", company.ticker);
                report.inserted += 1;
            }
        }
        Ok(())
    }
}
