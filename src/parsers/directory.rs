//! 公司目录页解析
//!
//! 目录页结构：
//! - `span.count` 内含分页标记 `[当前页/总页数]`
//! - `tbody > tr` 每行四列：公司名(链接)、代码(链接)、行业、子行业

use crate::errors::{DataHubError, Result};
use crate::models::company::Company;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static PAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*(\d+)\s*/\s*(\d+)\s*\]").expect("page marker pattern"));
static COUNT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.count").expect("count selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr").expect("row selector"));

/// 分页标记 `[current/total]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCount {
    pub current: u32,
    pub total: u32,
}

impl PageCount {
    /// 从标记文本中提取页码，允许空白
    pub fn from_marker(text: &str) -> Result<Self> {
        let caps = PAGE_MARKER
            .captures(text)
            .ok_or_else(|| DataHubError::parse(format!("Malformed page count marker: {:?}", text)))?;

        let current = caps[1]
            .parse::<u32>()
            .map_err(|e| DataHubError::parse(format!("Invalid current page {:?}: {}", &caps[1], e)))?;
        let total = caps[2]
            .parse::<u32>()
            .map_err(|e| DataHubError::parse(format!("Invalid total pages {:?}: {}", &caps[2], e)))?;

        Ok(Self { current, total })
    }

    pub fn has_more(&self) -> bool {
        self.current < self.total
    }
}

/// 单个目录页的解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryPage {
    pub page_count: PageCount,
    pub companies: Vec<Company>,
}

pub fn parse_directory_page(html: &str) -> Result<DirectoryPage> {
    let document = Html::parse_document(html);

    let marker = document
        .select(&COUNT_SELECTOR)
        .next()
        .and_then(first_text)
        .ok_or_else(|| DataHubError::parse("Page count marker not found"))?;
    let page_count = PageCount::from_marker(&marker)?;

    let mut companies = Vec::new();
    for (index, row) in document.select(&ROW_SELECTOR).enumerate() {
        companies.push(parse_company_row(index, row)?);
    }

    Ok(DirectoryPage { page_count, companies })
}

fn parse_company_row(index: usize, row: ElementRef<'_>) -> Result<Company> {
    let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();

    let name = cell_text(&cells, index, 0, true)?;
    let ticker = cell_text(&cells, index, 1, true)?;
    let sector = cell_text(&cells, index, 2, false)?;
    let subsector = cell_text(&cells, index, 3, false)?;

    Ok(Company { name, ticker, sector, subsector })
}

// 取第 column 列的首个文本节点；linked 为 true 时取列内 <a> 的文本
fn cell_text(cells: &[ElementRef<'_>], row: usize, column: usize, linked: bool) -> Result<String> {
    let missing = || {
        DataHubError::parse(format!(
            "Row {} is missing text in column {}",
            row + 1,
            column + 1
        ))
    };

    let cell = cells.get(column).copied().ok_or_else(missing)?;
    let target = if linked {
        child_elements(cell, "a").next().ok_or_else(missing)?
    } else {
        cell
    };

    first_text(target).ok_or_else(missing)
}

fn child_elements<'a>(parent: ElementRef<'a>, tag: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == tag)
}

/// 元素的首个直接文本节点（去除首尾空白）
fn first_text(element: ElementRef<'_>) -> Option<String> {
    element
        .children()
        .next()
        .and_then(|node| node.value().as_text().map(|t| t.trim().to_string()))
}
