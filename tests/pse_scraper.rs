use mockito::{Matcher, Server};
use pse_datahub::config::Config;
use pse_datahub::errors::{DataHubError, ErrorKind};
use pse_datahub::scrapers::base::ExchangeScraper;
use pse_datahub::scrapers::pse::PSEScraper;
use pse_datahub::services::pipeline::run_pipeline;
use pse_datahub::store::MemoryStore;
use std::time::{Duration, Instant};

const DIRECTORY_PATH: &str = "/companyDirectory/search.ax";
const PRICE_PATH: &str = "/ape/colcharts/jason.asp";

fn config_for(server: &Server) -> Config {
    Config::new()
        .with_directory_url(&format!("{}{}", server.url(), DIRECTORY_PATH))
        .with_price_url(&format!("{}{}", server.url(), PRICE_PATH))
        .with_request_timeout(Duration::from_secs(5))
}

fn directory_page(current: u32, total: u32, ticker: &str) -> String {
    format!(
        r#"<html><body><span class="count">[{}/{}]</span>
        <table><tbody><tr><td><a>{} Inc.</a></td><td><a>{}</a></td><td>Services</td><td>Telecom</td></tr></tbody></table>
        </body></html>"#,
        current, total, ticker, ticker
    )
}

#[tokio::test]
async fn directory_request_posts_form_with_browser_agent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", DIRECTORY_PATH)
        .match_header("user-agent", Matcher::Regex("Mozilla/5.0".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sector".to_string(), "ALL".to_string()),
            Matcher::UrlEncoded("subsector".to_string(), "ALL".to_string()),
            Matcher::UrlEncoded("pageNo".to_string(), "2".to_string()),
        ]))
        .with_status(200)
        .with_body(directory_page(2, 2, "GLO"))
        .create_async()
        .await;

    let scraper = PSEScraper::new(&config_for(&server)).unwrap();
    let html = scraper.fetch_directory_page(2).await.unwrap();

    assert!(html.contains("GLO"));
    mock.assert_async().await;
}

#[tokio::test]
async fn price_request_passes_symbol_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PRICE_PATH)
        .match_query(Matcher::UrlEncoded("symbol".to_string(), "TEL".to_string()))
        .match_header("user-agent", Matcher::Regex("Mozilla/5.0".to_string()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let scraper = PSEScraper::new(&config_for(&server)).unwrap();
    assert_eq!(scraper.fetch_price_history("TEL").await.unwrap(), "[]");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_fetch_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PRICE_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let scraper = PSEScraper::new(&config_for(&server)).unwrap();
    let err = scraper.fetch_price_history("TEL").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(matches!(err, DataHubError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn request_interval_spaces_out_requests() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PRICE_PATH)
        .match_query(Matcher::Any)
        .with_body("[]")
        .expect(3)
        .create_async()
        .await;

    let config = config_for(&server).with_request_interval(Duration::from_millis(200));
    let scraper = PSEScraper::new(&config).unwrap();

    let started = Instant::now();
    scraper.fetch_price_history("TEL").await.unwrap();
    scraper.fetch_price_history("GLO").await.unwrap();
    // 第三次请求的间隔从第二次实际发送时算起
    scraper.fetch_price_history("AC").await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn pipeline_runs_against_http_endpoints() {
    let mut server = Server::new_async().await;
    // mock 离开作用域即失效，需保留
    let mut mocks = Vec::new();
    for (page, ticker) in [(1, "GLO"), (2, "TEL")] {
        let mock = server
            .mock("POST", DIRECTORY_PATH)
            .match_body(Matcher::UrlEncoded("pageNo".to_string(), page.to_string()))
            .with_body(directory_page(page, 2, ticker))
            .create_async()
            .await;
        mocks.push(mock);
    }
    let glo = server
        .mock("GET", PRICE_PATH)
        .match_query(Matcher::UrlEncoded("symbol".to_string(), "GLO".to_string()))
        .with_body(r#"[{"Date":"2024-03-01","Open":1700,"High":1725,"Low":1690,"Close":1710,"Volume":51230}]"#)
        .create_async()
        .await;
    let tel = server
        .mock("GET", PRICE_PATH)
        .match_query(Matcher::UrlEncoded("symbol".to_string(), "TEL".to_string()))
        .with_status(502)
        .create_async()
        .await;

    let scraper = PSEScraper::new(&config_for(&server)).unwrap();
    let mut store = MemoryStore::new();
    let report = run_pipeline(&scraper, &mut store).await.unwrap();

    assert_eq!(report.companies.pages_fetched, 2);
    assert_eq!(store.companies().len(), 2);
    assert_eq!(store.prices("GLO").len(), 1);
    assert_eq!(report.prices.failed_tickers(), vec!["TEL"]);
    glo.assert_async().await;
    tel.assert_async().await;
}

#[tokio::test]
#[ignore] // 实际网络测试
async fn fetch_live_directory_first_page() {
    let scraper = PSEScraper::new(&Config::new()).unwrap();
    let html = scraper.fetch_directory_page(1).await.unwrap();
    let page = pse_datahub::parsers::parse_directory_page(&html).unwrap();
    println!("{:?} with {} companies", page.page_count, page.companies.len());
    assert!(page.page_count.total >= 1);
}
