// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod parsers;
pub mod scrapers;
pub mod store;
pub mod services;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::company::Company;
pub use models::price::PricePoint;
pub use config::Config;
pub use errors::{Result, DataHubError, ErrorKind};
pub use scrapers::{ExchangeScraper, PSEScraper};
pub use store::{MemoryStore, MySqlStore, Store};
pub use services::pipeline::{run_pipeline, Pipeline, PipelineReport};
