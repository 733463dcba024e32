pub mod base;
pub mod pse;

pub use base::ExchangeScraper;
pub use pse::PSEScraper;
