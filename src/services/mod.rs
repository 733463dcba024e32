pub mod company_loader;
pub mod pipeline;
pub mod price_loader;
pub mod scheduler;
pub mod watermark;
