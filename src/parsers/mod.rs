pub mod directory;
pub mod prices;

pub use directory::{parse_directory_page, DirectoryPage, PageCount};
pub use prices::parse_price_series;
