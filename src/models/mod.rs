pub mod company;
pub mod price;
