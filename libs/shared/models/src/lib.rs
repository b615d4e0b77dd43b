pub mod consultation;
pub mod error;
pub mod order;
pub mod product;
pub mod user;
