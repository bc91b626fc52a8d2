pub mod bounds;
pub mod filter;
