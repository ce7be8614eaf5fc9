pub mod core;
pub mod filter;
pub mod schema;
