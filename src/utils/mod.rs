pub mod ip;
pub mod query;
