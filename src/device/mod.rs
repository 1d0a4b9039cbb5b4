pub mod btle;
pub mod command;
pub mod constants;
pub mod fake;
pub mod link;
pub mod scan;
pub mod types;
