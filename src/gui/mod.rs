pub mod application;
pub mod style;
pub mod subscription;
pub mod types;
