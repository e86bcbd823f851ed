//! iamlens fetch - HTTP access to the service reference documents

pub mod http;

pub use http::HttpSource;
