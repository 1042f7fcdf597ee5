pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod level;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod output;
pub mod quality;
pub mod query;
pub mod reshape;
pub mod serve;
