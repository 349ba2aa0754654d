//! Stock pipeline: fetch every shop category, then render a text report.

pub mod aggregator;
pub mod models;
pub mod render;

pub use aggregator::{fetch_all, AggregationPolicy};
pub use models::Category;
pub use render::render;
