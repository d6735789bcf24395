pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod explorer;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod schema;
