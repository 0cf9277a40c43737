pub mod env;
pub mod export;
pub mod matcher_config;
pub mod progress_bars;
pub mod tabular;
