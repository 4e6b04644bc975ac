pub mod config;
pub mod export;
pub mod match_record;
pub mod persist;
pub mod sections;
pub mod seed;
pub mod state;
pub mod store;
pub mod telemetry;
