pub mod accuracy_export;
pub mod analysis;
pub mod config;
pub mod extract;
pub mod positions;
pub mod prediction_store;
pub mod sample_feed;
pub mod season;
pub mod sources;
pub mod stats_api;
pub mod stats_store;
pub mod summary;
pub mod team_names;
pub mod team_snapshot;
