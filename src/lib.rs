pub mod api;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod fixture_difficulty;
pub mod http_client;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod squad;
pub mod transfers;
