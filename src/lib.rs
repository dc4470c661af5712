pub mod accuracy;
pub mod config;
pub mod extract;
pub mod history;
pub mod http_client;
pub mod logging;
pub mod persist;
pub mod prompt_history;
pub mod results_feed;
pub mod tracker;
