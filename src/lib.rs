pub mod app;
pub mod config;
pub mod dates;
pub mod errors;
pub mod fetcher;
pub mod handlers;
pub mod migrate;
pub mod models;
pub mod presenter;
pub mod reconcile;
pub mod refresh;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
