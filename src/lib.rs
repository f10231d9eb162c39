pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod recipes;
pub mod state;
pub mod storage;

pub use app::build_app;
pub use state::AppState;
