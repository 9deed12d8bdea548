pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod gateway;
pub mod mailer;
pub mod models;
pub mod scheduler;
mod domain_events;
mod main_lib;

pub use main_lib::{build_state, init_tracing, AppState};
