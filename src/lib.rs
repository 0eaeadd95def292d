use std::sync::Arc;

use cache::CacheStore;
use config::Config;
use services::IdentityService;

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityService>,
    pub cache: Arc<dyn CacheStore>,
    pub config: Arc<Config>,
}
