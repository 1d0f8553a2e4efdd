pub mod api;
pub mod app_state;
pub mod auth;
pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

#[cfg(test)]
pub mod test_utils;
