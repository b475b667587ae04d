pub mod ai;
pub mod api;
pub mod config;
pub mod database;
pub mod events;
pub mod middleware;
pub mod models;
pub mod seeds;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;
