pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
