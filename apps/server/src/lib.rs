//! Menu server library
//!
//! Dish catalogue backend: a repository/service layer over PostgreSQL or
//! SQLite, an axum transport, and a conventional user/session subsystem.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod startup;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
