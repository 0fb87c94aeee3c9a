//! Multi-role marketplace backend: catalog, carts, orders with stock
//! accounting, and review/report moderation.

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
