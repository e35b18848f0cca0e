//! Shared modules for the SQL generation system.
//!
//! Contains the request/response models, error taxonomy, response envelope,
//! configuration loading, middleware, and text utilities used by the
//! generation service and the console client.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
