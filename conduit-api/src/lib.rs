//! # Conduit API Server Library
//!
//! HTTP surface of the Conduit blogging API. Request handling itself lives
//! in `conduit_shared::service`; this crate routes, authenticates and maps
//! errors to responses.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
