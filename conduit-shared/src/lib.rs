//! # Conduit Shared Library
//!
//! Domain core of the Conduit blogging API: models, the resource store,
//! credentials and the request handlers. The HTTP surface lives in the
//! `conduit-api` crate and only translates between HTTP and this crate.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, session tokens, caller identity
//! - `db`: PostgreSQL pool and migrations
//! - `error`: domain error taxonomy
//! - `models`: rows, inputs and JSON representations
//! - `service`: request handlers
//! - `store`: repository traits with PostgreSQL and in-memory backends

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the Conduit shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
