//! devserve - a static file server for local development.
//!
//! Serves a root directory over HTTP/1.1, stamps every response with
//! permissive CORS headers and a cache-disabling policy, and forces the
//! JavaScript MIME type for `.js`/`.mjs` files.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
