//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the request handler: the fixed
//! header set, MIME resolution, and response builders.

pub mod cors;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_500_response, build_options_response,
    build_redirect_response,
};
