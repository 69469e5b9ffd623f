//! HTTP service that recommends a crop from seven soil and weather
//! measurements using a pre-trained classifier.

pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod inference;
pub mod models;
pub mod onnx;
pub mod validation;

use actix_cors::Cors;

/// The browser client calls the API from another origin.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
}
