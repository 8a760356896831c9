//! REST-backed [`AlgorithmSource`](algorithm_core::source::AlgorithmSource).
//! The client is built from an explicit [`HttpSourceConfig`]; nothing is read
//! from global state at request time.

mod config;
mod errors;
mod source;

pub use config::HttpSourceConfig;
pub use errors::HttpSourceError;
pub use source::HttpAlgorithmSource;
