/// Filesystem helpers: atomic writes, markers, tree copies.
pub mod fs;
/// Remote fetch transport.
pub mod http;

pub use http::{Fetcher, HttpFetcher};
