//! Utility functions.

pub mod mime;

pub use mime::{content_type_extension, path_extension};
