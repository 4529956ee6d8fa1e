//! Services that turn extracted URLs into output.

pub mod download;

pub use download::{
    Classification, ContentTypeResolver, DownloadEvent, MaterializeReport, Materializer,
};
