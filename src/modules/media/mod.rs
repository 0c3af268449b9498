/// Media module
///
/// On-disk layout for uploads and job artifacts, plus the HTTP route that
/// serves finished artifacts back to clients.
pub mod commands;
pub mod infrastructure;

pub use infrastructure::{content_type_for, MediaStorage, MEDIA_URL_PREFIX};
