pub mod storage;

pub use storage::{content_type_for, MediaStorage, MEDIA_URL_PREFIX};
