pub mod pipeline;

pub use pipeline::{PipelineRequest, ProcessingPipeline};
