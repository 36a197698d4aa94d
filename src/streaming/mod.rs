pub mod line_source;
pub mod pipeline;
pub mod scheduler;

pub use line_source::{lines_from, LineSource, LineStream};
pub use pipeline::StreamingPipeline;
pub use scheduler::TickScheduler;
