pub mod batch_aggregator;
pub mod enricher;
pub mod stats;
pub mod window_aggregator;

pub use batch_aggregator::{BatchAggregator, BatchOutcome, BatchReport};
pub use enricher::Enricher;
pub use stats::{PipelineStats, StatsSnapshot};
pub use window_aggregator::{
    Admission, OverflowPolicy, WindowAggregator, WindowFlush, WindowSettings, WindowState,
};
