pub mod row_writer;
pub mod sink;

pub use row_writer::RowWriter;
pub use sink::{ChannelSink, CsvSink, JsonLinesSink, OutputFormat, ResultSink};
