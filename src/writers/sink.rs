//! Result consumers for tick reports.

use crate::error::Result;
use crate::models::TickReport;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::sync::mpsc;

/// Receives every tick's rows. A report is fully written before the next
/// one is handed over.
pub trait ResultSink: Send {
    fn emit(&mut self, report: &TickReport) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn sink<W: Write + Send + 'static>(self, writer: W) -> Box<dyn ResultSink> {
        match self {
            OutputFormat::Csv => Box::new(CsvSink::new(writer)),
            OutputFormat::Json => Box::new(JsonLinesSink::new(writer)),
        }
    }
}

/// `# tick ...` header followed by `country,year,tempMin,tempMax,windMin,windMax` rows.
pub struct CsvSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResultSink for CsvSink<W> {
    fn emit(&mut self, report: &TickReport) -> Result<()> {
        writeln!(
            self.writer,
            "# tick {} rows={} retained={}",
            report.tick_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            report.rows.len(),
            report.retained
        )?;
        for row in &report.rows {
            writeln!(self.writer, "{}", row.to_csv_line())?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One JSON document per tick.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    fn emit(&mut self, report: &TickReport) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Forwards reports to an async consumer. Reports are dropped once the
/// receiving side has gone away.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<TickReport>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickReport>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ResultSink for ChannelSink {
    fn emit(&mut self, report: &TickReport) -> Result<()> {
        let _ = self.sender.send(report.clone());
        Ok(())
    }
}
