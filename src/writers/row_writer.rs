use crate::error::Result;
use crate::models::AggregateRow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes batch results as `country,year,tempMin,tempMax,windMin,windMax` lines.
pub struct RowWriter;

impl RowWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_rows(&self, rows: &[AggregateRow], path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        for row in rows {
            writeln!(writer, "{}", row.to_csv_line())?;
        }
        writer.flush()?;
        Ok(rows.len())
    }
}

impl Default for RowWriter {
    fn default() -> Self {
        Self::new()
    }
}
