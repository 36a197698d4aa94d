use crate::error::Result;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Loads whole ISD observation files for batch processing.
pub struct ObservationReader {
    use_mmap: bool,
}

/// Raw file contents, either copied into memory or mapped. Lines are decoded
/// one at a time so a single bad byte only spoils its own line.
pub enum ObservationText {
    Buffered(Vec<u8>),
    Mapped(Mmap),
}

impl ObservationText {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ObservationText::Buffered(bytes) => bytes.as_slice(),
            ObservationText::Mapped(mmap) => &mmap[..],
        }
    }

    pub fn lines(&self) -> Vec<&[u8]> {
        split_lines(self.as_bytes())
    }
}

/// Split on `\n`, dropping a trailing `\r`, with the same line count as
/// `str::lines`.
pub fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}

impl ObservationReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    pub fn open(&self, path: &Path) -> Result<ObservationText> {
        let file = File::open(path)?;
        if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            Ok(ObservationText::Mapped(mmap))
        } else {
            let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(ObservationText::Buffered(bytes))
        }
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_buffered_and_mapped_agree() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "first line")?;
        temp_file.write_all(b"bad \xff line\r\n")?;
        writeln!(temp_file, "third line")?;

        let buffered = ObservationReader::new().open(temp_file.path())?;
        let mapped = ObservationReader::with_mmap(true).open(temp_file.path())?;

        assert_eq!(buffered.as_bytes(), mapped.as_bytes());
        let lines = buffered.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], b"bad \xff line");
        assert_eq!(lines[2], b"third line");
        Ok(())
    }

    #[test]
    fn test_split_lines_matches_str_lines() {
        for text in ["", "\n", "a", "a\n", "a\r\nb", "a\n\nb\n"] {
            let expected: Vec<&[u8]> = text.lines().map(str::as_bytes).collect();
            assert_eq!(split_lines(text.as_bytes()), expected, "{:?}", text);
        }
    }
}
