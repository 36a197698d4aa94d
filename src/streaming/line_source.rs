use crate::error::{ProcessingError, Result};
use std::fmt;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::net::TcpStream;

pub type LineStream = Lines<BufReader<Box<dyn AsyncRead + Unpin + Send>>>;

/// Where observation lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    /// Connect to a server that pushes newline-delimited records.
    Tcp { host: String, port: u16 },
    File(PathBuf),
    Stdin,
}

impl LineSource {
    /// Connect or open. Failure here is fatal for the stream command.
    pub async fn open(&self) -> Result<LineStream> {
        let reader: Box<dyn AsyncRead + Unpin + Send> = match self {
            LineSource::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(|source| ProcessingError::SourceUnavailable {
                        address: self.to_string(),
                        source,
                    })?;
                Box::new(stream)
            }
            LineSource::File(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|source| {
                    ProcessingError::SourceUnavailable {
                        address: self.to_string(),
                        source,
                    }
                })?;
                Box::new(file)
            }
            LineSource::Stdin => Box::new(tokio::io::stdin()),
        };
        Ok(lines_from(reader))
    }
}

impl fmt::Display for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSource::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
            LineSource::File(path) => write!(f, "{}", path.display()),
            LineSource::Stdin => write!(f, "stdin"),
        }
    }
}

pub fn lines_from<R: AsyncRead + Unpin + Send + 'static>(reader: R) -> LineStream {
    let reader: Box<dyn AsyncRead + Unpin + Send> = Box::new(reader);
    BufReader::new(reader).lines()
}
