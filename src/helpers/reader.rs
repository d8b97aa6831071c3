use crate::error::BotError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum SourceReaderError {
    #[error("No data from remote file: '{0}'")]
    RemoteFileNoDataError(String),

    #[error("Remote file '{0}' answered with status {1}")]
    RemoteFileStatusError(String, u16),
}

/// A reader over a spreadsheet source that is either a local file or a remote URL
pub(crate) enum SourceReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Remote URL reader (in-memory buffer)
    Remote(Cursor<Vec<u8>>),
}

impl SourceReader {
    /// Opens a source from either a local path or remote URL
    /// For remote URLs, the whole body is downloaded with the given blocking client
    ///
    /// # Arguments
    /// * `source` - Path or URL to the workbook
    /// * `client` - HTTP client carrying the fetch timeout
    ///
    /// # Returns
    /// * `Result<SourceReader, BotError>` - Reader for the source content
    pub(crate) fn open(source: &str, client: &reqwest::blocking::Client) -> Result<SourceReader, BotError> {
        if Self::is_remote_url(source) {
            Self::download(source, client)
        } else {
            let file = File::open(source)?;
            Ok(SourceReader::Local(BufReader::new(file)))
        }
    }

    /// Checks if a source names an HTTP(S) location
    pub(crate) fn is_remote_url(source: &str) -> bool {
        if let Ok(url) = Url::parse(source) {
            matches!(url.scheme(), "http" | "https")
        } else {
            false
        }
    }

    /// Downloads a remote file into memory, failing on any non-2xx answer or empty body
    fn download(source: &str, client: &reqwest::blocking::Client) -> Result<SourceReader, BotError> {
        let response = client.get(source).send()?;
        let status = response.status();
        if !status.is_success() {
            Err(SourceReaderError::RemoteFileStatusError(source.to_owned(), status.as_u16()))?;
        }

        let bytes = response.bytes()?;
        if bytes.is_empty() {
            Err(SourceReaderError::RemoteFileNoDataError(source.to_owned()))?;
        }

        Ok(SourceReader::Remote(Cursor::new(bytes.to_vec())))
    }
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            SourceReader::Local(reader) => reader.read(buf),
            SourceReader::Remote(reader) => reader.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            SourceReader::Local(reader) => reader.seek(pos),
            SourceReader::Remote(reader) => reader.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client() -> reqwest::blocking::Client {
        reqwest::blocking::Client::new()
    }

    #[test]
    fn test_is_remote_url() {
        // Local files
        assert!(!SourceReader::is_remote_url("data.xlsx"));
        assert!(!SourceReader::is_remote_url("/path/to/data.xlsx"));
        assert!(!SourceReader::is_remote_url("./relative/data.xlsx"));
        assert!(!SourceReader::is_remote_url("file:///path/to/data.xlsx"));

        // Remote URLs
        assert!(SourceReader::is_remote_url("http://example.com/data.xlsx"));
        assert!(SourceReader::is_remote_url("https://docs.google.com/spreadsheets/d/x/export?format=xlsx"));
    }

    #[test]
    fn test_open_local_file() {
        let result = SourceReader::open("Cargo.toml", &client());
        assert!(result.is_ok(), "Failed to open local file: {:?}", result.err());

        let result = SourceReader::open("non_existent_file.xlsx", &client());
        assert!(result.is_err(), "Should fail to open non-existent file");
    }

    #[test]
    fn test_open_remote_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/book.xlsx");
            then.status(200).body("PK");
        });

        let mut reader = SourceReader::open(&server.url("/book.xlsx"), &client()).unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "PK");
    }

    #[test]
    fn test_open_remote_file_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.xlsx");
            then.status(404);
        });

        let result = SourceReader::open(&server.url("/missing.xlsx"), &client());
        assert!(matches!(
            result,
            Err(BotError::SourceReaderError(SourceReaderError::RemoteFileStatusError(_, 404)))
        ));
    }

    #[test]
    fn test_open_remote_file_empty_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/empty.xlsx");
            then.status(200);
        });

        let result = SourceReader::open(&server.url("/empty.xlsx"), &client());
        assert!(matches!(
            result,
            Err(BotError::SourceReaderError(SourceReaderError::RemoteFileNoDataError(_)))
        ));
    }
}
