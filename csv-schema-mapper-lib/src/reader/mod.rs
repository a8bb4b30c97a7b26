use crate::error::ProcessorError;
use crate::types::{HeaderIndex, Row};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Streams a CSV as chunks of at most `chunk_size` rows, in source order.
///
/// Records may be shorter or longer than the header; cells past the end of a
/// short record read as absent.
pub struct ChunkedReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Arc<HeaderIndex>,
    chunk_size: usize,
    rows_read: u64,
    done: bool,
}

impl ChunkedReader<File> {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        delimiter: u8,
        chunk_size: usize,
    ) -> Result<Self, ProcessorError> {
        let path = path.as_ref();
        tracing::debug!("Opening CSV at {}", path.display());
        let file = File::open(path).map_err(|e| {
            tracing::error!("Failed to open CSV @ {}: {}", path.display(), e);
            e
        })?;
        Self::from_reader(file, delimiter, chunk_size)
    }
}

impl<R: Read> ChunkedReader<R> {
    pub fn from_reader(
        source: R,
        delimiter: u8,
        chunk_size: usize,
    ) -> Result<Self, ProcessorError> {
        if chunk_size == 0 {
            return Err(ProcessorError::InvalidConfig(
                "chunk size must be at least 1".into(),
            ));
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(source);
        let headers = Arc::new(HeaderIndex::from_record(reader.headers()?));
        tracing::debug!("CSV headers: {:?}", headers.names());
        Ok(Self {
            reader,
            headers,
            chunk_size,
            rows_read: 0,
            done: false,
        })
    }

    pub fn headers(&self) -> &HeaderIndex {
        &self.headers
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Reads the next chunk; `Ok(None)` once the source is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<Row>>, ProcessorError> {
        if self.done {
            return Ok(None);
        }
        let mut chunk = Vec::with_capacity(self.chunk_size.min(DEFAULT_CHUNK_SIZE));
        let mut record = csv::StringRecord::new();
        while chunk.len() < self.chunk_size {
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    chunk.push(Row::new(Arc::clone(&self.headers), record.clone()));
                }
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Err(e.into());
                }
            }
        }
        self.rows_read += chunk.len() as u64;
        if chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(chunk))
        }
    }
}

impl<R: Read> Iterator for ChunkedReader<R> {
    type Item = Result<Vec<Row>, ProcessorError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// Header names plus the first few rows, as shown to the language model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvSample {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvSample {
    pub fn from_reader<R: Read>(
        source: R,
        delimiter: u8,
        sample_rows: usize,
    ) -> Result<Self, ProcessorError> {
        let mut reader = ChunkedReader::from_reader(source, delimiter, sample_rows.max(1))?;
        let headers = reader.headers().names().to_vec();
        let rows = if sample_rows == 0 {
            Vec::new()
        } else {
            reader
                .next_chunk()?
                .unwrap_or_default()
                .iter()
                .map(Row::values)
                .collect()
        };
        Ok(Self { headers, rows })
    }

    pub fn from_path<P: AsRef<Path>>(
        path: P,
        delimiter: u8,
        sample_rows: usize,
    ) -> Result<Self, ProcessorError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file, delimiter, sample_rows)
    }
}
