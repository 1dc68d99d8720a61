use crate::file::csv::{error::FileError, settings::CsvSettings};
use model::records::source::SourceRecord;
use std::{fs::File, io::Read};
use tracing::{debug, info};

const UTF8_BOM: &str = "\u{feff}";

/// One-pass streaming reader over a delimited file with a header row.
///
/// Yields one [`SourceRecord`] per data row, keyed by header name. Rows
/// shorter than the header are accepted (missing cells are absent), invalid
/// UTF-8 is decoded lossily.
pub struct CsvSource<R: Read> {
    headers: Vec<String>,
    records: csv::ByteRecordsIntoIter<R>,
    rows_read: u64,
}

impl CsvSource<File> {
    pub fn open(path: &str, settings: CsvSettings) -> Result<Self, FileError> {
        let file = File::open(path).map_err(|e| FileError::from_open(path, e))?;
        let source = Self::from_reader(file, settings)?;
        info!(
            path,
            columns = source.headers.len(),
            "Opened CSV source"
        );
        Ok(source)
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R, settings: CsvSettings) -> Result<Self, FileError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(settings.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .byte_headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let name = String::from_utf8_lossy(h);
                if i == 0 {
                    name.trim_start_matches(UTF8_BOM).to_string()
                } else {
                    name.into_owned()
                }
            })
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(FileError::InvalidFormat("missing header row".into()));
        }
        debug!(?headers, "CSV headers");

        Ok(CsvSource {
            headers,
            records: rdr.into_byte_records(),
            rows_read: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<SourceRecord, FileError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => {
                return Some(Err(FileError::ReadError {
                    record: self.rows_read + 1,
                    message: e.to_string(),
                }));
            }
        };
        self.rows_read += 1;

        let cells = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).into_owned());
        Some(Ok(SourceRecord::from_cells(&self.headers, cells)))
    }
}
