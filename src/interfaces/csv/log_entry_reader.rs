use crate::domain::log_entry::LogEntry;
use crate::error::{BonusError, Result};
use std::io::Read;

/// Streams log entries from CSV with an `id,timestamp,severity,message` header.
///
/// Timestamps are RFC 3339 and severities use the stored uppercase form.
pub struct LogEntryReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LogEntryReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn entries(self) -> impl Iterator<Item = Result<LogEntry>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BonusError::from))
    }
}
