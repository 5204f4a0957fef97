use crate::domain::account::Account;
use crate::error::{BonusError, Result};
use std::io::Read;

/// Reads accounts from a CSV source with an `id,balance,bonus_granted` header.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Account>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    /// Creates a new `AccountReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes accounts.
    pub fn accounts(self) -> impl Iterator<Item = Result<Account>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BonusError::from))
    }
}
