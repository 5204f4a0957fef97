pub mod account_reader;
pub mod account_writer;
pub mod log_entry_reader;
