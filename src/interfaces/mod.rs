//! Input/output adapters for the command line.

pub mod csv;
