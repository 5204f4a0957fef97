//! Application layer containing the business logic orchestration.
//!
//! `BonusGranter` is the retry-safe way to award the one-time bonus, and
//! `baseline` keeps the unsafe read-modify-write for comparison.
//! `LogQueryService` pages through stored log entries.

pub mod baseline;
pub mod bonus;
pub mod log_query;
