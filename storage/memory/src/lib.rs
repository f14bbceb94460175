//! An in-memory ledger: records live in a `Vec` in the order they were posted, queries
//! are answered by evaluating the filter against every record.

mod ledger;
mod record;

pub use ledger::MemoryLedger;
pub use record::Record;
