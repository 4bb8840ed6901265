// Transaction deduplication.
//
// - `fingerprint` — double SHA-256 content fingerprints
// - `cache`       — fingerprint-keyed pattern store with reference counts
// - `transaction` — dedup reference record and raw transaction payloads

pub mod cache;
pub mod fingerprint;
pub mod transaction;

pub use cache::{PatternCache, PatternEntry};
pub use fingerprint::{FINGERPRINT_LEN, Fingerprint};
pub use transaction::{DEDUP_MARKER, DEDUP_RECORD_LEN, DedupRef};
