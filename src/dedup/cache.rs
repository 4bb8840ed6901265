// Content-addressed pattern cache.
//
// Maps a fingerprint to the one stored copy of a transaction buffer plus
// the number of times that buffer was submitted. There is no eviction;
// callers bound memory with `clear()` using `size_bytes()` as the gauge.

use std::collections::HashMap;

use super::fingerprint::Fingerprint;

/// One stored pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub fingerprint: Fingerprint,
    /// Owned copy of the original, uncompressed buffer.
    pub data: Vec<u8>,
    /// Submissions of this exact buffer, always >= 1.
    pub ref_count: u32,
}

/// Fixed accounting overhead charged per entry by [`PatternCache::size_bytes`].
pub const ENTRY_OVERHEAD: usize = std::mem::size_of::<PatternEntry>();

/// Fingerprint-keyed pattern store.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: HashMap<Fingerprint, PatternEntry>,
    payload_bytes: usize,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint `data` and report whether it is already stored.
    pub fn lookup(&self, data: &[u8]) -> (Fingerprint, bool) {
        let fingerprint = Fingerprint::of(data);
        let found = self.entries.contains_key(&fingerprint);
        (fingerprint, found)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Insert `data` under `fingerprint` with a count of one, or bump the
    /// count of the existing entry. Stored bytes are never replaced.
    ///
    /// Returns the entry's count after the call.
    pub fn store_or_bump(&mut self, fingerprint: Fingerprint, data: &[u8]) -> u32 {
        if let Some(entry) = self.entries.get_mut(&fingerprint) {
            entry.ref_count = entry.ref_count.saturating_add(1);
            return entry.ref_count;
        }

        self.payload_bytes += data.len();
        self.entries.insert(
            fingerprint,
            PatternEntry {
                fingerprint,
                data: data.to_vec(),
                ref_count: 1,
            },
        );
        1
    }

    /// Copy of the stored bytes for `fingerprint`.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Vec<u8>> {
        self.entries.get(fingerprint).map(|e| e.data.clone())
    }

    pub fn ref_count(&self, fingerprint: &Fingerprint) -> Option<u32> {
        self.entries.get(fingerprint).map(|e| e.ref_count)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.payload_bytes = 0;
    }

    /// Stored payload bytes plus [`ENTRY_OVERHEAD`] per entry.
    pub fn size_bytes(&self) -> usize {
        self.payload_bytes + self.entries.len() * ENTRY_OVERHEAD
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
