// Running compression counters.

/// Counters accumulated by an [`Engine`](crate::engine::Engine).
///
/// Byte totals and `blocks_compressed` move only on the block path;
/// `deduped_transactions` moves only on transaction dedup hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Bytes handed to the block codec.
    pub total_bytes_original: u64,
    /// Codec output bytes, container headers excluded.
    pub total_bytes_compressed: u64,
    pub blocks_compressed: u64,
    pub deduped_transactions: u64,
}

impl CompressionStats {
    /// `compressed / original`, or 1.0 before any bytes were seen.
    pub fn compression_ratio(&self) -> f64 {
        if self.total_bytes_original == 0 {
            return 1.0;
        }
        self.total_bytes_compressed as f64 / self.total_bytes_original as f64
    }

    /// Bytes saved on the block path (negative if the codec expanded data).
    pub fn bytes_saved(&self) -> i64 {
        self.total_bytes_original as i64 - self.total_bytes_compressed as i64
    }

    pub(crate) fn record_block(&mut self, original_len: usize, payload_len: usize) {
        self.total_bytes_original += original_len as u64;
        self.total_bytes_compressed += payload_len as u64;
        self.blocks_compressed += 1;
    }

    pub(crate) fn record_dedup_hit(&mut self) {
        self.deduped_transactions += 1;
    }
}
