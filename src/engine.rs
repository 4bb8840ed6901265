// Compression engine: ties the block container and the transaction
// transform to shared configuration, pattern cache and statistics.
//
// All mutable state sits behind one mutex, so an `Engine` can be shared
// between threads by reference. Codec work on blocks runs outside the
// lock; the transaction path holds it across lookup and insert so a
// buffer is stored exactly once.
//
// Block calls read `enabled` once on entry and act on that snapshot for
// the whole call: a `set_enabled(false)` racing an in-flight
// `compress_block` lets that call finish as a compressed, counted block
// and takes effect from the next call.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::container::{self, FormatError, Wrapped};
use crate::dedup::transaction::{self, DedupRef};
use crate::dedup::{Fingerprint, PatternCache};
use crate::stats::CompressionStats;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 9;
pub const DEFAULT_LEVEL: u32 = 6;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// When false every operation is the identity.
    pub enabled: bool,
    /// Compression level (1-9). Accepted and reported; the run-length codec
    /// has no level-dependent behavior.
    pub level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: DEFAULT_LEVEL,
        }
    }
}

impl EngineConfig {
    /// Enabled configuration at the given (clamped) level.
    pub fn enabled(level: i64) -> Self {
        Self {
            enabled: true,
            level: clamp_level(level),
        }
    }
}

/// Clamp a requested level into `MIN_LEVEL..=MAX_LEVEL`.
pub fn clamp_level(level: i64) -> u32 {
    level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u32
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("dedup reference to unknown pattern {0}")]
    DedupMiss(Fingerprint),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct State {
    config: EngineConfig,
    cache: PatternCache,
    stats: CompressionStats,
}

/// Block and transaction compression engine.
///
/// # Example
/// ```
/// use blockpress::engine::{Engine, EngineConfig};
///
/// let engine = Engine::with_config(EngineConfig::enabled(6));
/// let block = vec![0u8; 512];
/// let packed = engine.compress_block(&block).unwrap();
/// assert!(packed.len() < block.len());
/// assert_eq!(engine.decompress_block(&packed).unwrap(), block);
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    state: Mutex<State>,
}

static GLOBAL: OnceLock<Engine> = OnceLock::new();

impl Engine {
    /// New engine with compression disabled and an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            state: Mutex::new(State {
                config: EngineConfig {
                    level: clamp_level(config.level as i64),
                    ..config
                },
                ..State::default()
            }),
        }
    }

    /// Process-wide shared instance, created disabled on first use.
    ///
    /// Prefer passing an `&Engine` explicitly; this exists for call sites
    /// that have no context to thread one through.
    pub fn global() -> &'static Engine {
        GLOBAL.get_or_init(Engine::new)
    }

    // Every critical section leaves the state consistent, so a panic in
    // another thread does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- configuration ------------------------------------------------------

    pub fn set_enabled(&self, enabled: bool) {
        self.lock().config.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().config.enabled
    }

    /// Set the compression level, silently clamped to 1-9.
    pub fn set_level(&self, level: i64) {
        self.lock().config.level = clamp_level(level);
    }

    pub fn level(&self) -> u32 {
        self.lock().config.level
    }

    pub fn config(&self) -> EngineConfig {
        self.lock().config
    }

    // -- statistics and cache -----------------------------------------------

    /// Snapshot of the counters.
    pub fn stats(&self) -> CompressionStats {
        self.lock().stats
    }

    pub fn reset_stats(&self) {
        self.lock().stats = CompressionStats::default();
    }

    pub fn clear_cache(&self) {
        let mut state = self.lock();
        log::debug!("clearing {} cached patterns", state.cache.len());
        state.cache.clear();
    }

    pub fn cache_size_bytes(&self) -> usize {
        self.lock().cache.size_bytes()
    }

    pub fn cache_len(&self) -> usize {
        self.lock().cache.len()
    }

    /// Submission count for a cached pattern.
    pub fn pattern_ref_count(&self, fingerprint: &Fingerprint) -> Option<u32> {
        self.lock().cache.ref_count(fingerprint)
    }

    // -- blocks -------------------------------------------------------------

    /// Compress a serialized block into a container record.
    ///
    /// Returns a copy of `input` when compression is disabled. The enabled
    /// flag is sampled once on entry.
    pub fn compress_block(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        if !self.is_enabled() {
            return Ok(input.to_vec());
        }

        let wrapped = container::wrap(input)?;
        self.lock()
            .stats
            .record_block(wrapped.original_len, wrapped.payload_len);
        log::trace!(
            "compressed block: {} -> {} bytes",
            wrapped.original_len,
            wrapped.record.len()
        );
        Ok(wrapped.record)
    }

    /// Reverse [`compress_block`](Self::compress_block).
    ///
    /// Data that is not a container (too short, wrong magic) and all data
    /// while compression is disabled is returned unchanged.
    pub fn decompress_block(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        if !self.is_enabled() {
            return Ok(input.to_vec());
        }
        Ok(container::unwrap(input)?.into_bytes(input))
    }

    /// Compress many blocks, updating statistics once for the whole batch.
    ///
    /// Runs on the rayon pool with the `parallel` feature. Nothing is
    /// recorded if any block fails.
    pub fn compress_blocks<B>(&self, blocks: &[B]) -> Result<Vec<Vec<u8>>, Error>
    where
        B: AsRef<[u8]> + Sync,
    {
        if !self.is_enabled() {
            return Ok(blocks.iter().map(|b| b.as_ref().to_vec()).collect());
        }

        #[cfg(feature = "parallel")]
        let wrapped: Result<Vec<Wrapped>, FormatError> =
            blocks.par_iter().map(|b| container::wrap(b.as_ref())).collect();
        #[cfg(not(feature = "parallel"))]
        let wrapped: Result<Vec<Wrapped>, FormatError> =
            blocks.iter().map(|b| container::wrap(b.as_ref())).collect();
        let wrapped = wrapped?;

        let mut state = self.lock();
        for w in &wrapped {
            state.stats.record_block(w.original_len, w.payload_len);
        }
        drop(state);

        Ok(wrapped.into_iter().map(|w| w.record).collect())
    }

    /// Decompress many blocks; fails on the first malformed container.
    pub fn decompress_blocks<B>(&self, blocks: &[B]) -> Result<Vec<Vec<u8>>, Error>
    where
        B: AsRef<[u8]> + Sync,
    {
        if !self.is_enabled() {
            return Ok(blocks.iter().map(|b| b.as_ref().to_vec()).collect());
        }

        let unwrap_one = |b: &B| -> Result<Vec<u8>, Error> {
            let input = b.as_ref();
            Ok(container::unwrap(input)?.into_bytes(input))
        };

        #[cfg(feature = "parallel")]
        return blocks.par_iter().map(unwrap_one).collect();
        #[cfg(not(feature = "parallel"))]
        return blocks.iter().map(unwrap_one).collect();
    }

    // -- transactions -------------------------------------------------------

    /// Compress a serialized transaction.
    ///
    /// A buffer already in the cache becomes a 33-byte dedup reference;
    /// otherwise it is cached and returned run-length encoded.
    pub fn compress_transaction(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        if !self.is_enabled() {
            return Ok(input.to_vec());
        }

        let fingerprint = Fingerprint::of(input);
        let mut state = self.lock();
        let seen = state.cache.contains(&fingerprint);
        let refs = state.cache.store_or_bump(fingerprint, input);

        if seen {
            state.stats.record_dedup_hit();
            drop(state);
            log::debug!("transaction {fingerprint} deduplicated (refs={refs})");
            return Ok(DedupRef(fingerprint).encode().to_vec());
        }
        drop(state);

        Ok(transaction::encode_payload(input))
    }

    /// Reverse [`compress_transaction`](Self::compress_transaction).
    ///
    /// A dedup reference resolves only against this engine's cache; a
    /// reference to a pattern it does not hold is [`Error::DedupMiss`].
    pub fn decompress_transaction(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        if input.is_empty() || !self.is_enabled() {
            return Ok(input.to_vec());
        }

        if let Some(reference) = DedupRef::parse(input) {
            let fingerprint = reference.fingerprint();
            return self
                .lock()
                .cache
                .get(&fingerprint)
                .ok_or(Error::DedupMiss(fingerprint));
        }

        Ok(transaction::decode_payload(input))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
