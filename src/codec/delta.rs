// XOR delta codec between two buffers.
//
// Layout:
//
//   size_diff   i32, big-endian   len(target) - len(base)
//   xor         min(len(base), len(target)) bytes of target[i] ^ base[i]
//   tail        target bytes past len(base), when target is longer
//
// The size field is four bytes, so buffers whose lengths differ by more
// than i32 can represent are rejected at encode time.

/// Width of the size-difference prefix.
pub const SIZE_DIFF_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeltaError {
    #[error("delta too short: {0} bytes, need at least 4")]
    Truncated(usize),
    #[error("size difference {0} does not fit in 32 bits")]
    SizeDiffOutOfRange(i64),
    #[error("size difference {diff} makes target length negative (base is {base_len} bytes)")]
    NegativeTargetSize { base_len: usize, diff: i32 },
    #[error("decoded length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `target` as a delta against `base`.
pub fn encode(base: &[u8], target: &[u8]) -> Result<Vec<u8>, DeltaError> {
    let diff = target.len() as i64 - base.len() as i64;
    let diff32 = i32::try_from(diff).map_err(|_| DeltaError::SizeDiffOutOfRange(diff))?;

    let overlap = base.len().min(target.len());
    let mut delta = Vec::with_capacity(SIZE_DIFF_LEN + target.len());
    delta.extend_from_slice(&diff32.to_be_bytes());
    delta.extend(
        target[..overlap]
            .iter()
            .zip(&base[..overlap])
            .map(|(t, b)| t ^ b),
    );
    delta.extend_from_slice(&target[overlap..]);

    Ok(delta)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Reconstruct the target from `base` and a delta produced by [`encode`].
pub fn decode(base: &[u8], delta: &[u8]) -> Result<Vec<u8>, DeltaError> {
    let Some((prefix, body)) = delta.split_first_chunk::<SIZE_DIFF_LEN>() else {
        return Err(DeltaError::Truncated(delta.len()));
    };
    let diff = i32::from_be_bytes(*prefix);

    let target_size = usize::try_from(base.len() as i64 + i64::from(diff)).map_err(|_| {
        DeltaError::NegativeTargetSize {
            base_len: base.len(),
            diff,
        }
    })?;

    // XOR the overlap; the tail is only read when the target outgrew the
    // base. Surplus body bytes are ignored otherwise.
    let overlap = base.len().min(target_size).min(body.len());
    let mut target = Vec::with_capacity(target_size.min(body.len()));
    target.extend(
        body[..overlap]
            .iter()
            .zip(&base[..overlap])
            .map(|(d, b)| d ^ b),
    );
    if target_size > base.len() {
        target.extend_from_slice(&body[overlap..]);
    }

    if target.len() != target_size {
        return Err(DeltaError::LengthMismatch {
            expected: target_size,
            actual: target.len(),
        });
    }

    Ok(target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
