// Self-describing block container.
//
// `wrap` frames run-length codec output behind a 14-byte header;
// `unwrap` reverses it. Data without the container magic is passed through
// untouched so readers stay compatible with uncompressed blocks.
//
// - `header` — fixed header layout, flags and format errors

pub mod header;

pub use header::{
    CONTAINER_MAGIC, CONTAINER_VERSION, ContainerFlags, ContainerHeader, FormatError, HEADER_LEN,
};

use crate::codec::rle;

/// Result of [`wrap`]: the framed record plus the sizes that feed statistics.
#[derive(Debug, Clone)]
pub struct Wrapped {
    pub record: Vec<u8>,
    /// Bytes handed to the codec.
    pub original_len: usize,
    /// Bytes of codec output (header excluded).
    pub payload_len: usize,
}

/// Result of [`unwrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unwrapped {
    /// Input is not a container; the caller keeps it as-is.
    Passthrough,
    /// Payload decoded from a well-formed container.
    Decoded(Vec<u8>),
}

impl Unwrapped {
    /// Resolve to the output bytes, copying `input` for passthroughs.
    pub fn into_bytes(self, input: &[u8]) -> Vec<u8> {
        match self {
            Self::Passthrough => input.to_vec(),
            Self::Decoded(data) => data,
        }
    }
}

/// Compress `input` and frame it in a container record.
///
/// Fails only when `input` (or its encoding) is too large for the 32-bit
/// size fields.
pub fn wrap(input: &[u8]) -> Result<Wrapped, FormatError> {
    let original_size =
        u32::try_from(input.len()).map_err(|_| FormatError::InputTooLarge(input.len()))?;

    let mut record = Vec::with_capacity(HEADER_LEN + input.len());
    record.resize(HEADER_LEN, 0);
    rle::encode_into(input, &mut record);

    let payload_len = record.len() - HEADER_LEN;
    let compressed_size =
        u32::try_from(payload_len).map_err(|_| FormatError::InputTooLarge(input.len()))?;

    let header = ContainerHeader::new(original_size, compressed_size);
    record[..HEADER_LEN].copy_from_slice(&header.encode());

    Ok(Wrapped {
        record,
        original_len: input.len(),
        payload_len,
    })
}

/// Decode a container record.
///
/// Inputs shorter than a header or lacking the magic are `Passthrough`.
/// Bytes past the declared payload are ignored.
pub fn unwrap(input: &[u8]) -> Result<Unwrapped, FormatError> {
    if input.len() < HEADER_LEN || !header::has_magic(input) {
        return Ok(Unwrapped::Passthrough);
    }

    let header = ContainerHeader::parse(input)?;

    if header.flags != ContainerFlags::COMPRESSED {
        log::debug!(
            "container carries flags {:#04X}; decoding payload as run-length",
            header.flags.bits()
        );
    }

    let end = header.record_len();
    if end > input.len() {
        return Err(FormatError::Truncated {
            declared: header.compressed_size as usize,
            available: input.len() - HEADER_LEN,
        });
    }
    if end < input.len() {
        log::debug!(
            "ignoring {} bytes past the container payload",
            input.len() - end
        );
    }

    // Size the output before expanding an untrusted payload.
    let payload = &input[HEADER_LEN..end];
    let decoded_len = rle::decoded_len(payload);
    if decoded_len != header.original_size as usize {
        return Err(FormatError::SizeMismatch {
            declared: header.original_size as usize,
            actual: decoded_len,
        });
    }

    let mut decoded = Vec::with_capacity(decoded_len);
    rle::decode_into(payload, &mut decoded);

    Ok(Unwrapped::Decoded(decoded))
}

/// Does `input` look like a container record (long enough, right magic)?
pub fn is_container(input: &[u8]) -> bool {
    input.len() >= HEADER_LEN && header::has_magic(input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
