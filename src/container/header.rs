// Compressed block container header.
//
// Fixed 14-byte big-endian layout:
//
//   offset  size  field
//   0       4     magic "TCMP"
//   4       1     version
//   5       1     flags
//   6       4     original size
//   10      4     compressed (payload) size

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Magic, version, sizes
// ---------------------------------------------------------------------------

pub const CONTAINER_MAGIC: [u8; 4] = *b"TCMP";

/// The only container version this engine reads or writes.
pub const CONTAINER_VERSION: u8 = 0x01;

pub const HEADER_LEN: usize = 14;

const VERSION_OFFSET: usize = 4;
const FLAGS_OFFSET: usize = 5;
const ORIGINAL_SIZE_OFFSET: usize = 6;
const COMPRESSED_SIZE_OFFSET: usize = 10;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

bitflags! {
    /// Container flag bits. Only `COMPRESSED` is produced by the encoder;
    /// the other two are reserved and carried through without effect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContainerFlags: u8 {
        const COMPRESSED = 1 << 0;
        const DEDUPLICATED = 1 << 1;
        const DELTA_ENCODED = 1 << 2;
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Malformed or unsupported container data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("container header needs 14 bytes, got {0}")]
    HeaderTooShort(usize),
    #[error("bad container magic: {0:02X?}")]
    BadMagic([u8; 4]),
    #[error("unsupported container version {found:#04X} (expected {expected:#04X})")]
    UnsupportedVersion { found: u8, expected: u8 },
    #[error("declared payload of {declared} bytes exceeds the {available} bytes available")]
    Truncated { declared: usize, available: usize },
    #[error("decoded {actual} bytes but header declares {declared}")]
    SizeMismatch { declared: usize, actual: usize },
    #[error("input of {0} bytes exceeds the container size limit")]
    InputTooLarge(usize),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u8,
    pub flags: ContainerFlags,
    /// Length of the payload before compression.
    pub original_size: u32,
    /// Length of the codec output following the header.
    pub compressed_size: u32,
}

impl ContainerHeader {
    /// Header for a freshly compressed payload at the current version.
    pub fn new(original_size: u32, compressed_size: u32) -> Self {
        Self {
            version: CONTAINER_VERSION,
            flags: ContainerFlags::COMPRESSED,
            original_size,
            compressed_size,
        }
    }

    /// Serialize to the fixed 14-byte layout.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[..VERSION_OFFSET].copy_from_slice(&CONTAINER_MAGIC);
        buf[VERSION_OFFSET] = self.version;
        buf[FLAGS_OFFSET] = self.flags.bits();
        buf[ORIGINAL_SIZE_OFFSET..COMPRESSED_SIZE_OFFSET]
            .copy_from_slice(&self.original_size.to_be_bytes());
        buf[COMPRESSED_SIZE_OFFSET..HEADER_LEN]
            .copy_from_slice(&self.compressed_size.to_be_bytes());
        buf
    }

    /// Append the encoded header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.encode());
    }

    /// Parse a header from the start of `bytes`.
    ///
    /// Checks length, magic and version. Flags are kept as-is (unknown bits
    /// retained) and payload bounds are not checked here.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let Some(head) = bytes.first_chunk::<HEADER_LEN>() else {
            return Err(FormatError::HeaderTooShort(bytes.len()));
        };

        let magic = [head[0], head[1], head[2], head[3]];
        if magic != CONTAINER_MAGIC {
            return Err(FormatError::BadMagic(magic));
        }

        let version = head[VERSION_OFFSET];
        if version != CONTAINER_VERSION {
            return Err(FormatError::UnsupportedVersion {
                found: version,
                expected: CONTAINER_VERSION,
            });
        }

        Ok(Self {
            version,
            flags: ContainerFlags::from_bits_retain(head[FLAGS_OFFSET]),
            original_size: read_u32_be(head, ORIGINAL_SIZE_OFFSET),
            compressed_size: read_u32_be(head, COMPRESSED_SIZE_OFFSET),
        })
    }

    /// Total record length (header plus declared payload).
    #[inline]
    pub fn record_len(&self) -> usize {
        HEADER_LEN + self.compressed_size as usize
    }
}

#[inline]
fn read_u32_be(buf: &[u8; HEADER_LEN], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Does `bytes` start with the container magic?
#[inline]
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&CONTAINER_MAGIC)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
