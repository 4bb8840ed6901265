// Transaction wire records.
//
// A compressed transaction is either a dedup reference
//
//   0xFE <32-byte fingerprint>          (always exactly 33 bytes)
//
// or the raw run-length encoding of the transaction, with no container
// header. A raw encoding that would itself look like a reference has its
// leading 0xFE re-emitted as the triplet FF 01 FE.

use crate::codec::rle;

use super::fingerprint::{FINGERPRINT_LEN, Fingerprint};

pub const DEDUP_MARKER: u8 = 0xFE;

pub const DEDUP_RECORD_LEN: usize = 1 + FINGERPRINT_LEN;

/// Reference to a pattern already held in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupRef(pub Fingerprint);

impl DedupRef {
    pub fn encode(&self) -> [u8; DEDUP_RECORD_LEN] {
        let mut buf = [0u8; DEDUP_RECORD_LEN];
        buf[0] = DEDUP_MARKER;
        buf[1..].copy_from_slice(self.0.as_bytes());
        buf
    }

    /// Parse a reference. Anything other than exactly 33 bytes starting
    /// with the marker is not a reference.
    pub fn parse(input: &[u8]) -> Option<Self> {
        if input.len() != DEDUP_RECORD_LEN || input[0] != DEDUP_MARKER {
            return None;
        }
        Fingerprint::from_slice(&input[1..]).map(Self)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.0
    }
}

/// Raw run-length payload for a transaction seen for the first time.
pub fn encode_payload(input: &[u8]) -> Vec<u8> {
    let mut out = rle::encode(input);
    if DedupRef::parse(&out).is_some() {
        out.splice(0..1, [rle::ESCAPE, 1, DEDUP_MARKER]);
    }
    out
}

/// Decode a raw (non-reference) payload.
pub fn decode_payload(input: &[u8]) -> Vec<u8> {
    rle::decode(input)
}
