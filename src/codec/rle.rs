// Run-length byte codec.
//
// Output is a plain byte stream where every 0xFF begins an escape triplet:
//
//   0xFF <run length: 1..=255> <run value>
//
// All other bytes are literals. Runs shorter than MIN_RUN are copied
// literally (a triplet would expand them), except runs of the escape byte
// itself, which are always emitted as triplets so the decoder never sees a
// bare 0xFF.

/// Escape marker introducing a run triplet.
pub const ESCAPE: u8 = 0xFF;

/// Shortest run worth emitting as a triplet.
pub const MIN_RUN: usize = 4;

/// Longest run a single triplet can describe (count fits in one byte).
pub const MAX_RUN: usize = 255;

/// Length of an escape triplet.
pub const TRIPLET_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Length of the run of `byte` at the start of `data`, capped at `max`.
#[inline]
pub fn find_run_length(data: &[u8], byte: u8, max: usize) -> usize {
    let n = max.min(data.len());
    let mut i = 0;
    while i < n && data[i] == byte {
        i += 1;
    }
    i
}

/// Run-length encode `input`.
///
/// Empty input yields empty output.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    encode_into(input, &mut output);
    output
}

/// Run-length encode `input`, appending to `output`.
pub fn encode_into(input: &[u8], output: &mut Vec<u8>) {
    let mut pos = 0usize;

    while pos < input.len() {
        let byte = input[pos];
        let run = find_run_length(&input[pos..], byte, MAX_RUN);

        if run >= MIN_RUN || byte == ESCAPE {
            output.extend_from_slice(&[ESCAPE, run as u8, byte]);
        } else {
            output.extend_from_slice(&input[pos..pos + run]);
        }
        pos += run;
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a run-length encoded buffer.
///
/// A 0xFF followed by at least two bytes is expanded as a triplet; a 0xFF in
/// the last two positions is copied literally. Decoding never fails: any
/// byte string decodes to something, and output produced by [`encode`]
/// decodes to exactly the original input.
pub fn decode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len().saturating_mul(2));
    decode_into(input, &mut output);
    output
}

/// Decode `input`, appending to `output`.
pub fn decode_into(input: &[u8], output: &mut Vec<u8>) {
    let mut pos = 0usize;

    while pos < input.len() {
        let byte = input[pos];
        if byte == ESCAPE && pos + 2 < input.len() {
            let len = input[pos + 1] as usize;
            let value = input[pos + 2];
            output.resize(output.len() + len, value);
            pos += TRIPLET_LEN;
        } else {
            output.push(byte);
            pos += 1;
        }
    }
}

/// Length [`decode`] would produce for `input`, without allocating.
///
/// Lets callers check an untrusted payload against a declared size before
/// expanding it.
pub fn decoded_len(input: &[u8]) -> usize {
    let mut pos = 0usize;
    let mut len = 0usize;

    while pos < input.len() {
        if input[pos] == ESCAPE && pos + 2 < input.len() {
            len += input[pos + 1] as usize;
            pos += TRIPLET_LEN;
        } else {
            len += 1;
            pos += 1;
        }
    }
    len
}

/// Upper bound on the encoded size of `len` input bytes.
///
/// Worst case is a stream of isolated 0xFF bytes, each becoming a triplet.
pub fn max_encoded_len(len: usize) -> usize {
    len.saturating_mul(TRIPLET_LEN)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) {
        let encoded = encode(input);
        let decoded = decode(&encoded);
        assert_eq!(
            decoded,
            input,
            "roundtrip mismatch (input={}, encoded={})",
            input.len(),
            encoded.len()
        );
    }

    #[test]
    fn empty_input() {
        assert!(encode(b"").is_empty());
        assert!(decode(b"").is_empty());
    }

    #[test]
    fn short_runs_are_literal() {
        assert_eq!(encode(b"abc"), b"abc");
        assert_eq!(encode(b"aaab"), b"aaab");
    }

    #[test]
    fn long_run_becomes_triplet() {
        assert_eq!(encode(b"aaaa"), vec![ESCAPE, 4, b'a']);
        assert_eq!(encode(b"xaaaaay"), vec![b'x', ESCAPE, 5, b'a', b'y']);
    }

    #[test]
    fn runs_split_at_max() {
        let input = vec![0x11u8; 600];
        let encoded = encode(&input);
        assert_eq!(
            encoded,
            vec![ESCAPE, 255, 0x11, ESCAPE, 255, 0x11, ESCAPE, 90, 0x11]
        );
        roundtrip(&input);
    }

    #[test]
    fn tail_shorter_than_min_run_stays_literal() {
        // 258 = one full triplet + three literal bytes.
        let input = vec![0x22u8; 258];
        let encoded = encode(&input);
        assert_eq!(encoded, vec![ESCAPE, 255, 0x22, 0x22, 0x22, 0x22]);
        roundtrip(&input);
    }

    #[test]
    fn escape_byte_is_always_a_triplet() {
        assert_eq!(encode(&[ESCAPE]), vec![ESCAPE, 1, ESCAPE]);
        assert_eq!(encode(&[1, ESCAPE, ESCAPE, 2]), vec![1, ESCAPE, 2, ESCAPE, 2]);
        roundtrip(&[ESCAPE]);
        roundtrip(&[ESCAPE, 0x00, 0x01]);
        roundtrip(&[0x10, ESCAPE, ESCAPE, ESCAPE]);
    }

    #[test]
    fn encoder_never_emits_bare_escape() {
        let input: Vec<u8> = (0..=255u8).chain([ESCAPE, 7, ESCAPE, ESCAPE]).collect();
        let encoded = encode(&input);
        let mut pos = 0;
        while pos < encoded.len() {
            if encoded[pos] == ESCAPE {
                assert!(pos + 2 < encoded.len(), "dangling escape at {pos}");
                assert!(encoded[pos + 1] >= 1);
                pos += TRIPLET_LEN;
            } else {
                pos += 1;
            }
        }
        roundtrip(&input);
    }

    #[test]
    fn trailing_escape_decodes_literally() {
        assert_eq!(decode(&[1, ESCAPE]), vec![1, ESCAPE]);
        assert_eq!(decode(&[ESCAPE, 3]), vec![ESCAPE, 3]);
    }

    #[test]
    fn zero_length_triplet_expands_to_nothing() {
        assert_eq!(decode(&[7, ESCAPE, 0, 9, 8]), vec![7, 8]);
    }

    #[test]
    fn thousand_repeats_shrink() {
        let input = vec![0xAAu8; 1000];
        let encoded = encode(&input);
        assert!(encoded.len() < input.len());
        assert_eq!(encoded.len(), 12);
        roundtrip(&input);
    }

    #[test]
    fn mixed_content_roundtrip() {
        let mut input = vec![0xAAu8; 100];
        input.extend((0..50u8).map(|i| i % 7));
        input.extend_from_slice(&[ESCAPE; 3]);
        input.extend_from_slice(b"tail");
        roundtrip(&input);
    }

    #[test]
    fn encoded_len_is_bounded() {
        let input: Vec<u8> = (0..4096).map(|i| if i % 2 == 0 { ESCAPE } else { 0 }).collect();
        assert!(encode(&input).len() <= max_encoded_len(input.len()));
    }

    #[test]
    fn find_run_length_caps() {
        assert_eq!(find_run_length(b"aaab", b'a', 10), 3);
        assert_eq!(find_run_length(b"aaaa", b'a', 2), 2);
        assert_eq!(find_run_length(b"baaa", b'a', 10), 0);
        assert_eq!(find_run_length(b"", b'a', 10), 0);
    }

    #[test]
    fn decoded_len_matches_decode() {
        let inputs: [&[u8]; 5] = [
            b"",
            b"plain",
            &[ESCAPE, 200, 7, b'x', ESCAPE, 3, ESCAPE],
            &[b'a', ESCAPE, 9],
            &[ESCAPE, 255, 0, ESCAPE, 255, 0, ESCAPE],
        ];
        for input in inputs {
            assert_eq!(decoded_len(input), decode(input).len(), "{input:?}");
        }
    }
}
