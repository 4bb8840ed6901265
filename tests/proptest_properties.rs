use blockpress::codec::{delta, rle};
use blockpress::container::{self, ContainerHeader, HEADER_LEN};
use blockpress::dedup::{DEDUP_RECORD_LEN, DedupRef, Fingerprint};
use blockpress::{Engine, EngineConfig};
use proptest::prelude::*;

/// Byte strings biased towards runs, so the codec sees both literals and
/// triplets (including runs of the escape byte).
fn runny_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        (prop_oneof![Just(0u8), Just(0xFFu8), any::<u8>()], 1usize..300),
        0..max_len,
    )
    .prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, len)| std::iter::repeat_n(byte, len))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_rle_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(rle::decode(&rle::encode(&data)), data);
    }

    #[test]
    fn prop_rle_roundtrip_runs(data in runny_bytes(32)) {
        let encoded = rle::encode(&data);
        prop_assert!(encoded.len() <= rle::max_encoded_len(data.len()));
        prop_assert_eq!(rle::decode(&encoded), data);
    }

    #[test]
    fn prop_rle_decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let _ = rle::decode(&data);
    }

    #[test]
    fn prop_block_roundtrip_all_levels(data in runny_bytes(16), level in 1i64..=9) {
        let engine = Engine::with_config(EngineConfig::enabled(level));
        let packed = engine.compress_block(&data).unwrap();
        prop_assert!(container::is_container(&packed));

        let header = ContainerHeader::parse(&packed).unwrap();
        prop_assert_eq!(header.original_size as usize, data.len());
        prop_assert_eq!(header.compressed_size as usize, packed.len() - HEADER_LEN);

        prop_assert_eq!(engine.decompress_block(&packed).unwrap(), data);
    }

    #[test]
    fn prop_disabled_engine_is_identity(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let engine = Engine::new();
        prop_assert_eq!(engine.compress_block(&data).unwrap(), data.clone());
        prop_assert_eq!(engine.decompress_block(&data).unwrap(), data.clone());
        prop_assert_eq!(engine.compress_transaction(&data).unwrap(), data.clone());
        prop_assert_eq!(engine.decompress_transaction(&data).unwrap(), data);
        prop_assert_eq!(engine.stats().blocks_compressed, 0);
    }

    #[test]
    fn prop_foreign_data_passes_through(
        mut data in proptest::collection::vec(any::<u8>(), 0..1024)
    ) {
        // Anything not starting with the magic is not a container.
        if data.starts_with(b"TCMP") {
            data[0] = b'X';
        }
        let engine = Engine::with_config(EngineConfig::enabled(6));
        prop_assert_eq!(engine.decompress_block(&data).unwrap(), data);
    }

    #[test]
    fn prop_delta_roundtrip(
        base in proptest::collection::vec(any::<u8>(), 0..2048),
        target in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let d = delta::encode(&base, &target).unwrap();
        prop_assert_eq!(d.len(), delta::SIZE_DIFF_LEN + target.len());
        prop_assert_eq!(delta::decode(&base, &d).unwrap(), target);
    }

    #[test]
    fn prop_delta_decode_never_panics(
        base in proptest::collection::vec(any::<u8>(), 0..256),
        d in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let _ = delta::decode(&base, &d);
    }

    #[test]
    fn prop_transaction_roundtrip(
        txs in proptest::collection::vec(runny_bytes(4), 1..16)
    ) {
        let engine = Engine::with_config(EngineConfig::enabled(6));
        let mut seen = std::collections::HashSet::new();

        for tx in &txs {
            let out = engine.compress_transaction(tx).unwrap();
            let first = seen.insert(Fingerprint::of(tx));
            if first {
                prop_assert!(DedupRef::parse(&out).is_none());
            } else {
                prop_assert_eq!(out.len(), DEDUP_RECORD_LEN);
            }
            prop_assert_eq!(&engine.decompress_transaction(&out).unwrap(), tx);
        }

        prop_assert_eq!(engine.cache_len(), seen.len());
        prop_assert_eq!(
            engine.stats().deduped_transactions as usize,
            txs.len() - seen.len()
        );
    }
}
