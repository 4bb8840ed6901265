#![no_main]
use blockpress::codec::{delta, rle};
use blockpress::{Engine, EngineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the level, the rest is the payload.
    let level = i64::from(data[0] % 9) + 1;
    let payload = &data[1..];

    assert_eq!(rle::decode(&rle::encode(payload)), payload);

    let engine = Engine::with_config(EngineConfig::enabled(level));
    let packed = engine.compress_block(payload).unwrap();
    assert_eq!(engine.decompress_block(&packed).unwrap(), payload);

    // Submit twice: a first-seen payload, then a reference.
    for _ in 0..2 {
        let out = engine.compress_transaction(payload).unwrap();
        assert_eq!(engine.decompress_transaction(&out).unwrap(), payload);
    }

    let split = payload.len() / 2;
    let (base, target) = payload.split_at(split);
    let d = delta::encode(base, target).unwrap();
    assert_eq!(delta::decode(base, &d).unwrap(), target);
});
