#![no_main]
use blockpress::codec::{delta, rle};
use blockpress::{Engine, EngineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoders must never panic, only return errors.
    let engine = Engine::with_config(EngineConfig::enabled(6));
    let _ = engine.decompress_block(data);
    let _ = engine.decompress_transaction(data);
    let _ = rle::decode(data);

    if data.len() >= 2 {
        let split = data.len() / 2;
        let (base, d) = data.split_at(split);
        let _ = delta::decode(base, d);
    }
});
