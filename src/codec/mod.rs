// Stateless byte codecs.
//
// - `rle`   — run-length byte codec used by block containers and transactions
// - `delta` — XOR differencing between two buffers (standalone; not wired
//             into the container or transaction paths)

pub mod delta;
pub mod rle;

pub use delta::DeltaError;
