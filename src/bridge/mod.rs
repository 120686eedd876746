// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the boundary between the host simulator's flat `f64` argument
// arrays and the structured values the external calculation works with. Everything
// below it (`schema`, `kernels`, `buffer`) is pure and stateless; the only state
// lives in `session`.
//
// Data Flow (one Calculate call):
//
//   1. [Commander (Bridge::dispatch)]   -> Receives (method_id, inargs, outargs)
//         |
//         `-> routes method 1 to the active session ->
//
//   2. [Session::calculate]
//         |
//         `-> a. `decoder::decode`: two-pass walk of `inargs` against the input
//         |      descriptors -> Vec<(name, StructuredValue)>
//         |
//         `-> b. `Calculation::call` on the positional values
//         |
//         `-> c. `encoder::encode`: results -> `outargs`, one field per output
//                descriptor, time series and tables via `kernels`
//
//   3. [Commander]                       -> Maps Ok/Err to a host `Status`
//
// ====================================================================================
pub mod decoder;
pub mod encoder;
pub mod format;
pub mod session;

// --- Stateless API (for FFI and testing) ---
pub use decoder::decode;
pub use encoder::encode;

// --- Stateful API ---
pub use session::{Bridge, Calculation, Method, ScriptRuntime, Session, Status};

#[cfg(test)]
mod tests;
