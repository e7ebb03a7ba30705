//! Development suite for `patio-core`.
//!
//! Provides:
//! - `StubTransport`: a scripted `RecordTransport` that records every call,
//!   so store behavior can be asserted without a network
//! - builders for drafts, records and remote-shape JSON payloads
//! - flow tests exercising the composed `Patio` end to end

pub mod builders;
pub mod transport_stub;

#[cfg(test)]
mod flows;

pub use builders::{draft, motorcycle, remote_fleet_from_json, remote_motorcycle};
pub use transport_stub::{StubCall, StubOutcome, StubTransport};
