//! Test helpers shared across Retcon crates.

pub mod sources;
pub mod transport;

pub use sources::StaticSource;
pub use transport::{ScriptedTransport, TransportCall};
