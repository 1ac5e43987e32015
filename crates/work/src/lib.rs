//! Proof-of-work backends and the engine that drives them.
//!
//! A [`WorkBackend`] runs the CPU-bound parts of the protocol: the work
//! search and public key derivation. [`WorkEngine`] is an explicit handle
//! around a backend that is loaded on first use and called from async code
//! without blocking the runtime.

pub mod backend;
pub mod engine;
pub mod software;
pub mod threaded;

pub use backend::WorkBackend;
pub use engine::{EngineError, WorkEngine};
pub use software::SoftwareBackend;
pub use threaded::ThreadedBackend;
