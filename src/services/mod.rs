//! Contracts with the external collaborators
//!
//! The block model never calls these directly; the editor session and the
//! assistant do.

pub mod persistence;

#[cfg(not(target_arch = "wasm32"))]
pub mod generation;
#[cfg(not(target_arch = "wasm32"))]
pub mod openai;

pub use persistence::{InMemoryPersistence, PersistenceError, PersistenceService};

#[cfg(not(target_arch = "wasm32"))]
pub use generation::{GenerationError, GenerationRequest, RetryPolicy, RetryingGenerator, TextGenerator};
