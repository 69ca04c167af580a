//! Core types and reviewer-assignment logic for the roster service.
//!
//! No HTTP or SQL lives here. Storage is reached only through the port
//! traits in [`store`]; every other crate in the workspace depends on this
//! one.

// Port futures spell out their `Send` bounds in the trait declarations.
#![allow(async_fn_in_trait)]

pub mod assign;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod model;
pub mod store;

pub use directory::Directory;
pub use error::{Error, ErrorKind, Result};
pub use lifecycle::{Lifecycle, Reassignment};
pub use memory::MemoryStore;

#[cfg(test)]
mod tests;
