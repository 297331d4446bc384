//! Storage media for romfield layouts.
//!
//! A layout is persisted to a single byte-addressable medium through the [`ByteStore`] trait.
//! The trait carries default text and block algorithms so that a medium only has to provide
//! single-byte access and capacity bookkeeping; media with native string or block support can
//! override them.
//!
//! Two media are provided: [`MemoryStore`], whose writes are durable immediately, and
//! [`FileStore`], which needs an explicit [`commit`](ByteStore::commit).

pub use file::*;
pub use memory::*;
pub use store::*;

mod file;
mod memory;
mod store;
