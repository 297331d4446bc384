#![deny(missing_docs)]

//! Typed field layouts persisted to a single byte-addressable store.
//!
//! A layout is an ordered list of fields, declared either as a tuple or with [`layout!`].
//! Saving walks the list with a running cursor and places every field directly after the one
//! before it; loading walks it again in the same order. There is no header and no field
//! metadata in the store: the declaration order *is* the format.
//!
//! Fixed fields ([`Scalar`], [`Array`], [`Matrix`]) occupy the same bytes every time. A
//! [`Text`] field occupies its current length plus a terminator, so every field after it moves
//! with its contents (see [`static_offsets`]).
//!
//! # Capacity
//!
//! Before each field the walker checks that the field's span starting at the cursor stays
//! strictly below the store capacity. The first field that does not fit stops the walk; the
//! fields before it have been written or read, the rest are untouched. This is reported through
//! a [`WalkReport`], not as an error.
//!
//! # Sessions
//!
//! A [`Session`] binds a field list to a store through a [`StoreHandle`]. Only one session
//! can hold a given store at a time:
//!
//! ```
//! use romfield::{MemoryStore, Scalar, Session, StoreHandle, Text};
//!
//! let handle = StoreHandle::new(MemoryStore::new(64));
//! let mut session = Session::<_, (Scalar<i32>, Text), 32>::new(&handle).unwrap();
//! session.field_mut::<0>().set(42);
//! session.field_mut::<1>().set("Hello");
//! assert!(session.save());
//!
//! assert!(Session::<_, (Scalar<i32>, Text), 32>::new(&handle).is_err());
//! drop(session);
//!
//! let mut session = Session::<_, (Scalar<i32>, Text), 32>::new(&handle).unwrap();
//! assert!(session.load());
//! assert_eq!(session.field::<1>().as_str(), "Hello");
//! ```

pub use claim::*;
pub use list::*;
pub use romfield_dtype::*;
pub use romfield_error::{RomError, RomResult};
pub use romfield_io::*;
pub use session::*;
pub use walk::*;

mod claim;
mod list;
mod session;
#[cfg(test)]
mod tests;
mod walk;
