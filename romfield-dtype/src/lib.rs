#![deny(missing_docs)]

//! Field descriptors for romfield layouts.
//!
//! A layout is an ordered list of fields. Each field is one of four shapes, described by
//! [`FieldKind`]:
//!
//! * [`Scalar`], a single element;
//! * [`Array`], a fixed number of elements;
//! * [`Matrix`], a fixed number of rows of fixed length (usually bytes, see [`Strings`]);
//! * [`Text`], terminated text whose length depends on its contents.
//!
//! Fixed fields are made of [`Element`]s, which encode to and from little-endian bytes.
//! Every field implements [`Field`], which is object safe so that a layout can be walked as a
//! sequence of `&mut dyn Field`.

pub use array::*;
pub use field::*;
pub use half;
pub use kind::*;
pub use matrix::*;
pub use ptype::*;
pub use scalar::*;
pub use text::*;

mod array;
mod field;
mod kind;
mod matrix;
mod ptype;
mod scalar;
mod text;
