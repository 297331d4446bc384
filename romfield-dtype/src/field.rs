use std::fmt::Debug;

use romfield_error::{RomResult, rom_err};
use romfield_io::ByteStore;

use crate::{Element, FieldKind};

/// One logical value of a layout, and the rules for placing it in a store.
///
/// A field knows its serialized size and how to move its payload to and from a store at a
/// given offset. It does not know where it sits in a layout: the caller owns the cursor,
/// checks the span against the store's capacity, and advances by what `put`/`get` report.
///
/// The trait is object safe so that heterogeneous fields can be walked as `&mut dyn Field`.
pub trait Field: Debug {
    /// The shape of the field.
    fn kind(&self) -> FieldKind;

    /// The number of bytes the payload occupies in a store, excluding any terminator.
    fn byte_size(&self) -> usize;

    /// The span that must be available at the cursor before writing this field.
    fn write_span(&self) -> usize {
        self.byte_size()
    }

    /// The span that must be available at the cursor before reading this field.
    fn read_span(&self) -> usize {
        self.byte_size()
    }

    /// Write the payload at `offset`.
    ///
    /// Returns the number of bytes the cursor advances by, or `None` if the field could not be
    /// placed at all.
    fn put(&mut self, store: &mut dyn ByteStore, offset: usize) -> RomResult<Option<usize>>;

    /// Read the payload from `offset`, returning the number of bytes the cursor advances by.
    fn get(&mut self, store: &dyn ByteStore, offset: usize) -> RomResult<usize>;
}

/// Typed access to the payload of a field.
pub trait FieldData: Field {
    /// The payload representation.
    type Data: ?Sized;

    /// A view of the payload.
    fn data(&self) -> &Self::Data;

    /// A mutable view of the payload.
    fn data_mut(&mut self) -> &mut Self::Data;
}

/// What element access does with an index at or past a field's arity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IndexPolicy {
    /// Fail with [`RomError::IndexOutOfRange`](romfield_error::RomError::IndexOutOfRange).
    #[default]
    FailFast,
    /// Log a warning and hand out the first element instead.
    Degrade,
}

/// Element-wise access to a fixed field.
pub trait Indexed: Field {
    /// A single element.
    type Elem;

    /// All elements, in declaration order.
    fn elements(&self) -> &[Self::Elem];

    /// All elements, in declaration order.
    fn elements_mut(&mut self) -> &mut [Self::Elem];

    /// The declared number of elements.
    fn arity(&self) -> usize {
        self.elements().len()
    }

    /// The element at `index`, subject to `policy` when the index is out of range.
    fn element(&self, index: usize, policy: IndexPolicy) -> RomResult<&Self::Elem> {
        let index = resolve_index(index, self.arity(), policy)?;
        Ok(&self.elements()[index])
    }

    /// The element at `index`, subject to `policy` when the index is out of range.
    fn element_mut(&mut self, index: usize, policy: IndexPolicy) -> RomResult<&mut Self::Elem> {
        let index = resolve_index(index, self.arity(), policy)?;
        Ok(&mut self.elements_mut()[index])
    }
}

fn resolve_index(index: usize, arity: usize, policy: IndexPolicy) -> RomResult<usize> {
    if index < arity {
        return Ok(index);
    }
    match policy {
        IndexPolicy::Degrade if arity > 0 => {
            log::warn!("element index {index} out of range for arity {arity}, using element 0");
            Ok(0)
        }
        _ => Err(rom_err!(IndexOutOfRange: index, arity)),
    }
}

/// Encode `elements` back to back and store them at `offset`.
pub(crate) fn put_elements<'a, T: Element>(
    store: &mut dyn ByteStore,
    offset: usize,
    size: usize,
    elements: impl IntoIterator<Item = &'a T>,
) -> RomResult<()> {
    let mut bytes = vec![0u8; size];
    for (chunk, element) in bytes.chunks_exact_mut(T::WIDTH).zip(elements) {
        element.encode_le(chunk);
    }
    store.put(offset, &bytes)
}

/// Load `size` bytes from `offset` and decode them into `elements`.
pub(crate) fn get_elements<'a, T: Element>(
    store: &dyn ByteStore,
    offset: usize,
    size: usize,
    elements: impl IntoIterator<Item = &'a mut T>,
) -> RomResult<()> {
    let mut bytes = vec![0u8; size];
    store.get(offset, &mut bytes)?;
    for (chunk, element) in bytes.chunks_exact(T::WIDTH).zip(elements) {
        *element = T::decode_le(chunk);
    }
    Ok(())
}
