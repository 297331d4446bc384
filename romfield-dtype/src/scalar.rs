use romfield_error::RomResult;
use romfield_io::ByteStore;

use crate::field::{get_elements, put_elements};
use crate::{Element, Field, FieldData, FieldKind, Indexed};

/// A field holding exactly one element.
///
/// The payload is kept as a one-element array so that it can be addressed like any other
/// fixed field; element `0` is the value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scalar<T: Element> {
    data: [T; 1],
}

impl<T: Element> Scalar<T> {
    /// Create a field holding `value`.
    pub fn new(value: T) -> Self {
        Self { data: [value] }
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.data[0]
    }

    /// Replace the current value.
    pub fn set(&mut self, value: T) {
        self.data[0] = value;
    }
}

impl<T: Element> From<T> for Scalar<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Element> Field for Scalar<T> {
    fn kind(&self) -> FieldKind {
        FieldKind::Scalar(T::PTYPE)
    }

    fn byte_size(&self) -> usize {
        T::WIDTH
    }

    fn put(&mut self, store: &mut dyn ByteStore, offset: usize) -> RomResult<Option<usize>> {
        put_elements(store, offset, T::WIDTH, &self.data)?;
        Ok(Some(T::WIDTH))
    }

    fn get(&mut self, store: &dyn ByteStore, offset: usize) -> RomResult<usize> {
        get_elements(store, offset, T::WIDTH, &mut self.data)?;
        Ok(T::WIDTH)
    }
}

impl<T: Element> FieldData for Scalar<T> {
    type Data = [T; 1];

    fn data(&self) -> &Self::Data {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Self::Data {
        &mut self.data
    }
}

impl<T: Element> Indexed for Scalar<T> {
    type Elem = T;

    fn elements(&self) -> &[T] {
        &self.data
    }

    fn elements_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}
