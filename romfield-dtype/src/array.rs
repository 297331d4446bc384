use std::ops::{Deref, DerefMut};

use romfield_error::RomResult;
use romfield_io::ByteStore;

use crate::field::{get_elements, put_elements};
use crate::{Element, Field, FieldData, FieldKind, Indexed};

/// A field holding `N` elements of the same type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Array<T: Element, const N: usize> {
    data: [T; N],
}

impl<T: Element, const N: usize> Array<T, N> {
    const SIZE: usize = T::WIDTH * N;

    /// Create a field holding `data`.
    pub fn new(data: [T; N]) -> Self {
        Self { data }
    }

    /// The elements as a fixed-size array.
    pub fn as_array(&self) -> &[T; N] {
        &self.data
    }
}

impl<T: Element, const N: usize> Default for Array<T, N> {
    fn default() -> Self {
        Self {
            data: [T::default(); N],
        }
    }
}

impl<T: Element, const N: usize> From<[T; N]> for Array<T, N> {
    fn from(data: [T; N]) -> Self {
        Self::new(data)
    }
}

impl<T: Element, const N: usize> Deref for Array<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T: Element, const N: usize> DerefMut for Array<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T: Element, const N: usize> Field for Array<T, N> {
    fn kind(&self) -> FieldKind {
        FieldKind::Array(T::PTYPE, N)
    }

    fn byte_size(&self) -> usize {
        Self::SIZE
    }

    fn put(&mut self, store: &mut dyn ByteStore, offset: usize) -> RomResult<Option<usize>> {
        put_elements(store, offset, Self::SIZE, &self.data)?;
        Ok(Some(Self::SIZE))
    }

    fn get(&mut self, store: &dyn ByteStore, offset: usize) -> RomResult<usize> {
        get_elements(store, offset, Self::SIZE, &mut self.data)?;
        Ok(Self::SIZE)
    }
}

impl<T: Element, const N: usize> FieldData for Array<T, N> {
    type Data = [T; N];

    fn data(&self) -> &Self::Data {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Self::Data {
        &mut self.data
    }
}

impl<T: Element, const N: usize> Indexed for Array<T, N> {
    type Elem = T;

    fn elements(&self) -> &[T] {
        &self.data
    }

    fn elements_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use romfield_io::MemoryStore;

    use super::*;
    use crate::IndexPolicy;

    #[test]
    fn floats_round_trip() {
        let mut store = MemoryStore::new(32);
        store.begin(32);

        let mut field = Array::new([1.0f32, -2.5, 0.0, 1e6]);
        assert_eq!(field.byte_size(), 16);
        assert_eq!(field.put(&mut store, 0).unwrap(), Some(16));

        let mut loaded = Array::<f32, 4>::default();
        assert_eq!(loaded.get(&store, 0).unwrap(), 16);
        assert_eq!(loaded, field);
    }

    #[test]
    fn large_arrays_default() {
        let field = Array::<u8, 64>::default();
        assert_eq!(field.len(), 64);
        assert_eq!(field.kind(), FieldKind::Array(crate::PType::U8, 64));
    }

    #[test]
    fn index_guard_uses_arity_not_bytes() {
        let field = Array::new([1u32, 2, 3]);
        assert_eq!(*field.element(2, IndexPolicy::FailFast).unwrap(), 3);
        // Byte size is 12, but there are only 3 elements.
        assert!(field.element(3, IndexPolicy::FailFast).is_err());
        assert_eq!(*field.element(11, IndexPolicy::Degrade).unwrap(), 1);
    }

    #[test]
    fn empty_array_cannot_degrade() {
        let field = Array::<u8, 0>::default();
        assert!(field.element(0, IndexPolicy::Degrade).is_err());
    }
}
