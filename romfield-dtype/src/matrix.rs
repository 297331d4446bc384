use std::borrow::Cow;

use romfield_error::{RomResult, rom_err};
use romfield_io::{ByteStore, TERMINATOR};

use crate::field::{get_elements, put_elements};
use crate::{Element, Field, FieldData, FieldKind, Indexed};

/// A field holding `N` rows of `LEN` elements each.
///
/// The element type is usually `u8`, in which case each row is a fixed-length, zero-padded
/// string; see [`Strings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<T: Element, const N: usize, const LEN: usize> {
    data: [[T; LEN]; N],
}

/// `N` fixed-length strings of at most `LEN - 1` bytes plus a terminator.
pub type Strings<const N: usize, const LEN: usize> = Matrix<u8, N, LEN>;

impl<T: Element, const N: usize, const LEN: usize> Matrix<T, N, LEN> {
    const SIZE: usize = T::WIDTH * N * LEN;

    /// Create a field holding `data`.
    pub fn new(data: [[T; LEN]; N]) -> Self {
        Self { data }
    }

    /// The declared number of rows.
    pub const fn rows(&self) -> usize {
        N
    }

    /// The declared row length.
    pub const fn row_len(&self) -> usize {
        LEN
    }
}

impl<T: Element, const N: usize, const LEN: usize> Default for Matrix<T, N, LEN> {
    fn default() -> Self {
        Self {
            data: [[T::default(); LEN]; N],
        }
    }
}

impl<const N: usize, const LEN: usize> Matrix<u8, N, LEN> {
    /// The string stored in `row`, up to its first terminator.
    pub fn row_str(&self, row: usize) -> RomResult<Cow<'_, str>> {
        let bytes = self
            .data
            .get(row)
            .ok_or_else(|| rom_err!(IndexOutOfRange: row, N))?;
        let end = bytes
            .iter()
            .position(|b| *b == TERMINATOR)
            .unwrap_or(LEN);
        Ok(String::from_utf8_lossy(&bytes[..end]))
    }

    /// Store `value` in `row`, returning the number of bytes kept.
    ///
    /// The value is cut at `LEN - 1` bytes so that the row always holds a terminator, and the
    /// rest of the row is zeroed.
    pub fn set_row_str(&mut self, row: usize, value: &str) -> RomResult<usize> {
        let bytes = self
            .data
            .get_mut(row)
            .ok_or_else(|| rom_err!(IndexOutOfRange: row, N))?;
        let kept = value.len().min(LEN.saturating_sub(1));
        if kept < value.len() {
            log::warn!(
                "row {row} holds at most {} bytes, truncating {} byte string",
                LEN.saturating_sub(1),
                value.len()
            );
        }
        bytes.fill(TERMINATOR);
        bytes[..kept].copy_from_slice(&value.as_bytes()[..kept]);
        Ok(kept)
    }
}

impl<T: Element, const N: usize, const LEN: usize> Field for Matrix<T, N, LEN> {
    fn kind(&self) -> FieldKind {
        FieldKind::Matrix(T::PTYPE, N, LEN)
    }

    fn byte_size(&self) -> usize {
        Self::SIZE
    }

    fn put(&mut self, store: &mut dyn ByteStore, offset: usize) -> RomResult<Option<usize>> {
        put_elements(store, offset, Self::SIZE, self.data.iter().flatten())?;
        Ok(Some(Self::SIZE))
    }

    fn get(&mut self, store: &dyn ByteStore, offset: usize) -> RomResult<usize> {
        get_elements(store, offset, Self::SIZE, self.data.iter_mut().flatten())?;
        Ok(Self::SIZE)
    }
}

impl<T: Element, const N: usize, const LEN: usize> FieldData for Matrix<T, N, LEN> {
    type Data = [[T; LEN]; N];

    fn data(&self) -> &Self::Data {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Self::Data {
        &mut self.data
    }
}

impl<T: Element, const N: usize, const LEN: usize> Indexed for Matrix<T, N, LEN> {
    type Elem = [T; LEN];

    fn elements(&self) -> &[[T; LEN]] {
        &self.data
    }

    fn elements_mut(&mut self) -> &mut [[T; LEN]] {
        &mut self.data
    }
}
