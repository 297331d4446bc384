use std::path::Path;

use romfield_error::{RomResult, rom_bail};

/// The byte that terminates a variable-length text run in a store.
pub const TERMINATOR: u8 = 0;

/// The value of a byte that has never been written on an erased medium.
pub const ERASED: u8 = 0xFF;

/// A byte-addressable persistent medium.
///
/// Only [`read`](ByteStore::read), [`write`](ByteStore::write) and the capacity bookkeeping
/// are required. Block and text access have default implementations expressed in terms of
/// single-byte access, which media with native support are free to override.
///
/// The trait is object safe so that layouts can be walked over `&mut dyn ByteStore`.
pub trait ByteStore {
    /// Initialise the usable region to `capacity` bytes, clamped to [`device_len`].
    ///
    /// [`device_len`]: ByteStore::device_len
    fn begin(&mut self, capacity: usize);

    /// Release the medium. Called when the owning session goes away.
    fn end(&mut self) {}

    /// The usable size in bytes, as configured by the last [`begin`](ByteStore::begin).
    fn capacity(&self) -> usize;

    /// The physical size of the medium in bytes.
    fn device_len(&self) -> usize;

    /// A process-wide name for the physical medium, when separately opened stores can refer
    /// to the same one.
    ///
    /// Stores that own their medium outright return `None`.
    fn identity(&self) -> Option<&Path> {
        None
    }

    /// Read a single byte.
    fn read(&self, offset: usize) -> RomResult<u8>;

    /// Write a single byte.
    fn write(&mut self, offset: usize, value: u8) -> RomResult<()>;

    /// Write a single byte only if it differs from the stored one.
    fn update(&mut self, offset: usize, value: u8) -> RomResult<()> {
        if self.read(offset)? != value {
            self.write(offset, value)?;
        }
        Ok(())
    }

    /// Fill `out` with the bytes starting at `offset`.
    fn get(&self, offset: usize, out: &mut [u8]) -> RomResult<()> {
        self.check_range(offset, out.len())?;
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.read(offset + i)?;
        }
        Ok(())
    }

    /// Store `bytes` starting at `offset`.
    fn put(&mut self, offset: usize, bytes: &[u8]) -> RomResult<()> {
        self.check_range(offset, bytes.len())?;
        for (i, byte) in bytes.iter().enumerate() {
            self.update(offset + i, *byte)?;
        }
        Ok(())
    }

    /// Write `text` followed by a [`TERMINATOR`], returning the number of text bytes written.
    ///
    /// The text ends at its first zero byte, if any. When the text and its terminator do not
    /// fit before [`capacity`](ByteStore::capacity) the text is truncated so that the
    /// terminator still fits. If not even one text byte and the terminator fit, nothing is
    /// written and `0` is returned.
    fn write_text(&mut self, offset: usize, text: &[u8]) -> RomResult<usize> {
        let text = text
            .split(|b| *b == TERMINATOR)
            .next()
            .unwrap_or_default();
        let capacity = self.capacity();

        let mut len = text.len();
        if offset.saturating_add(len + 1) > capacity {
            len = capacity.saturating_sub(offset).saturating_sub(1);
            if len == 0 {
                log::warn!(
                    "text of {} bytes does not fit at offset {offset} (capacity {capacity})",
                    text.len()
                );
                return Ok(0);
            }
            log::warn!(
                "truncating text from {} to {len} bytes at offset {offset} (capacity {capacity})",
                text.len()
            );
        }

        self.put(offset, &text[..len])?;
        self.update(offset + len, TERMINATOR)?;
        Ok(len)
    }

    /// Read the text stored at `offset`, without its terminator.
    ///
    /// Scans forward up to [`capacity`](ByteStore::capacity) for a [`TERMINATOR`]. If none is
    /// found, or the text is empty, an empty buffer is returned.
    fn read_text(&self, offset: usize) -> RomResult<Vec<u8>> {
        let capacity = self.capacity();
        let mut end = offset;
        while end < capacity && self.read(end)? != TERMINATOR {
            end += 1;
        }

        if end >= capacity || end == offset {
            return Ok(Vec::new());
        }

        let mut text = vec![0u8; end - offset];
        self.get(offset, &mut text)?;
        Ok(text)
    }

    /// Flush pending writes to durable storage.
    ///
    /// Media that write through immediately keep the default, which always succeeds.
    fn commit(&mut self) -> RomResult<()> {
        Ok(())
    }

    /// Fail with [`RomError::OutOfBounds`](romfield_error::RomError::OutOfBounds) unless
    /// `offset..offset + len` lies within the usable region.
    fn check_range(&self, offset: usize, len: usize) -> RomResult<()> {
        let capacity = self.capacity();
        match offset.checked_add(len) {
            Some(end) if end <= capacity => Ok(()),
            _ => rom_bail!(OutOfBounds: offset, capacity),
        }
    }
}
