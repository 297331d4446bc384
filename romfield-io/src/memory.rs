use bytes::BytesMut;
use romfield_error::{RomResult, rom_bail};

use crate::{ByteStore, ERASED};

/// A store backed by an in-memory image whose writes are durable immediately.
///
/// This models media such as on-chip EEPROM where every byte write lands on the device, so
/// [`commit`](ByteStore::commit) has nothing to do. Physical byte writes are counted, which
/// makes the update-if-different behaviour of [`ByteStore::update`] observable.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    image: BytesMut,
    capacity: usize,
    writes: usize,
}

impl MemoryStore {
    /// Create an erased store of `device_len` bytes. The usable capacity starts at zero until
    /// [`begin`](ByteStore::begin) is called.
    pub fn new(device_len: usize) -> Self {
        Self::from_bytes(vec![ERASED; device_len])
    }

    /// Create a store whose device contents are the provided bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            image: BytesMut::from(bytes.into().as_slice()),
            capacity: 0,
            writes: 0,
        }
    }

    /// The full device image, including bytes past the usable capacity.
    pub fn as_bytes(&self) -> &[u8] {
        &self.image
    }

    /// The number of physical byte writes performed so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl ByteStore for MemoryStore {
    fn begin(&mut self, capacity: usize) {
        if capacity > self.image.len() {
            log::warn!(
                "requested capacity {capacity} exceeds device length {}, clamping",
                self.image.len()
            );
        }
        self.capacity = capacity.min(self.image.len());
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn device_len(&self) -> usize {
        self.image.len()
    }

    fn read(&self, offset: usize) -> RomResult<u8> {
        if offset >= self.capacity {
            rom_bail!(OutOfBounds: offset, self.capacity);
        }
        Ok(self.image[offset])
    }

    fn write(&mut self, offset: usize, value: u8) -> RomResult<()> {
        if offset >= self.capacity {
            rom_bail!(OutOfBounds: offset, self.capacity);
        }
        self.image[offset] = value;
        self.writes += 1;
        Ok(())
    }

    fn get(&self, offset: usize, out: &mut [u8]) -> RomResult<()> {
        self.check_range(offset, out.len())?;
        out.copy_from_slice(&self.image[offset..offset + out.len()]);
        Ok(())
    }
}
