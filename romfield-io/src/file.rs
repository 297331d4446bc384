use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use romfield_error::{ContextExt, RomResult, rom_bail};

use crate::{ByteStore, ERASED};

/// A store that keeps a RAM image of a file and persists it only on [`commit`].
///
/// This models emulated EEPROM on flash-backed boards: byte writes only touch the image and
/// nothing is durable until the image is flushed. Dropping the store without committing
/// discards pending writes.
///
/// [`commit`]: ByteStore::commit
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    identity: PathBuf,
    image: Vec<u8>,
    capacity: usize,
    dirty: bool,
}

impl FileStore {
    /// Open the device file at `path`, creating it when missing.
    ///
    /// The image is exactly `device_len` bytes: existing contents are truncated or padded with
    /// erased bytes.
    pub fn open(path: impl AsRef<Path>, device_len: usize) -> RomResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            fs::File::create(&path).context(|| format!("creating store image {}", path.display()))?;
        }
        let mut image =
            fs::read(&path).context(|| format!("reading store image {}", path.display()))?;
        let identity = fs::canonicalize(&path)
            .context(|| format!("resolving store image {}", path.display()))?;
        let dirty = image.len() != device_len;
        image.resize(device_len, ERASED);

        log::debug!(
            "opened file store {} ({device_len} bytes, dirty: {dirty})",
            path.display()
        );
        Ok(Self {
            path,
            identity,
            image,
            capacity: 0,
            dirty,
        })
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the image holds writes that have not been committed yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl ByteStore for FileStore {
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

    fn identity(&self) -> Option<&Path> {
        Some(&self.identity)
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
        self.dirty = true;
        Ok(())
    }

    fn commit(&mut self) -> RomResult<()> {
        if !self.dirty {
            log::trace!("nothing to commit to {}", self.path.display());
            return Ok(());
        }

        let mut file = fs::File::create(&self.path)?;
        file.write_all(&self.image)?;
        file.sync_all()?;
        self.dirty = false;
        log::trace!(
            "committed {} bytes to {}",
            self.image.len(),
            self.path.display()
        );
        Ok(())
    }
}
