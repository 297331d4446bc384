use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use romfield_error::RomResult;
use romfield_io::{ByteStore, TERMINATOR};

use crate::{Field, FieldData, FieldKind};

/// A variable-length text field, stored as its bytes followed by a terminator.
///
/// Unlike the fixed fields, the span a text field occupies is only known once it has been
/// written or read: every field that follows it is placed relative to its actual length.
///
/// The contents are kept as raw bytes, so text that is not valid UTF-8 survives a load and a
/// save unchanged. The length is always derived from the contents, up to the first embedded
/// terminator. When a save had to truncate, [`written`](Text::written) reports how many bytes
/// actually reached the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    data: Vec<u8>,
    written: Option<usize>,
}

impl Text {
    /// Create a field holding `value`.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            data: value.into(),
            written: None,
        }
    }

    /// The raw contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The contents as text, with invalid UTF-8 replaced.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Replace the contents.
    pub fn set(&mut self, value: impl Into<Vec<u8>>) {
        self.data = value.into();
        self.written = None;
    }

    /// The length in bytes of what a save would emit.
    pub fn len(&self) -> usize {
        self.payload().len()
    }

    /// Whether a save would emit nothing but the terminator.
    pub fn is_empty(&self) -> bool {
        self.payload().is_empty()
    }

    /// The number of bytes the last save placed, if the field has been saved since it was
    /// last set or loaded.
    pub fn written(&self) -> Option<usize> {
        self.written
    }

    /// The bytes that would be emitted, up to the first embedded terminator.
    fn payload(&self) -> &[u8] {
        let end = self
            .data
            .iter()
            .position(|b| *b == TERMINATOR)
            .unwrap_or(self.data.len());
        &self.data[..end]
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Text {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.data == other.as_bytes()
    }
}

impl Field for Text {
    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }

    fn byte_size(&self) -> usize {
        self.payload().len()
    }

    // Nothing is known before scanning, only that the cursor itself must be in range.
    fn read_span(&self) -> usize {
        0
    }

    fn put(&mut self, store: &mut dyn ByteStore, offset: usize) -> RomResult<Option<usize>> {
        let payload = self.payload();
        let written = store.write_text(offset, payload)?;
        if written == 0 && !payload.is_empty() {
            return Ok(None);
        }

        self.written = Some(written);
        Ok(Some(written + 1))
    }

    fn get(&mut self, store: &dyn ByteStore, offset: usize) -> RomResult<usize> {
        self.data = store.read_text(offset)?;
        self.written = None;
        if std::str::from_utf8(&self.data).is_err() {
            log::debug!("text at offset {offset} is not valid UTF-8, keeping raw bytes");
        }
        Ok(self.data.len() + 1)
    }
}

impl FieldData for Text {
    type Data = Vec<u8>;

    fn data(&self) -> &Self::Data {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Self::Data {
        &mut self.data
    }
}
