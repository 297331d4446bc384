//! The layout walker: places each field of a list at a running cursor.

use std::fmt::{Display, Formatter};

use romfield_error::{RomResult, rom_bail};
use romfield_io::ByteStore;

use crate::FieldList;

/// The outcome of a save or load traversal.
///
/// Running out of capacity is not an error: the walk stops at the first field that does not
/// fit and reports how far it got. Fields before that point have been written or read, the
/// rest are untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkReport {
    processed: usize,
    total: usize,
    cursor: usize,
}

impl WalkReport {
    /// The number of fields written or read.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// The number of fields in the list.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The offset just past the last field processed.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether every field was processed.
    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }

    /// The index of the field that did not fit, if the walk stopped early.
    pub fn stopped_at(&self) -> Option<usize> {
        (!self.is_complete()).then_some(self.processed)
    }
}

impl Display for WalkReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} fields, cursor at {}",
            self.processed, self.total, self.cursor
        )
    }
}

struct Label(usize, Option<&'static str>);

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.1 {
            Some(name) => write!(f, "field {} ({name})", self.0),
            None => write!(f, "field {}", self.0),
        }
    }
}

/// Whether `span` bytes at `cursor` reach or pass the end of the store.
///
/// The last byte of the store is never the end of a field; a field that would end exactly at
/// `capacity` is rejected too.
fn exceeds(cursor: usize, span: usize, capacity: usize) -> bool {
    cursor.checked_add(span).is_none_or(|end| end >= capacity)
}

/// Write every field of `fields` to `store`, starting at offset `start`.
///
/// Stops at the first field whose span does not fit, or whose text could not be placed at
/// all. Does not commit the store.
pub fn save_fields(
    fields: &mut dyn FieldList,
    store: &mut dyn ByteStore,
    start: usize,
) -> RomResult<WalkReport> {
    let capacity = store.capacity();
    let total = fields.len();
    let mut cursor = start;

    for index in 0..total {
        let label = Label(index, fields.name(index));
        let Some(field) = fields.field_mut(index) else {
            rom_bail!("field list of length {total} has no field at {index}");
        };

        let span = field.write_span();
        if exceeds(cursor, span, capacity) {
            log::warn!(
                "save stopped at {label} ({}): {span} bytes at offset {cursor} exceed capacity {capacity}",
                field.kind()
            );
            return Ok(WalkReport {
                processed: index,
                total,
                cursor,
            });
        }

        let Some(advance) = field.put(store, cursor)? else {
            log::warn!(
                "save stopped at {label} ({}): nothing could be written at offset {cursor}",
                field.kind()
            );
            return Ok(WalkReport {
                processed: index,
                total,
                cursor,
            });
        };

        log::debug!(
            "saved {label} ({}) at offset {cursor}, advancing {advance}",
            field.kind()
        );
        cursor += advance;
    }

    Ok(WalkReport {
        processed: total,
        total,
        cursor,
    })
}

/// Read every field of `fields` from `store`, starting at offset `start`.
///
/// Stops at the first field whose span does not fit. Text is scanned for its terminator; text
/// without one in range loads as empty and does not stop the walk.
pub fn load_fields(
    fields: &mut dyn FieldList,
    store: &dyn ByteStore,
    start: usize,
) -> RomResult<WalkReport> {
    let capacity = store.capacity();
    let total = fields.len();
    let mut cursor = start;

    for index in 0..total {
        let label = Label(index, fields.name(index));
        let Some(field) = fields.field_mut(index) else {
            rom_bail!("field list of length {total} has no field at {index}");
        };

        let span = field.read_span();
        if exceeds(cursor, span, capacity) {
            log::warn!(
                "load stopped at {label} ({}): {span} bytes at offset {cursor} exceed capacity {capacity}",
                field.kind()
            );
            return Ok(WalkReport {
                processed: index,
                total,
                cursor,
            });
        }

        let advance = field.get(store, cursor)?;
        log::debug!(
            "loaded {label} ({}) at offset {cursor}, advancing {advance}",
            field.kind()
        );
        cursor += advance;
    }

    Ok(WalkReport {
        processed: total,
        total,
        cursor,
    })
}

/// The offset of every field relative to the start of the layout, if it can be known without
/// touching a store.
///
/// This is the case when no text field is followed by another field. The offset of a text
/// field itself is known; only the fields after it move with its contents.
pub fn static_offsets(fields: &dyn FieldList) -> Option<Vec<usize>> {
    let total = fields.len();
    let mut offsets = Vec::with_capacity(total);
    let mut cursor = 0usize;

    for index in 0..total {
        offsets.push(cursor);
        match fields.field(index)?.kind().fixed_size() {
            Some(size) => cursor += size,
            None if index + 1 == total => {}
            None => return None,
        }
    }

    Some(offsets)
}

#[cfg(test)]
mod tests {
    use romfield_dtype::{Array, Scalar, Strings, Text};
    use romfield_io::{ERASED, MemoryStore};
    use rstest::rstest;

    use super::*;

    fn store(capacity: usize) -> MemoryStore {
        let mut store = MemoryStore::new(64);
        store.begin(capacity);
        store
    }

    #[test]
    fn fixed_fields_are_contiguous() {
        let mut store = store(32);
        let mut fields = (
            Scalar::new(0x0102u16),
            Array::new([7u8, 8, 9]),
            Scalar::new(-1i32),
        );
        let report = save_fields(&mut fields, &mut store, 0).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.cursor(), 9);
        assert_eq!(
            store.as_bytes()[..9],
            [0x02, 0x01, 7, 8, 9, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn text_moves_following_fields() {
        let mut store = store(32);
        let mut fields = (Text::new("abc"), Scalar::new(5u8));
        let report = save_fields(&mut fields, &mut store, 2).unwrap();
        assert_eq!(report.cursor(), 2 + 4 + 1);
        assert_eq!(store.as_bytes()[2..7], *b"abc\0\x05");

        let mut loaded = (Text::default(), Scalar::<u8>::default());
        let report = load_fields(&mut loaded, &store, 2).unwrap();
        assert!(report.is_complete());
        assert_eq!(loaded.0, "abc");
        assert_eq!(loaded.1.value(), 5);
    }

    #[rstest]
    #[case(8, true)]
    #[case(7, false)]
    #[case(4, false)]
    fn field_may_not_end_at_capacity(#[case] capacity: usize, #[case] complete: bool) {
        let mut store = store(capacity);
        let mut fields = (Scalar::new(1u32), Array::new([1u8, 2, 3]));
        let report = save_fields(&mut fields, &mut store, 0).unwrap();
        assert_eq!(report.is_complete(), complete);
    }

    #[test]
    fn abort_preserves_prefix() {
        let mut store = store(9);
        let mut fields = (Scalar::new(3u16), Text::new("hello"), Scalar::new(9u8));
        let report = save_fields(&mut fields, &mut store, 0).unwrap();

        assert_eq!(report.processed(), 2);
        assert_eq!(report.stopped_at(), Some(2));
        assert_eq!(report.cursor(), 8);
        assert_eq!(store.as_bytes()[..8], *b"\x03\x00hello\0");
        assert!(store.as_bytes()[8..].iter().all(|b| *b == ERASED));
    }

    #[test]
    fn empty_text_takes_its_terminator() {
        let mut store = store(4);
        let mut fields = (Array::new([1u8, 2, 3]), Text::default(), Scalar::new(1u8));
        let report = save_fields(&mut fields, &mut store, 0).unwrap();
        // The empty text still fits at offset 3, the scalar after it does not.
        assert_eq!(report.processed(), 2);
        assert_eq!(report.cursor(), 4);
    }

    #[test]
    fn load_stops_at_capacity() {
        let mut store = store(6);
        store.put(0, &[1, 0, 0, 0]).unwrap();

        let mut fields = (Scalar::<u32>::default(), Scalar::new(77u16));
        let report = load_fields(&mut fields, &store, 0).unwrap();
        assert_eq!(report.stopped_at(), Some(1));
        assert_eq!(fields.0.value(), 1);
        assert_eq!(fields.1.value(), 77);
    }

    #[test]
    fn unterminated_text_does_not_stop_load() {
        let store = store(8);
        let mut fields = (Text::new("old"), Scalar::new(1u8));
        let report = load_fields(&mut fields, &store, 0).unwrap();
        assert!(report.is_complete());
        assert_eq!(fields.0, "");
        assert_eq!(fields.1.value(), ERASED);
    }

    #[test]
    fn start_past_capacity_processes_nothing() {
        let mut store = store(8);
        let mut fields = (Text::new("x"),);
        let report = save_fields(&mut fields, &mut store, 8).unwrap();
        assert_eq!(report.processed(), 0);
        assert_eq!(report.to_string(), "0/1 fields, cursor at 8");
    }

    #[test]
    fn offsets_of_fixed_layouts() {
        let fields = (Scalar::<u8>::default(), Strings::<2, 4>::default(), Text::default());
        assert_eq!(static_offsets(&fields), Some(vec![0, 1, 9]));

        let fields = (Text::default(), Scalar::<u8>::default());
        assert_eq!(static_offsets(&fields), None);
        assert_eq!(static_offsets(&()), Some(vec![]));
    }
}
