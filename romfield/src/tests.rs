use romfield_dtype::half::f16;
use romfield_dtype::{Array, Element, Field, IndexPolicy, Scalar, Strings, Text};
use romfield_io::{ByteStore, ERASED, FileStore, MemoryStore};
use rstest::rstest;
use tempfile::tempdir;

use crate::{FieldList, Session, SessionOptions, StoreHandle, layout, static_offsets};

type Greeting = (Scalar<i32>, Text);

layout! {
    struct Settings {
        boot_count: Scalar<u32>,
        calibration: Array<f32, 3>,
        networks: Strings<2, 8>,
        hostname: Text,
        enabled: Scalar<bool>,
    }
}

#[test]
fn greeting_bytes() {
    let handle = StoreHandle::new(MemoryStore::new(32));
    let mut session = Session::<_, Greeting, 32>::with_fields(
        &handle,
        (Scalar::new(42), Text::new("Hello")),
    )
    .unwrap();
    assert!(session.save());
    drop(session);

    let bytes = handle.with_store(|store| store.as_bytes()[..10].to_vec());
    assert_eq!(bytes, [42, 0, 0, 0, b'H', b'e', b'l', b'l', b'o', 0]);

    let mut session = Session::<_, Greeting, 32>::new(&handle).unwrap();
    assert!(session.load());
    assert_eq!(session.field::<0>().value(), 42);
    assert_eq!(session.field::<1>().as_str(), "Hello");
    assert_eq!(session.field::<1>().len(), 5);
}

#[test]
fn named_layout_round_trip() {
    let handle = StoreHandle::new(MemoryStore::new(64));
    let mut session = Session::<_, Settings, 64>::new(&handle).unwrap();
    {
        let settings = session.fields_mut();
        settings.boot_count.set(17);
        settings.calibration = Array::new([0.5, -1.25, 3.0]);
        settings.networks.set_row_str(0, "home").unwrap();
        settings.networks.set_row_str(1, "office-5g").unwrap();
        settings.hostname.set("sensor-7");
        settings.enabled.set(true);
    }
    assert!(session.save());
    drop(session);

    let mut session = Session::<_, Settings, 64>::new(&handle).unwrap();
    assert!(session.load());
    let settings = session.fields();
    assert_eq!(settings.boot_count.value(), 17);
    assert_eq!(settings.calibration.as_array(), &[0.5, -1.25, 3.0]);
    assert_eq!(settings.networks.row_str(0).unwrap(), "home");
    assert_eq!(settings.networks.row_str(1).unwrap(), "office-");
    assert_eq!(settings.hostname, "sensor-7");
    assert!(settings.enabled.value());
    assert_eq!(*session.element(|s| &s.calibration, 1).unwrap(), -1.25);
}

type Sweep<T> = (Scalar<T>, Array<T, 3>, Text);

fn round_trip<T: Element>(value: T) {
    let handle = StoreHandle::new(MemoryStore::new(64));
    let mut session = Session::<_, Sweep<T>, 64>::with_fields(
        &handle,
        (Scalar::new(value), Array::new([value; 3]), Text::new("end")),
    )
    .unwrap();
    assert!(session.save());
    drop(session);

    let mut session = Session::<_, Sweep<T>, 64>::new(&handle).unwrap();
    assert!(session.load());
    assert_eq!(session.field::<0>().value(), value);
    assert_eq!(session.field::<1>().as_array(), &[value; 3]);
    assert_eq!(session.field::<2>().as_str(), "end");
}

#[rstest]
#[case::u8(0xA5u8)]
#[case::u16(0xBEEFu16)]
#[case::u32(u32::MAX - 1)]
#[case::u64(u64::MAX)]
#[case::i8(i8::MIN)]
#[case::i16(-12_345i16)]
#[case::i32(i32::MIN + 1)]
#[case::i64(-1i64)]
#[case::f16(f16::from_f32(-2.5))]
#[case::f32(1.0e-3f32)]
#[case::f64(std::f64::consts::PI)]
#[case::bool(true)]
fn every_element_type_round_trips(#[case] value: impl Element) {
    round_trip(value);
}

#[test]
fn non_utf8_text_survives_load_and_save() {
    let image = [0x61, 0xFF, 0x62, 0x00, 0x2A, 0x00];
    let mut bytes = image.to_vec();
    bytes.resize(16, ERASED);
    let handle = StoreHandle::new(MemoryStore::from_bytes(bytes));
    let mut session = Session::<_, (Text, Scalar<u16>), 16>::new(&handle).unwrap();

    assert!(session.load());
    assert_eq!(session.field::<0>().as_bytes(), [0x61, 0xFF, 0x62]);
    assert_eq!(session.field::<1>().value(), 0x2A);

    assert!(session.save());
    assert_eq!(session.with_store(|store| store.as_bytes()[..6].to_vec()), image);
}

#[test]
fn text_length_follows_data_mut() {
    let handle = StoreHandle::new(MemoryStore::new(16));
    let mut session = Session::<_, (Text, Scalar<u8>), 16>::new(&handle).unwrap();
    session.data_mut::<0>().extend_from_slice(b"abcd");
    session.field_mut::<1>().set(9);

    assert_eq!(session.field::<0>().len(), 4);
    assert_eq!(session.field::<0>().byte_size(), 4);
    assert!(session.save());
    assert_eq!(
        session.with_store(|store| store.as_bytes()[..6].to_vec()),
        *b"abcd\0\x09"
    );
}

#[test]
fn offsets_without_text_are_sums_of_sizes() {
    let fields = (
        Scalar::<u8>::default(),
        Array::<u16, 3>::default(),
        Strings::<2, 5>::default(),
        Scalar::<f64>::default(),
    );
    assert_eq!(static_offsets(&fields), Some(vec![0, 1, 7, 17]));
    assert_eq!(static_offsets(&Settings::default()), None);
}

#[test]
fn text_truncation_law() {
    let mut store = MemoryStore::new(16);
    store.begin(16);
    for remaining in 0..8usize {
        let offset = 16 - remaining;
        let written = store.write_text(offset, b"abcdefgh").unwrap();
        assert_eq!(written, remaining.saturating_sub(1));
        if written > 0 {
            assert_eq!(store.read_text(offset).unwrap(), &b"abcdefgh"[..written]);
        }
    }
}

#[test]
fn aborted_save_is_prefix_preserving() {
    let handle = StoreHandle::new(MemoryStore::new(16));
    let mut session = Session::<_, (Scalar<u32>, Text, Array<u8, 4>), 16>::with_fields(
        &handle,
        (Scalar::new(7), Text::new("overflowing"), Array::new([1, 2, 3, 4])),
    )
    .unwrap();

    let report = session.save_at(0).unwrap();
    assert_eq!(report.stopped_at(), Some(2));

    let bytes = session.with_store(|store| store.as_bytes().to_vec());
    assert_eq!(bytes[..4], [7, 0, 0, 0]);
    assert_eq!(bytes[4..16], *b"overflowing\0");
    assert!(!session.save());
}

#[test]
fn aborted_load_keeps_previous_values() {
    let handle = StoreHandle::new(MemoryStore::new(8));
    let mut session = Session::<_, (Scalar<u16>, Scalar<u64>), 8>::with_fields(
        &handle,
        (Scalar::new(1), Scalar::new(99)),
    )
    .unwrap();

    assert!(!session.load());
    assert_eq!(session.field::<0>().value(), u16::from_le_bytes([ERASED; 2]));
    assert_eq!(session.field::<1>().value(), 99);
}

#[test]
fn second_session_is_rejected_until_first_is_dropped() {
    let handle = StoreHandle::new(MemoryStore::new(16));
    let first = Session::<_, Greeting, 16>::new(&handle).unwrap();

    let err = Session::<_, (Scalar<u8>,), 8>::new(&handle).unwrap_err();
    assert!(err.is_store_claimed());
    assert!(Session::<_, Settings, 16>::new(&handle.clone()).is_err());

    drop(first);
    assert!(!handle.is_claimed());
    assert!(Session::<_, (Scalar<u8>,), 8>::new(&handle).is_ok());
}

#[test]
fn one_session_per_file_across_handles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shared.rom");
    let first = StoreHandle::new(FileStore::open(&path, 16).unwrap());
    let second = StoreHandle::new(FileStore::open(&path, 16).unwrap());

    let session = Session::<_, Greeting, 16>::new(&first).unwrap();
    let err = Session::<_, Greeting, 16>::new(&second).unwrap_err();
    assert!(err.is_store_claimed());
    assert!(!second.is_claimed());

    drop(session);
    assert!(Session::<_, Greeting, 16>::new(&second).is_ok());
}

#[rstest]
#[case(IndexPolicy::FailFast)]
#[case(IndexPolicy::Degrade)]
fn index_guard_for_every_arity(#[case] policy: IndexPolicy) {
    let handle = StoreHandle::new(MemoryStore::new(32));
    let session = Session::<_, (Scalar<u8>, Array<u16, 2>, Array<i32, 5>), 32>::new(&handle)
        .unwrap()
        .with_options(SessionOptions::default().with_index_policy(policy));

    let fail_fast = policy == IndexPolicy::FailFast;
    assert!(session.get::<0>(0).is_ok());
    assert_eq!(session.get::<0>(1).is_err(), fail_fast);
    assert!(session.get::<1>(1).is_ok());
    assert_eq!(session.get::<1>(2).is_err(), fail_fast);
    assert!(session.get::<2>(4).is_ok());
    assert_eq!(session.get::<2>(5).is_err(), fail_fast);
    assert_eq!(session.get::<2>(20).is_err(), fail_fast);
}

#[test]
fn unchanged_bytes_are_not_rewritten() {
    let handle = StoreHandle::new(MemoryStore::new(16));
    let mut session = Session::<_, (Scalar<u32>, Text), 16>::with_fields(
        &handle,
        (Scalar::new(0x01020304), Text::new("abc")),
    )
    .unwrap();

    assert!(session.save());
    let first = session.with_store(MemoryStore::write_count);
    assert_eq!(first, 8);

    session.field_mut::<1>().set("abd");
    assert!(session.save());
    assert_eq!(session.with_store(MemoryStore::write_count), first + 1);
}

#[test]
fn file_store_persists_only_committed_saves() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.rom");

    {
        let handle = StoreHandle::new(FileStore::open(&path, 32).unwrap());
        let mut session = Session::<_, Greeting, 32>::with_fields(
            &handle,
            (Scalar::new(-3), Text::new("persisted")),
        )
        .unwrap();
        assert!(session.save());
        assert!(!session.with_store(FileStore::is_dirty));
    }

    {
        // Too small for the text: nothing reaches the file.
        let handle = StoreHandle::new(FileStore::open(&path, 32).unwrap());
        let mut session = Session::<_, Greeting, 8>::with_fields(
            &handle,
            (Scalar::new(5), Text::new("lost")),
        )
        .unwrap();
        assert!(!session.save());
        assert!(session.with_store(FileStore::is_dirty));
    }

    let handle = StoreHandle::new(FileStore::open(&path, 32).unwrap());
    let mut session = Session::<_, Greeting, 32>::new(&handle).unwrap();
    assert!(session.load());
    assert_eq!(session.field::<0>().value(), -3);
    assert_eq!(session.field::<1>().as_str(), "persisted");
}

#[test]
fn partial_saves_commit_when_asked() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.rom");

    {
        let handle = StoreHandle::new(FileStore::open(&path, 16).unwrap());
        let mut session = Session::<_, (Scalar<u16>, Array<u8, 32>), 16>::with_fields(
            &handle,
            (Scalar::new(0xBEEF), Array::default()),
        )
        .unwrap()
        .with_options(SessionOptions::default().with_commit_on_partial(true));
        assert!(!session.save());
        assert!(session.options().commit_on_partial());
    }

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes[..2], [0xEF, 0xBE]);
}

#[test]
fn layout_names_drive_field_lookup() {
    let settings = Settings::default();
    assert_eq!(settings.len(), 5);
    assert_eq!(settings.name(2), Some("networks"));
    assert_eq!(settings.field(4).unwrap().byte_size(), 1);
}
