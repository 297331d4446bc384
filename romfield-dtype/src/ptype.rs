//! Physical element types that fixed fields are made of.

use std::fmt::{Debug, Display, Formatter};

use half::f16;
use static_assertions::assert_eq_size;

/// The physical type of a single element of a fixed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PType {
    /// An 8-bit unsigned integer
    U8,
    /// A 16-bit unsigned integer
    U16,
    /// A 32-bit unsigned integer
    U32,
    /// A 64-bit unsigned integer
    U64,
    /// An 8-bit signed integer
    I8,
    /// A 16-bit signed integer
    I16,
    /// A 32-bit signed integer
    I32,
    /// A 64-bit signed integer
    I64,
    /// A 16-bit floating point number
    F16,
    /// A 32-bit floating point number
    F32,
    /// A 64-bit floating point number
    F64,
    /// A boolean stored as a single byte
    Bool,
}

impl PType {
    /// The number of bytes one element of this type occupies in a store.
    pub const fn byte_width(&self) -> usize {
        match self {
            PType::U8 | PType::I8 | PType::Bool => 1,
            PType::U16 | PType::I16 | PType::F16 => 2,
            PType::U32 | PType::I32 | PType::F32 => 4,
            PType::U64 | PType::I64 | PType::F64 => 8,
        }
    }
}

impl Display for PType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F16 => write!(f, "f16"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

/// A fixed-width value that can be stored as the element of a fixed field.
///
/// Elements are always stored little-endian, independent of the host.
pub trait Element: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// The [`PType`] tag of this element type.
    const PTYPE: PType;

    /// The number of bytes one element occupies in a store.
    const WIDTH: usize;

    /// Encode into `out`, which must be exactly [`WIDTH`](Element::WIDTH) bytes long.
    fn encode_le(&self, out: &mut [u8]);

    /// Decode from `bytes`, which must be exactly [`WIDTH`](Element::WIDTH) bytes long.
    fn decode_le(bytes: &[u8]) -> Self;
}

macro_rules! native_element {
    ($T:ty, $ptype:ident) => {
        impl Element for $T {
            const PTYPE: PType = PType::$ptype;
            const WIDTH: usize = size_of::<$T>();

            #[inline]
            fn encode_le(&self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn decode_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; size_of::<$T>()];
                buf.copy_from_slice(bytes);
                <$T>::from_le_bytes(buf)
            }
        }
    };
}

native_element!(u8, U8);
native_element!(u16, U16);
native_element!(u32, U32);
native_element!(u64, U64);
native_element!(i8, I8);
native_element!(i16, I16);
native_element!(i32, I32);
native_element!(i64, I64);
native_element!(f16, F16);
native_element!(f32, F32);
native_element!(f64, F64);

assert_eq_size!(f16, u16);
assert_eq_size!(bool, u8);

impl Element for bool {
    const PTYPE: PType = PType::Bool;
    const WIDTH: usize = 1;

    #[inline]
    fn encode_le(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    // Any non-zero byte reads back as true, which is what an erased (0xFF) cell decodes to.
    #[inline]
    fn decode_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}
