use std::fmt::{Display, Formatter};

use crate::PType;

/// The shape of a field, as persisted in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single element.
    Scalar(PType),
    /// A fixed number of elements.
    Array(PType, usize),
    /// A fixed number of rows, each a fixed number of elements.
    Matrix(PType, usize, usize),
    /// Terminated variable-length text.
    Text,
}

impl FieldKind {
    /// Whether the number of bytes this field occupies depends on its contents.
    pub fn is_variable(&self) -> bool {
        matches!(self, FieldKind::Text)
    }

    /// The number of bytes the field occupies, if it is known from the declaration alone.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldKind::Scalar(ptype) => Some(ptype.byte_width()),
            FieldKind::Array(ptype, n) => Some(ptype.byte_width() * n),
            FieldKind::Matrix(ptype, rows, cols) => Some(ptype.byte_width() * rows * cols),
            FieldKind::Text => None,
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Scalar(ptype) => write!(f, "{ptype}"),
            FieldKind::Array(ptype, n) => write!(f, "[{ptype}; {n}]"),
            FieldKind::Matrix(ptype, rows, cols) => write!(f, "[[{ptype}; {cols}]; {rows}]"),
            FieldKind::Text => write!(f, "text"),
        }
    }
}
