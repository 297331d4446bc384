use romfield_dtype::Field;

/// An ordered, fixed-arity sequence of fields.
///
/// The order of the list is the persisted format: every field is placed directly after the
/// one before it, so the same list must be used to save and to load a store.
///
/// Implemented for `()`, for tuples of up to twelve fields, and for structs declared with
/// [`layout!`](crate::layout).
pub trait FieldList {
    /// The number of fields.
    fn len(&self) -> usize;

    /// Whether the list has no fields.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The field at `index`, in declaration order.
    fn field(&self, index: usize) -> Option<&dyn Field>;

    /// The field at `index`, in declaration order.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Field>;

    /// The declared name of the field at `index`, if the list has names.
    fn name(&self, index: usize) -> Option<&'static str> {
        let _ = index;
        None
    }
}

/// Typed access to the field at position `I` of a list.
pub trait FieldAt<const I: usize> {
    /// The type of the field.
    type Output: Field;

    /// The field at position `I`.
    fn at(&self) -> &Self::Output;

    /// The field at position `I`.
    fn at_mut(&mut self) -> &mut Self::Output;
}

impl FieldList for () {
    fn len(&self) -> usize {
        0
    }

    fn field(&self, _index: usize) -> Option<&dyn Field> {
        None
    }

    fn field_mut(&mut self, _index: usize) -> Option<&mut dyn Field> {
        None
    }
}

macro_rules! impl_field_at {
    (@one [$($All:ident),+] $T:ident $idx:tt) => {
        impl<$($All: Field),+> FieldAt<$idx> for ($($All,)+) {
            type Output = $T;

            #[inline]
            fn at(&self) -> &$T {
                &self.$idx
            }

            #[inline]
            fn at_mut(&mut self) -> &mut $T {
                &mut self.$idx
            }
        }
    };
    ($all:tt) => {};
    ($all:tt $T:ident $idx:tt $(, $Rest:ident $rest:tt)*) => {
        impl_field_at!(@one $all $T $idx);
        impl_field_at!($all $($Rest $rest),*);
    };
}

macro_rules! impl_field_list {
    ($len:literal; $($T:ident $idx:tt),+) => {
        impl<$($T: Field),+> FieldList for ($($T,)+) {
            #[inline]
            fn len(&self) -> usize {
                $len
            }

            fn field(&self, index: usize) -> Option<&dyn Field> {
                match index {
                    $($idx => Some(&self.$idx),)+
                    _ => None,
                }
            }

            fn field_mut(&mut self, index: usize) -> Option<&mut dyn Field> {
                match index {
                    $($idx => Some(&mut self.$idx),)+
                    _ => None,
                }
            }
        }

        impl_field_at!([$($T),+] $($T $idx),+);
    };
}

impl_field_list!(1; T0 0);
impl_field_list!(2; T0 0, T1 1);
impl_field_list!(3; T0 0, T1 1, T2 2);
impl_field_list!(4; T0 0, T1 1, T2 2, T3 3);
impl_field_list!(5; T0 0, T1 1, T2 2, T3 3, T4 4);
impl_field_list!(6; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5);
impl_field_list!(7; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6);
impl_field_list!(8; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7);
impl_field_list!(9; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8);
impl_field_list!(10; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8, T9 9);
impl_field_list!(11; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8, T9 9, T10 10);
impl_field_list!(12; T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8, T9 9, T10 10, T11 11);

/// Declare a named field list.
///
/// Generates a struct with one public field per entry, in declaration order, together with
/// its [`FieldList`] and [`Default`] implementations. The declared names are available as
/// `FIELD_NAMES` and are used in log messages.
///
/// ```
/// use romfield::layout;
/// use romfield::{Array, FieldList, Scalar, Strings, Text};
///
/// layout! {
///     /// Persisted device settings.
///     pub struct Settings {
///         boot_count: Scalar<u32>,
///         calibration: Array<f32, 3>,
///         networks: Strings<2, 16>,
///         hostname: Text,
///     }
/// }
///
/// let settings = Settings::default();
/// assert_eq!(settings.len(), 4);
/// assert_eq!(settings.name(3), Some("hostname"));
/// ```
#[macro_export]
macro_rules! layout {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$field_meta:meta])* $field:ident : $ty:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        $vis struct $name {
            $($(#[$field_meta])* pub $field: $ty,)+
        }

        impl $name {
            /// The declared field names, in declaration order.
            pub const FIELD_NAMES: &'static [&'static str] = &[$(stringify!($field)),+];
        }

        const _: () = {
            #[allow(non_camel_case_types)]
            enum Position {
                $($field),+
            }

            impl $crate::FieldList for $name {
                #[inline]
                fn len(&self) -> usize {
                    Self::FIELD_NAMES.len()
                }

                fn field(&self, index: usize) -> Option<&dyn $crate::Field> {
                    match index {
                        $(i if i == Position::$field as usize => Some(&self.$field),)+
                        _ => None,
                    }
                }

                fn field_mut(&mut self, index: usize) -> Option<&mut dyn $crate::Field> {
                    match index {
                        $(i if i == Position::$field as usize => Some(&mut self.$field),)+
                        _ => None,
                    }
                }

                fn name(&self, index: usize) -> Option<&'static str> {
                    Self::FIELD_NAMES.get(index).copied()
                }
            }
        };
    };
}

#[cfg(test)]
mod tests {
    use romfield_dtype::{Array, FieldKind, PType, Scalar, Text};

    use super::*;

    #[test]
    fn tuple_positions() {
        let mut fields = (Scalar::new(1u8), Text::new("x"), Array::new([2u16, 3]));
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.field(1).unwrap().kind(), FieldKind::Text);
        assert!(fields.field(3).is_none());
        assert!(fields.name(0).is_none());

        FieldAt::<0>::at_mut(&mut fields).set(9);
        assert_eq!(fields.0.value(), 9);
        assert_eq!(FieldAt::<2>::at(&fields).as_array(), &[2, 3]);
    }

    #[test]
    fn empty_list() {
        assert!(().is_empty());
        assert!(().field_mut(0).is_none());
    }

    #[test]
    fn twelve_fields() {
        let fields = (
            Scalar::<u8>::default(),
            Scalar::<u16>::default(),
            Scalar::<u32>::default(),
            Scalar::<u64>::default(),
            Scalar::<i8>::default(),
            Scalar::<i16>::default(),
            Scalar::<i32>::default(),
            Scalar::<i64>::default(),
            Scalar::<f32>::default(),
            Scalar::<f64>::default(),
            Scalar::<bool>::default(),
            Text::default(),
        );
        assert_eq!(fields.len(), 12);
        assert_eq!(fields.field(9).unwrap().kind(), FieldKind::Scalar(PType::F64));
        assert_eq!(FieldAt::<11>::at(&fields).as_str(), "");
    }

    crate::layout! {
        struct Named {
            id: Scalar<u16>,
            label: Text,
        }
    }

    #[test]
    fn layout_names() {
        let mut named = Named::default();
        assert_eq!(Named::FIELD_NAMES, ["id", "label"]);
        assert_eq!(named.name(1), Some("label"));
        assert!(named.name(2).is_none());

        named.id.set(5);
        assert_eq!(named.field(0).unwrap().byte_size(), 2);
        assert_eq!(named.field_mut(1).unwrap().kind(), FieldKind::Text);
        assert!(named.field_mut(2).is_none());
    }

    #[test]
    fn layout_lookup_matches_declaration_order() {
        let mut named = Named::default();
        let kinds = [FieldKind::Scalar(PType::U16), FieldKind::Text];
        for (index, kind) in kinds.into_iter().enumerate() {
            assert_eq!(named.field(index).unwrap().kind(), kind);
            assert_eq!(named.field_mut(index).unwrap().kind(), kind);
        }
        assert!(named.field(usize::MAX).is_none());
        assert!(named.field_mut(usize::MAX).is_none());
    }
}
