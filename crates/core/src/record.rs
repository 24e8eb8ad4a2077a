//! Introspection model for records.
//!
//! Rust has no runtime reflection, so each record type publishes a field
//! table through [`Inspect`]. Structs get theirs from `#[derive(Inspect)]`;
//! std types implement [`Inspect`] here and report a non-struct [`Shape`].

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Access level of a field as declared on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Declared `pub`; the value is readable by the validator.
    Public,
    /// Any restricted visibility (private, `pub(crate)`, `pub(super)`, ...).
    Private,
}

/// Runtime value of a field, as far as the validator is allowed to see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// A string-like field.
    Str(&'a str),
    /// A readable field whose declared type is not string-like.
    Other,
    /// A field whose value was not exposed (restricted visibility).
    Unreadable,
}

/// Read-only view of one declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor<'a> {
    /// Reported field name.
    pub name: &'static str,
    /// Declared type, as rendered by `std::any::type_name`.
    pub type_name: &'static str,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Raw annotation text, when the field carries one.
    pub annotation: Option<&'static str>,
    /// Runtime value.
    pub value: FieldValue<'a>,
}

impl FieldDescriptor<'_> {
    /// Returns the annotation when present and non-empty.
    #[must_use]
    pub fn active_annotation(&self) -> Option<&'static str> {
        self.annotation.filter(|annotation| !annotation.is_empty())
    }

    /// Returns true when the validator may read the field value.
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.visibility == Visibility::Public && self.value != FieldValue::Unreadable
    }
}

/// Field table of one record instance, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView<'a> {
    /// Record type name.
    pub type_name: &'static str,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor<'a>>,
}

impl<'a> RecordView<'a> {
    /// Build a record view.
    #[must_use]
    pub const fn new(type_name: &'static str, fields: Vec<FieldDescriptor<'a>>) -> Self {
        Self { type_name, fields }
    }
}

/// Value dispatch used by `#[derive(Inspect)]`.
///
/// `(&FieldRef(&value)).field_value()` picks [`ReadText`](field_read::ReadText)
/// when the field type implements `AsRef<str>` and
/// [`ReadOpaque`](field_read::ReadOpaque) otherwise. Resolution happens on
/// the concrete field type, so aliases of `String` are read as strings.
#[doc(hidden)]
pub mod field_read {
    use super::FieldValue;

    /// Borrowed field value.
    pub struct FieldRef<'a, T: ?Sized>(pub &'a T);

    impl<T: ?Sized> Clone for FieldRef<'_, T> {
        fn clone(&self) -> Self {
            *self
        }
    }

    impl<T: ?Sized> Copy for FieldRef<'_, T> {}

    /// Reads string-like fields.
    pub trait ReadText<'a> {
        /// Field value as a string.
        fn field_value(self) -> FieldValue<'a>;
    }

    impl<'a, T: AsRef<str> + ?Sized> ReadText<'a> for &FieldRef<'a, T> {
        fn field_value(self) -> FieldValue<'a> {
            FieldValue::Str(AsRef::<str>::as_ref(self.0))
        }
    }

    /// Fallback for every other field type.
    pub trait ReadOpaque<'a> {
        /// Always [`FieldValue::Other`].
        fn field_value(self) -> FieldValue<'a>;
    }

    impl<'a, T: ?Sized> ReadOpaque<'a> for FieldRef<'a, T> {
        fn field_value(self) -> FieldValue<'a> {
            FieldValue::Other
        }
    }
}

/// Structural category of an inspected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape<'a> {
    /// A struct with a field table.
    Struct(RecordView<'a>),
    /// A primitive or string.
    Scalar(&'static str),
    /// A list, set, slice, or array.
    Sequence(&'static str),
    /// A key/value map.
    Map(&'static str),
    /// An enum.
    Enum(&'static str),
}

impl Shape<'_> {
    /// Returns the category without the payload.
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Struct(_) => ShapeKind::Struct,
            Self::Scalar(_) => ShapeKind::Scalar,
            Self::Sequence(_) => ShapeKind::Sequence,
            Self::Map(_) => ShapeKind::Map,
            Self::Enum(_) => ShapeKind::Enum,
        }
    }

    /// Returns the inspected type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Struct(record) => record.type_name,
            Self::Scalar(name) | Self::Sequence(name) | Self::Map(name) | Self::Enum(name) => {
                name
            },
        }
    }
}

/// Payload-free [`Shape`] category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Struct.
    Struct,
    /// Primitive or string.
    Scalar,
    /// List, set, slice, or array.
    Sequence,
    /// Key/value map.
    Map,
    /// Enum.
    Enum,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => formatter.write_str("struct"),
            Self::Scalar => formatter.write_str("scalar"),
            Self::Sequence => formatter.write_str("sequence"),
            Self::Map => formatter.write_str("map"),
            Self::Enum => formatter.write_str("enum"),
        }
    }
}

/// Values whose structure can be walked by the validator.
///
/// Derive it for structs with `#[derive(fieldlen_core::Inspect)]`.
pub trait Inspect {
    /// Describe the value's structure.
    fn shape(&self) -> Shape<'_>;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Inspect for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Scalar(std::any::type_name::<Self>())
                }
            }
        )*
    };
}

impl_scalar!(
    bool, char, str, String, (), u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize,
    f32, f64,
);

impl Inspect for Cow<'_, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(std::any::type_name::<Self>())
    }
}

macro_rules! impl_sequence {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T> Inspect for $ty<T> {
                fn shape(&self) -> Shape<'_> {
                    Shape::Sequence(std::any::type_name::<Self>())
                }
            }
        )*
    };
}

impl_sequence!(Vec, VecDeque, BTreeSet);

impl<T, S> Inspect for HashSet<T, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(std::any::type_name::<Self>())
    }
}

impl<T> Inspect for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(std::any::type_name::<Self>())
    }
}

impl<T, const N: usize> Inspect for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(std::any::type_name::<Self>())
    }
}

impl<K, V> Inspect for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(std::any::type_name::<Self>())
    }
}

impl<K, V, S> Inspect for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(std::any::type_name::<Self>())
    }
}

impl<T> Inspect for Option<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Enum(std::any::type_name::<Self>())
    }
}

// Smart pointers and references are transparent.

impl<T: Inspect + ?Sized> Inspect for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Inspect + ?Sized> Inspect for &mut T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Inspect + ?Sized> Inspect for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}
