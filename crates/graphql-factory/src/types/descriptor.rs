//! Type descriptors and typed handles.
//!
//! A [`TypeDescriptor`] is a plain value describing a field or argument type.
//! Named types (objects, interfaces, unions, enums) are referenced through
//! [`TypeHandle`]s, slots in the arena owned by a
//! [`TypeFactory`](crate::TypeFactory). Handles are `Copy`, so descriptors can
//! mention types that are not defined yet, including themselves.

use std::fmt;
use std::marker::PhantomData;

/// Built-in GraphQL scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Int,
    Float,
    Boolean,
    Id,
}

impl ScalarType {
    /// Returns the GraphQL name of the scalar.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Id => "ID",
        }
    }

    pub(crate) const ALL: [ScalarType; 5] = [
        Self::String,
        Self::Int,
        Self::Float,
        Self::Boolean,
        Self::Id,
    ];
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Slot of a named type in a factory arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    pub(crate) factory: u64,
    pub(crate) index: usize,
}

/// Description of a field or argument type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Scalar(ScalarType),
    Enum(TypeHandle),
    Object(TypeHandle),
    Interface(TypeHandle),
    Union(TypeHandle),
    List(Box<TypeDescriptor>),
    NonNull(Box<TypeDescriptor>),
}

pub const STRING: TypeDescriptor = TypeDescriptor::Scalar(ScalarType::String);
pub const INT: TypeDescriptor = TypeDescriptor::Scalar(ScalarType::Int);
pub const FLOAT: TypeDescriptor = TypeDescriptor::Scalar(ScalarType::Float);
pub const BOOLEAN: TypeDescriptor = TypeDescriptor::Scalar(ScalarType::Boolean);
pub const ID: TypeDescriptor = TypeDescriptor::Scalar(ScalarType::Id);

/// Wraps a type in a list.
pub fn list(inner: impl Into<TypeDescriptor>) -> TypeDescriptor {
    TypeDescriptor::List(Box::new(inner.into()))
}

/// Wraps a type in non-null.
///
/// Wrapping a type that is already non-null is rejected when the schema is
/// compiled.
pub fn non_null(inner: impl Into<TypeDescriptor>) -> TypeDescriptor {
    TypeDescriptor::NonNull(Box::new(inner.into()))
}

impl TypeDescriptor {
    /// Returns the named type handle at the core of this descriptor.
    pub fn named(&self) -> Option<TypeHandle> {
        match self {
            Self::Scalar(_) => None,
            Self::Enum(h) | Self::Object(h) | Self::Interface(h) | Self::Union(h) => Some(*h),
            Self::List(inner) | Self::NonNull(inner) => inner.named(),
        }
    }

    /// Returns true if the descriptor may be used as an argument type.
    pub fn is_input(&self) -> bool {
        match self {
            Self::Scalar(_) | Self::Enum(_) => true,
            Self::Object(_) | Self::Interface(_) | Self::Union(_) => false,
            Self::List(inner) | Self::NonNull(inner) => inner.is_input(),
        }
    }

    /// Returns true if `NonNull` directly wraps `NonNull` anywhere in the descriptor.
    pub fn has_nested_non_null(&self) -> bool {
        match self {
            Self::NonNull(inner) => {
                matches!(**inner, Self::NonNull(_)) || inner.has_nested_non_null()
            }
            Self::List(inner) => inner.has_nested_non_null(),
            _ => false,
        }
    }

    /// Returns true if the outermost wrapper is `NonNull`.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        pub struct $name<T> {
            pub(crate) handle: TypeHandle,
            _marker: PhantomData<fn() -> T>,
        }

        impl<T> $name<T> {
            pub(crate) fn new(handle: TypeHandle) -> Self {
                Self {
                    handle,
                    _marker: PhantomData,
                }
            }

            /// Returns the untyped arena handle.
            pub fn handle(&self) -> TypeHandle {
                self.handle
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.handle).finish()
            }
        }

        impl<T> From<$name<T>> for TypeDescriptor {
            fn from(value: $name<T>) -> Self {
                TypeDescriptor::$variant(value.handle)
            }
        }
    };
}

typed_handle!(
    /// Handle to an object type backed by values of type `T`.
    ObjectType,
    Object
);
typed_handle!(
    /// Handle to an interface implemented by objects backed by `T`.
    InterfaceType,
    Interface
);
typed_handle!(
    /// Handle to a union whose members are backed by `T`.
    UnionType,
    Union
);
typed_handle!(
    /// Handle to an enum whose internal values are of type `T`.
    EnumType,
    Enum
);

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: usize) -> TypeHandle {
        TypeHandle { factory: 0, index }
    }

    #[test]
    fn test_wrappers() {
        let ty = non_null(list(non_null(INT)));
        assert!(ty.is_non_null());
        assert!(ty.is_input());
        assert!(!ty.has_nested_non_null());
        assert_eq!(ty.named(), None);
    }

    #[test]
    fn test_nested_non_null_detected() {
        assert!(non_null(non_null(STRING)).has_nested_non_null());
        assert!(list(non_null(non_null(STRING))).has_nested_non_null());
        assert!(!non_null(list(non_null(STRING))).has_nested_non_null());
    }

    #[test]
    fn test_output_types_are_not_input() {
        let object: TypeDescriptor = ObjectType::<()>::new(handle(1)).into();
        assert!(!list(object.clone()).is_input());
        assert_eq!(object.named(), Some(handle(1)));

        let episode: TypeDescriptor = EnumType::<i32>::new(handle(2)).into();
        assert!(non_null(episode).is_input());
    }
}
