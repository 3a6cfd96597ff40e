//! Shapes of values produced by backing models and resolvers.
//!
//! A [`Shape`] is the Rust side of a field: what a property or resolver
//! yields. The compiler compares it with the declared [`TypeDescriptor`]
//! before any query runs.

use std::any::{TypeId, type_name};
use std::fmt;

use super::descriptor::{ScalarType, TypeDescriptor, TypeHandle};

/// Scalar value categories a resolver can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Boolean,
    Id,
}

/// What a property or resolver produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Scalar(ScalarKind),
    /// Enum internal value.
    Leaf {
        type_id: TypeId,
        type_name: &'static str,
    },
    /// Backing model of an object, interface or union.
    Model {
        type_id: TypeId,
        type_name: &'static str,
    },
    List(Box<Shape>),
    Nullable(Box<Shape>),
    /// Only known at query time.
    Dynamic,
}

impl Shape {
    pub fn leaf<T: 'static>() -> Self {
        Self::Leaf {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    pub fn model<T: 'static>() -> Self {
        Self::Model {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    pub fn list(inner: Shape) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn nullable(inner: Shape) -> Self {
        Self::Nullable(Box::new(inner))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind:?}"),
            Self::Leaf { type_name, .. } | Self::Model { type_name, .. } => {
                f.write_str(type_name)
            }
            Self::List(inner) => write!(f, "Vec<{inner}>"),
            Self::Nullable(inner) => write!(f, "Option<{inner}>"),
            Self::Dynamic => f.write_str("dynamic value"),
        }
    }
}

/// Answers which Rust type backs a named type.
pub(crate) trait BackingLookup {
    fn backing_type(&self, handle: TypeHandle) -> Option<TypeId>;
}

/// Returns true if a value of `shape` can complete a field declared as `ty`.
///
/// A nullable shape in a non-null position is accepted; the null case is
/// rejected per value at query time.
pub(crate) fn produces(shape: &Shape, ty: &TypeDescriptor, lookup: &dyn BackingLookup) -> bool {
    match (shape, ty) {
        (Shape::Dynamic, _) => true,
        (Shape::Nullable(inner), _) => produces(inner, ty, lookup),
        (_, TypeDescriptor::NonNull(inner)) => produces(shape, inner, lookup),
        (Shape::List(item), TypeDescriptor::List(inner)) => produces(item, inner, lookup),
        (Shape::Scalar(kind), TypeDescriptor::Scalar(scalar)) => scalar_accepts(*scalar, *kind),
        (Shape::Leaf { type_id, .. }, TypeDescriptor::Enum(handle)) => {
            lookup.backing_type(*handle) == Some(*type_id)
        }
        (
            Shape::Model { type_id, .. },
            TypeDescriptor::Object(handle)
            | TypeDescriptor::Interface(handle)
            | TypeDescriptor::Union(handle),
        ) => lookup.backing_type(*handle) == Some(*type_id),
        _ => false,
    }
}

fn scalar_accepts(scalar: ScalarType, kind: ScalarKind) -> bool {
    matches!(
        (scalar, kind),
        (ScalarType::String, ScalarKind::String | ScalarKind::Id)
            | (ScalarType::Int, ScalarKind::Int)
            | (ScalarType::Float, ScalarKind::Float | ScalarKind::Int)
            | (ScalarType::Boolean, ScalarKind::Boolean)
            | (ScalarType::Id, ScalarKind::Id | ScalarKind::String | ScalarKind::Int)
    )
}
