//! Values produced by resolvers before completion.

use std::any::Any;
use std::sync::Arc;

use async_graphql::{ID, Number, PathSegment, Value};

use super::shape::{ScalarKind, Shape};

/// A resolver result before it is checked against the declared field type.
pub enum Resolved {
    Null,
    /// Scalar value.
    Value(Value),
    /// Enum internal value.
    Leaf(Box<dyn Any + Send + Sync>),
    List(Vec<Resolved>),
    /// Backing model of an object, interface or union.
    Model(Arc<dyn Any + Send + Sync>),
}

impl Resolved {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Wraps a backing model.
    pub fn model<T: Any + Send + Sync>(value: T) -> Self {
        Self::Model(Arc::new(value))
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Leaf(_) => f.write_str("Leaf(..)"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Model(_) => f.write_str("Model(..)"),
        }
    }
}

/// Parent value handed to child resolvers.
pub(crate) struct ModelRef {
    pub(crate) model: Arc<dyn Any + Send + Sync>,
    /// Response path of the nearest nullable position at or above this object.
    pub(crate) anchor: Arc<[PathSegment]>,
}

impl ModelRef {
    pub(crate) fn new(model: Arc<dyn Any + Send + Sync>, anchor: &[PathSegment]) -> Self {
        Self {
            model,
            anchor: anchor.into(),
        }
    }
}

/// Rust values that can be returned from a resolver.
pub trait OutputValue: Send + 'static {
    /// Describes the values this type produces.
    fn shape() -> Shape;

    fn into_resolved(self) -> Resolved;
}

/// A named property of a backing model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub shape: Shape,
}

impl Property {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// A statically-typed data model backing objects, interfaces and unions.
///
/// Usually implemented with the [`model!`](crate::model) macro, which exposes
/// every struct field under its camelCase name.
pub trait Model: Any + Send + Sync {
    /// Declared properties, in declaration order.
    fn properties() -> Vec<Property>
    where
        Self: Sized;

    /// Reads a property by its exposed name.
    fn property(&self, name: &str) -> Option<Resolved>;
}

/// Root value of query and mutation types.
impl Model for () {
    fn properties() -> Vec<Property> {
        Vec::new()
    }

    fn property(&self, _name: &str) -> Option<Resolved> {
        None
    }
}

impl<T: Model> OutputValue for Arc<T> {
    fn shape() -> Shape {
        Shape::model::<T>()
    }

    fn into_resolved(self) -> Resolved {
        Resolved::Model(self)
    }
}

impl OutputValue for Resolved {
    fn shape() -> Shape {
        Shape::Dynamic
    }

    fn into_resolved(self) -> Resolved {
        self
    }
}

impl OutputValue for String {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::String)
    }

    fn into_resolved(self) -> Resolved {
        Resolved::Value(Value::String(self))
    }
}

impl OutputValue for &'static str {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::String)
    }

    fn into_resolved(self) -> Resolved {
        Resolved::Value(Value::String(self.to_string()))
    }
}

impl OutputValue for ID {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Id)
    }

    fn into_resolved(self) -> Resolved {
        Resolved::Value(Value::String(self.0))
    }
}

impl OutputValue for bool {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Boolean)
    }

    fn into_resolved(self) -> Resolved {
        Resolved::Value(Value::Boolean(self))
    }
}

impl OutputValue for i32 {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Int)
    }

    fn into_resolved(self) -> Resolved {
        Resolved::Value(Value::Number(self.into()))
    }
}

impl OutputValue for f64 {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Float)
    }

    fn into_resolved(self) -> Resolved {
        match Number::from_f64(self) {
            Some(n) => Resolved::Value(Value::Number(n)),
            None => Resolved::Null,
        }
    }
}

impl<T: OutputValue> OutputValue for Option<T> {
    fn shape() -> Shape {
        Shape::nullable(T::shape())
    }

    fn into_resolved(self) -> Resolved {
        match self {
            Some(value) => value.into_resolved(),
            None => Resolved::Null,
        }
    }
}

impl<T: OutputValue> OutputValue for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn into_resolved(self) -> Resolved {
        Resolved::List(self.into_iter().map(OutputValue::into_resolved).collect())
    }
}

/// Converts a snake_case identifier into its camelCase GraphQL name.
#[doc(hidden)]
pub fn to_camel_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut upper = false;
    for ch in ident.trim_start_matches("r#").chars() {
        if ch == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Declares a struct usable as a backing model.
///
/// Every field is exposed as a property under its camelCase name and must
/// implement [`OutputValue`] and `Clone`.
///
/// ```
/// graphql_factory::model! {
///     #[derive(Debug, Clone)]
///     pub struct Planet {
///         pub name: String,
///         pub orbital_period: Option<i32>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::Model for $name {
            fn properties() -> ::std::vec::Vec<$crate::Property> {
                ::std::vec![
                    $( $crate::Property::new(
                        $crate::to_camel_case(::std::stringify!($field)),
                        <$ty as $crate::OutputValue>::shape(),
                    ), )*
                ]
            }

            fn property(&self, name: &str) -> ::std::option::Option<$crate::Resolved> {
                $(
                    if name == $crate::to_camel_case(::std::stringify!($field)) {
                        return ::std::option::Option::Some($crate::OutputValue::into_resolved(
                            ::std::clone::Clone::clone(&self.$field),
                        ));
                    }
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::OutputValue for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::model::<$name>()
            }

            fn into_resolved(self) -> $crate::Resolved {
                $crate::Resolved::model(self)
            }
        }
    };
}

/// Marks types usable as enum internal values.
///
/// The type becomes returnable from resolvers, readable from arguments and
/// usable as a default argument value. It must be `Clone + PartialEq`.
#[macro_export]
macro_rules! enum_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::OutputValue for $ty {
                fn shape() -> $crate::Shape {
                    $crate::Shape::leaf::<$ty>()
                }

                fn into_resolved(self) -> $crate::Resolved {
                    $crate::Resolved::Leaf(::std::boxed::Box::new(self))
                }
            }

            impl $crate::FromInput for $ty {
                fn from_input(input: &$crate::Input) -> $crate::FieldResult<Self> {
                    input.leaf::<$ty>()
                }
            }

            impl $crate::InputDefault for $ty {
                fn into_default(self) -> $crate::DefaultValue {
                    $crate::DefaultValue::Leaf(::std::sync::Arc::new(self))
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::model! {
        #[derive(Debug, Clone)]
        struct Ship {
            name: String,
            crew_size: i32,
            home_port: Option<String>,
        }
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("name"), "name");
        assert_eq!(to_camel_case("home_planet"), "homePlanet");
        assert_eq!(to_camel_case("appears_in"), "appearsIn");
        assert_eq!(to_camel_case("_private"), "private");
        assert_eq!(to_camel_case("r#type"), "type");
    }

    #[test]
    fn test_model_properties() {
        let props = Ship::properties();
        let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["name", "crewSize", "homePort"]);
        assert_eq!(
            props[2].shape,
            Shape::nullable(Shape::Scalar(ScalarKind::String))
        );
    }

    #[test]
    fn test_model_property_read() {
        let ship = Ship {
            name: "Falcon".into(),
            crew_size: 4,
            home_port: None,
        };
        assert!(matches!(
            ship.property("name"),
            Some(Resolved::Value(Value::String(ref s))) if s == "Falcon"
        ));
        assert!(matches!(ship.property("homePort"), Some(Resolved::Null)));
        assert!(ship.property("crew_size").is_none());
    }

    #[test]
    fn test_nested_output_values() {
        let resolved = vec![Some(1), None].into_resolved();
        match resolved {
            Resolved::List(items) => {
                assert!(matches!(items[0], Resolved::Value(Value::Number(_))));
                assert!(items[1].is_null());
            }
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(
            <Vec<Option<i32>>>::shape(),
            Shape::list(Shape::nullable(Shape::Scalar(ScalarKind::Int)))
        );
    }
}
