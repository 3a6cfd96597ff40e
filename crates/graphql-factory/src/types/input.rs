//! Field arguments as seen by resolvers.
//!
//! The compiler decodes the engine's argument values into [`Input`] trees,
//! translating enum names into their internal values, and hands them to
//! resolvers as [`Args`].

use std::any::{Any, type_name};
use std::sync::Arc;

use async_graphql::{ID, Value};
use indexmap::IndexMap;

use crate::error::{FieldError, FieldResult};

/// A decoded argument value.
#[derive(Clone)]
pub enum Input {
    Null,
    /// Scalar value as received.
    Value(Value),
    /// Enum internal value.
    Leaf(Arc<dyn Any + Send + Sync>),
    List(Vec<Input>),
}

impl Input {
    /// Extracts an enum internal value.
    pub fn leaf<T: Any + Clone>(&self) -> FieldResult<T> {
        match self {
            Self::Leaf(value) => value
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| FieldError::new(format!("expected {}", type_name::<T>()))),
            other => Err(unexpected(type_name::<T>(), other)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Value(_) => "scalar",
            Self::Leaf(_) => "enum value",
            Self::List(_) => "list",
        }
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Leaf(_) => f.write_str("Leaf(..)"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

fn unexpected(expected: &str, found: &Input) -> FieldError {
    FieldError::new(format!("expected {expected}, found {}", found.kind()))
}

/// Types that can be read from an argument.
pub trait FromInput: Sized {
    fn from_input(input: &Input) -> FieldResult<Self>;
}

impl FromInput for Input {
    fn from_input(input: &Input) -> FieldResult<Self> {
        Ok(input.clone())
    }
}

impl FromInput for String {
    fn from_input(input: &Input) -> FieldResult<Self> {
        match input {
            Input::Value(Value::String(s)) => Ok(s.clone()),
            other => Err(unexpected("String", other)),
        }
    }
}

impl FromInput for ID {
    fn from_input(input: &Input) -> FieldResult<Self> {
        match input {
            Input::Value(Value::String(s)) => Ok(ID(s.clone())),
            Input::Value(Value::Number(n)) => Ok(ID(n.to_string())),
            other => Err(unexpected("ID", other)),
        }
    }
}

impl FromInput for i32 {
    fn from_input(input: &Input) -> FieldResult<Self> {
        match input {
            Input::Value(Value::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| FieldError::new(format!("{n} is not a 32-bit integer"))),
            other => Err(unexpected("Int", other)),
        }
    }
}

impl FromInput for f64 {
    fn from_input(input: &Input) -> FieldResult<Self> {
        match input {
            Input::Value(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| FieldError::new(format!("{n} is not a float"))),
            other => Err(unexpected("Float", other)),
        }
    }
}

impl FromInput for bool {
    fn from_input(input: &Input) -> FieldResult<Self> {
        match input {
            Input::Value(Value::Boolean(b)) => Ok(*b),
            other => Err(unexpected("Boolean", other)),
        }
    }
}

impl<T: FromInput> FromInput for Option<T> {
    fn from_input(input: &Input) -> FieldResult<Self> {
        match input {
            Input::Null => Ok(None),
            other => T::from_input(other).map(Some),
        }
    }
}

impl<T: FromInput> FromInput for Vec<T> {
    fn from_input(input: &Input) -> FieldResult<Self> {
        match input {
            Input::List(items) => items.iter().map(T::from_input).collect(),
            other => Err(unexpected("list", other)),
        }
    }
}

/// Decoded arguments of one field invocation.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: IndexMap<String, Input>,
}

impl Args {
    pub(crate) fn new(values: IndexMap<String, Input>) -> Self {
        Self { values }
    }

    /// Reads an argument, treating an omitted argument as null.
    pub fn get<T: FromInput>(&self, name: &str) -> FieldResult<T> {
        let input = self.values.get(name).unwrap_or(&Input::Null);
        T::from_input(input).map_err(|e| FieldError::new(format!("argument `{name}`: {}", e.message)))
    }

    /// Returns the raw decoded value of an argument.
    pub fn raw(&self, name: &str) -> Option<&Input> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A default argument value before it is checked against the argument type.
#[derive(Clone)]
pub enum DefaultValue {
    Null,
    Value(Value),
    Leaf(Arc<dyn Any + Send + Sync>),
    List(Vec<DefaultValue>),
}

impl std::fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Leaf(_) => f.write_str("Leaf(..)"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

/// Types usable as default argument values.
pub trait InputDefault {
    fn into_default(self) -> DefaultValue;
}

impl InputDefault for DefaultValue {
    fn into_default(self) -> DefaultValue {
        self
    }
}

impl InputDefault for Value {
    fn into_default(self) -> DefaultValue {
        DefaultValue::Value(self)
    }
}

impl InputDefault for String {
    fn into_default(self) -> DefaultValue {
        DefaultValue::Value(Value::String(self))
    }
}

impl InputDefault for &str {
    fn into_default(self) -> DefaultValue {
        DefaultValue::Value(Value::String(self.to_string()))
    }
}

impl InputDefault for ID {
    fn into_default(self) -> DefaultValue {
        DefaultValue::Value(Value::String(self.0))
    }
}

impl InputDefault for i32 {
    fn into_default(self) -> DefaultValue {
        DefaultValue::Value(Value::Number(self.into()))
    }
}

impl InputDefault for f64 {
    fn into_default(self) -> DefaultValue {
        match async_graphql::Number::from_f64(self) {
            Some(n) => DefaultValue::Value(Value::Number(n)),
            None => DefaultValue::Null,
        }
    }
}

impl InputDefault for bool {
    fn into_default(self) -> DefaultValue {
        DefaultValue::Value(Value::Boolean(self))
    }
}

impl<T: InputDefault> InputDefault for Option<T> {
    fn into_default(self) -> DefaultValue {
        match self {
            Some(value) => value.into_default(),
            None => DefaultValue::Null,
        }
    }
}

impl<T: InputDefault> InputDefault for Vec<T> {
    fn into_default(self) -> DefaultValue {
        DefaultValue::List(self.into_iter().map(InputDefault::into_default).collect())
    }
}
