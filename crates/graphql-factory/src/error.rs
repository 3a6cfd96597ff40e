//! Error types for schema definition and field resolution.
//!
//! Definition errors abort [`TypeFactory::compile`](crate::TypeFactory::compile)
//! and are never deferred to query time. Field errors are the engine's own
//! error type and are reported next to a `null` value for the failing field.

use thiserror::Error;

/// Error raised by a resolver or while completing a field value.
///
/// Any [`Display`](std::fmt::Display) error converts into it with `?`.
pub type FieldError = async_graphql::Error;

/// Result type returned by field resolvers.
pub type FieldResult<T> = std::result::Result<T, FieldError>;

/// Result type for schema compilation.
pub type Result<T> = std::result::Result<T, DefinitionError>;

/// Errors detected while compiling a factory into a schema.
#[derive(Debug, Clone, Error)]
pub enum DefinitionError {
    /// Schema configuration failed validation.
    #[error("invalid schema configuration: {0}")]
    InvalidConfig(String),

    /// A type name does not match the GraphQL name grammar.
    #[error("`{0}` is not a valid GraphQL type name")]
    InvalidTypeName(String),

    /// A field, argument or enum value name does not match the GraphQL name grammar.
    #[error("`{name}` in `{type_name}` is not a valid GraphQL name")]
    InvalidName { type_name: String, name: String },

    /// Two reachable types share a name, or a type reuses a built-in scalar name.
    #[error("type `{0}` is defined more than once")]
    DuplicateTypeName(String),

    /// An object or interface without fields, an enum without values, or a union without members.
    #[error("type `{type_name}` declares no {what}")]
    EmptyType {
        type_name: String,
        what: &'static str,
    },

    /// Two fields of one type share a name.
    #[error("field `{type_name}.{field}` is declared more than once")]
    DuplicateField { type_name: String, field: String },

    /// Two arguments of one field share a name.
    #[error("argument `{arg}` of `{type_name}.{field}` is declared more than once")]
    DuplicateArgument {
        type_name: String,
        field: String,
        arg: String,
    },

    /// Two values of one enum share an external name.
    #[error("enum value `{value}` of `{type_name}` is declared more than once")]
    DuplicateEnumValue { type_name: String, value: String },

    /// `NonNull` wrapped directly around another `NonNull`.
    #[error("`{site}` wraps a non-null type in another non-null")]
    NestedNonNull { site: String },

    /// An object, interface or union used as an argument type.
    #[error("argument `{arg}` of `{type_name}.{field}` has output-only type `{ty}`")]
    InvalidArgumentType {
        type_name: String,
        field: String,
        arg: String,
        ty: String,
    },

    /// The declared output type cannot be produced from what the resolver or property yields.
    #[error("field `{type_name}.{field}` is declared as `{declared}` but produces `{produced}`")]
    ShapeMismatch {
        type_name: String,
        field: String,
        declared: String,
        produced: String,
    },

    /// A default field names a property the backing model does not have.
    #[error("`{type_name}` has no property `{field}` for its default field")]
    UnknownProperty { type_name: String, field: String },

    /// An implementing object lacks one of the interface's fields.
    #[error("`{object}` does not implement field `{interface}.{field}`")]
    MissingInterfaceField {
        object: String,
        interface: String,
        field: String,
    },

    /// An implementing object declares an interface field with an unrelated type.
    #[error(
        "`{object}.{field}` has type `{found}`, which does not satisfy `{interface}.{field}` of type `{expected}`"
    )]
    IncompatibleInterfaceField {
        object: String,
        interface: String,
        field: String,
        expected: String,
        found: String,
    },

    /// An implementing object's field is missing an argument the interface declares.
    #[error("`{object}.{field}` is missing argument `{arg}` declared by `{interface}`")]
    MissingInterfaceArgument {
        object: String,
        interface: String,
        field: String,
        arg: String,
    },

    /// An implementing object's argument has a different type than the interface's.
    #[error(
        "argument `{arg}` of `{object}.{field}` has type `{found}`, but `{interface}` declares `{expected}`"
    )]
    IncompatibleInterfaceArgument {
        object: String,
        interface: String,
        field: String,
        arg: String,
        expected: String,
        found: String,
    },

    /// An abstract type has several possible types and one of them cannot be recognised.
    #[error("`{object}` needs an isTypeOf predicate to be told apart among the possible types of `{abstract_type}`")]
    MissingIsTypeOf {
        object: String,
        abstract_type: String,
    },

    /// A type was declared for forward reference and never defined.
    #[error("type `{0}` was declared but never defined")]
    UndefinedType(String),

    /// A handle created by a different factory was used.
    #[error("`{0}` references a type from another factory")]
    ForeignHandle(String),

    /// A default argument value does not fit the argument type.
    #[error("default value of argument `{arg}` of `{type_name}.{field}` is invalid: {reason}")]
    InvalidDefault {
        type_name: String,
        field: String,
        arg: String,
        reason: String,
    },

    /// A field list was requested while the same thread was still producing it.
    #[error("fields of `{0}` were requested while they were being resolved")]
    ReentrantFields(String),

    /// A field thunk panicked, leaving the type unusable.
    #[error("field thunk of `{0}` panicked")]
    PoisonedFields(String),

    /// The execution engine refused the generated schema.
    #[error("schema engine rejected the schema: {0}")]
    Engine(String),
}
