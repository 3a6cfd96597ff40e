//! Code-first GraphQL schema construction.
//!
//! This crate lets an application declare its GraphQL types as ordinary Rust
//! values bound to statically-typed backing models, and compiles them into an
//! executable [async-graphql](async_graphql) dynamic schema.
//!
//! # Architecture
//!
//! - **Types**: descriptors ([`TypeDescriptor`]), backing models ([`Model`])
//!   and the values resolvers produce ([`Resolved`])
//! - **Factory**: builders producing typed handles ([`TypeFactory`])
//! - **Deferred**: run-once field thunks tolerating cyclic references
//! - **Schema**: the compiler, abstract type dispatch and value completion
//!
//! # Example
//!
//! ```
//! use graphql_factory::{SchemaDescription, TypeFactory, non_null, STRING};
//!
//! graphql_factory::model! {
//!     #[derive(Clone)]
//!     pub struct Greeting {
//!         pub text: String,
//!     }
//! }
//!
//! let mut t = TypeFactory::<String>::new();
//! let greeting = t.object_type::<Greeting>("Greeting").fields(|_, f| {
//!     f.default_field("text", non_null(STRING));
//! });
//! let query = t.query_type().fields(move |_, f| {
//!     f.field("greeting", non_null(greeting), |_, _, name: &String| {
//!         Ok(Greeting { text: format!("hello {name}") })
//!     });
//! });
//!
//! let schema = t.compile(SchemaDescription::new(query)).unwrap();
//! let response = tokio_test::block_on(
//!     schema.execute("{ greeting { text } }", "world".to_string()),
//! );
//! assert_eq!(
//!     response.data.into_json().unwrap(),
//!     serde_json::json!({ "greeting": { "text": "hello world" } })
//! );
//! ```

pub mod config;
pub mod deferred;
pub mod error;
pub mod factory;
pub mod schema;
pub mod types;

pub use config::SchemaConfig;
pub use error::{DefinitionError, FieldError, FieldResult, Result};
pub use factory::{
    ArgumentDescriptor, EnumBuilder, FieldDescriptor, InterfaceBuilder, InterfaceFields,
    ObjectBuilder, ObjectFields, TypeFactory, UnionBuilder, arg, default_arg,
};
pub use schema::{CompiledSchema, SchemaDescription};
pub use types::{
    Args, BOOLEAN, DefaultValue, EnumType, FLOAT, FromInput, ID, INT, Input, InputDefault,
    InterfaceType, Model, ObjectType, OutputValue, Property, Resolved, STRING, ScalarKind,
    ScalarType, Shape, TypeDescriptor, TypeHandle, UnionType, list, non_null, to_camel_case,
};
