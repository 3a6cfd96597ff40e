//! Schema compilation and execution.
//!
//! [`TypeFactory::compile`](crate::TypeFactory::compile) turns the types
//! reachable from a [`SchemaDescription`] into a [`CompiledSchema`], which
//! wraps the async-graphql dynamic schema. Compile once per process and
//! share the result across requests.

mod compiler;
mod complete;
mod dispatch;
mod propagate;
mod registry;

use std::fmt;
use std::marker::PhantomData;

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Response};

use self::propagate::NullAnchors;
use crate::config::SchemaConfig;
use crate::types::ObjectType;

/// Roots and limits of a schema to compile.
#[derive(Debug, Clone)]
pub struct SchemaDescription {
    pub(crate) query: ObjectType<()>,
    pub(crate) mutation: Option<ObjectType<()>>,
    pub(crate) config: SchemaConfig,
}

impl SchemaDescription {
    pub fn new(query: ObjectType<()>) -> Self {
        Self {
            query,
            mutation: None,
            config: SchemaConfig::default(),
        }
    }

    /// Sets the root mutation type.
    #[must_use]
    pub fn mutation(mut self, mutation: ObjectType<()>) -> Self {
        self.mutation = Some(mutation);
        self
    }

    #[must_use]
    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }
}

/// An executable schema whose resolvers expect a context of type `C`.
pub struct CompiledSchema<C> {
    schema: Schema,
    type_names: Vec<String>,
    _context: PhantomData<fn(C)>,
}

impl<C> Clone for CompiledSchema<C> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            type_names: self.type_names.clone(),
            _context: PhantomData,
        }
    }
}

impl<C> fmt::Debug for CompiledSchema<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("type_names", &self.type_names)
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync + 'static> CompiledSchema<C> {
    pub(crate) fn new(schema: Schema, type_names: Vec<String>) -> Self {
        Self {
            schema,
            type_names,
            _context: PhantomData,
        }
    }

    /// Executes a request with `context` available to every resolver.
    ///
    /// A failing field is reported next to a `null`; a failing non-null
    /// field nulls its nearest nullable ancestor, or the whole `data`.
    pub async fn execute(&self, request: impl Into<Request>, context: C) -> Response {
        let anchors = NullAnchors::default();
        let request = request.into().data(context).data(anchors.clone());
        let mut response = self.schema.execute(request).await;
        anchors.apply(&mut response);
        response
    }

    /// Schema definition language of the compiled schema.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// Names of the compiled types, in the order they were reached from the roots.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    /// The underlying engine schema.
    ///
    /// Requests executed on it directly keep failed non-null fields out of
    /// the response instead of nulling their parents.
    pub fn engine(&self) -> &Schema {
        &self.schema
    }
}
