//! Field and argument descriptors.

use std::any::{Any, type_name};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use crate::error::{FieldError, FieldResult};
use crate::types::{Args, DefaultValue, InputDefault, OutputValue, Resolved, Shape, TypeDescriptor};

/// Type-erased resolver: `(source, args, context) -> future of value`.
pub(crate) type Resolver<C> =
    Arc<dyn Fn(&dyn Any, &Args, &C) -> BoxFuture<'static, FieldResult<Resolved>> + Send + Sync>;

/// How a field obtains its value.
pub(crate) enum FieldOutput<C> {
    /// Interface field; each implementer resolves it.
    Abstract,
    /// Reads the same-named property of the backing model.
    Property,
    Resolver { shape: Shape, resolve: Resolver<C> },
}

impl<C> Clone for FieldOutput<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Abstract => Self::Abstract,
            Self::Property => Self::Property,
            Self::Resolver { shape, resolve } => Self::Resolver {
                shape: shape.clone(),
                resolve: Arc::clone(resolve),
            },
        }
    }
}

/// A named field: output type, arguments and resolution behaviour.
pub struct FieldDescriptor<C> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) deprecation: Option<String>,
    pub(crate) ty: TypeDescriptor,
    pub(crate) args: Vec<ArgumentDescriptor>,
    pub(crate) output: FieldOutput<C>,
}

impl<C> FieldDescriptor<C> {
    fn new(name: &str, ty: TypeDescriptor, output: FieldOutput<C>) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            deprecation: None,
            ty,
            args: Vec::new(),
            output,
        }
    }

    /// Adds an argument.
    pub fn argument(&mut self, arg: ArgumentDescriptor) -> &mut Self {
        self.args.push(arg);
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field deprecated.
    pub fn deprecated(&mut self, reason: impl Into<String>) -> &mut Self {
        self.deprecation = Some(reason.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.args
    }

    /// Returns true for interface fields, which carry no resolver.
    pub fn is_abstract(&self) -> bool {
        matches!(self.output, FieldOutput::Abstract)
    }
}

impl<C> Clone for FieldDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            deprecation: self.deprecation.clone(),
            ty: self.ty.clone(),
            args: self.args.clone(),
            output: self.output.clone(),
        }
    }
}

impl<C> std::fmt::Debug for FieldDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("args", &self.args)
            .field("abstract", &self.is_abstract())
            .finish()
    }
}

/// A field argument.
#[derive(Debug, Clone)]
pub struct ArgumentDescriptor {
    pub(crate) name: String,
    pub(crate) ty: TypeDescriptor,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) description: Option<String>,
}

impl ArgumentDescriptor {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }
}

/// Declares an argument without a default value.
pub fn arg(name: &str, ty: impl Into<TypeDescriptor>) -> ArgumentDescriptor {
    ArgumentDescriptor {
        name: name.to_string(),
        ty: ty.into(),
        default: None,
        description: None,
    }
}

/// Declares an argument substituted with `value` when the caller omits it.
///
/// Enum defaults are given as internal values.
pub fn default_arg(
    name: &str,
    ty: impl Into<TypeDescriptor>,
    value: impl InputDefault,
) -> ArgumentDescriptor {
    ArgumentDescriptor {
        default: Some(value.into_default()),
        ..arg(name, ty)
    }
}

fn source_mismatch<T>() -> FieldError {
    FieldError::new(format!("expected a parent value of type {}", type_name::<T>()))
}

/// Field list of an object type backed by `T`.
pub struct ObjectFields<T, C> {
    fields: Vec<FieldDescriptor<C>>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any, C: 'static> ObjectFields<T, C> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn into_fields(self) -> Vec<FieldDescriptor<C>> {
        self.fields
    }

    fn push(&mut self, field: FieldDescriptor<C>) -> &mut FieldDescriptor<C> {
        self.fields.push(field);
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    /// Declares a field resolved by reading the same-named property of the source.
    pub fn default_field(
        &mut self,
        name: &str,
        ty: impl Into<TypeDescriptor>,
    ) -> &mut FieldDescriptor<C> {
        self.push(FieldDescriptor::new(name, ty.into(), FieldOutput::Property))
    }

    /// Declares a field with a synchronous resolver.
    pub fn field<R, F>(
        &mut self,
        name: &str,
        ty: impl Into<TypeDescriptor>,
        resolve: F,
    ) -> &mut FieldDescriptor<C>
    where
        R: OutputValue,
        F: Fn(&T, &Args, &C) -> FieldResult<R> + Send + Sync + 'static,
    {
        let resolver: Resolver<C> = Arc::new(move |source: &dyn Any, args: &Args, ctx: &C| {
            let result = match source.downcast_ref::<T>() {
                Some(source) => resolve(source, args, ctx).map(OutputValue::into_resolved),
                None => Err(source_mismatch::<T>()),
            };
            future::ready(result).boxed()
        });
        self.push(FieldDescriptor::new(
            name,
            ty.into(),
            FieldOutput::Resolver {
                shape: R::shape(),
                resolve: resolver,
            },
        ))
    }

    /// Declares a field whose resolver returns a future.
    ///
    /// The future must own what it needs; clone it out of the source or
    /// context before the `async move` block.
    pub fn field_async<R, F, Fut>(
        &mut self,
        name: &str,
        ty: impl Into<TypeDescriptor>,
        resolve: F,
    ) -> &mut FieldDescriptor<C>
    where
        R: OutputValue,
        F: Fn(&T, &Args, &C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<R>> + Send + 'static,
    {
        let resolver: Resolver<C> = Arc::new(move |source: &dyn Any, args: &Args, ctx: &C| {
            match source.downcast_ref::<T>() {
                Some(source) => resolve(source, args, ctx)
                    .map(|result| result.map(OutputValue::into_resolved))
                    .boxed(),
                None => future::ready(Err(source_mismatch::<T>())).boxed(),
            }
        });
        self.push(FieldDescriptor::new(
            name,
            ty.into(),
            FieldOutput::Resolver {
                shape: R::shape(),
                resolve: resolver,
            },
        ))
    }
}

/// Field list of an interface. Fields are abstract.
pub struct InterfaceFields<T, C> {
    fields: Vec<FieldDescriptor<C>>,
    _marker: PhantomData<fn(&T)>,
}

impl<T, C> InterfaceFields<T, C> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn into_fields(self) -> Vec<FieldDescriptor<C>> {
        self.fields
    }

    /// Declares an abstract field; implementers supply the resolver.
    pub fn field(&mut self, name: &str, ty: impl Into<TypeDescriptor>) -> &mut FieldDescriptor<C> {
        self.fields
            .push(FieldDescriptor::new(name, ty.into(), FieldOutput::Abstract));
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }
}
