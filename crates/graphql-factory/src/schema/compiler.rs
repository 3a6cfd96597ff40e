//! Compilation of a factory into an engine schema.
//!
//! Compilation walks the types reachable from the roots with a worklist,
//! forcing each field thunk once, then validates the linked graph and emits
//! async-graphql dynamic types. Every definition error surfaces here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, InputValue, Interface, InterfaceField, Object, Schema,
    TypeRef, Union,
};
use async_graphql::{Name, Value};
use tracing::{debug, trace, warn};

use super::complete::{ArgPlan, FieldPlan, FieldSource, InputPlan, OutputPlan};
use super::dispatch::{Candidate, Dispatcher};
use super::registry::TypeRegistry;
use super::{CompiledSchema, SchemaDescription};
use crate::deferred::ForceError;
use crate::error::{DefinitionError, Result};
use crate::factory::{
    ArgumentDescriptor, EnumValues, FieldDescriptor, FieldList, FieldOutput, ObjectDef,
    TypeDef, TypeFactory, TypeKind,
};
use crate::types::shape::{BackingLookup, produces};
use crate::types::{DefaultValue, ScalarType, TypeDescriptor, TypeHandle};

type Fields<C> = Arc<Vec<FieldDescriptor<C>>>;

/// Checks whether a name is valid for GraphQL.
///
/// GraphQL names must match `/[_A-Za-z][_0-9A-Za-z]*/` and must not start
/// with `__`, which is reserved for introspection.
pub(crate) fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();

    // First character must be underscore or letter
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    if name.starts_with("__") {
        return false;
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

impl<C: Send + Sync + 'static> TypeFactory<C> {
    /// Compiles the types reachable from the description's roots.
    ///
    /// Field thunks run at most once per factory; compiling again reuses
    /// their results.
    ///
    /// # Errors
    ///
    /// Returns the first definition error found. No query can run against
    /// a schema that failed to compile.
    pub fn compile(&self, description: SchemaDescription) -> Result<CompiledSchema<C>> {
        debug!(types = self.len(), "Compiling schema");
        let result = Compiler::new(self).run(description);
        match &result {
            Ok(schema) => debug!(
                types = schema.type_names().len(),
                "Schema compiled"
            ),
            Err(e) => warn!(error = %e, "Schema definition rejected"),
        }
        result
    }
}

struct Compiler<'f, C> {
    factory: &'f TypeFactory<C>,
    registry: TypeRegistry,
    names: HashMap<String, TypeHandle>,
    fields: HashMap<TypeHandle, Fields<C>>,
    enums: HashMap<TypeHandle, Arc<EnumValues>>,
    dispatchers: HashMap<TypeHandle, Arc<Dispatcher>>,
}

impl<C: Send + Sync + 'static> BackingLookup for Compiler<'_, C> {
    fn backing_type(&self, handle: TypeHandle) -> Option<std::any::TypeId> {
        self.factory.get(handle).map(|def| def.backing)
    }
}

impl<'f, C: Send + Sync + 'static> Compiler<'f, C> {
    fn new(factory: &'f TypeFactory<C>) -> Self {
        Self {
            factory,
            registry: TypeRegistry::new(),
            names: HashMap::new(),
            fields: HashMap::new(),
            enums: HashMap::new(),
            dispatchers: HashMap::new(),
        }
    }

    fn run(mut self, description: SchemaDescription) -> Result<CompiledSchema<C>> {
        description
            .config
            .validate()
            .map_err(DefinitionError::InvalidConfig)?;
        if let Some(error) = self.factory.recorded_errors().first() {
            return Err(error.clone());
        }

        let query = description.query.handle();
        let mutation = description.mutation.map(|m| m.handle());
        self.enqueue(query, "schema roots")?;
        if let Some(mutation) = mutation {
            self.enqueue(mutation, "schema roots")?;
        }

        while let Some(handle) = self.registry.pop_pending() {
            self.visit(handle)?;
        }

        let order = self.registry.order().to_vec();
        for &handle in &order {
            self.prepare(handle)?;
        }

        let query_name = self.name(query).to_string();
        let mutation_name = mutation.map(|m| self.name(m).to_string());
        let mut builder = Schema::build(&query_name, mutation_name.as_deref(), None);
        let mut type_names = Vec::with_capacity(order.len());
        for &handle in &order {
            let def = self.def(handle, "schema")?;
            builder = match &def.kind {
                TypeKind::Object(object) => builder.register(self.build_object(handle, def, object)?),
                TypeKind::Interface(_) => builder.register(self.build_interface(handle, def)?),
                TypeKind::Union(union) => {
                    let mut engine = Union::new(def.name.as_str());
                    if let Some(description) = &def.description {
                        engine = engine.description(description);
                    }
                    for &member in &union.members {
                        engine = engine.possible_type(self.name(member));
                    }
                    builder.register(engine)
                }
                TypeKind::Enum(_) => builder.register(self.build_enum(handle, def)?),
            };
            type_names.push(def.name.clone());
        }

        let config = &description.config;
        if let Some(depth) = config.max_depth {
            builder = builder.limit_depth(depth);
        }
        if let Some(complexity) = config.max_complexity {
            builder = builder.limit_complexity(complexity);
        }
        if !config.introspection {
            builder = builder.disable_introspection();
        }

        let schema = builder
            .finish()
            .map_err(|e| DefinitionError::Engine(e.to_string()))?;
        Ok(CompiledSchema::new(schema, type_names))
    }

    fn def(&self, handle: TypeHandle, site: &str) -> Result<&'f TypeDef<C>> {
        self.factory
            .get(handle)
            .ok_or_else(|| DefinitionError::ForeignHandle(site.to_string()))
    }

    fn name(&self, handle: TypeHandle) -> &'f str {
        self.factory.type_name(handle).unwrap_or_default()
    }

    fn enqueue(&mut self, handle: TypeHandle, site: &str) -> Result<()> {
        if handle.factory != self.factory.id() || self.factory.get(handle).is_none() {
            return Err(DefinitionError::ForeignHandle(site.to_string()));
        }
        self.registry.queue_if_needed(handle);
        Ok(())
    }

    fn enqueue_field_types(&mut self, type_name: &str, fields: &[FieldDescriptor<C>]) -> Result<()> {
        for field in fields {
            let site = format!("{type_name}.{}", field.name);
            if let Some(named) = field.ty.named() {
                self.enqueue(named, &site)?;
            }
            for arg in &field.args {
                if let Some(named) = arg.ty.named() {
                    self.enqueue(named, &site)?;
                }
            }
        }
        Ok(())
    }

    /// Claims the type's name, forces its fields and queues what it references.
    fn visit(&mut self, handle: TypeHandle) -> Result<()> {
        let def = self.def(handle, "schema")?;
        self.registry.start_resolving(handle);
        self.claim_name(handle, def)?;

        match &def.kind {
            TypeKind::Object(object) => {
                let fields = force(def, object.fields.as_ref())?;
                self.enqueue_field_types(&def.name, &fields)?;
                for &interface in &object.interfaces {
                    self.enqueue(interface, &def.name)?;
                }
                self.fields.insert(handle, fields);
            }
            TypeKind::Interface(interface) => {
                let fields = force(def, interface.fields.as_ref())?;
                self.enqueue_field_types(&def.name, &fields)?;
                for implementer in self.implementers(handle) {
                    self.registry.queue_if_needed(implementer);
                }
                self.fields.insert(handle, fields);
            }
            TypeKind::Union(union) => {
                for &member in &union.members {
                    self.enqueue(member, &def.name)?;
                }
            }
            TypeKind::Enum(values) => {
                self.enums.insert(handle, Arc::new(values.clone()));
            }
        }

        trace!(type_name = %def.name, "Visited type");
        self.registry.finish_resolving(handle);
        Ok(())
    }

    fn claim_name(&mut self, handle: TypeHandle, def: &TypeDef<C>) -> Result<()> {
        if !is_valid_graphql_name(&def.name) {
            return Err(DefinitionError::InvalidTypeName(def.name.clone()));
        }
        let builtin = ScalarType::ALL.iter().any(|s| s.name() == def.name);
        let taken = self
            .names
            .insert(def.name.clone(), handle)
            .is_some_and(|previous| previous != handle);
        if builtin || taken {
            return Err(DefinitionError::DuplicateTypeName(def.name.clone()));
        }
        Ok(())
    }

    /// Objects implementing an interface, in definition order.
    fn implementers(&self, interface: TypeHandle) -> Vec<TypeHandle> {
        self.factory
            .defs()
            .filter(|(_, def)| match &def.kind {
                TypeKind::Object(object) => object.interfaces.contains(&interface),
                _ => false,
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Validates abstract types and sets up their dispatchers.
    fn prepare(&mut self, handle: TypeHandle) -> Result<()> {
        let def = self.def(handle, "schema")?;
        let dispatcher = match &def.kind {
            TypeKind::Interface(interface) => {
                let implementers = self.implementers(handle);
                let interface_fields = self.fields_of(handle)?;
                for &object in &implementers {
                    let object_fields = self.fields_of(object)?;
                    self.check_implementation(
                        &def.name,
                        &interface_fields,
                        self.name(object),
                        &object_fields,
                    )?;
                }
                self.dispatcher(def, interface.resolve_type.clone(), &implementers)?
            }
            TypeKind::Union(union) => {
                if union.members.is_empty() {
                    return Err(DefinitionError::EmptyType {
                        type_name: def.name.clone(),
                        what: "members",
                    });
                }
                self.dispatcher(def, union.resolve_type.clone(), &union.members)?
            }
            TypeKind::Enum(values) => {
                check_enum(&def.name, values)?;
                return Ok(());
            }
            TypeKind::Object(_) => return Ok(()),
        };
        self.dispatchers.insert(handle, Arc::new(dispatcher));
        Ok(())
    }

    fn fields_of(&self, handle: TypeHandle) -> Result<Fields<C>> {
        self.fields
            .get(&handle)
            .cloned()
            .ok_or_else(|| DefinitionError::UndefinedType(self.name(handle).to_string()))
    }

    fn dispatcher(
        &self,
        def: &TypeDef<C>,
        resolve_type: Option<crate::factory::TypeResolver>,
        possible: &[TypeHandle],
    ) -> Result<Dispatcher> {
        let ambiguous = possible.len() > 1 && resolve_type.is_none();
        let mut candidates = Vec::with_capacity(possible.len());
        for &object in possible {
            let is_type_of = match &self.def(object, &def.name)?.kind {
                TypeKind::Object(object) => object.is_type_of.clone(),
                _ => None,
            };
            if ambiguous && is_type_of.is_none() {
                return Err(DefinitionError::MissingIsTypeOf {
                    object: self.name(object).to_string(),
                    abstract_type: def.name.clone(),
                });
            }
            candidates.push(Candidate {
                name: self.name(object).to_string(),
                is_type_of,
            });
        }
        Ok(Dispatcher::new(def.name.as_str(), resolve_type, candidates))
    }

    fn check_implementation(
        &self,
        interface: &str,
        interface_fields: &[FieldDescriptor<C>],
        object: &str,
        object_fields: &[FieldDescriptor<C>],
    ) -> Result<()> {
        for expected in interface_fields {
            let Some(found) = object_fields.iter().find(|f| f.name == expected.name) else {
                return Err(DefinitionError::MissingInterfaceField {
                    object: object.to_string(),
                    interface: interface.to_string(),
                    field: expected.name.clone(),
                });
            };
            if !self.is_subtype(&found.ty, &expected.ty) {
                return Err(DefinitionError::IncompatibleInterfaceField {
                    object: object.to_string(),
                    interface: interface.to_string(),
                    field: expected.name.clone(),
                    expected: self.render(&expected.ty),
                    found: self.render(&found.ty),
                });
            }
            for expected_arg in &expected.args {
                let Some(found_arg) = found.args.iter().find(|a| a.name == expected_arg.name)
                else {
                    return Err(DefinitionError::MissingInterfaceArgument {
                        object: object.to_string(),
                        interface: interface.to_string(),
                        field: expected.name.clone(),
                        arg: expected_arg.name.clone(),
                    });
                };
                if found_arg.ty != expected_arg.ty {
                    return Err(DefinitionError::IncompatibleInterfaceArgument {
                        object: object.to_string(),
                        interface: interface.to_string(),
                        field: expected.name.clone(),
                        arg: expected_arg.name.clone(),
                        expected: self.render(&expected_arg.ty),
                        found: self.render(&found_arg.ty),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns true if a field of type `sub` may stand in for one of type `sup`.
    fn is_subtype(&self, sub: &TypeDescriptor, sup: &TypeDescriptor) -> bool {
        match (sub, sup) {
            (TypeDescriptor::NonNull(a), TypeDescriptor::NonNull(b))
            | (TypeDescriptor::List(a), TypeDescriptor::List(b)) => self.is_subtype(a, b),
            (TypeDescriptor::NonNull(a), b) => self.is_subtype(a, b),
            (TypeDescriptor::Object(object), TypeDescriptor::Interface(interface)) => matches!(
                self.factory.get(*object).map(|d| &d.kind),
                Some(TypeKind::Object(o)) if o.interfaces.contains(interface)
            ),
            (TypeDescriptor::Object(object), TypeDescriptor::Union(union)) => matches!(
                self.factory.get(*union).map(|d| &d.kind),
                Some(TypeKind::Union(u)) if u.members.contains(object)
            ),
            (a, b) => a == b,
        }
    }

    fn render(&self, ty: &TypeDescriptor) -> String {
        match ty {
            TypeDescriptor::Scalar(scalar) => scalar.name().to_string(),
            TypeDescriptor::Enum(h)
            | TypeDescriptor::Object(h)
            | TypeDescriptor::Interface(h)
            | TypeDescriptor::Union(h) => self.name(*h).to_string(),
            TypeDescriptor::List(inner) => format!("[{}]", self.render(inner)),
            TypeDescriptor::NonNull(inner) => format!("{}!", self.render(inner)),
        }
    }

    fn type_ref(&self, ty: &TypeDescriptor) -> TypeRef {
        match ty {
            TypeDescriptor::Scalar(scalar) => TypeRef::named(scalar.name()),
            TypeDescriptor::Enum(h)
            | TypeDescriptor::Object(h)
            | TypeDescriptor::Interface(h)
            | TypeDescriptor::Union(h) => TypeRef::named(self.name(*h)),
            TypeDescriptor::List(inner) => TypeRef::List(Box::new(self.type_ref(inner))),
            TypeDescriptor::NonNull(inner) => TypeRef::NonNull(Box::new(self.type_ref(inner))),
        }
    }

    /// Structural checks shared by object and interface fields.
    fn check_fields(&self, type_name: &str, fields: &[FieldDescriptor<C>]) -> Result<()> {
        if fields.is_empty() {
            return Err(DefinitionError::EmptyType {
                type_name: type_name.to_string(),
                what: "fields",
            });
        }
        let mut seen = HashSet::new();
        for field in fields {
            if !is_valid_graphql_name(&field.name) {
                return Err(DefinitionError::InvalidName {
                    type_name: type_name.to_string(),
                    name: field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DefinitionError::DuplicateField {
                    type_name: type_name.to_string(),
                    field: field.name.clone(),
                });
            }
            let site = format!("{type_name}.{}", field.name);
            if field.ty.has_nested_non_null() {
                return Err(DefinitionError::NestedNonNull { site });
            }

            let mut arg_names = HashSet::new();
            for arg in &field.args {
                if !is_valid_graphql_name(&arg.name) {
                    return Err(DefinitionError::InvalidName {
                        type_name: site,
                        name: arg.name.clone(),
                    });
                }
                if !arg_names.insert(arg.name.as_str()) {
                    return Err(DefinitionError::DuplicateArgument {
                        type_name: type_name.to_string(),
                        field: field.name.clone(),
                        arg: arg.name.clone(),
                    });
                }
                if arg.ty.has_nested_non_null() {
                    return Err(DefinitionError::NestedNonNull {
                        site: format!("{site}({}:)", arg.name),
                    });
                }
                if !arg.ty.is_input() {
                    return Err(DefinitionError::InvalidArgumentType {
                        type_name: type_name.to_string(),
                        field: field.name.clone(),
                        arg: arg.name.clone(),
                        ty: self.render(&arg.ty),
                    });
                }
            }
        }
        Ok(())
    }

    fn build_object(
        &self,
        handle: TypeHandle,
        def: &TypeDef<C>,
        object: &ObjectDef<C>,
    ) -> Result<Object> {
        let fields = self.fields_of(handle)?;
        self.check_fields(&def.name, &fields)?;
        let properties = (object.properties)();

        let mut engine = Object::new(def.name.as_str());
        if let Some(description) = &def.description {
            engine = engine.description(description);
        }
        for &interface in &object.interfaces {
            engine = engine.implement(self.name(interface));
        }

        for field in fields.iter() {
            let (produced, source) = match &field.output {
                FieldOutput::Property => {
                    let Some(property) = properties.iter().find(|p| p.name == field.name) else {
                        return Err(DefinitionError::UnknownProperty {
                            type_name: def.name.clone(),
                            field: field.name.clone(),
                        });
                    };
                    let source = FieldSource::Property {
                        read: object.read,
                        name: field.name.clone(),
                    };
                    (&property.shape, source)
                }
                FieldOutput::Resolver { shape, resolve } => {
                    (shape, FieldSource::Resolver(Arc::clone(resolve)))
                }
                FieldOutput::Abstract => {
                    return Err(DefinitionError::MissingInterfaceField {
                        object: def.name.clone(),
                        interface: def.name.clone(),
                        field: field.name.clone(),
                    });
                }
            };
            if !produces(produced, &field.ty, self) {
                return Err(DefinitionError::ShapeMismatch {
                    type_name: def.name.clone(),
                    field: field.name.clone(),
                    declared: self.render(&field.ty),
                    produced: produced.to_string(),
                });
            }

            let plan = Arc::new(FieldPlan {
                site: format!("{}.{}", def.name, field.name),
                args: self.arg_plans(&def.name, field)?,
                source,
                output: self.output_plan(&field.ty)?,
            });
            let mut engine_field =
                Field::new(field.name.as_str(), self.type_ref(&field.ty), move |ctx| {
                    let plan = Arc::clone(&plan);
                    FieldFuture::new(async move { plan.resolve(ctx).await })
                });
            if let Some(description) = &field.description {
                engine_field = engine_field.description(description);
            }
            if let Some(reason) = &field.deprecation {
                engine_field = engine_field.deprecation(Some(reason.as_str()));
            }
            for arg in &field.args {
                engine_field = engine_field.argument(self.input_value(&def.name, field, arg)?);
            }
            engine = engine.field(engine_field);
        }
        Ok(engine)
    }

    fn build_interface(&self, handle: TypeHandle, def: &TypeDef<C>) -> Result<Interface> {
        let fields = self.fields_of(handle)?;
        self.check_fields(&def.name, &fields)?;

        let mut engine = Interface::new(def.name.as_str());
        if let Some(description) = &def.description {
            engine = engine.description(description);
        }
        for field in fields.iter() {
            let mut engine_field =
                InterfaceField::new(field.name.as_str(), self.type_ref(&field.ty));
            if let Some(description) = &field.description {
                engine_field = engine_field.description(description);
            }
            if let Some(reason) = &field.deprecation {
                engine_field = engine_field.deprecation(Some(reason.as_str()));
            }
            for arg in &field.args {
                engine_field = engine_field.argument(self.input_value(&def.name, field, arg)?);
            }
            engine = engine.field(engine_field);
        }
        Ok(engine)
    }

    fn build_enum(&self, handle: TypeHandle, def: &TypeDef<C>) -> Result<Enum> {
        let values = self
            .enums
            .get(&handle)
            .ok_or_else(|| DefinitionError::UndefinedType(def.name.clone()))?;

        let mut engine = Enum::new(def.name.as_str());
        if let Some(description) = &def.description {
            engine = engine.description(description);
        }
        for value in &values.values {
            let mut item = EnumItem::new(value.name.as_str());
            if let Some(description) = &value.description {
                item = item.description(description);
            }
            if let Some(reason) = &value.deprecation {
                item = item.deprecation(Some(reason.as_str()));
            }
            engine = engine.item(item);
        }
        Ok(engine)
    }

    fn input_value(
        &self,
        type_name: &str,
        field: &FieldDescriptor<C>,
        arg: &ArgumentDescriptor,
    ) -> Result<InputValue> {
        let mut input = InputValue::new(arg.name.as_str(), self.type_ref(&arg.ty));
        if let Some(description) = &arg.description {
            input = input.description(description);
        }
        if let Some(default) = self.default_of(type_name, field, arg)? {
            input = input.default_value(default);
        }
        Ok(input)
    }

    fn arg_plans(&self, type_name: &str, field: &FieldDescriptor<C>) -> Result<Vec<ArgPlan>> {
        field
            .args
            .iter()
            .map(|arg| {
                Ok(ArgPlan {
                    name: arg.name.clone(),
                    input: self.input_plan(&arg.ty)?,
                    default: self.default_of(type_name, field, arg)?,
                })
            })
            .collect()
    }

    fn default_of(
        &self,
        type_name: &str,
        field: &FieldDescriptor<C>,
        arg: &ArgumentDescriptor,
    ) -> Result<Option<Value>> {
        let Some(default) = &arg.default else {
            return Ok(None);
        };
        self.default_value(&arg.ty, default)
            .map(Some)
            .map_err(|reason| DefinitionError::InvalidDefault {
                type_name: type_name.to_string(),
                field: field.name.clone(),
                arg: arg.name.clone(),
                reason,
            })
    }

    /// Converts a default to the engine value, enum internal values to names.
    fn default_value(
        &self,
        ty: &TypeDescriptor,
        value: &DefaultValue,
    ) -> std::result::Result<Value, String> {
        match (ty, value) {
            (TypeDescriptor::NonNull(_), DefaultValue::Null) => {
                Err("null is not allowed for a non-null argument".into())
            }
            (TypeDescriptor::NonNull(inner), value) => self.default_value(inner, value),
            (_, DefaultValue::Null) => Ok(Value::Null),
            (TypeDescriptor::List(inner), DefaultValue::List(items)) => items
                .iter()
                .map(|item| self.default_value(inner, item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::List),
            (TypeDescriptor::List(inner), single) => {
                self.default_value(inner, single).map(|v| Value::List(vec![v]))
            }
            (TypeDescriptor::Scalar(scalar), DefaultValue::Value(value))
                if scalar_input_accepts(*scalar, value) =>
            {
                Ok(value.clone())
            }
            (TypeDescriptor::Enum(handle), DefaultValue::Leaf(leaf)) => self
                .enums
                .get(handle)
                .and_then(|values| values.name_of(leaf.as_ref()))
                .map(|name| Value::Enum(Name::new(name)))
                .ok_or_else(|| format!("not a value of enum `{}`", self.name(*handle))),
            (TypeDescriptor::Enum(handle), DefaultValue::Value(Value::Enum(name)))
                if self
                    .enums
                    .get(handle)
                    .is_some_and(|values| values.parse(name.as_str()).is_some()) =>
            {
                Ok(Value::Enum(name.clone()))
            }
            (ty, value) => Err(format!("{value:?} does not fit `{}`", self.render(ty))),
        }
    }

    fn output_plan(&self, ty: &TypeDescriptor) -> Result<OutputPlan> {
        Ok(match ty {
            TypeDescriptor::NonNull(inner) => OutputPlan::NonNull(Box::new(self.output_plan(inner)?)),
            TypeDescriptor::List(inner) => OutputPlan::List(Box::new(self.output_plan(inner)?)),
            TypeDescriptor::Scalar(scalar) => OutputPlan::Scalar(*scalar),
            TypeDescriptor::Enum(handle) => OutputPlan::Enum(self.enum_values(*handle)?),
            TypeDescriptor::Object(handle) => {
                let def = self.def(*handle, "output type")?;
                let is_type_of = match &def.kind {
                    TypeKind::Object(object) => object.is_type_of.clone(),
                    _ => None,
                };
                OutputPlan::Object {
                    name: def.name.clone(),
                    is_type_of,
                }
            }
            TypeDescriptor::Interface(handle) | TypeDescriptor::Union(handle) => {
                let dispatcher = self
                    .dispatchers
                    .get(handle)
                    .ok_or_else(|| DefinitionError::UndefinedType(self.name(*handle).to_string()))?;
                OutputPlan::Abstract(Arc::clone(dispatcher))
            }
        })
    }

    fn input_plan(&self, ty: &TypeDescriptor) -> Result<InputPlan> {
        Ok(match ty {
            TypeDescriptor::NonNull(inner) => self.input_plan(inner)?,
            TypeDescriptor::List(inner) => InputPlan::List(Box::new(self.input_plan(inner)?)),
            TypeDescriptor::Enum(handle) => InputPlan::Enum(self.enum_values(*handle)?),
            _ => InputPlan::Scalar,
        })
    }

    fn enum_values(&self, handle: TypeHandle) -> Result<Arc<EnumValues>> {
        self.enums
            .get(&handle)
            .cloned()
            .ok_or_else(|| DefinitionError::UndefinedType(self.name(handle).to_string()))
    }
}

fn force<C>(def: &TypeDef<C>, fields: Option<&FieldList<C>>) -> Result<Arc<Vec<FieldDescriptor<C>>>> {
    let fields = fields.ok_or_else(|| DefinitionError::UndefinedType(def.name.clone()))?;
    fields.force().map_err(|e| match e {
        ForceError::Reentrant => DefinitionError::ReentrantFields(def.name.clone()),
        ForceError::Poisoned => DefinitionError::PoisonedFields(def.name.clone()),
    })
}

fn check_enum(type_name: &str, values: &EnumValues) -> Result<()> {
    if values.values.is_empty() {
        return Err(DefinitionError::EmptyType {
            type_name: type_name.to_string(),
            what: "values",
        });
    }
    let mut seen = HashSet::new();
    for value in &values.values {
        if !is_valid_graphql_name(&value.name) || matches!(value.name.as_str(), "true" | "false" | "null") {
            return Err(DefinitionError::InvalidName {
                type_name: type_name.to_string(),
                name: value.name.clone(),
            });
        }
        if !seen.insert(value.name.as_str()) {
            return Err(DefinitionError::DuplicateEnumValue {
                type_name: type_name.to_string(),
                value: value.name.clone(),
            });
        }
    }
    Ok(())
}

fn scalar_input_accepts(scalar: ScalarType, value: &Value) -> bool {
    match (scalar, value) {
        (ScalarType::String, Value::String(_)) | (ScalarType::Boolean, Value::Boolean(_)) => true,
        (ScalarType::Float, Value::Number(_)) => true,
        (ScalarType::Int, Value::Number(n)) => {
            n.as_i64().is_some_and(|i| i32::try_from(i).is_ok())
        }
        (ScalarType::Id, Value::String(_)) => true,
        (ScalarType::Id, Value::Number(n)) => n.is_i64() || n.is_u64(),
        _ => false,
    }
}
