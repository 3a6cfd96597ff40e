//! The type factory.
//!
//! A [`TypeFactory`] owns an arena of named type definitions. Builders fill
//! arena slots and hand back `Copy` handles, so types can reference each
//! other (or themselves) before they are defined. Field lists are closures
//! stored in [`Deferred`] cells and only run when the schema is compiled.
//!
//! Builders never fail. Everything they record is validated by
//! [`TypeFactory::compile`], before any query runs.

mod builder;
mod field;

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::deferred::Deferred;
use crate::error::DefinitionError;
use crate::types::{
    EnumType, InterfaceType, Model, ObjectType, Property, Resolved, TypeHandle, UnionType,
};

pub use builder::{EnumBuilder, InterfaceBuilder, ObjectBuilder, UnionBuilder};
pub use field::{
    ArgumentDescriptor, FieldDescriptor, InterfaceFields, ObjectFields, arg, default_arg,
};
pub(crate) use field::{FieldOutput, Resolver};

/// Predicate deciding whether a backing value is an instance of an object type.
pub(crate) type Predicate = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

/// Picks the concrete type name of an abstract-typed value.
pub(crate) type TypeResolver = Arc<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

pub(crate) type FieldList<C> = Deferred<Vec<FieldDescriptor<C>>>;

static NEXT_FACTORY_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct TypeDef<C> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) backing: TypeId,
    pub(crate) kind: TypeKind<C>,
}

pub(crate) enum TypeKind<C> {
    Object(ObjectDef<C>),
    Interface(InterfaceDef<C>),
    Union(UnionDef),
    Enum(EnumValues),
}

pub(crate) struct ObjectDef<C> {
    pub(crate) properties: fn() -> Vec<Property>,
    pub(crate) read: fn(&dyn Any, &str) -> Option<Resolved>,
    pub(crate) interfaces: Vec<TypeHandle>,
    pub(crate) is_type_of: Option<Predicate>,
    /// `None` until the type is defined.
    pub(crate) fields: Option<FieldList<C>>,
}

pub(crate) struct InterfaceDef<C> {
    pub(crate) resolve_type: Option<TypeResolver>,
    pub(crate) fields: Option<FieldList<C>>,
}

pub(crate) struct UnionDef {
    pub(crate) members: Vec<TypeHandle>,
    pub(crate) resolve_type: Option<TypeResolver>,
}

#[derive(Clone)]
pub(crate) struct EnumValueDef {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) deprecation: Option<String>,
    pub(crate) value: Arc<dyn Any + Send + Sync>,
}

/// Values of an enum and the equality of its internal value type.
#[derive(Clone)]
pub(crate) struct EnumValues {
    pub(crate) values: Vec<EnumValueDef>,
    eq: fn(&dyn Any, &dyn Any) -> bool,
}

fn eq_as<V: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<V>(), b.downcast_ref::<V>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn read_property<T: Model>(source: &dyn Any, name: &str) -> Option<Resolved> {
    source.downcast_ref::<T>().and_then(|model| model.property(name))
}

impl EnumValues {
    fn new<V: PartialEq + 'static>() -> Self {
        Self {
            values: Vec::new(),
            eq: eq_as::<V>,
        }
    }

    /// External name of an internal value.
    pub(crate) fn name_of(&self, value: &dyn Any) -> Option<&str> {
        self.values
            .iter()
            .find(|v| (self.eq)(v.value.as_ref(), value))
            .map(|v| v.name.as_str())
    }

    /// Internal value of an external name.
    pub(crate) fn parse(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| Arc::clone(&v.value))
    }
}

/// Builder of typed schema descriptors, parameterised by the request context `C`.
///
/// # Example
///
/// ```
/// use graphql_factory::{TypeFactory, SchemaDescription, non_null, STRING};
///
/// graphql_factory::model! {
///     #[derive(Clone)]
///     pub struct Planet {
///         pub name: String,
///     }
/// }
///
/// let mut t = TypeFactory::<()>::new();
/// let planet = t.object_type::<Planet>("Planet").fields(|_, f| {
///     f.default_field("name", non_null(STRING));
/// });
/// let query = t.query_type().fields(move |_, f| {
///     f.field("home", non_null(planet), |_, _, _| {
///         Ok(Planet { name: "Tatooine".into() })
///     });
/// });
/// let schema = t.compile(SchemaDescription::new(query)).unwrap();
/// assert!(schema.sdl().contains("type Planet"));
/// ```
pub struct TypeFactory<C> {
    id: u64,
    types: Vec<TypeDef<C>>,
    /// Misuse recorded by builders, reported by `compile`.
    errors: Vec<DefinitionError>,
    _context: PhantomData<fn(&C)>,
}

impl<C: Send + Sync + 'static> Default for TypeFactory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + Sync + 'static> TypeFactory<C> {
    pub fn new() -> Self {
        Self {
            id: NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed),
            types: Vec::new(),
            errors: Vec::new(),
            _context: PhantomData,
        }
    }

    /// Starts an object type backed by `T`.
    pub fn object_type<T: Model>(&mut self, name: &str) -> ObjectBuilder<'_, T, C> {
        let handle = self.declare_object::<T>(name);
        self.define_object(handle)
    }

    /// Reserves an object type to be defined later with [`define_object`](Self::define_object).
    pub fn declare_object<T: Model>(&mut self, name: &str) -> ObjectType<T> {
        ObjectType::new(self.push::<T>(
            name,
            TypeKind::Object(ObjectDef {
                properties: T::properties,
                read: read_property::<T>,
                interfaces: Vec::new(),
                is_type_of: None,
                fields: None,
            }),
        ))
    }

    /// Defines a previously declared object type.
    pub fn define_object<T: Model>(&mut self, handle: ObjectType<T>) -> ObjectBuilder<'_, T, C> {
        let slot = self.slot(handle.handle, "object");
        ObjectBuilder::new(self, handle, slot)
    }

    /// Starts an interface whose implementers are backed by `T`.
    pub fn interface_type<T: Model>(&mut self, name: &str) -> InterfaceBuilder<'_, T, C> {
        let handle = self.declare_interface::<T>(name);
        self.define_interface(handle)
    }

    /// Reserves an interface to be defined later with [`define_interface`](Self::define_interface).
    pub fn declare_interface<T: Model>(&mut self, name: &str) -> InterfaceType<T> {
        InterfaceType::new(self.push::<T>(
            name,
            TypeKind::Interface(InterfaceDef {
                resolve_type: None,
                fields: None,
            }),
        ))
    }

    /// Defines a previously declared interface.
    pub fn define_interface<T: Model>(
        &mut self,
        handle: InterfaceType<T>,
    ) -> InterfaceBuilder<'_, T, C> {
        let slot = self.slot(handle.handle, "interface");
        InterfaceBuilder::new(self, handle, slot)
    }

    /// Starts a union whose members are backed by `T`.
    pub fn union_type<T: Model>(&mut self, name: &str) -> UnionBuilder<'_, T, C> {
        let handle = UnionType::new(self.push::<T>(
            name,
            TypeKind::Union(UnionDef {
                members: Vec::new(),
                resolve_type: None,
            }),
        ));
        UnionBuilder::new(self, handle)
    }

    /// Starts an enum whose internal values are of type `V`.
    pub fn enum_type<V>(&mut self, name: &str) -> EnumBuilder<'_, V, C>
    where
        V: PartialEq + Send + Sync + 'static,
    {
        let handle = EnumType::new(self.push::<V>(name, TypeKind::Enum(EnumValues::new::<V>())));
        EnumBuilder::new(self, handle)
    }

    /// Starts the root query type, named `Query`.
    pub fn query_type(&mut self) -> ObjectBuilder<'_, (), C> {
        self.object_type::<()>("Query")
    }

    /// Starts the root mutation type, named `Mutation`.
    pub fn mutation_type(&mut self) -> ObjectBuilder<'_, (), C> {
        self.object_type::<()>("Mutation")
    }

    /// Returns the name a handle was declared with.
    pub fn type_name(&self, handle: TypeHandle) -> Option<&str> {
        self.get(handle).map(|def| def.name.as_str())
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn push<T: 'static>(&mut self, name: &str, kind: TypeKind<C>) -> TypeHandle {
        let handle = TypeHandle {
            factory: self.id,
            index: self.types.len(),
        };
        self.types.push(TypeDef {
            name: name.to_string(),
            description: None,
            backing: TypeId::of::<T>(),
            kind,
        });
        handle
    }

    /// Resolves a handle a builder is about to fill, recording misuse.
    fn slot(&mut self, handle: TypeHandle, kind: &str) -> Option<usize> {
        if handle.factory != self.id {
            self.errors
                .push(DefinitionError::ForeignHandle(format!("{kind} definition")));
            return None;
        }
        let def = self.types.get(handle.index)?;
        let defined = match &def.kind {
            TypeKind::Object(object) => object.fields.is_some(),
            TypeKind::Interface(interface) => interface.fields.is_some(),
            _ => false,
        };
        if defined {
            self.errors
                .push(DefinitionError::DuplicateTypeName(def.name.clone()));
            return None;
        }
        Some(handle.index)
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn get(&self, handle: TypeHandle) -> Option<&TypeDef<C>> {
        if handle.factory != self.id {
            return None;
        }
        self.types.get(handle.index)
    }

    pub(crate) fn def_mut(&mut self, index: usize) -> &mut TypeDef<C> {
        &mut self.types[index]
    }

    pub(crate) fn defs(&self) -> impl Iterator<Item = (TypeHandle, &TypeDef<C>)> {
        let id = self.id;
        self.types
            .iter()
            .enumerate()
            .map(move |(index, def)| (TypeHandle { factory: id, index }, def))
    }

    pub(crate) fn recorded_errors(&self) -> &[DefinitionError] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ID, STRING, non_null};

    crate::model! {
        #[derive(Clone)]
        struct Ship {
            id: String,
            name: String,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Class {
        Freighter,
        Fighter,
    }

    #[test]
    fn test_handles_are_arena_slots() {
        let mut t = TypeFactory::<()>::new();
        let ship = t.declare_object::<Ship>("Ship");
        let class = t.enum_type::<Class>("Class").value("FREIGHTER", Class::Freighter).build();

        assert_eq!(t.len(), 2);
        assert_eq!(t.type_name(ship.handle()), Some("Ship"));
        assert_eq!(t.type_name(class.handle()), Some("Class"));

        let other = TypeFactory::<()>::new();
        assert_eq!(other.type_name(ship.handle()), None);
    }

    #[test]
    fn test_enum_values_lookup() {
        let mut t = TypeFactory::<()>::new();
        let class = t
            .enum_type::<Class>("Class")
            .value("FREIGHTER", Class::Freighter)
            .value("FIGHTER", Class::Fighter)
            .build();

        let def = t.get(class.handle()).unwrap();
        let TypeKind::Enum(values) = &def.kind else {
            panic!("expected enum");
        };
        assert_eq!(values.name_of(&Class::Fighter), Some("FIGHTER"));
        assert_eq!(values.name_of(&"FIGHTER"), None);
        let parsed = values.parse("FREIGHTER").unwrap();
        assert_eq!(parsed.downcast_ref::<Class>(), Some(&Class::Freighter));
        assert!(values.parse("Freighter").is_none());
    }

    #[test]
    fn test_fields_are_deferred() {
        let mut t = TypeFactory::<()>::new();
        let ship = t.object_type::<Ship>("Ship").fields(|_, f| {
            f.default_field("id", non_null(ID));
            f.default_field("name", STRING);
        });

        let def = t.get(ship.handle()).unwrap();
        let TypeKind::Object(object) = &def.kind else {
            panic!("expected object");
        };
        let fields = object.fields.as_ref().unwrap();
        assert!(!fields.is_ready());
        assert_eq!(fields.force().unwrap().len(), 2);
    }

    #[test]
    fn test_defining_twice_is_recorded() {
        let mut t = TypeFactory::<()>::new();
        let ship = t.object_type::<Ship>("Ship").fields(|_, f| {
            f.default_field("id", ID);
        });
        t.define_object(ship).fields(|_, f| {
            f.default_field("name", STRING);
        });
        assert!(matches!(
            t.recorded_errors(),
            [DefinitionError::DuplicateTypeName(name)] if name == "Ship"
        ));
    }
}
