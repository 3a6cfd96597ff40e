//! Builders for named types.

use std::any::Any;
use std::sync::Arc;

use super::{
    EnumValueDef, FieldList, InterfaceFields, ObjectFields, Predicate, TypeFactory, TypeKind,
    TypeResolver,
};
use crate::deferred::Deferred;
use crate::types::{EnumType, InterfaceType, Model, ObjectType, UnionType};

fn predicate<T: Any>(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Predicate {
    Arc::new(move |value: &dyn Any| value.downcast_ref::<T>().is_some_and(&f))
}

fn type_resolver<T: Any, S: Into<String>>(
    f: impl Fn(&T) -> Option<S> + Send + Sync + 'static,
) -> TypeResolver {
    Arc::new(move |value: &dyn Any| value.downcast_ref::<T>().and_then(&f).map(Into::into))
}

/// Builder of an object type backed by `T`.
pub struct ObjectBuilder<'a, T, C> {
    factory: &'a mut TypeFactory<C>,
    handle: ObjectType<T>,
    /// `None` when the handle cannot be defined; the misuse is already recorded.
    slot: Option<usize>,
}

impl<'a, T: Model, C: Send + Sync + 'static> ObjectBuilder<'a, T, C> {
    pub(crate) fn new(
        factory: &'a mut TypeFactory<C>,
        handle: ObjectType<T>,
        slot: Option<usize>,
    ) -> Self {
        Self {
            factory,
            handle,
            slot,
        }
    }

    fn with_def(&mut self, f: impl FnOnce(&mut super::TypeDef<C>)) {
        if let Some(index) = self.slot {
            f(self.factory.def_mut(index));
        }
    }

    fn with_object(&mut self, f: impl FnOnce(&mut super::ObjectDef<C>)) {
        self.with_def(|def| {
            if let TypeKind::Object(object) = &mut def.kind {
                f(object);
            }
        });
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.with_def(|def| def.description = Some(description));
        self
    }

    /// Declares that this object implements `interface`.
    pub fn implements(mut self, interface: InterfaceType<T>) -> Self {
        self.with_object(|object| object.interfaces.push(interface.handle));
        self
    }

    /// Sets the predicate recognising values of this type.
    pub fn is_type_of(mut self, f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        let f = predicate(f);
        self.with_object(|object| object.is_type_of = Some(f));
        self
    }

    /// Sets the field list and finishes the type.
    ///
    /// The closure runs once, when the schema is first compiled, and receives
    /// this type's own handle for self references.
    pub fn fields<F>(mut self, f: F) -> ObjectType<T>
    where
        F: FnOnce(ObjectType<T>, &mut ObjectFields<T, C>) + Send + 'static,
    {
        let handle = self.handle;
        let fields: FieldList<C> = Deferred::new(move || {
            let mut set = ObjectFields::new();
            f(handle, &mut set);
            set.into_fields()
        });
        self.with_object(|object| object.fields = Some(fields));
        handle
    }
}

/// Builder of an interface whose implementers are backed by `T`.
pub struct InterfaceBuilder<'a, T, C> {
    factory: &'a mut TypeFactory<C>,
    handle: InterfaceType<T>,
    slot: Option<usize>,
}

impl<'a, T: Model, C: Send + Sync + 'static> InterfaceBuilder<'a, T, C> {
    pub(crate) fn new(
        factory: &'a mut TypeFactory<C>,
        handle: InterfaceType<T>,
        slot: Option<usize>,
    ) -> Self {
        Self {
            factory,
            handle,
            slot,
        }
    }

    fn with_def(&mut self, f: impl FnOnce(&mut super::TypeDef<C>)) {
        if let Some(index) = self.slot {
            f(self.factory.def_mut(index));
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.with_def(|def| def.description = Some(description));
        self
    }

    /// Names the concrete type of a value, consulted before `isTypeOf` predicates.
    pub fn resolve_type<S: Into<String>>(
        mut self,
        f: impl Fn(&T) -> Option<S> + Send + Sync + 'static,
    ) -> Self {
        let f = type_resolver(f);
        self.with_def(|def| {
            if let TypeKind::Interface(interface) = &mut def.kind {
                interface.resolve_type = Some(f);
            }
        });
        self
    }

    /// Sets the abstract field list and finishes the interface.
    pub fn fields<F>(mut self, f: F) -> InterfaceType<T>
    where
        F: FnOnce(InterfaceType<T>, &mut InterfaceFields<T, C>) + Send + 'static,
    {
        let handle = self.handle;
        let fields: FieldList<C> = Deferred::new(move || {
            let mut set = InterfaceFields::new();
            f(handle, &mut set);
            set.into_fields()
        });
        self.with_def(|def| {
            if let TypeKind::Interface(interface) = &mut def.kind {
                interface.fields = Some(fields);
            }
        });
        handle
    }
}

/// Builder of a union whose members are backed by `T`.
pub struct UnionBuilder<'a, T, C> {
    factory: &'a mut TypeFactory<C>,
    handle: UnionType<T>,
}

impl<'a, T: Model, C: Send + Sync + 'static> UnionBuilder<'a, T, C> {
    pub(crate) fn new(factory: &'a mut TypeFactory<C>, handle: UnionType<T>) -> Self {
        Self { factory, handle }
    }

    fn with_def(&mut self, f: impl FnOnce(&mut super::TypeDef<C>)) {
        f(self.factory.def_mut(self.handle.handle.index));
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.with_def(|def| def.description = Some(description));
        self
    }

    /// Adds a member. Dispatch tries members in the order they are added.
    pub fn member(mut self, object: ObjectType<T>) -> Self {
        self.with_def(|def| {
            if let TypeKind::Union(union) = &mut def.kind {
                union.members.push(object.handle);
            }
        });
        self
    }

    /// Names the concrete type of a value, consulted before `isTypeOf` predicates.
    pub fn resolve_type<S: Into<String>>(
        mut self,
        f: impl Fn(&T) -> Option<S> + Send + Sync + 'static,
    ) -> Self {
        let f = type_resolver(f);
        self.with_def(|def| {
            if let TypeKind::Union(union) = &mut def.kind {
                union.resolve_type = Some(f);
            }
        });
        self
    }

    pub fn build(self) -> UnionType<T> {
        self.handle
    }
}

/// Builder of an enum with internal values of type `V`.
pub struct EnumBuilder<'a, V, C> {
    factory: &'a mut TypeFactory<C>,
    handle: EnumType<V>,
}

impl<'a, V, C> EnumBuilder<'a, V, C>
where
    V: PartialEq + Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    pub(crate) fn new(factory: &'a mut TypeFactory<C>, handle: EnumType<V>) -> Self {
        Self { factory, handle }
    }

    fn with_values(&mut self, f: impl FnOnce(&mut Vec<EnumValueDef>)) {
        if let TypeKind::Enum(values) = &mut self.factory.def_mut(self.handle.handle.index).kind
        {
            f(&mut values.values);
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.factory.def_mut(self.handle.handle.index).description = Some(description.into());
        self
    }

    /// Adds a value exposed as `name` and delivered to resolvers as `value`.
    pub fn value(mut self, name: &str, value: V) -> Self {
        let value = EnumValueDef {
            name: name.to_string(),
            description: None,
            deprecation: None,
            value: Arc::new(value),
        };
        self.with_values(|values| values.push(value));
        self
    }

    /// Describes the value named `name`.
    pub fn describe(mut self, name: &str, description: impl Into<String>) -> Self {
        let description = description.into();
        self.with_values(|values| {
            for value in values.iter_mut().filter(|v| v.name == name) {
                value.description = Some(description.clone());
            }
        });
        self
    }

    /// Deprecates the value named `name`.
    pub fn deprecate(mut self, name: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.with_values(|values| {
            for value in values.iter_mut().filter(|v| v.name == name) {
                value.deprecation = Some(reason.clone());
            }
        });
        self
    }

    pub fn build(self) -> EnumType<V> {
        self.handle
    }
}
