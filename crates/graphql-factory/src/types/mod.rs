//! Descriptors, shapes and runtime values shared by the factory and the compiler.

pub mod descriptor;
pub mod input;
pub mod shape;
pub mod value;

pub use descriptor::{
    BOOLEAN, EnumType, FLOAT, ID, INT, InterfaceType, ObjectType, STRING, ScalarType,
    TypeDescriptor, TypeHandle, UnionType, list, non_null,
};
pub use input::{Args, DefaultValue, FromInput, Input, InputDefault};
pub use shape::{ScalarKind, Shape};
pub use value::{Model, OutputValue, Property, Resolved, to_camel_case};
