//! # Type Descriptors
//!
//! Describes the members of mappable types and caches those descriptions.
//!
//! Rust has no runtime reflection, so member discovery is generated at
//! compile time: the [`mappable!`](crate::mappable) macro implements
//! [`Semantic`] and [`Mappable`] for a struct, listing each field with its
//! [`SemanticType`]. The [`TypeRegistry`] turns those listings into
//! immutable [`TypeDescriptor`]s on first use and keeps them for its
//! lifetime, keyed by type identity.
//!
//! ## Key Responsibilities
//!
//! - **Type identity**: [`TypeKey`] pairs a `TypeId` with a readable name
//! - **Semantic types**: a small vocabulary the compiler uses to decide
//!   whether two members are assignable, convertible, or nested mappings
//! - **Lazy nesting**: [`ObjectType`] carries a function that lists members,
//!   so nested and self-referencing types are described only when reached

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{MappingError, Result};
use crate::naming;

/// Identity of a Rust type plus its name for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `shared::UserDto`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, e.g. `UserDto`
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A mappable object type: its key and the function listing its members.
#[derive(Clone, Copy)]
pub struct ObjectType {
    key: TypeKey,
    members: fn() -> Vec<MemberDescriptor>,
}

impl ObjectType {
    pub fn of<T: Mappable>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            members: T::members,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    fn list_members(&self) -> Vec<MemberDescriptor> {
        (self.members)()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.key)
    }
}

/// The kind of value a member holds, as far as mapping is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Bool,
    /// Fixed-width integer; `isize`/`usize` count as 64 bits
    Integer { bits: u8, signed: bool },
    Float,
    Text,
    /// `chrono::DateTime<Utc>`, carried as RFC 3339 text
    DateTime,
    /// `chrono::NaiveDate`, carried as `YYYY-MM-DD` text
    Date,
    Uuid,
    /// A leaf value (usually an enum) only assignable to the same type
    Opaque(TypeKey),
    Object(ObjectType),
    Sequence(Box<SemanticType>),
    Optional(Box<SemanticType>),
}

impl SemanticType {
    pub fn of<T: Semantic>() -> Self {
        T::semantic_type()
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, SemanticType::Optional(_))
    }

    /// Whether every value of this integer type fits in `other` without loss
    pub fn widens_to(&self, other: &SemanticType) -> bool {
        match (self, other) {
            (
                SemanticType::Integer { bits, signed },
                SemanticType::Integer {
                    bits: to_bits,
                    signed: to_signed,
                },
            ) => match (*signed, *to_signed) {
                (false, true) => to_bits > bits,
                (true, false) => false,
                _ => to_bits >= bits,
            },
            _ => false,
        }
    }

    /// The type with any `Optional` wrappers removed
    pub fn strip_optional(&self) -> &SemanticType {
        match self {
            SemanticType::Optional(inner) => inner.strip_optional(),
            other => other,
        }
    }

    /// The object type behind this member, looking through `Optional`
    pub fn as_object(&self) -> Option<&ObjectType> {
        match self.strip_optional() {
            SemanticType::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Bool => f.write_str("bool"),
            SemanticType::Integer { bits, signed } => {
                write!(f, "{}{}", if *signed { 'i' } else { 'u' }, bits)
            }
            SemanticType::Float => f.write_str("float"),
            SemanticType::Text => f.write_str("text"),
            SemanticType::DateTime => f.write_str("datetime"),
            SemanticType::Date => f.write_str("date"),
            SemanticType::Uuid => f.write_str("uuid"),
            SemanticType::Opaque(key) => write!(f, "{}", key),
            SemanticType::Object(object) => write!(f, "{}", object.key()),
            SemanticType::Sequence(inner) => write!(f, "[{}]", inner),
            SemanticType::Optional(inner) => write!(f, "{}?", inner),
        }
    }
}

/// One member of a mappable type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    name: &'static str,
    semantic_type: SemanticType,
    readable: bool,
    writable: bool,
}

impl MemberDescriptor {
    pub fn new(name: &'static str, semantic_type: SemanticType) -> Self {
        Self {
            name,
            semantic_type,
            readable: true,
            writable: true,
        }
    }

    /// Member can be read as a mapping source but never filled
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Member can be filled but is never used as a mapping source
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn semantic_type(&self) -> &SemanticType {
        &self.semantic_type
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_accessible(&self) -> bool {
        self.readable || self.writable
    }
}

/// Immutable member listing for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    key: TypeKey,
    members: Vec<MemberDescriptor>,
}

impl TypeDescriptor {
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Member with exactly this name
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Member whose name matches ignoring case and separators
    pub fn find(&self, name: &str) -> Option<&MemberDescriptor> {
        self.member(name)
            .or_else(|| self.members.iter().find(|m| naming::names_match(m.name, name)))
    }

    /// Like [`find`](Self::find) but only considers readable members
    pub fn find_readable(&self, name: &str) -> Option<&MemberDescriptor> {
        self.find(name).filter(|m| m.readable).or_else(|| {
            self.members
                .iter()
                .find(|m| m.readable && naming::names_match(m.name, name))
        })
    }
}

/// Types with a [`SemanticType`]; implemented for primitives, standard
/// containers, chrono/uuid values and every `mappable!` type.
pub trait Semantic {
    fn semantic_type() -> SemanticType;
}

/// Object types the engine can map from and to.
///
/// Values cross the engine boundary through serde, so member names must be
/// the serialized field names.
pub trait Mappable: Semantic + Serialize + DeserializeOwned + 'static {
    fn members() -> Vec<MemberDescriptor>;

    fn object_type() -> ObjectType {
        ObjectType::of::<Self>()
    }
}

macro_rules! impl_semantic {
    ($variant:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Semantic for $ty {
                fn semantic_type() -> SemanticType {
                    SemanticType::$variant
                }
            }
        )+
    };
}

macro_rules! impl_integer {
    ($($ty:ty => $bits:expr, $signed:expr);+ $(;)?) => {
        $(
            impl Semantic for $ty {
                fn semantic_type() -> SemanticType {
                    SemanticType::Integer {
                        bits: $bits,
                        signed: $signed,
                    }
                }
            }
        )+
    };
}

impl_semantic!(Bool => bool);
impl_integer!(
    i8 => 8, true;
    i16 => 16, true;
    i32 => 32, true;
    i64 => 64, true;
    isize => 64, true;
    u8 => 8, false;
    u16 => 16, false;
    u32 => 32, false;
    u64 => 64, false;
    usize => 64, false;
);
impl_semantic!(Float => f32, f64);
impl_semantic!(Text => String, char);
impl_semantic!(DateTime => chrono::DateTime<chrono::Utc>);
impl_semantic!(Date => chrono::NaiveDate);
impl_semantic!(Uuid => uuid::Uuid);

impl<T: Semantic> Semantic for Option<T> {
    fn semantic_type() -> SemanticType {
        SemanticType::Optional(Box::new(T::semantic_type()))
    }
}

impl<T: Semantic> Semantic for Vec<T> {
    fn semantic_type() -> SemanticType {
        SemanticType::Sequence(Box::new(T::semantic_type()))
    }
}

impl<T: Semantic> Semantic for Box<T> {
    fn semantic_type() -> SemanticType {
        T::semantic_type()
    }
}

/// Implements [`Semantic`] and [`Mappable`] for a struct.
///
/// ```ignore
/// mappable!(User {
///     first_name: String,
///     last_name: String,
///     #[read_only] created_at: DateTime<Utc>,
/// });
/// ```
#[macro_export]
macro_rules! mappable {
    (@member $field:ident : $fty:ty) => {
        $crate::descriptor::MemberDescriptor::new(
            stringify!($field),
            <$fty as $crate::descriptor::Semantic>::semantic_type(),
        )
    };
    (@member #[read_only] $field:ident : $fty:ty) => {
        $crate::mappable!(@member $field : $fty).read_only()
    };
    (@member #[write_only] $field:ident : $fty:ty) => {
        $crate::mappable!(@member $field : $fty).write_only()
    };
    ($ty:ident { $( $(#[$access:ident])? $field:ident : $fty:ty ),* $(,)? }) => {
        impl $crate::descriptor::Semantic for $ty {
            fn semantic_type() -> $crate::descriptor::SemanticType {
                $crate::descriptor::SemanticType::Object(
                    $crate::descriptor::ObjectType::of::<$ty>(),
                )
            }
        }

        impl $crate::descriptor::Mappable for $ty {
            fn members() -> ::std::vec::Vec<$crate::descriptor::MemberDescriptor> {
                ::std::vec![
                    $( $crate::mappable!(@member $(#[$access])? $field : $fty) ),*
                ]
            }
        }
    };
}

/// Marks serde types (typically enums) as opaque leaf values.
#[macro_export]
macro_rules! mappable_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::descriptor::Semantic for $ty {
                fn semantic_type() -> $crate::descriptor::SemanticType {
                    $crate::descriptor::SemanticType::Opaque(
                        $crate::descriptor::TypeKey::of::<$ty>(),
                    )
                }
            }
        )+
    };
}

/// Cache of [`TypeDescriptor`]s keyed by type identity.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    descriptors: RwLock<HashMap<TypeKey, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe<T: Mappable>(&self) -> Result<Arc<TypeDescriptor>> {
        self.describe_object(&T::object_type())
    }

    /// Describe an object type, building its descriptor on first reference
    pub fn describe_object(&self, object: &ObjectType) -> Result<Arc<TypeDescriptor>> {
        let key = object.key();
        if let Some(found) = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(found));
        }

        let members = object.list_members();
        if !members.iter().any(MemberDescriptor::is_accessible) {
            return Err(MappingError::Reflection {
                type_name: key.name(),
            });
        }

        let mut descriptors = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // A concurrent caller may have won the race; the first entry stays.
        let entry = descriptors.entry(key).or_insert_with(|| {
            debug!(type_name = key.name(), members = members.len(), "Described type");
            Arc::new(TypeDescriptor { key, members })
        });
        Ok(Arc::clone(entry))
    }

    /// Number of descriptors built so far
    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
