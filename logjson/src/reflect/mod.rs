//! Runtime type descriptions consumed by the plan compiler.
//!
//! Every loggable type describes itself through a [`TypeInfo`]: its identity,
//! its [`Kind`] (with monomorphic accessors that read a `&dyn Any` of that
//! type) and its [`Capabilities`]. The plan compiler never sees concrete
//! types, only these descriptions.
//!
//! - `#[derive(Loggable)]` produces descriptions for structs and enums.
//! - `impls` covers std scalars, strings, collections, smart pointers, cells,
//!   trait objects and common error types.
//! - [`crate::impl_loggable!`] registers foreign types through a capability.
//!
//! Accessors are plain `fn` pointers so a `TypeInfo` is `Copy` and costs
//! nothing to build. They return `None` when handed a value of another type;
//! the compiler renders that as `null`.

use std::{
    any::{Any, TypeId, type_name},
    fmt,
};

mod capability;
mod impls;

pub use capability::{
    Capabilities, ErrorFn, JsonMarshalerFn, LogMarshaler, LogMarshalerFn, error_of,
    json_marshaler_of, log_marshaler_of,
};

use crate::rule::LogRule;

// =============================================================================
// Traits
// =============================================================================

/// A type the encoder knows how to describe.
///
/// Implement it with `#[derive(Loggable)]`, or with [`crate::impl_loggable!`]
/// for types that render through a capability.
pub trait Loggable: Any {
    /// Describes the type. Called whenever a plan for the type is needed, so it
    /// must be cheap and must not recurse into field types eagerly.
    fn type_info() -> TypeInfo;
}

/// Object-safe view of a [`Loggable`] value.
///
/// This is the "dynamic" half of the reflection layer: `Box<dyn LogValue>`
/// holds a value whose concrete type is only known at runtime, and the entry
/// points accept `&dyn LogValue` as well as concrete references.
pub trait LogValue: Any {
    /// Description of the concrete type behind `self`.
    fn log_type_info(&self) -> TypeInfo;

    /// `self` as `&dyn Any`, for the accessors in the description.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Loggable> LogValue for T {
    fn log_type_info(&self) -> TypeInfo {
        T::type_info()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-level rule source for struct and enum fields.
///
/// Opt in with `#[log(field_rules)]` on the container; the derive then consults
/// `field_rule` for every field that has no directive of its own. The argument
/// is the field's output name.
pub trait FieldRules {
    fn field_rule(field: &str) -> Option<LogRule>;
}

/// Upcasts a reference to `&dyn Any`. Generated field accessors use it.
pub fn erase<T: Any>(value: &T) -> &dyn Any {
    value
}

// =============================================================================
// Accessor signatures
// =============================================================================

pub type TypeInfoFn = fn() -> TypeInfo;
pub type BoolFn = fn(&dyn Any) -> Option<bool>;
pub type IntFn = fn(&dyn Any) -> Option<i64>;
pub type UintFn = fn(&dyn Any) -> Option<u64>;
pub type FloatFn = fn(&dyn Any) -> Option<f64>;
pub type CharFn = fn(&dyn Any) -> Option<char>;
pub type StrFn = fn(&dyn Any) -> Option<&str>;
pub type BytesFn = fn(&dyn Any) -> Option<&[u8]>;
pub type LenFn = fn(&dyn Any) -> usize;
pub type AddressFn = fn(&dyn Any) -> usize;
pub type ForEachFn = fn(&dyn Any, &mut dyn FnMut(&dyn Any));
pub type ForEachEntryFn = fn(&dyn Any, &mut dyn FnMut(&dyn Any, &dyn Any));
pub type VisitFn = fn(&dyn Any, &mut dyn FnMut(&dyn Any)) -> bool;
pub type NullCheckFn = fn(&dyn Any) -> bool;
pub type FieldGetter = fn(&dyn Any) -> Option<&dyn Any>;
pub type FieldRuleFn = fn(&str) -> Option<LogRule>;
pub type VariantFn = fn(&dyn Any) -> Option<usize>;
pub type DynamicFn = fn(&dyn Any) -> Option<&dyn LogValue>;

// =============================================================================
// TypeInfo
// =============================================================================

/// Description of one concrete type.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    kind: Kind,
    capabilities: Capabilities,
}

impl TypeInfo {
    /// Describes `T` as `kind`, with no capabilities.
    pub fn of<T: Any>(kind: Kind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
            capabilities: Capabilities::default(),
        }
    }

    /// The value renders itself through [`LogMarshaler`].
    #[must_use]
    pub fn with_log_marshaler(mut self, marshaler: LogMarshalerFn) -> Self {
        self.capabilities.log_marshaler = Some(marshaler);
        self
    }

    /// The value renders through its `serde::Serialize` impl.
    #[must_use]
    pub fn with_json_marshaler(mut self, marshaler: JsonMarshalerFn) -> Self {
        self.capabilities.json_marshaler = Some(marshaler);
        self
    }

    /// The value is an error and renders as its display text.
    #[must_use]
    pub fn with_error(mut self, error: ErrorFn) -> Self {
        self.capabilities.error = Some(error);
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind.name())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

// =============================================================================
// Kind
// =============================================================================

/// Structural category of a type, with the accessors the encoder needs.
#[derive(Clone, Copy)]
pub enum Kind {
    Bool(BoolFn),
    /// Signed integers up to 64 bits.
    Int(IntFn),
    /// Unsigned integers up to 64 bits.
    Uint(UintFn),
    Float(FloatFn),
    Char(CharFn),
    Str(StrFn),
    /// Dynamically sized sequence.
    Seq(SeqInfo),
    /// Fixed-length array.
    Array(SeqInfo),
    Map(MapInfo),
    Struct(StructInfo),
    Enum(EnumInfo),
    /// Smart pointer, reference, `Option` or interior-mutability cell.
    Pointer(PointerInfo),
    /// Trait object whose concrete type is only known at runtime.
    Dynamic(DynamicFn),
    /// Renders as `null` unless a capability says otherwise.
    Unsupported,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "str",
            Self::Seq(_) => "seq",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Struct(_) => "struct",
            Self::Enum(_) => "enum",
            Self::Pointer(_) => "pointer",
            Self::Dynamic(_) => "dynamic",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Sequences and arrays.
#[derive(Clone, Copy)]
pub struct SeqInfo {
    pub(crate) element: TypeInfoFn,
    pub(crate) len: LenFn,
    pub(crate) for_each: ForEachFn,
    pub(crate) address: AddressFn,
    pub(crate) bytes: Option<BytesFn>,
}

impl SeqInfo {
    pub fn new(element: TypeInfoFn, len: LenFn, for_each: ForEachFn, address: AddressFn) -> Self {
        Self {
            element,
            len,
            for_each,
            address,
            bytes: None,
        }
    }

    /// Contiguous byte view, used to render `u8` sequences as base64.
    #[must_use]
    pub fn with_bytes(mut self, bytes: BytesFn) -> Self {
        self.bytes = Some(bytes);
        self
    }
}

/// Key/value maps.
#[derive(Clone, Copy)]
pub struct MapInfo {
    pub(crate) key: TypeInfoFn,
    pub(crate) value: TypeInfoFn,
    pub(crate) len: LenFn,
    pub(crate) for_each: ForEachEntryFn,
    pub(crate) address: AddressFn,
}

impl MapInfo {
    pub fn new(
        key: TypeInfoFn,
        value: TypeInfoFn,
        len: LenFn,
        for_each: ForEachEntryFn,
        address: AddressFn,
    ) -> Self {
        Self {
            key,
            value,
            len,
            for_each,
            address,
        }
    }
}

/// Structs: fields in declaration order, built on demand.
#[derive(Clone, Copy)]
pub struct StructInfo {
    pub(crate) fields: fn() -> Vec<FieldInfo>,
    pub(crate) field_rules: Option<FieldRuleFn>,
}

impl StructInfo {
    pub fn new(fields: fn() -> Vec<FieldInfo>) -> Self {
        Self {
            fields,
            field_rules: None,
        }
    }

    #[must_use]
    pub fn with_field_rules(mut self, rules: FieldRuleFn) -> Self {
        self.field_rules = Some(rules);
        self
    }
}

/// One declared field and its `#[log(...)]` directives.
#[derive(Clone, Copy)]
pub struct FieldInfo {
    pub(crate) name: &'static str,
    pub(crate) rename: Option<&'static str>,
    pub(crate) rule: Option<LogRule>,
    pub(crate) omit_empty: bool,
    pub(crate) flatten: bool,
    pub(crate) ty: TypeInfoFn,
    pub(crate) get: FieldGetter,
}

impl FieldInfo {
    pub fn new(name: &'static str, ty: TypeInfoFn, get: FieldGetter) -> Self {
        Self {
            name,
            rename: None,
            rule: None,
            omit_empty: false,
            flatten: false,
            ty,
            get,
        }
    }

    /// A field that is never rendered. It still takes part in name shadowing,
    /// but its type needs no description.
    pub fn omitted(name: &'static str) -> Self {
        Self::new(name, <() as Loggable>::type_info, |_| None).rule(LogRule::Omit)
    }

    #[must_use]
    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: LogRule) -> Self {
        self.rule = Some(rule);
        self
    }

    #[must_use]
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    #[must_use]
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// The key the field is written under.
    pub fn output_name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }
}

/// Enums: the active variant index plus per-variant field lists.
#[derive(Clone, Copy)]
pub struct EnumInfo {
    pub(crate) variant: VariantFn,
    pub(crate) variants: fn() -> Vec<VariantInfo>,
    pub(crate) field_rules: Option<FieldRuleFn>,
}

impl EnumInfo {
    pub fn new(variant: VariantFn, variants: fn() -> Vec<VariantInfo>) -> Self {
        Self {
            variant,
            variants,
            field_rules: None,
        }
    }

    #[must_use]
    pub fn with_field_rules(mut self, rules: FieldRuleFn) -> Self {
        self.field_rules = Some(rules);
        self
    }
}

#[derive(Clone)]
pub struct VariantInfo {
    pub(crate) name: &'static str,
    /// `None` for unit variants.
    pub(crate) fields: Option<Vec<FieldInfo>>,
}

impl VariantInfo {
    pub fn unit(name: &'static str) -> Self {
        Self { name, fields: None }
    }

    pub fn new(name: &'static str, fields: Vec<FieldInfo>) -> Self {
        Self {
            name,
            fields: Some(fields),
        }
    }
}

/// Anything that leads to at most one value of the target type.
#[derive(Clone, Copy)]
pub struct PointerInfo {
    pub(crate) target: TypeInfoFn,
    pub(crate) visit: VisitFn,
    pub(crate) is_null: NullCheckFn,
    pub(crate) address: Option<AddressFn>,
    pub(crate) inline: bool,
}

impl PointerInfo {
    /// `visit` hands the target to the callback and returns `true`, or returns
    /// `false` when there is nothing to hand over (absent, or currently locked).
    pub fn new(target: TypeInfoFn, visit: VisitFn) -> Self {
        Self {
            target,
            visit,
            is_null: |_| false,
            address: None,
            inline: false,
        }
    }

    #[must_use]
    pub fn with_null_check(mut self, is_null: NullCheckFn) -> Self {
        self.is_null = is_null;
        self
    }

    /// Stable address of the pointee, used for cycle detection.
    #[must_use]
    pub fn with_address(mut self, address: AddressFn) -> Self {
        self.address = Some(address);
        self
    }

    /// The target is stored inline (newtype structs); emptiness follows the
    /// target's.
    #[must_use]
    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}
