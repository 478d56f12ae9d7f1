//! Plan construction.
//!
//! [`compile`] turns a [`TypeInfo`] into a [`Plan`] without touching any other
//! type: nested plans are left as [`LazyPlan`]s. Field lists for structs and
//! enum variants are built on first use by [`build_fields`], which is where
//! flattening, redaction rules and `omitempty` are resolved.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use crate::{
    log_json::LogJson,
    plan::{
        DigestPlan, EnumPlan, FieldPlan, KeyFormat, LazyPlan, MapPlan, Plan, PointerPlan, SeqPlan,
        StructPlan, VariantPlan,
    },
    reflect::{
        BoolFn, CharFn, EnumInfo, FieldGetter, FieldInfo, FieldRuleFn, FloatFn, IntFn, Kind,
        LenFn, NullCheckFn, StrFn, TypeInfo, UintFn, VisitFn,
    },
    rule::{self, LogRule},
};

// =============================================================================
// Type dispatch
// =============================================================================

/// Capabilities win over the structural kind, in the order log marshaler,
/// JSON marshaler, error.
pub(crate) fn compile(info: TypeInfo) -> Plan {
    let capabilities = info.capabilities();
    if let Some(marshaler) = capabilities.log_marshaler {
        return Plan::LogMarshaler(marshaler);
    }
    if let Some(marshaler) = capabilities.json_marshaler {
        return Plan::JsonMarshaler(marshaler);
    }
    if let Some(error) = capabilities.error {
        return Plan::Error(error);
    }

    match *info.kind() {
        Kind::Bool(get) => Plan::Bool(get),
        Kind::Int(get) => Plan::Int(get),
        Kind::Uint(get) => Plan::Uint(get),
        Kind::Float(get) => Plan::Float(get),
        Kind::Char(get) => Plan::Char(get),
        Kind::Str(get) => Plan::Str(get),
        Kind::Seq(seq) => match seq.bytes {
            Some(bytes) if (seq.element)().id() == TypeId::of::<u8>() => Plan::Bytes(bytes),
            _ => Plan::Seq(SeqPlan {
                id: info.id(),
                info: seq,
                element: LazyPlan::new(seq.element),
            }),
        },
        Kind::Array(array) => Plan::Array(SeqPlan {
            id: info.id(),
            info: array,
            element: LazyPlan::new(array.element),
        }),
        Kind::Map(map) => match KeyFormat::for_key(&(map.key)()) {
            Some(key) => Plan::Map(MapPlan {
                id: info.id(),
                info: map,
                key,
                value: LazyPlan::new(map.value),
            }),
            None => Plan::Null,
        },
        Kind::Struct(structure) => Plan::Struct(StructPlan {
            info: structure,
            fields: OnceLock::new(),
        }),
        Kind::Enum(enumeration) => Plan::Enum(EnumPlan {
            info: enumeration,
            variants: OnceLock::new(),
        }),
        Kind::Pointer(pointer) => Plan::Pointer(PointerPlan {
            id: info.id(),
            info: pointer,
            target: LazyPlan::new(pointer.target),
        }),
        Kind::Dynamic(inner) => Plan::Dynamic(inner),
        Kind::Unsupported => Plan::Null,
    }
}

impl KeyFormat {
    /// `None` for key kinds that have no string form. Newtypes key by their
    /// field and unit-only enums by variant name.
    fn for_key(key: &TypeInfo) -> Option<Self> {
        match *key.kind() {
            Kind::Bool(get) => Some(Self::Bool(get)),
            Kind::Int(get) => Some(Self::Int(get)),
            Kind::Uint(get) => Some(Self::Uint(get)),
            Kind::Float(get) => Some(Self::Float(get)),
            Kind::Char(get) => Some(Self::Char(get)),
            Kind::Str(get) => Some(Self::Str(get)),
            Kind::Pointer(pointer) if pointer.inline => {
                Self::for_key(&(pointer.target)()).map(|target| Self::Inline {
                    visit: pointer.visit,
                    target: Box::new(target),
                })
            }
            Kind::Enum(info) => {
                let variants = (info.variants)();
                variants
                    .iter()
                    .all(|variant| variant.fields.is_none())
                    .then(|| Self::Variant {
                        index: info.variant,
                        names: variants.iter().map(|variant| variant.name).collect(),
                    })
            }
            _ => None,
        }
    }
}

// =============================================================================
// Fields
// =============================================================================

/// A field that may end up in the output, before visibility is settled.
struct Candidate {
    name: &'static str,
    depth: usize,
    path: Vec<FieldGetter>,
    field: FieldInfo,
    type_rules: Option<FieldRuleFn>,
}

fn collect(
    fields: &[FieldInfo],
    type_rules: Option<FieldRuleFn>,
    prefix: &[FieldGetter],
    depth: usize,
    out: &mut Vec<Candidate>,
) {
    for field in fields {
        let mut path = prefix.to_vec();
        path.push(field.get);
        if field.flatten {
            if let Kind::Struct(nested) = *(field.ty)().kind() {
                collect(&(nested.fields)(), nested.field_rules, &path, depth + 1, out);
                continue;
            }
        }
        out.push(Candidate {
            name: field.output_name(),
            depth,
            path,
            field: *field,
            type_rules,
        });
    }
}

/// Keeps, per output name, the single shallowest candidate. Names with more
/// than one candidate at the shallowest depth are dropped entirely.
fn visible(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut shallowest: HashMap<&'static str, (usize, usize)> = HashMap::new();
    for candidate in &candidates {
        shallowest
            .entry(candidate.name)
            .and_modify(|(depth, count)| {
                if candidate.depth < *depth {
                    *depth = candidate.depth;
                    *count = 1;
                } else if candidate.depth == *depth {
                    *count += 1;
                }
            })
            .or_insert((candidate.depth, 1));
    }
    candidates
        .into_iter()
        .filter(|candidate| shallowest.get(candidate.name) == Some(&(candidate.depth, 1)))
        .collect()
}

fn field_plan(json: &LogJson, candidate: Candidate) -> Option<FieldPlan> {
    let Candidate {
        name,
        path,
        field,
        type_rules,
        ..
    } = candidate;
    let info = (field.ty)();
    let plan = match rule::resolve(field.rule, type_rules, name, |name| json.log_rule(name)) {
        Some(LogRule::Omit) => return None,
        Some(LogRule::Digest) => match DigestPlan::for_type(&info) {
            Some(digest) => Arc::new(Plan::Digest(digest)),
            None => json.plan(info),
        },
        None => json.plan(info),
    };
    Some(FieldPlan {
        name,
        path,
        plan,
        empty: field.omit_empty.then(|| EmptyCheck::for_type(&info)),
    })
}

/// Field plans in declaration order, flattened fields promoted in place.
pub(crate) fn build_fields(
    json: &LogJson,
    fields: Vec<FieldInfo>,
    type_rules: Option<FieldRuleFn>,
) -> Vec<FieldPlan> {
    let mut candidates = Vec::with_capacity(fields.len());
    collect(&fields, type_rules, &[], 0, &mut candidates);
    visible(candidates)
        .into_iter()
        .filter_map(|candidate| field_plan(json, candidate))
        .collect()
}

pub(crate) fn build_variants(json: &LogJson, info: &EnumInfo) -> Vec<VariantPlan> {
    (info.variants)()
        .into_iter()
        .map(|variant| VariantPlan {
            name: variant.name,
            fields: variant
                .fields
                .map(|fields| build_fields(json, fields, info.field_rules)),
        })
        .collect()
}

impl DigestPlan {
    /// Digesting applies to text and to pointers whose target is text.
    fn for_type(info: &TypeInfo) -> Option<Self> {
        match *info.kind() {
            Kind::Str(text) => Some(Self::Text(text)),
            Kind::Pointer(pointer) => match *(pointer.target)().kind() {
                Kind::Str(text) => Some(Self::Indirect {
                    visit: pointer.visit,
                    text,
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

// =============================================================================
// Emptiness
// =============================================================================

/// Decides whether an `omitempty` field is skipped.
pub(crate) enum EmptyCheck {
    Bool(BoolFn),
    Int(IntFn),
    Uint(UintFn),
    Float(FloatFn),
    Char(CharFn),
    Str(StrFn),
    Len(LenFn),
    Null(NullCheckFn),
    Inline { visit: VisitFn, target: Box<EmptyCheck> },
    Never,
}

impl EmptyCheck {
    fn for_type(info: &TypeInfo) -> Self {
        match *info.kind() {
            Kind::Bool(get) => Self::Bool(get),
            Kind::Int(get) => Self::Int(get),
            Kind::Uint(get) => Self::Uint(get),
            Kind::Float(get) => Self::Float(get),
            Kind::Char(get) => Self::Char(get),
            Kind::Str(get) => Self::Str(get),
            Kind::Seq(seq) | Kind::Array(seq) => Self::Len(seq.len),
            Kind::Map(map) => Self::Len(map.len),
            Kind::Pointer(pointer) if pointer.inline => Self::Inline {
                visit: pointer.visit,
                target: Box::new(Self::for_type(&(pointer.target)())),
            },
            Kind::Pointer(pointer) => Self::Null(pointer.is_null),
            Kind::Struct(_) | Kind::Enum(_) | Kind::Dynamic(_) | Kind::Unsupported => Self::Never,
        }
    }

    pub(crate) fn is_empty(&self, value: &dyn Any) -> bool {
        match self {
            Self::Bool(get) => get(value) == Some(false),
            Self::Int(get) => get(value) == Some(0),
            Self::Uint(get) => get(value) == Some(0),
            Self::Float(get) => get(value).is_some_and(|number| number == 0.0),
            Self::Char(get) => get(value) == Some('\0'),
            Self::Str(get) => get(value).is_some_and(str::is_empty),
            Self::Len(len) => len(value) == 0,
            Self::Null(is_null) => is_null(value),
            Self::Inline { visit, target } => {
                let mut empty = false;
                visit(value, &mut |inner: &dyn Any| empty = target.is_empty(inner));
                empty
            }
            Self::Never => false,
        }
    }
}
