//! Encoding plans and their execution.
//!
//! A [`Plan`] is the compiled, immutable recipe for rendering one type. Plans
//! for nested types are resolved lazily through [`LazyPlan`], so building a
//! plan never recurses into the types it refers to and self-referential types
//! compile fine.
//!
//! Per-call mutable state (the encoder in use and the cycle detector) lives in
//! [`State`] and is threaded through `marshal`.

use std::{
    any::{Any, TypeId},
    ops::{Deref, DerefMut},
    sync::{Arc, OnceLock},
};

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};

use crate::{
    compile::{self, EmptyCheck},
    cycle::{CycleDetector, Identity},
    encoder::Encoder,
    log_json::LogJson,
    reflect::{
        BoolFn, BytesFn, CharFn, DynamicFn, EnumInfo, ErrorFn, FieldGetter, FloatFn, IntFn,
        JsonMarshalerFn, LogMarshalerFn, MapInfo, PointerInfo, SeqInfo, StrFn, StructInfo,
        TypeInfoFn, UintFn, VariantFn, VisitFn,
    },
    rule,
};

// =============================================================================
// Per-call state
// =============================================================================

pub(crate) struct State<'a> {
    json: &'a LogJson,
    encoder: &'a mut Encoder,
    cycles: CycleDetector,
    threshold: usize,
}

impl<'a> State<'a> {
    pub(crate) fn new(json: &'a LogJson, encoder: &'a mut Encoder) -> Self {
        Self {
            json,
            encoder,
            cycles: CycleDetector::default(),
            threshold: json.config().cycle_detection_depth,
        }
    }
}

/// Keeps a container identity on the cycle path for as long as it lives.
struct OnPath<'s, 'a> {
    state: &'s mut State<'a>,
    identity: Option<Identity>,
}

impl<'s, 'a> OnPath<'s, 'a> {
    /// Tracking only starts once the encoder is deeper than the configured
    /// threshold. Returns `None`, after writing `null`, if `identity` is
    /// already on the path.
    fn enter(state: &'s mut State<'a>, identity: Option<Identity>) -> Option<Self> {
        let identity = identity.filter(|_| state.encoder.depth() > state.threshold);
        if let Some(identity) = identity {
            if !state.cycles.enter(identity) {
                state.encoder.write_null();
                return None;
            }
        }
        Some(Self { state, identity })
    }
}

impl<'a> Deref for OnPath<'_, 'a> {
    type Target = State<'a>;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for OnPath<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl Drop for OnPath<'_, '_> {
    fn drop(&mut self) {
        if let Some(identity) = self.identity.take() {
            self.state.cycles.leave(&identity);
        }
    }
}

// =============================================================================
// Plans
// =============================================================================

/// A nested plan, resolved through the cache on first use.
pub(crate) struct LazyPlan {
    ty: TypeInfoFn,
    plan: OnceLock<Arc<Plan>>,
}

impl LazyPlan {
    pub(crate) fn new(ty: TypeInfoFn) -> Self {
        Self {
            ty,
            plan: OnceLock::new(),
        }
    }

    fn get(&self, json: &LogJson) -> &Plan {
        self.plan.get_or_init(|| json.plan((self.ty)()))
    }
}

pub(crate) enum Plan {
    Null,
    Bool(BoolFn),
    Int(IntFn),
    Uint(UintFn),
    Float(FloatFn),
    Char(CharFn),
    Str(StrFn),
    Bytes(BytesFn),
    Seq(SeqPlan),
    Array(SeqPlan),
    Map(MapPlan),
    Struct(StructPlan),
    Enum(EnumPlan),
    Pointer(PointerPlan),
    Dynamic(DynamicFn),
    Digest(DigestPlan),
    LogMarshaler(LogMarshalerFn),
    JsonMarshaler(JsonMarshalerFn),
    Error(ErrorFn),
}

pub(crate) struct SeqPlan {
    pub(crate) id: TypeId,
    pub(crate) info: SeqInfo,
    pub(crate) element: LazyPlan,
}

pub(crate) struct MapPlan {
    pub(crate) id: TypeId,
    pub(crate) info: MapInfo,
    pub(crate) key: KeyFormat,
    pub(crate) value: LazyPlan,
}

pub(crate) struct StructPlan {
    pub(crate) info: StructInfo,
    pub(crate) fields: OnceLock<Vec<FieldPlan>>,
}

pub(crate) struct EnumPlan {
    pub(crate) info: EnumInfo,
    pub(crate) variants: OnceLock<Vec<VariantPlan>>,
}

pub(crate) struct VariantPlan {
    pub(crate) name: &'static str,
    pub(crate) fields: Option<Vec<FieldPlan>>,
}

pub(crate) struct PointerPlan {
    pub(crate) id: TypeId,
    pub(crate) info: PointerInfo,
    pub(crate) target: LazyPlan,
}

/// Renders text as its digest instead of verbatim.
pub(crate) enum DigestPlan {
    Text(StrFn),
    /// A pointer to text; renders `null` when there is no target.
    Indirect { visit: VisitFn, text: StrFn },
}

/// How map keys of a given kind become member names.
pub(crate) enum KeyFormat {
    Bool(BoolFn),
    Int(IntFn),
    Uint(UintFn),
    Float(FloatFn),
    Char(CharFn),
    Str(StrFn),
    /// Newtype key, named after its field.
    Inline {
        visit: VisitFn,
        target: Box<KeyFormat>,
    },
    /// Unit-only enum key, named after its variant.
    Variant {
        index: VariantFn,
        names: Vec<&'static str>,
    },
}

pub(crate) struct FieldPlan {
    pub(crate) name: &'static str,
    /// Accessors from the outer struct down to the field, one per level of
    /// flattening.
    pub(crate) path: Vec<FieldGetter>,
    pub(crate) plan: Arc<Plan>,
    pub(crate) empty: Option<EmptyCheck>,
}

impl FieldPlan {
    fn access<'v>(&self, value: &'v dyn Any) -> Option<&'v dyn Any> {
        self.path.iter().try_fold(value, |current, get| get(current))
    }
}

// =============================================================================
// Execution
// =============================================================================

fn write_scalar<T>(encoder: &mut Encoder, value: Option<T>, write: fn(&mut Encoder, T)) {
    match value {
        Some(value) => write(encoder, value),
        None => encoder.write_null(),
    }
}

fn write_char(encoder: &mut Encoder, value: char) {
    encoder.write_str(value.encode_utf8(&mut [0; 4]));
}

fn write_bytes(encoder: &mut Encoder, value: &[u8]) {
    encoder.write_str(&STANDARD_NO_PAD.encode(value));
}

fn write_digest(encoder: &mut Encoder, value: &str) {
    encoder.write_str(&rule::digest(value));
}

impl Plan {
    pub(crate) fn marshal(&self, value: &dyn Any, state: &mut State<'_>) {
        match self {
            Self::Null => state.encoder.write_null(),
            Self::Bool(get) => write_scalar(state.encoder, get(value), Encoder::write_bool),
            Self::Int(get) => write_scalar(state.encoder, get(value), Encoder::write_int),
            Self::Uint(get) => write_scalar(state.encoder, get(value), Encoder::write_uint),
            Self::Float(get) => write_scalar(state.encoder, get(value), Encoder::write_float),
            Self::Char(get) => write_scalar(state.encoder, get(value), write_char),
            Self::Str(get) => write_scalar(state.encoder, get(value), Encoder::write_str),
            Self::Bytes(get) => write_scalar(state.encoder, get(value), write_bytes),
            Self::Seq(plan) => plan.marshal(value, state, true),
            Self::Array(plan) => plan.marshal(value, state, false),
            Self::Map(plan) => plan.marshal(value, state),
            Self::Struct(plan) => plan.marshal(value, state),
            Self::Enum(plan) => plan.marshal(value, state),
            Self::Pointer(plan) => plan.marshal(value, state),
            Self::Dynamic(inner) => match inner(value) {
                Some(inner) => {
                    let plan = state.json.plan(inner.log_type_info());
                    plan.marshal(inner.as_any(), state);
                }
                None => state.encoder.write_null(),
            },
            Self::Digest(plan) => plan.marshal(value, state),
            Self::LogMarshaler(get) => match get(value) {
                Some(marshaler) => {
                    let mark = state.encoder.mark();
                    marshaler.marshal_log_json(state.encoder);
                    state.encoder.close_value(mark);
                }
                None => state.encoder.write_null(),
            },
            Self::JsonMarshaler(get) => match get(value) {
                Some(Ok(json)) => state.encoder.write_raw(&json),
                Some(Err(_)) | None => state.encoder.write_null(),
            },
            Self::Error(get) => match get(value) {
                Some(error) => state.encoder.write_str(&error.to_string()),
                None => state.encoder.write_null(),
            },
        }
    }
}

impl SeqPlan {
    fn marshal(&self, value: &dyn Any, state: &mut State<'_>, tracked: bool) {
        let info = &self.info;
        let identity =
            tracked.then(|| Identity::new(self.id, (info.address)(value), (info.len)(value)));
        let Some(mut state) = OnPath::enter(state, identity) else {
            return;
        };
        let element = self.element.get(state.json);
        state.encoder.begin_array();
        (info.for_each)(value, &mut |item: &dyn Any| element.marshal(item, &mut state));
        state.encoder.end_array();
    }
}

impl MapPlan {
    fn marshal(&self, value: &dyn Any, state: &mut State<'_>) {
        let info = &self.info;
        let identity = Identity::new(self.id, (info.address)(value), 0);
        let Some(mut state) = OnPath::enter(state, Some(identity)) else {
            return;
        };
        let item_plan = self.value.get(state.json);
        state.encoder.begin_object();
        (info.for_each)(value, &mut |key: &dyn Any, item: &dyn Any| {
            self.key.write(key, state.encoder);
            item_plan.marshal(item, &mut state);
        });
        state.encoder.end_object();
    }
}

impl KeyFormat {
    fn write(&self, key: &dyn Any, encoder: &mut Encoder) {
        match self {
            Self::Bool(get) => write_scalar(encoder, get(key), Encoder::write_bool),
            Self::Int(get) => write_scalar(encoder, get(key), Encoder::write_int),
            Self::Uint(get) => write_scalar(encoder, get(key), Encoder::write_uint),
            Self::Float(get) => write_scalar(encoder, get(key), write_float_key),
            Self::Char(get) => write_scalar(encoder, get(key), write_char),
            Self::Str(get) => write_scalar(encoder, get(key), Encoder::write_str),
            Self::Inline { visit, target } => {
                if !visit(key, &mut |inner: &dyn Any| target.write(inner, encoder)) {
                    encoder.write_null();
                }
            }
            Self::Variant { index, names } => {
                match index(key).and_then(|position| names.get(position)) {
                    Some(name) => encoder.write_str(name),
                    None => encoder.write_null(),
                }
            }
        }
    }
}

/// Shortest decimal form without exponent.
fn write_float_key(encoder: &mut Encoder, value: f64) {
    if value.is_nan() {
        encoder.write_str("NaN");
    } else if value.is_infinite() {
        encoder.write_str(if value > 0.0 { "+Inf" } else { "-Inf" });
    } else {
        encoder.write_str(&value.to_string());
    }
}

fn write_fields(fields: &[FieldPlan], value: &dyn Any, state: &mut State<'_>) {
    for field in fields {
        let Some(field_value) = field.access(value) else {
            continue;
        };
        if field
            .empty
            .as_ref()
            .is_some_and(|check| check.is_empty(field_value))
        {
            continue;
        }
        state.encoder.write_str(field.name);
        field.plan.marshal(field_value, state);
    }
}

impl StructPlan {
    fn marshal(&self, value: &dyn Any, state: &mut State<'_>) {
        let json = state.json;
        let fields = self
            .fields
            .get_or_init(|| compile::build_fields(json, (self.info.fields)(), self.info.field_rules));
        state.encoder.begin_object();
        write_fields(fields, value, state);
        state.encoder.end_object();
    }
}

impl EnumPlan {
    fn marshal(&self, value: &dyn Any, state: &mut State<'_>) {
        let json = state.json;
        let variants = self
            .variants
            .get_or_init(|| compile::build_variants(json, &self.info));
        let Some(variant) = (self.info.variant)(value).and_then(|index| variants.get(index))
        else {
            state.encoder.write_null();
            return;
        };
        match &variant.fields {
            None => state.encoder.write_str(variant.name),
            Some(fields) => {
                state.encoder.begin_object();
                state.encoder.write_str(variant.name);
                state.encoder.begin_object();
                write_fields(fields, value, state);
                state.encoder.end_object();
                state.encoder.end_object();
            }
        }
    }
}

impl PointerPlan {
    fn marshal(&self, value: &dyn Any, state: &mut State<'_>) {
        let info = &self.info;
        if (info.is_null)(value) {
            state.encoder.write_null();
            return;
        }
        let identity = info
            .address
            .map(|address| Identity::new(self.id, address(value), 0));
        let Some(mut state) = OnPath::enter(state, identity) else {
            return;
        };
        let target = self.target.get(state.json);
        if !(info.visit)(value, &mut |inner: &dyn Any| target.marshal(inner, &mut state)) {
            state.encoder.write_null();
        }
    }
}

impl DigestPlan {
    fn marshal(&self, value: &dyn Any, state: &mut State<'_>) {
        match *self {
            Self::Text(text) => write_scalar(state.encoder, text(value), write_digest),
            Self::Indirect { visit, text } => {
                let encoder = &mut *state.encoder;
                let visited = visit(value, &mut |inner: &dyn Any| {
                    write_scalar(encoder, text(inner), write_digest);
                });
                if !visited {
                    encoder.write_null();
                }
            }
        }
    }
}
