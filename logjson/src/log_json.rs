//! The encoder instance: plan cache, runtime rules and encoder pool.

use std::{
    any::TypeId,
    collections::HashMap,
    fmt, io,
    sync::{Arc, LazyLock},
};

use dashmap::{DashMap, mapref::entry::Entry};
use parking_lot::{Mutex, RwLock};

use crate::{
    Config, Result,
    compile,
    encoder::Encoder,
    plan::{Plan, State},
    reflect::{LogValue, TypeInfo},
    rule::LogRule,
};

static GLOBAL: LazyLock<LogJson> = LazyLock::new(LogJson::new);

/// Renders values as single-line JSON for log records.
///
/// Plans are compiled once per type and cached for the lifetime of the
/// instance. Most programs use the shared [`LogJson::global`] instance through
/// [`crate::marshal`]; separate instances are useful when runtime rules or
/// configuration must differ.
///
/// ```
/// use logjson::{LogJson, LogRule, Loggable};
///
/// #[derive(Loggable)]
/// struct Login {
///     user: String,
///     password: String,
/// }
///
/// let json = LogJson::new();
/// json.add_log_rule("password", LogRule::Omit);
///
/// let login = Login { user: "ada".into(), password: "hunter2".into() };
/// assert_eq!(json.marshal(&login), br#"{"user":"ada"}"#);
/// ```
pub struct LogJson {
    config: Config,
    plans: DashMap<TypeId, Arc<Plan>>,
    rules: RwLock<HashMap<String, LogRule>>,
    pool: EncoderPool,
}

impl LogJson {
    pub fn new() -> Self {
        Self::from_valid_config(Config::default())
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: Config) -> Self {
        Self {
            pool: EncoderPool::new(config.pool_capacity, config.max_pooled_buffer),
            config,
            plans: DashMap::new(),
            rules: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide instance used by [`crate::marshal`].
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a rule for every field with this output name.
    ///
    /// Rules are read when a struct's field list is first built, so register
    /// them before the first value of the affected types is marshaled.
    pub fn add_log_rule(&self, field: impl Into<String>, rule: LogRule) {
        self.rules.write().insert(field.into(), rule);
    }

    pub(crate) fn log_rule(&self, field: &str) -> Option<LogRule> {
        self.rules.read().get(field).copied()
    }

    /// Number of compiled plans in the cache.
    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    /// Cached plan for the type, compiling and publishing it on a miss.
    ///
    /// Compilation happens outside the cache lock. When two callers race on
    /// the same type, the first published plan wins and the other is dropped.
    pub(crate) fn plan(&self, info: TypeInfo) -> Arc<Plan> {
        if let Some(plan) = self.plans.get(&info.id()) {
            return Arc::clone(plan.value());
        }
        let compiled = Arc::new(compile::compile(info));
        match self.plans.entry(info.id()) {
            Entry::Occupied(existing) => Arc::clone(existing.get()),
            Entry::Vacant(slot) => Arc::clone(slot.insert(compiled).value()),
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Renders `value` as compact JSON, without a trailing newline.
    pub fn marshal<T: LogValue + ?Sized>(&self, value: &T) -> Vec<u8> {
        let mut encoder = self.pool.take();
        self.marshal_with_encoder(value, &mut encoder);
        let written = encoder.as_bytes();
        let rendered = written.strip_suffix(b"\n").unwrap_or(written).to_vec();
        self.pool.give_back(encoder);
        rendered
    }

    /// Like [`marshal`](Self::marshal) for an optional trait object; `None`
    /// renders as `null`.
    pub fn marshal_dyn(&self, value: Option<&dyn LogValue>) -> Vec<u8> {
        match value {
            Some(value) => self.marshal(value),
            None => b"null".to_vec(),
        }
    }

    /// Renders `value` into an existing encoder, e.g. as a member value of a
    /// larger document. A complete top-level value is followed by a newline.
    pub fn marshal_with_encoder<T: LogValue + ?Sized>(&self, value: &T, encoder: &mut Encoder) {
        let plan = self.plan(value.log_type_info());
        let mut state = State::new(self, encoder);
        plan.marshal(value.as_any(), &mut state);
    }

    /// Writes the rendered value followed by a newline.
    pub fn write_to<T, W>(&self, value: &T, mut writer: W) -> Result<()>
    where
        T: LogValue + ?Sized,
        W: io::Write,
    {
        let mut encoder = self.pool.take();
        self.marshal_with_encoder(value, &mut encoder);
        let written = writer.write_all(encoder.as_bytes());
        self.pool.give_back(encoder);
        Ok(written?)
    }
}

impl Default for LogJson {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogJson")
            .field("config", &self.config)
            .field("cached_plans", &self.plans.len())
            .field("rules", &*self.rules.read())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Encoder pool
// =============================================================================

struct EncoderPool {
    idle: Mutex<Vec<Encoder>>,
    capacity: usize,
    max_buffer: usize,
}

impl EncoderPool {
    fn new(capacity: usize, max_buffer: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            max_buffer,
        }
    }

    fn take(&self) -> Encoder {
        self.idle.lock().pop().unwrap_or_default()
    }

    fn give_back(&self, mut encoder: Encoder) {
        if encoder.capacity() > self.max_buffer {
            return;
        }
        encoder.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(encoder);
        }
    }
}
