//! Extension entries and the name → factory registry.
//!
//! Every glTF object may carry an `extensions` map. The raw JSON of each
//! entry is kept verbatim; when a factory is registered for the name, the
//! parser also attaches a typed payload that callers retrieve by downcasting.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::document::Document;
use crate::errors::{GltfError, Result};

/// A typed extension payload.
pub trait ExtensionPayload: Any + fmt::Debug + Send + Sync {
    /// Upcast for downcasting to the concrete payload type.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> ExtensionPayload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One entry of an `extensions` map.
#[derive(Clone, Default)]
pub struct ExtensionEntry {
    raw: Value,
    payload: OnceLock<Arc<dyn ExtensionPayload>>,
}

impl ExtensionEntry {
    /// An entry with no typed payload.
    pub fn opaque(raw: Value) -> Self {
        Self {
            raw,
            payload: OnceLock::new(),
        }
    }

    /// An entry with a typed payload.
    pub fn typed(raw: Value, payload: Arc<dyn ExtensionPayload>) -> Self {
        let entry = Self::opaque(raw);
        entry.attach(payload);
        entry
    }

    /// The JSON exactly as it appeared in the document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The typed payload, if a factory produced one.
    pub fn payload(&self) -> Option<&dyn ExtensionPayload> {
        self.payload.get().map(|p| &**p)
    }

    /// The typed payload as `T`.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.payload()?.as_any().downcast_ref::<T>()
    }

    /// Whether no factory handled this entry.
    pub fn is_opaque(&self) -> bool {
        self.payload.get().is_none()
    }

    /// Attach a payload. The first attachment wins; returns whether this one did.
    pub fn attach(&self, payload: Arc<dyn ExtensionPayload>) -> bool {
        self.payload.set(payload).is_ok()
    }
}

impl fmt::Debug for ExtensionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionEntry")
            .field("raw", &self.raw)
            .field("payload", &self.payload.get())
            .finish()
    }
}

// Payloads are derived from `raw`, so equality looks at the JSON only.
impl PartialEq for ExtensionEntry {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Serialize for ExtensionEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExtensionEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::opaque)
    }
}

/// The `extensions` map of one glTF object, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(IndexMap<String, ExtensionEntry>);

impl Extensions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entry for `name`.
    pub fn get(&self, name: &str) -> Option<&ExtensionEntry> {
        self.0.get(name)
    }

    /// Typed payload of `name`, if present and of type `T`.
    pub fn payload<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(name)?.downcast::<T>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtensionEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: ExtensionEntry) {
        self.0.insert(name.into(), entry);
    }
}

impl FromIterator<(String, ExtensionEntry)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (String, ExtensionEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Turns the raw JSON of one extension into a typed payload.
pub trait ExtensionFactory: Send + Sync {
    /// Build the payload. `document` is the fully deserialized document, so
    /// the factory may resolve indices it references.
    fn create(&self, raw: &Value, document: &Document) -> Result<Arc<dyn ExtensionPayload>>;
}

/// Adapts a closure returning a concrete payload into an [`ExtensionFactory`].
pub struct FnFactory<F, P> {
    f: F,
    _payload: PhantomData<fn() -> P>,
}

impl<F, P> FnFactory<F, P>
where
    F: Fn(&Value, &Document) -> Result<P> + Send + Sync,
    P: ExtensionPayload,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _payload: PhantomData,
        }
    }
}

impl<F, P> ExtensionFactory for FnFactory<F, P>
where
    F: Fn(&Value, &Document) -> Result<P> + Send + Sync,
    P: ExtensionPayload,
{
    fn create(&self, raw: &Value, document: &Document) -> Result<Arc<dyn ExtensionPayload>> {
        let payload = (self.f)(raw, document)?;
        Ok(Arc::new(payload))
    }
}

/// Factories keyed by extension name.
///
/// Handed to the parser explicitly; there is no process-wide registry.
#[derive(Default)]
pub struct ExtensionRegistry {
    factories: IndexMap<String, Box<dyn ExtensionFactory>>,
}

impl ExtensionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. Fails if `name` already has one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl ExtensionFactory + 'static,
    ) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(GltfError::DuplicateExtension { name });
        }
        log::debug!("registered extension factory {}", name);
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    /// Register a closure as the factory for `name`.
    pub fn register_fn<F, P>(&mut self, name: impl Into<String>, f: F) -> Result<()>
    where
        F: Fn(&Value, &Document) -> Result<P> + Send + Sync + 'static,
        P: ExtensionPayload,
    {
        self.register(name, FnFactory::new(f))
    }

    /// Install a factory, replacing any existing one. Returns whether a
    /// factory was replaced.
    pub fn replace(
        &mut self,
        name: impl Into<String>,
        factory: impl ExtensionFactory + 'static,
    ) -> bool {
        let name = name.into();
        let replaced = self.factories.insert(name.clone(), Box::new(factory)).is_some();
        if replaced {
            log::debug!("replaced extension factory {}", name);
        }
        replaced
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build an entry for `name`: typed when a factory exists, opaque otherwise.
    pub fn deserialize(&self, name: &str, raw: &Value, document: &Document) -> Result<ExtensionEntry> {
        match self.factories.get(name) {
            Some(factory) => Ok(ExtensionEntry::typed(raw.clone(), factory.create(raw, document)?)),
            None => Ok(ExtensionEntry::opaque(raw.clone())),
        }
    }

    /// Attach typed payloads to every entry in `document` that has a
    /// factory. Returns the number of entries attached.
    pub fn attach_all(&self, document: &Document) -> Result<usize> {
        if self.factories.is_empty() {
            return Ok(0);
        }
        let mut attached = 0;
        for (location, extensions) in document.extension_maps() {
            for (name, entry) in extensions.iter() {
                let Some(factory) = self.factories.get(name) else {
                    continue;
                };
                let payload = factory.create(entry.raw(), document).map_err(|err| match err {
                    GltfError::SchemaViolation { message } => {
                        GltfError::schema(format!("{} on {}: {}", name, location, message))
                    }
                    other => other,
                })?;
                if entry.attach(payload) {
                    attached += 1;
                }
                log::trace!("attached {} payload on {}", name, location);
            }
        }
        Ok(attached)
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
