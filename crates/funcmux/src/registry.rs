//! Adaptor registry.
//!
//! Caches one [`Signature`] per distinct handler type signature so that
//! classification runs once no matter how many routes share it. Entries are
//! either installed ahead of time (precompiled) or classified on first use.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use funcmux_core::{Inputs, Outputs};
use parking_lot::Mutex;

use crate::adaptor::{Adapted, HandlerFn};
use crate::classify::{ClassifyError, Signature};

/// Identity of a handler signature: the type `fn(Args) -> R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    id: TypeId,
    name: &'static str,
}

impl SignatureKey {
    /// Key for a handler taking `Args` and returning `R`.
    #[must_use]
    pub fn of<Args: 'static, R: 'static>() -> Self {
        Self {
            id: TypeId::of::<fn(Args) -> R>(),
            name: std::any::type_name::<fn(Args) -> R>(),
        }
    }

    /// Full type name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// How an entry got into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Installed ahead of time.
    Precompiled,
    /// Built by the classifier on first use.
    Classified,
}

/// A cached signature.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// The plan.
    pub signature: Arc<Signature>,
    /// Where it came from.
    pub origin: Origin,
}

/// Lookup counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    /// Cached signatures.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the classifier.
    pub misses: u64,
}

/// Cache from handler signature to its classified plan.
///
/// Shared by reference (usually behind an `Arc`) between every mux that
/// should reuse classifications.
#[derive(Debug, Default)]
pub struct AdaptorRegistry {
    entries: Mutex<HashMap<SignatureKey, RegistryEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AdaptorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a precompiled signature for handlers taking `Args` and
    /// returning `R`, replacing any cached entry.
    ///
    /// # Errors
    ///
    /// [`ClassifyError::ArityMismatch`] when the signature does not have one
    /// converter per parameter and result, and the role mismatch errors when
    /// a converter's role is not the one its type classifies to.
    pub fn install<Args: Inputs, R: Outputs>(
        &self,
        signature: Signature,
    ) -> Result<(), ClassifyError> {
        signature.check_fits::<Args, R>()?;
        let key = SignatureKey::of::<Args, R>();
        tracing::debug!(signature = key.name(), "precompiled signature installed");
        self.entries.lock().insert(
            key,
            RegistryEntry {
                signature: Arc::new(signature),
                origin: Origin::Precompiled,
            },
        );
        Ok(())
    }

    /// Cached signature for `Args -> R`, classifying it on first use.
    ///
    /// # Errors
    ///
    /// Classification failures; nothing is cached for them.
    pub fn resolve<Args: Inputs, R: Outputs>(&self) -> Result<Arc<Signature>, ClassifyError> {
        let key = SignatureKey::of::<Args, R>();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(&entry.signature));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let signature = Arc::new(Signature::of::<Args, R>()?);
        tracing::debug!(
            signature = key.name(),
            inputs = signature.inputs().len(),
            outputs = signature.outputs().len(),
            "signature classified"
        );
        entries.insert(
            key,
            RegistryEntry {
                signature: Arc::clone(&signature),
                origin: Origin::Classified,
            },
        );
        Ok(signature)
    }

    /// The cached entry for `Args -> R`, without classifying.
    #[must_use]
    pub fn get<Args: 'static, R: 'static>(&self) -> Option<RegistryEntry> {
        self.entries
            .lock()
            .get(&SignatureKey::of::<Args, R>())
            .cloned()
    }

    /// Adapt a function using the cached (or freshly classified) signature.
    ///
    /// # Errors
    ///
    /// Classification failures.
    pub fn adapt<H, Args>(&self, handler: H) -> Result<Adapted<H, Args>, ClassifyError>
    where
        H: HandlerFn<Args>,
        Args: Inputs,
    {
        let signature = self.resolve::<Args, H::Output>()?;
        Ok(Adapted::new(handler, signature))
    }

    /// Number of cached signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{InputConverter, InputRole, OutputConverter, QueryKind};
    use funcmux_core::{HttpError, OutputRole, Shape, StatusCode, TestClient, TypeDesc};

    #[test]
    fn identical_signatures_classify_once() {
        let registry = AdaptorRegistry::new();
        let first = registry.resolve::<(String,), Result<u8, HttpError>>().unwrap();
        let second = registry.resolve::<(String,), Result<u8, HttpError>>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            registry.stats(),
            RegistryStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
        assert_eq!(
            registry.get::<(String,), Result<u8, HttpError>>().map(|e| e.origin),
            Some(Origin::Classified)
        );
    }

    #[test]
    fn distinct_signatures_get_distinct_entries() {
        let registry = AdaptorRegistry::new();
        registry.resolve::<(String,), u8>().unwrap();
        registry.resolve::<(String,), u16>().unwrap();
        registry.resolve::<(), u8>().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.stats().misses, 3);
    }

    #[test]
    fn failed_classification_is_not_cached() {
        let registry = AdaptorRegistry::new();
        assert!(registry.resolve::<(String, String), ()>().is_err());
        assert!(registry.is_empty());
        assert!(registry.get::<(String, String), ()>().is_none());
    }

    #[test]
    fn precompiled_entry_is_used_as_is() {
        let registry = AdaptorRegistry::new();
        let signature = Signature::from_parts(
            vec![InputConverter::body(TypeDesc::new("Name", Shape::Str))],
            vec![OutputConverter::new(
                OutputRole::Body,
                TypeDesc::new("Length", Shape::Int),
            )],
        )
        .unwrap();
        registry.install::<(String,), u8>(signature.clone()).unwrap();

        let resolved = registry.resolve::<(String,), u8>().unwrap();
        assert_eq!(*resolved, signature);
        assert_eq!(registry.stats().misses, 0);
        assert_eq!(
            registry.get::<(String,), u8>().map(|e| e.origin),
            Some(Origin::Precompiled)
        );

        let adapted = registry
            .adapt(|name: String| async move { u8::try_from(name.len()).unwrap_or(u8::MAX) })
            .unwrap();
        assert_eq!(adapted.signature().inputs()[0].desc.name(), "Name");
        let client = TestClient::new(adapted);
        let res = client.post("/").json(&"abc").send();
        res.assert_status(StatusCode::OK);
        assert_eq!(res.text(), "3");
    }

    #[test]
    fn precompiled_input_role_must_fit_type() {
        let registry = AdaptorRegistry::new();
        let signature = Signature::from_parts(
            vec![InputConverter::query(
                TypeDesc::new("String", Shape::Str),
                QueryKind::Str,
                "name",
            )],
            vec![OutputConverter::new(
                OutputRole::Body,
                TypeDesc::new("u8", Shape::Int),
            )],
        )
        .unwrap();

        let err = registry.install::<(String,), u8>(signature).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::InputRoleMismatch {
                index: 0,
                type_name: "String".to_string(),
                expected: InputRole::Body,
                found: InputRole::Query(QueryKind::Str),
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn precompiled_output_role_must_fit_type() {
        let registry = AdaptorRegistry::new();
        let signature = Signature::from_parts(
            Vec::new(),
            vec![
                OutputConverter::new(OutputRole::Custom, TypeDesc::new("u8", Shape::Int)),
                OutputConverter::new(OutputRole::Error, TypeDesc::error("HttpError")),
            ],
        )
        .unwrap();

        let err = registry
            .install::<(), Result<u8, HttpError>>(signature)
            .unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::OutputRoleMismatch {
                index: 0,
                expected: OutputRole::Body,
                found: OutputRole::Custom,
                ..
            }
        ));
        assert!(registry.get::<(), Result<u8, HttpError>>().is_none());
    }

    #[test]
    fn precompiled_arity_is_checked() {
        let registry = AdaptorRegistry::new();
        let signature = Signature::from_parts(Vec::new(), Vec::new()).unwrap();
        let err = registry.install::<(String,), u8>(signature).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::ArityMismatch {
                expected_inputs: 1,
                expected_outputs: 1,
                ..
            }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_resolution_classifies_once() {
        let registry = Arc::new(AdaptorRegistry::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve::<(Vec<u8>,), String>().unwrap())
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        let stats = registry.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
    }
}
