use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{
    error::{Result, VecError},
    fft::{ReferenceProvider, RustFftProvider, TransformProvider},
};

struct RegistryState {
    candidates: Vec<Arc<dyn TransformProvider>>,
    active: Option<Arc<dyn TransformProvider>>,
}

/// Ordered list of candidate transform providers.
///
/// The first candidate whose probe succeeds becomes active and stays active
/// for the lifetime of the registry. Probe failures are logged and the next
/// candidate is tried; only an exhausted list is an error.
pub struct TransformRegistry {
    state: Mutex<RegistryState>,
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                candidates: Vec::new(),
                active: None,
            }),
        }
    }

    /// `rustfft` first, then the portable reference provider.
    pub fn with_defaults() -> Self {
        let registry: Self = Self::new();
        registry.register(Arc::new(RustFftProvider));
        registry.register(Arc::new(ReferenceProvider));
        registry
    }

    /// Appends a candidate. Does not displace an already active provider.
    pub fn register(&self, provider: Arc<dyn TransformProvider>) {
        self.state.lock().candidates.push(provider);
    }

    pub fn candidates(&self) -> Vec<&'static str> {
        self.state.lock().candidates.iter().map(|p| p.name()).collect()
    }

    /// Returns the active provider, probing candidates on first use.
    pub fn active(&self) -> Result<Arc<dyn TransformProvider>> {
        let mut state = self.state.lock();
        if let Some(active) = &state.active {
            return Ok(active.clone());
        }
        let candidates: Vec<Arc<dyn TransformProvider>> = state.candidates.clone();
        for provider in candidates {
            match provider.probe() {
                Ok(()) => {
                    info!(provider = provider.name(), "transform provider selected");
                    state.active = Some(provider.clone());
                    return Ok(provider);
                }
                Err(err) => warn!(provider = provider.name(), %err, "transform provider unavailable"),
            }
        }
        Err(VecError::NoTransformProvider)
    }
}

static REGISTRY: Lazy<TransformRegistry> = Lazy::new(TransformRegistry::with_defaults);

/// Process-wide registry used by host-side transforms.
pub fn registry() -> &'static TransformRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::TransformRegistry;
    use crate::{
        error::{Result, VecError},
        fft::{ReferenceProvider, TransformPlan, TransformProvider},
        hal::layouts::PlanShape,
    };

    struct Missing {
        probes: AtomicUsize,
    }

    impl TransformProvider for Missing {
        fn name(&self) -> &'static str {
            "missing"
        }

        fn probe(&self) -> Result<()> {
            self.probes.fetch_add(1, Ordering::Relaxed);
            Err(VecError::DependencyResolution {
                provider: "missing",
                missing: "libfft.so".to_string(),
            })
        }

        fn create_plan(&self, _shape: PlanShape) -> Result<Box<dyn TransformPlan>> {
            unreachable!()
        }
    }

    #[test]
    fn falls_through_to_next_candidate() {
        let missing: Arc<Missing> = Arc::new(Missing {
            probes: AtomicUsize::new(0),
        });
        let registry: TransformRegistry = TransformRegistry::new();
        registry.register(missing.clone());
        registry.register(Arc::new(ReferenceProvider));
        assert_eq!(registry.active().unwrap().name(), "reference");
        assert_eq!(registry.active().unwrap().name(), "reference");
        assert_eq!(missing.probes.load(Ordering::Relaxed), 1);
        assert_eq!(registry.candidates(), vec!["missing", "reference"]);
    }

    #[test]
    fn exhausted_candidates_are_fatal() {
        let registry: TransformRegistry = TransformRegistry::new();
        registry.register(Arc::new(Missing {
            probes: AtomicUsize::new(0),
        }));
        assert_eq!(registry.active().err(), Some(VecError::NoTransformProvider));
    }

    #[test]
    fn defaults_prefer_rustfft_when_enabled() {
        let registry: TransformRegistry = TransformRegistry::with_defaults();
        let expected: &str = if cfg!(feature = "rustfft") { "rustfft" } else { "reference" };
        assert_eq!(registry.active().unwrap().name(), expected);
    }
}
