//! Explicitly owned material registry
//!
//! Effects look up shared materials by name. The registry must be
//! initialized before lookups succeed and torn down when the scene unloads;
//! before that, every lookup returns `None` and effects render unstyled.

use std::collections::HashMap;

pub const FIRE_FLAME: &str = "fire_flame";
pub const FIRE_EMBER: &str = "fire_ember";
pub const LIGHTNING_GLOW: &str = "lightning_glow";
pub const LIGHTNING_BOLT: &str = "lightning_bolt";

const BUILTIN_MATERIALS: &[&str] = &[FIRE_FLAME, FIRE_EMBER, LIGHTNING_GLOW, LIGHTNING_BOLT];

/// Opaque handle to a registered material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HashMap<String, MaterialHandle>,
    initialized: bool,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in effect materials. Calling twice is harmless.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        for name in BUILTIN_MATERIALS {
            self.register(name);
        }
        self.initialized = true;
        tracing::debug!(count = self.materials.len(), "material registry initialized");
    }

    /// Register an extra material, returning its handle
    pub fn register(&mut self, name: &str) -> MaterialHandle {
        let next = MaterialHandle(self.materials.len() as u32);
        *self.materials.entry(name.to_string()).or_insert(next)
    }

    pub fn get(&self, name: &str) -> Option<MaterialHandle> {
        if !self.initialized {
            return None;
        }
        self.materials.get(name).copied()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Drop every material; lookups fail until the next `initialize`
    pub fn teardown(&mut self) {
        self.materials.clear();
        self.initialized = false;
        tracing::debug!("material registry torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_fail_before_initialize() {
        let registry = MaterialRegistry::new();
        assert!(!registry.is_initialized());
        assert_eq!(registry.get(FIRE_FLAME), None);
    }

    #[test]
    fn lifecycle() {
        let mut registry = MaterialRegistry::new();
        registry.initialize();
        let flame = registry.get(FIRE_FLAME).unwrap();
        assert_eq!(registry.len(), BUILTIN_MATERIALS.len());

        // Re-initializing keeps handles stable
        registry.initialize();
        assert_eq!(registry.get(FIRE_FLAME), Some(flame));

        registry.teardown();
        assert_eq!(registry.get(FIRE_FLAME), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = MaterialRegistry::new();
        registry.initialize();
        let a = registry.register("frost");
        let b = registry.register("frost");
        assert_eq!(a, b);
        assert_eq!(registry.get("frost"), Some(a));
        assert_eq!(registry.get("missing"), None);
    }
}
