//! The effector registry.

use std::collections::HashMap;
use std::sync::Arc;

use switchboard_core::CapabilityType;

use crate::echo::EchoEffector;
use crate::effector::Effector;
use crate::filesystem::FilesystemEffector;
use crate::network::NetworkEffector;
use crate::shell::ShellEffector;

/// Registry of effectors keyed by capability type.
///
/// One instance lives for the process lifetime. Registration happens at
/// startup, deterministically; lookups afterwards are read-only.
#[derive(Default)]
pub struct EffectorRegistry {
    effectors: HashMap<CapabilityType, Arc<dyn Effector>>,
}

impl std::fmt::Debug for EffectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectorRegistry")
            .field("types", &self.types())
            .finish()
    }
}

impl EffectorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all built-in effectors, registered in fixed order:
    /// filesystem, shell, network, echo.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FilesystemEffector::new()));
        registry.register(Arc::new(ShellEffector::new()));
        registry.register(Arc::new(NetworkEffector::new()));
        registry.register(Arc::new(EchoEffector::new()));
        registry
    }

    /// Register an effector. Duplicate registration for a type already
    /// present is a no-op.
    pub fn register(&mut self, effector: Arc<dyn Effector>) {
        let capability_type = effector.capability_type();
        if self.effectors.contains_key(&capability_type) {
            tracing::warn!(%capability_type, "duplicate effector registration ignored");
            return;
        }
        self.effectors.insert(capability_type, effector);
    }

    /// The effector for a capability type, if registered.
    #[must_use]
    pub fn get(&self, capability_type: CapabilityType) -> Option<Arc<dyn Effector>> {
        self.effectors.get(&capability_type).cloned()
    }

    /// Registered capability types, in a stable order.
    #[must_use]
    pub fn types(&self) -> Vec<CapabilityType> {
        let mut types: Vec<CapabilityType> = self.effectors.keys().copied().collect();
        types.sort_by_key(|ty| ty.as_str());
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_cover_all_types() {
        let registry = EffectorRegistry::with_builtins();
        for ty in [
            CapabilityType::Filesystem,
            CapabilityType::Shell,
            CapabilityType::Network,
            CapabilityType::Echo,
        ] {
            let effector = registry.get(ty).expect("builtin registered");
            assert_eq!(effector.capability_type(), ty);
        }
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let mut registry = EffectorRegistry::with_builtins();
        let original = registry.get(CapabilityType::Echo).unwrap();
        registry.register(Arc::new(EchoEffector::new()));
        let after = registry.get(CapabilityType::Echo).unwrap();
        assert!(Arc::ptr_eq(&original, &after));
    }

    #[test]
    fn test_unknown_type_absent_in_empty_registry() {
        let registry = EffectorRegistry::new();
        assert!(registry.get(CapabilityType::Shell).is_none());
    }
}
