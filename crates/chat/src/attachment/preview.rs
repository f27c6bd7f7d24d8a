use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

/// Opaque handle to renderable preview bytes, analogous to a blob URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewRef(String);

impl PreviewRef {
    fn allocate() -> Self {
        Self(format!("preview:{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

type PreviewTable = HashMap<PreviewRef, Arc<[u8]>>;

/// Table of live preview handles.
///
/// Cloning shares the table. Handles are only ever removed by dropping their lease.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<PreviewTable>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self, bytes: Arc<[u8]>) -> PreviewLease {
        let reference = PreviewRef::allocate();
        self.lock().insert(reference.clone(), bytes);
        tracing::debug!(preview = %reference, "allocated preview handle");

        PreviewLease {
            reference,
            registry: self.clone(),
        }
    }

    pub fn resolve(&self, reference: &PreviewRef) -> Option<Arc<[u8]>> {
        self.lock().get(reference).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, reference: &PreviewRef) -> bool {
        self.lock().remove(reference).is_some()
    }

    fn lock(&self) -> MutexGuard<'_, PreviewTable> {
        // The table holds plain data; a panic mid-insert cannot leave it inconsistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PreviewRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PreviewRegistry")
            .field("live_count", &self.live_count())
            .finish()
    }
}

/// Ownership of one preview handle. Dropping the lease revokes the handle.
pub struct PreviewLease {
    reference: PreviewRef,
    registry: PreviewRegistry,
}

impl PreviewLease {
    pub fn reference(&self) -> &PreviewRef {
        &self.reference
    }
}

impl fmt::Debug for PreviewLease {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("PreviewLease")
            .field(&self.reference)
            .finish()
    }
}

impl Drop for PreviewLease {
    fn drop(&mut self) {
        let revoked = self.registry.revoke(&self.reference);
        tracing::debug!(preview = %self.reference, revoked, "released preview handle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_resolves_until_dropped() {
        let registry = PreviewRegistry::new();
        let bytes: Arc<[u8]> = Arc::from(vec![1_u8, 2, 3]);

        let lease = registry.allocate(bytes.clone());
        let reference = lease.reference().clone();
        assert!(reference.as_str().starts_with("preview:"));
        let resolved = registry.resolve(&reference);
        assert_eq!(resolved.as_deref(), Some(&[1_u8, 2, 3][..]));
        assert_eq!(registry.live_count(), 1);

        drop(lease);
        assert_eq!(registry.resolve(&reference), None);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn each_allocation_gets_its_own_handle() {
        let registry = PreviewRegistry::new();
        let bytes: Arc<[u8]> = Arc::from(vec![0_u8; 4]);

        let first = registry.allocate(bytes.clone());
        let second = registry.allocate(bytes);
        assert_ne!(first.reference(), second.reference());
        assert_eq!(registry.live_count(), 2);

        drop(first);
        assert_eq!(registry.live_count(), 1);
        assert!(registry.resolve(second.reference()).is_some());
    }
}
