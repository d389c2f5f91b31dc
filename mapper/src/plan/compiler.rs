//! Compile-once plan cache.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::descriptor::TypeRegistry;
use crate::error::{MappingError, Result};
use crate::plan::build::build_plan;
use crate::plan::CompiledPlan;
use crate::store::{ConfigurationStore, PairKey};

/// Memoizes one [`CompiledPlan`] per registered pair.
///
/// The cell map is fixed when the compiler is created from a sealed store,
/// so lookups take no lock. Each cell initializes at most once; concurrent
/// first requests for a pair wait for the single compilation in progress.
#[derive(Debug)]
pub struct PlanCompiler {
    store: Arc<ConfigurationStore>,
    registry: Arc<TypeRegistry>,
    plans: HashMap<PairKey, OnceCell<Arc<CompiledPlan>>>,
}

impl PlanCompiler {
    /// `store` should be sealed; pairs are taken as registered now.
    pub fn new(store: Arc<ConfigurationStore>, registry: Arc<TypeRegistry>) -> Self {
        let plans = store
            .pairs()
            .map(|config| (config.key(), OnceCell::new()))
            .collect();
        Self {
            store,
            registry,
            plans,
        }
    }

    pub fn compile(&self, key: &PairKey) -> Result<Arc<CompiledPlan>> {
        let cell = self
            .plans
            .get(key)
            .ok_or(MappingError::MissingMapping { pair: *key })?;

        cell.get_or_try_init(|| {
            // Include chains are acyclic once the store is sealed, so this
            // recursion never re-enters the cell being initialized.
            let base = match self.store.pair(key).and_then(|config| config.base()) {
                Some(base_key) => Some(self.compile(&base_key)?),
                None => None,
            };
            let plan = build_plan(&self.store, &self.registry, key, base.as_deref())?;
            debug!(pair = %key, "Cached mapping plan");
            Ok(Arc::new(plan))
        })
        .map(Arc::clone)
    }

    /// Already compiled plan, without compiling
    pub fn cached(&self, key: &PairKey) -> Option<Arc<CompiledPlan>> {
        self.plans.get(key)?.get().cloned()
    }

    /// Number of plans compiled so far
    pub fn compiled_count(&self) -> usize {
        self.plans.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Category, CategoryDto, Employee, EmployeeDto, Manager, ManagerDto};

    fn compiler(store: ConfigurationStore) -> PlanCompiler {
        let mut store = store;
        store.seal().expect("store should seal");
        PlanCompiler::new(Arc::new(store), Arc::new(TypeRegistry::new()))
    }

    #[test]
    fn test_compile_is_memoized() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Category, CategoryDto>().unwrap();
        let compiler = compiler(store);
        let key = PairKey::of::<Category, CategoryDto>();

        assert_eq!(compiler.compiled_count(), 0);
        assert!(compiler.cached(&key).is_none());

        let first = compiler.compile(&key).unwrap();
        let second = compiler.compile(&key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(compiler.compiled_count(), 1);
    }

    #[test]
    fn test_compile_unknown_pair_fails() {
        let compiler = compiler(ConfigurationStore::new());
        let err = compiler
            .compile(&PairKey::of::<Category, CategoryDto>())
            .unwrap_err();
        assert!(matches!(err, MappingError::MissingMapping { .. }));
    }

    #[test]
    fn test_compiling_derived_pair_compiles_base_first() {
        let mut store = ConfigurationStore::new();
        store
            .register_pair::<Manager, ManagerDto>()
            .unwrap()
            .include_base::<Employee, EmployeeDto>();
        store.register_pair::<Employee, EmployeeDto>().unwrap();
        let compiler = compiler(store);

        compiler
            .compile(&PairKey::of::<Manager, ManagerDto>())
            .unwrap();
        assert!(compiler
            .cached(&PairKey::of::<Employee, EmployeeDto>())
            .is_some());
        assert_eq!(compiler.compiled_count(), 2);
    }

    #[test]
    fn test_concurrent_first_use_compiles_once() {
        let mut store = ConfigurationStore::new();
        store.register_pair::<Category, CategoryDto>().unwrap();
        let compiler = compiler(store);
        let key = PairKey::of::<Category, CategoryDto>();

        let plans: Vec<Arc<CompiledPlan>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| compiler.compile(&key).expect("compile should succeed")))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread should not panic"))
                .collect()
        });

        assert!(plans.iter().all(|plan| Arc::ptr_eq(plan, &plans[0])));
        assert_eq!(compiler.compiled_count(), 1);
    }
}
