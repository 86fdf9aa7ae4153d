//! Resolution of class names to handles, substituting synthetic stand-ins for classes that
//! can't be found.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use log::{trace, warn};

use crate::model::ClassHandle;
use crate::provider::TypeProvider;

/// The root of the class hierarchy. It is never synthesized.
pub const ROOT_TYPE: &str = "java.lang.Object";

/// The implicit super class of enums
pub const ENUM_BASE_TYPE: &str = "java.lang.Enum";

/// Resolves names through a provider, remembering every answer. Repeated resolutions of a name
/// return the same handle.
pub struct Resolver<P> {
    provider: P,
    cache: RefCell<HashMap<String, Option<Arc<ClassHandle>>>>,
    failures: RefCell<Vec<(String, String)>>,
}

impl<P: TypeProvider> Resolver<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cache: RefCell::new(HashMap::new()),
            failures: RefCell::new(vec![]),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Finds the class with the given binary name, or synthesizes one. Only the root type can
    /// resolve to nothing.
    pub fn resolve(&self, name: &str) -> Option<Arc<ClassHandle>> {
        if let Some(cached) = self.cache.borrow().get(name) {
            return cached.clone();
        }
        let resolved = match self.provider.lookup(name) {
            Ok(found) => {
                trace!("resolved {}", name);
                Some(found)
            }
            Err(error) => {
                if !error.is_not_found() {
                    warn!("could not load {}, treating it as missing: {}", name, error);
                    self.failures
                        .borrow_mut()
                        .push((name.to_string(), error.to_string()));
                }
                (name != ROOT_TYPE).then(|| self.provider.synthesize(name))
            }
        };
        self.cache
            .borrow_mut()
            .insert(name.to_string(), resolved.clone());
        resolved
    }

    /// The simple name of a class, `?` when it resolves to nothing
    pub fn simple_name(&self, name: &str) -> String {
        self.resolve(name)
            .map_or_else(|| "?".to_string(), |class| class.simple_name().to_string())
    }

    /// Names that the provider failed on for reasons other than not finding them, with the
    /// failure. Clears the list.
    pub fn take_failures(&self) -> Vec<(String, String)> {
        self.failures.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    #[test]
    fn synthesizes_missing_types_once() {
        let resolver = Resolver::new(MemoryProvider::new());
        let first = resolver.resolve("a.b.Missing").expect("synthesized");
        let second = resolver.resolve("a.b.Missing").expect("synthesized");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_synthetic());
        assert_eq!(first.simple_name(), "Missing");
        assert_eq!(first, second);
    }

    #[test]
    fn never_synthesizes_root() {
        let resolver = Resolver::new(MemoryProvider::new());
        assert!(resolver.resolve(ROOT_TYPE).is_none());
        assert_eq!(resolver.simple_name(ROOT_TYPE), "?");
    }

    #[test]
    fn prefers_existing_types() {
        let provider = MemoryProvider::from_iter([ClassHandle::new(ROOT_TYPE)]);
        let resolver = Resolver::new(&provider);
        let object = resolver.resolve(ROOT_TYPE).expect("provided");
        assert!(!object.is_synthetic());
        assert_eq!(resolver.simple_name(ROOT_TYPE), "Object");
    }
}
