use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, ErrorKind};
use crate::model::ClassHandle;
use crate::provider::TypeProvider;

/// A fixed set of classes, held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    classes: HashMap<String, Arc<ClassHandle>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class, replacing any with the same name
    pub fn insert(&mut self, class: ClassHandle) -> Arc<ClassHandle> {
        let class = Arc::new(class);
        self.classes
            .insert(class.name().to_string(), class.clone());
        class
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<ClassHandle> for MemoryProvider {
    fn from_iter<T: IntoIterator<Item = ClassHandle>>(iter: T) -> Self {
        let mut provider = Self::new();
        for class in iter {
            provider.insert(class);
        }
        provider
    }
}

impl TypeProvider for MemoryProvider {
    fn lookup(&self, name: &str) -> Result<Arc<ClassHandle>, Error> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::TypeNotFound(name.to_string()).into())
    }
}
