//! Where class handles come from

use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::model::ClassHandle;

mod class_path;
mod memory;

pub use class_path::ClassPathProvider;
pub use memory::MemoryProvider;

/// Supplies classes by binary name.
pub trait TypeProvider {
    /// Finds an existing class. An error of kind
    /// [`TypeNotFound`](crate::error::ErrorKind::TypeNotFound) means there is no such class,
    /// any other error means the class exists but couldn't be read.
    fn lookup(&self, name: &str) -> Result<Arc<ClassHandle>, Error>;

    /// Makes a stand-in for a class that doesn't exist
    fn synthesize(&self, name: &str) -> Arc<ClassHandle> {
        debug!("synthesizing {}", name);
        Arc::new(ClassHandle::synthetic(name))
    }
}

impl<P: TypeProvider + ?Sized> TypeProvider for &P {
    fn lookup(&self, name: &str) -> Result<Arc<ClassHandle>, Error> {
        (**self).lookup(name)
    }

    fn synthesize(&self, name: &str) -> Arc<ClassHandle> {
        (**self).synthesize(name)
    }
}
