use crate::attributes::Attribute;
use crate::error::Error;
pub use class::*;
pub use members::*;

pub use fully_qualified_name::*;

pub mod attributes;
mod class;
mod fully_qualified_name;
mod members;

/// Objects which implement this trait can be queried for their attributes.
pub trait HasAttributes {
    /// The iterator that attributes are returned in
    type Iter<'a>: Iterator<Item = Result<Attribute<'a>, Error>>
    where
        Self: 'a;

    /// Gets the attributes associated with this value. Attributes that couldn't be
    /// parsed are returned as errors, in their original position.
    fn attributes<'a>(&'a self) -> Self::Iter<'a>;

    /// Attempts to get a successfully parsed attribute by attribute name
    fn get_attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes()
            .filter_map(Result::ok)
            .find(|att: &Attribute| att.attribute_name() == name)
    }
}
