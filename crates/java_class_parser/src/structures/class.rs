use crate::access_flags;
use crate::attributes::{create_attributes, Attribute, AttributeKind, InnerClass};
use crate::constant_pool::{ConstantPool, ConstantPoolInfo};
use crate::error::Error;
use crate::raw_java_class::RawJavaClass;
use crate::structures::FQName;
use crate::{Field, HasAttributes, Method};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A java class
#[derive(Debug, Clone)]
pub struct JavaClass(Arc<RawJavaClass>);

impl JavaClass {
    pub(crate) fn new(class: RawJavaClass) -> Self {
        Self(Arc::new(class))
    }

    /// The constant pool of this class
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.0.constant_pool
    }

    /// The class file version, as `(major, minor)`
    pub fn version(&self) -> (u16, u16) {
        (self.0.major, self.0.minor)
    }

    /// The raw access flags of this class
    pub fn access_flags(&self) -> u16 {
        self.0.access_flags
    }

    /// Whether this class is an interface
    pub fn is_interface(&self) -> bool {
        self.0.access_flags & access_flags::INTERFACE != 0
    }

    /// Gets this class's name
    pub fn this(&self) -> Result<&FQName, Error> {
        self.constant_pool().class_name(self.0.this_class)
    }

    /// Gets the super class's name of this class. Only `java/lang/Object` has none.
    pub fn super_name(&self) -> Result<Option<&FQName>, Error> {
        match self.0.super_class {
            0 => Ok(None),
            index => self.constant_pool().class_name(index).map(Some),
        }
    }

    /// Gets the names of this interfaces that this class implements
    pub fn interfaces(&self) -> Result<Vec<&FQName>, Error> {
        self.0
            .interfaces
            .iter()
            .map(|&index| self.constant_pool().class_name(index))
            .collect()
    }

    /// Every class named by a `Class` constant, in constant pool order. Array classes
    /// are included as their descriptors.
    pub fn referenced_classes(&self) -> Result<Vec<&FQName>, Error> {
        self.constant_pool()
            .iter()
            .filter(|(_, info)| matches!(info, ConstantPoolInfo::Class { .. }))
            .map(|(index, _)| self.constant_pool().class_name(index))
            .collect()
    }

    /// The classes declared as members of this class
    pub fn nested_classes(&self) -> Result<Vec<InnerClass<'_>>, Error> {
        let this = self.this()?;
        let nested = match self.get_attribute("InnerClasses").map(|att| att.kind().clone()) {
            Some(AttributeKind::InnerClasses(inner_classes)) => inner_classes
                .into_iter()
                .filter(|inner| inner.outer() == Some(this))
                .collect(),
            _ => vec![],
        };
        Ok(nested)
    }

    /// The `SourceFile` attribute, if the class was compiled with one
    pub fn source_file(&self) -> Option<&str> {
        match self.get_attribute("SourceFile")?.kind() {
            AttributeKind::SourceFile(source_file) => Some(*source_file),
            _ => None,
        }
    }

    /// Gets the fields declared in this class.
    pub fn fields(&self) -> Vec<Field<'_>> {
        self.0
            .fields
            .iter()
            .map(|f| Field::new(f, self.constant_pool()))
            .collect()
    }

    /// Gets the methods declared in this class.
    pub fn methods(&self) -> Vec<Method<'_>> {
        self.0
            .methods
            .iter()
            .map(|m| Method::new(m, self.constant_pool()))
            .collect()
    }
}

impl Display for JavaClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let attributes = self
            .attributes()
            .filter_map(Result::ok)
            .map(|att| att.attribute_name())
            .collect::<Vec<_>>();
        f.debug_struct("JavaClass")
            .field("this", &self.this().ok())
            .field("super", &self.super_name().ok().flatten())
            .field("interfaces", &self.interfaces().unwrap_or_default())
            .field("attributes", &attributes)
            .finish()
    }
}

impl HasAttributes for JavaClass {
    type Iter<'a> = <Vec<Result<Attribute<'a>, Error>> as IntoIterator>::IntoIter where Self: 'a;

    fn attributes<'a>(&'a self) -> Self::Iter<'a> {
        create_attributes(self.constant_pool(), &self.0.attributes).into_iter()
    }
}
