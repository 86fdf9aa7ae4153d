use crate::access_flags;
use crate::attributes::{create_attributes, parse_code, Attribute, Code};
use crate::constant_pool::ConstantPool;
use crate::error::Error;
use crate::raw_java_class::RawMemberInfo;
use crate::HasAttributes;

/// A field in a class
#[derive(Debug)]
pub struct Field<'a> {
    entry: Entry<'a>,
}

impl<'a> Field<'a> {
    pub(crate) fn new(field_info: &'a RawMemberInfo, pool: &'a ConstantPool) -> Self {
        Self {
            entry: Entry::new(field_info, pool),
        }
    }

    /// The name of the field
    pub fn name(&self) -> Result<&'a str, Error> {
        self.entry.name()
    }
    /// The descriptor of the field, like `Ljava/lang/String;`
    pub fn descriptor(&self) -> Result<&'a str, Error> {
        self.entry.descriptor()
    }
    /// The raw access flags of the field
    pub fn access_flags(&self) -> u16 {
        self.entry.info.access_flags
    }
}

impl HasAttributes for Field<'_> {
    type Iter<'a> = <Vec<Result<Attribute<'a>, Error>> as IntoIterator>::IntoIter where Self: 'a;

    fn attributes<'a>(&'a self) -> Self::Iter<'a> {
        self.entry.attributes().into_iter()
    }
}

/// A method in a class
#[derive(Debug)]
pub struct Method<'a> {
    entry: Entry<'a>,
}

impl<'a> Method<'a> {
    pub(crate) fn new(method_info: &'a RawMemberInfo, pool: &'a ConstantPool) -> Self {
        Self {
            entry: Entry::new(method_info, pool),
        }
    }

    /// The name of the method
    pub fn name(&self) -> Result<&'a str, Error> {
        self.entry.name()
    }
    /// The descriptor of the method, like `(I)V`
    pub fn descriptor(&self) -> Result<&'a str, Error> {
        self.entry.descriptor()
    }
    /// The raw access flags of the method
    pub fn access_flags(&self) -> u16 {
        self.entry.info.access_flags
    }

    /// Whether the method is expected to have no code
    pub fn is_abstract_or_native(&self) -> bool {
        self.access_flags() & (access_flags::ABSTRACT | access_flags::NATIVE) != 0
    }

    /// Gets the code of this method. `None` if there is no `Code` attribute, `Some(Err(_))`
    /// if there is one but it is malformed.
    pub fn code(&self) -> Option<Result<Code<'a>, Error>> {
        let pool = self.entry.pool;
        let raw = self
            .entry
            .info
            .attributes
            .iter()
            .find(|raw| matches!(pool.utf8(raw.attribute_name_index), Ok("Code")))?;
        Some(parse_code(pool, &raw.info))
    }
}

impl HasAttributes for Method<'_> {
    type Iter<'a> = <Vec<Result<Attribute<'a>, Error>> as IntoIterator>::IntoIter where Self: 'a;

    fn attributes<'a>(&'a self) -> Self::Iter<'a> {
        self.entry.attributes().into_iter()
    }
}

#[derive(Debug)]
struct Entry<'a> {
    pool: &'a ConstantPool,
    info: &'a RawMemberInfo,
}

impl<'a> Entry<'a> {
    fn new(info: &'a RawMemberInfo, pool: &'a ConstantPool) -> Self {
        Self { pool, info }
    }

    fn name(&self) -> Result<&'a str, Error> {
        self.pool.utf8(self.info.name_index)
    }

    fn descriptor(&self) -> Result<&'a str, Error> {
        self.pool.utf8(self.info.descriptor_index)
    }

    fn attributes(&self) -> Vec<Result<Attribute<'a>, Error>> {
        create_attributes(self.pool, &self.info.attributes)
    }
}
