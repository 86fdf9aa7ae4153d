//! The constant pool of a class file, and typed lookups into it

use crate::error::{Error, ErrorKind};
use crate::structures::FQName;

pub(crate) mod parser;

/// Constant pool tags, as defined in §4.4 of the jvm specification
pub mod tags {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

/// The `cp_info` structure, represents in a constant
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolInfo {
    Utf8(Box<str>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    FieldRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    MethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
    /// The slot following a long or double constant
    Unusable,
}

/// Which kind of member a [`MemberRef`] points at
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemberRefKind {
    Field,
    Method,
    InterfaceMethod,
}

/// A resolved `Fieldref`, `Methodref` or `InterfaceMethodref`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub kind: MemberRefKind,
    pub owner: &'a FQName,
    pub name: &'a str,
    pub descriptor: &'a str,
}

/// A constant that the `ldc` family of instructions can push
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<'a> {
    String(&'a str),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(&'a FQName),
    /// method handles, method types and dynamic constants
    Other,
}

/// The constant pool contains an array of constants
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    pool: Vec<ConstantPoolInfo>,
}

impl ConstantPool {
    /// Creates a new constant pool from an iterator
    pub(crate) fn new<I: IntoIterator<Item = ConstantPoolInfo>>(pool: I) -> Self {
        Self {
            pool: pool.into_iter().collect(),
        }
    }

    /// Constant pools are accessed using u16 values, starting at 1.
    pub fn get(&self, index: u16) -> Option<&ConstantPoolInfo> {
        let slot = usize::from(index).checked_sub(1)?;
        match self.pool.get(slot)? {
            ConstantPoolInfo::Unusable => None,
            info => Some(info),
        }
    }

    /// The number of slots, including unusable ones
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Checks whether the pool has no entries
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Iterates over all usable entries with their index
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantPoolInfo)> {
        (1..=self.pool.len() as u16).filter_map(move |index| Some((index, self.get(index)?)))
    }

    /// Gets a `Utf8` entry
    pub fn utf8(&self, index: u16) -> Result<&str, Error> {
        match self.get(index) {
            Some(ConstantPoolInfo::Utf8(utf8)) => Ok(utf8),
            _ => Err(ErrorKind::invalid_index(index, "Utf8").into()),
        }
    }

    /// Gets the internal name stored in a `Class` entry
    pub fn class_name(&self, index: u16) -> Result<&FQName, Error> {
        match self.get(index) {
            Some(ConstantPoolInfo::Class { name_index }) => Ok(FQName::new(self.utf8(*name_index)?)),
            _ => Err(ErrorKind::invalid_index(index, "Class").into()),
        }
    }

    /// Gets the name and descriptor of a `NameAndType` entry
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), Error> {
        match self.get(index) {
            Some(ConstantPoolInfo::NameAndType {
                name_index,
                descriptor_index,
            }) => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(ErrorKind::invalid_index(index, "NameAndType").into()),
        }
    }

    /// Follows a field or method reference to its owner, name and descriptor
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>, Error> {
        let (kind, class_index, name_and_type_index) = match self.get(index) {
            Some(ConstantPoolInfo::FieldRef {
                class_index,
                name_and_type_index,
            }) => (MemberRefKind::Field, class_index, name_and_type_index),
            Some(ConstantPoolInfo::MethodRef {
                class_index,
                name_and_type_index,
            }) => (MemberRefKind::Method, class_index, name_and_type_index),
            Some(ConstantPoolInfo::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            }) => (
                MemberRefKind::InterfaceMethod,
                class_index,
                name_and_type_index,
            ),
            _ => return Err(ErrorKind::invalid_index(index, "member reference").into()),
        };
        let owner = self.class_name(*class_index)?;
        let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
        Ok(MemberRef {
            kind,
            owner,
            name,
            descriptor,
        })
    }

    /// Gets a constant the way `ldc` would load it
    pub fn loadable(&self, index: u16) -> Result<Loadable<'_>, Error> {
        let loadable = match self.get(index) {
            Some(ConstantPoolInfo::String { string_index }) => {
                Loadable::String(self.utf8(*string_index)?)
            }
            Some(ConstantPoolInfo::Integer(int)) => Loadable::Integer(*int),
            Some(ConstantPoolInfo::Float(float)) => Loadable::Float(*float),
            Some(ConstantPoolInfo::Long(long)) => Loadable::Long(*long),
            Some(ConstantPoolInfo::Double(double)) => Loadable::Double(*double),
            Some(ConstantPoolInfo::Class { .. }) => Loadable::Class(self.class_name(index)?),
            Some(
                ConstantPoolInfo::MethodHandle { .. }
                | ConstantPoolInfo::MethodType { .. }
                | ConstantPoolInfo::Dynamic { .. },
            ) => Loadable::Other,
            _ => return Err(ErrorKind::invalid_index(index, "loadable constant").into()),
        };
        Ok(loadable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ConstantPool {
        ConstantPool::new([
            ConstantPoolInfo::Utf8("com/example/Square".into()),
            ConstantPoolInfo::Class { name_index: 1 },
            ConstantPoolInfo::Long(7),
            ConstantPoolInfo::Unusable,
            ConstantPoolInfo::Utf8("side".into()),
            ConstantPoolInfo::Utf8("I".into()),
            ConstantPoolInfo::NameAndType {
                name_index: 5,
                descriptor_index: 6,
            },
            ConstantPoolInfo::FieldRef {
                class_index: 2,
                name_and_type_index: 7,
            },
        ])
    }

    #[test]
    fn indices_start_at_one() {
        let pool = pool();
        assert!(pool.get(0).is_none());
        assert_eq!(pool.utf8(1).unwrap(), "com/example/Square");
        assert!(pool.get(9).is_none());
    }

    #[test]
    fn second_slot_of_long_is_unusable() {
        let pool = pool();
        assert_eq!(pool.get(3), Some(&ConstantPoolInfo::Long(7)));
        assert!(pool.get(4).is_none());
        assert_eq!(pool.iter().count(), 7);
    }

    #[test]
    fn follow_field_ref() {
        let pool = pool();
        let field = pool.member_ref(8).expect("should be a field ref");
        assert_eq!(field.kind, MemberRefKind::Field);
        assert_eq!(field.owner, "com/example/Square");
        assert_eq!(field.name, "side");
        assert_eq!(field.descriptor, "I");
    }

    #[test]
    fn wrong_kind_is_an_error() {
        let pool = pool();
        let err = pool.member_ref(1).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidConstantPoolIndex { index: 1, .. }
        ));
        assert!(matches!(pool.loadable(2), Ok(Loadable::Class(_))));
    }
}
