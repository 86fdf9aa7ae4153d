//! The raw java class, a direct translation of the java [ClassFile structure][class_file]
//!
//! [class_file]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.1

use crate::constant_pool::{parser, ConstantPool};
use crate::error::{Error, ErrorKind};
use nom::combinator::eof;
use nom::error::ParseError;
use nom::multi::count;
use nom::number::complete::{be_u16, be_u32};
use nom::sequence::tuple;
use nom::IResult;

/// Every class file starts with these four bytes
pub const MAGIC: u32 = 0xCAFE_BABE;

/// A raw java class file structure. All members have public access.
///
/// Defined by the [jvm spec](https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.1).
#[derive(Debug, Clone)]
pub struct RawJavaClass {
    pub minor: u16,
    pub major: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Box<[u16]>,
    pub fields: Box<[RawMemberInfo]>,
    pub methods: Box<[RawMemberInfo]>,
    pub attributes: Box<[RawAttributeInfo]>,
}

/// The raw `field_info` and `method_info` structures, which share a layout
#[derive(Debug, Default, Clone)]
pub struct RawMemberInfo {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Box<[RawAttributeInfo]>,
}

/// The raw attribute info struct
#[derive(Debug, Default, Clone)]
pub struct RawAttributeInfo {
    pub attribute_name_index: u16,
    pub info: Box<[u8]>,
}

struct RawClassBody {
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<RawMemberInfo>,
    methods: Vec<RawMemberInfo>,
    attributes: Vec<RawAttributeInfo>,
}

fn class_body<'a, E: ParseError<&'a [u8]>>(bytes: &'a [u8]) -> IResult<&'a [u8], RawClassBody, E> {
    let (bytes, (access_flags, this_class, super_class, interfaces_count)) =
        tuple((be_u16, be_u16, be_u16, be_u16))(bytes)?;
    let (bytes, interfaces) = count(be_u16, interfaces_count as usize)(bytes)?;

    let (bytes, fields_count) = be_u16(bytes)?;
    let (bytes, fields) = count(parser::parse_member_info, fields_count as usize)(bytes)?;

    let (bytes, methods_count) = be_u16(bytes)?;
    let (bytes, methods) = count(parser::parse_member_info, methods_count as usize)(bytes)?;

    let (bytes, attributes_count) = be_u16(bytes)?;
    let (bytes, attributes) = count(parser::parse_attribute_info, attributes_count as usize)(bytes)?;

    let (bytes, _) = eof(bytes)?;

    Ok((
        bytes,
        RawClassBody {
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        },
    ))
}

/// Should parse the entire byte array to create a raw java class
pub fn parse_class_file_bytes(bytes: &[u8]) -> Result<RawJavaClass, Error> {
    type NomError<'a> = nom::error::Error<&'a [u8]>;

    let (bytes, (magic, minor, major, constant_pool_count)) =
        tuple((be_u32, be_u16, be_u16, be_u16))(bytes)
            .map_err(|e: nom::Err<NomError>| Error::from(e))?;
    if magic != MAGIC {
        return Err(ErrorKind::BadMagic(magic).into());
    }

    let (bytes, constant_pool) = parser::parse_constant_pool(bytes, constant_pool_count)?;
    let (_, body) = class_body::<NomError>(bytes)?;

    Ok(RawJavaClass {
        minor,
        major,
        constant_pool,
        access_flags: body.access_flags,
        this_class: body.this_class,
        super_class: body.super_class,
        interfaces: body.interfaces.into_boxed_slice(),
        fields: body.fields.into_boxed_slice(),
        methods: body.methods.into_boxed_slice(),
        attributes: body.attributes.into_boxed_slice(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_magic() {
        let bytes = [0xca, 0xfe, 0xd0, 0x0d, 0, 0, 0, 52, 0, 1];
        let err = parse_class_file_bytes(&bytes).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::BadMagic(0xcafed00d)));
    }

    #[test]
    fn truncated_header() {
        let err = parse_class_file_bytes(&[0xca, 0xfe]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NomError { .. }));
    }
}
