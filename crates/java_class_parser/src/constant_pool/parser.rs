use crate::constant_pool::tags::*;
use crate::constant_pool::{ConstantPool, ConstantPoolInfo};
use crate::error::{Error, ErrorKind};
use crate::raw_java_class::{RawAttributeInfo, RawMemberInfo};

use nom::bytes::complete::take;
use nom::combinator::{flat_map, map};
use nom::error::ParseError;
use nom::multi::count;
use nom::number::complete::{be_f32, be_f64, be_i32, be_i64, be_u16, be_u32, be_u8};
use nom::sequence::tuple;
use nom::IResult;

type NomError<'a> = nom::error::Error<&'a [u8]>;

pub(crate) fn parse_member_info<'a, E: ParseError<&'a [u8]>>(
    bytes: &'a [u8],
) -> IResult<&'a [u8], RawMemberInfo, E> {
    let (bytes, (access_flags, name_index, descriptor_index, attributes_count)) =
        tuple((be_u16, be_u16, be_u16, be_u16))(bytes)?;
    map(
        count(parse_attribute_info, attributes_count as usize),
        move |attributes| RawMemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes: attributes.into_boxed_slice(),
        },
    )(bytes)
}

pub(crate) fn parse_attribute_info<'a, E: ParseError<&'a [u8]>>(
    bytes: &'a [u8],
) -> IResult<&'a [u8], RawAttributeInfo, E> {
    let (bytes, (attribute_name_index, length)) = tuple((be_u16, be_u32))(bytes)?;
    map(take(length), move |info: &[u8]| RawAttributeInfo {
        attribute_name_index,
        info: info.into(),
    })(bytes)
}

fn ref_info<'a>(bytes: &'a [u8]) -> IResult<&'a [u8], (u16, u16), NomError<'a>> {
    tuple((be_u16, be_u16))(bytes)
}

fn parse_constant_pool_info(bytes: &[u8]) -> Result<(&[u8], ConstantPoolInfo), Error> {
    let (bytes, tag) = be_u8::<_, NomError>(bytes)?;

    let parsed: IResult<&[u8], ConstantPoolInfo, NomError> = match tag {
        UTF8 => map(flat_map(be_u16, |length: u16| take(length)), |chars: &[u8]| {
            ConstantPoolInfo::Utf8(String::from_utf8_lossy(chars).into())
        })(bytes),
        INTEGER => map(be_i32, ConstantPoolInfo::Integer)(bytes),
        FLOAT => map(be_f32, ConstantPoolInfo::Float)(bytes),
        LONG => map(be_i64, ConstantPoolInfo::Long)(bytes),
        DOUBLE => map(be_f64, ConstantPoolInfo::Double)(bytes),
        CLASS => map(be_u16, |name_index| ConstantPoolInfo::Class { name_index })(bytes),
        STRING => map(be_u16, |string_index| ConstantPoolInfo::String { string_index })(bytes),
        FIELD_REF => map(ref_info, |(class_index, name_and_type_index)| {
            ConstantPoolInfo::FieldRef {
                class_index,
                name_and_type_index,
            }
        })(bytes),
        METHOD_REF => map(ref_info, |(class_index, name_and_type_index)| {
            ConstantPoolInfo::MethodRef {
                class_index,
                name_and_type_index,
            }
        })(bytes),
        INTERFACE_METHOD_REF => map(ref_info, |(class_index, name_and_type_index)| {
            ConstantPoolInfo::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            }
        })(bytes),
        NAME_AND_TYPE => map(ref_info, |(name_index, descriptor_index)| {
            ConstantPoolInfo::NameAndType {
                name_index,
                descriptor_index,
            }
        })(bytes),
        METHOD_HANDLE => map(
            tuple((be_u8, be_u16)),
            |(reference_kind, reference_index)| ConstantPoolInfo::MethodHandle {
                reference_kind,
                reference_index,
            },
        )(bytes),
        METHOD_TYPE => map(be_u16, |descriptor_index| ConstantPoolInfo::MethodType {
            descriptor_index,
        })(bytes),
        DYNAMIC => map(ref_info, |(bootstrap_method_attr_index, name_and_type_index)| {
            ConstantPoolInfo::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            }
        })(bytes),
        INVOKE_DYNAMIC => map(ref_info, |(bootstrap_method_attr_index, name_and_type_index)| {
            ConstantPoolInfo::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            }
        })(bytes),
        MODULE => map(be_u16, |name_index| ConstantPoolInfo::Module { name_index })(bytes),
        PACKAGE => map(be_u16, |name_index| ConstantPoolInfo::Package { name_index })(bytes),
        unknown => return Err(ErrorKind::UnknownConstantPoolInfoTag(unknown).into()),
    };
    Ok(parsed?)
}

/// Parses an entire constant pool. `constant_pool_count` is the value stored in the class file,
/// which is one more than the number of slots.
pub(crate) fn parse_constant_pool(
    mut bytes: &[u8],
    constant_pool_count: u16,
) -> Result<(&[u8], ConstantPool), Error> {
    let slots = constant_pool_count.saturating_sub(1) as usize;
    let mut pool = Vec::with_capacity(slots);
    while pool.len() < slots {
        let (rest, info) = parse_constant_pool_info(bytes)?;
        bytes = rest;
        // longs and doubles take up two slots
        let wide = matches!(info, ConstantPoolInfo::Long(_) | ConstantPoolInfo::Double(_));
        pool.push(info);
        if wide {
            pool.push(ConstantPoolInfo::Unusable);
        }
    }
    Ok((bytes, ConstantPool::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_utf8_constant_pool_info() {
        const CONSTANT: [u8; 6] = [UTF8, 0, 3, b'a', b'b', b'c'];
        let parsed = parse_constant_pool_info(&CONSTANT).expect("should be able to parse");
        match parsed {
            (&[], ConstantPoolInfo::Utf8(utf8)) => assert_eq!(&*utf8, "abc"),
            other => panic!("expected a lone utf8 constant, got {:?}", other),
        }
    }

    #[test]
    fn long_takes_two_slots() {
        let bytes = [LONG, 0, 0, 0, 0, 0, 0, 0, 42, INTEGER, 0xff, 0xff, 0xff, 0xff];
        let (rest, pool) = parse_constant_pool(&bytes, 4).expect("should parse");
        assert!(rest.is_empty());
        assert_eq!(pool.get(1), Some(&ConstantPoolInfo::Long(42)));
        assert_eq!(pool.get(2), None);
        assert_eq!(pool.get(3), Some(&ConstantPoolInfo::Integer(-1)));
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = parse_constant_pool(&[2, 0, 0], 2).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownConstantPoolInfoTag(2)));
    }

    #[test]
    fn truncated_pool_is_an_error() {
        let err = parse_constant_pool(&[CLASS, 0], 2).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NomError { .. }));
    }
}
