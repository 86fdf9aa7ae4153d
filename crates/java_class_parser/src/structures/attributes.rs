//! Parsed attributes

use crate::constant_pool::parser::parse_attribute_info;
use crate::constant_pool::ConstantPool;
use crate::error::{Error, ErrorKind};
use crate::raw_java_class::RawAttributeInfo;
use crate::structures::fully_qualified_name::FQName;
use crate::HasAttributes;
use nom::bytes::complete::take;
use nom::combinator::{complete, flat_map, map};
use nom::multi::count;
use nom::number::complete::{be_u16, be_u32};
use nom::sequence::tuple;
use nom::{Finish, IResult};
use std::fmt::{Debug, Formatter};

/// An attribute info piece. Can be parsed into usable data
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    attribute_name: &'a str,
    length: usize,
    kind: AttributeKind<'a>,
}

/// The kind of attribute
#[derive(Debug, Clone)]
pub enum AttributeKind<'a> {
    /// Java bytecode
    Code(Code<'a>),
    /// The classes nested in, or enclosing, this class
    InnerClasses(Vec<InnerClass<'a>>),
    /// The name of the source file the class was compiled from
    SourceFile(&'a str),
    /// An attribute this crate doesn't interpret
    Unknown(&'a [u8]),
}

impl<'a> Attribute<'a> {
    pub(crate) fn new(
        pool: &'a ConstantPool,
        attribute_name: &'a str,
        bytes: &'a [u8],
    ) -> Result<Self, Error> {
        let error = || Error::new(ErrorKind::ResolveAttribute(attribute_name.to_string()));

        let kind: AttributeKind = match attribute_name {
            "Code" => AttributeKind::Code(parse_code(pool, bytes)?),
            "InnerClasses" => {
                let parser = |bytes| -> IResult<&[u8], Vec<(u16, u16, u16, u16)>> {
                    flat_map(be_u16, |length: u16| {
                        count(tuple((be_u16, be_u16, be_u16, be_u16)), length as usize)
                    })(bytes)
                };
                let (_, entries) = parser(bytes).finish().map_err(|_| error())?;
                let inner_classes = entries
                    .into_iter()
                    .map(|(inner, outer, name, access_flags)| -> Result<InnerClass, Error> {
                        Ok(InnerClass {
                            inner: pool.class_name(inner)?,
                            outer: optional_index(outer)
                                .map(|outer| pool.class_name(outer))
                                .transpose()?,
                            simple_name: optional_index(name)
                                .map(|name| pool.utf8(name))
                                .transpose()?,
                            access_flags,
                        })
                    })
                    .collect::<Result<Vec<_>, Error>>()?;
                AttributeKind::InnerClasses(inner_classes)
            }
            "SourceFile" => {
                let (_, index) = be_u16::<_, nom::error::Error<&[u8]>>(bytes)
                    .finish()
                    .map_err(|_| error())?;
                AttributeKind::SourceFile(pool.utf8(index)?)
            }
            _ => AttributeKind::Unknown(bytes),
        };
        Ok(Self {
            attribute_name,
            length: bytes.len(),
            kind,
        })
    }

    /// Gets the name of the attribute
    pub fn attribute_name(&self) -> &'a str {
        self.attribute_name
    }

    /// The length of the attribute's info, in bytes
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the attribute carries no info at all
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Gets the attribute kind.
    ///
    /// If the attribute kind is not known (based on the attribute name), the
    /// [unknown](AttributeKind::Unknown) member is returned).
    pub fn kind(&self) -> &AttributeKind<'a> {
        &self.kind
    }
}

fn optional_index(index: u16) -> Option<u16> {
    (index != 0).then_some(index)
}

/// Creates attributes from their raw form, resolving names through the pool
pub(crate) fn create_attributes<'a>(
    pool: &'a ConstantPool,
    raw: &'a [RawAttributeInfo],
) -> Vec<Result<Attribute<'a>, Error>> {
    raw.iter()
        .map(|raw| {
            let name = pool.utf8(raw.attribute_name_index)?;
            Attribute::new(pool, name, &raw.info)
        })
        .collect()
}

/// The code attribute
#[derive(Clone)]
pub struct Code<'a> {
    pool: &'a ConstantPool,
    max_stack: u16,
    max_locals: u16,
    code: &'a [u8],
    exception_table: Vec<Exception<'a>>,
    attributes: Box<[RawAttributeInfo]>,
}

impl<'a> Code<'a> {
    /// The maximum stack values
    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }
    /// The maximum numbers of locals used
    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }

    /// The bytecode
    pub fn code(&self) -> &'a [u8] {
        self.code
    }

    /// The exceptions that can occur in the code
    pub fn exception_table(&self) -> &[Exception<'a>] {
        &self.exception_table[..]
    }
}

impl HasAttributes for Code<'_> {
    type Iter<'a> = <Vec<Result<Attribute<'a>, Error>> as IntoIterator>::IntoIter where Self: 'a;

    fn attributes<'a>(&'a self) -> Self::Iter<'a> {
        create_attributes(self.pool, &self.attributes).into_iter()
    }
}

impl Debug for Code<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Code")
            .field("max_stack", &self.max_stack)
            .field("max_locals", &self.max_locals)
            .field("code", &self.code)
            .field("exception_table", &self.exception_table)
            .field("attributes", &self.attributes.len())
            .finish()
    }
}

/// Each entry in the exception table describes one exception handler in the code array.
#[derive(Debug, Clone)]
pub struct Exception<'a> {
    start_pc: u16,
    end_pc: u16,
    handler_pc: u16,
    catch_type: Option<&'a FQName>,
}

impl<'a> Exception<'a> {
    /// The start bytecode for this exception handler
    pub fn start_pc(&self) -> u16 {
        self.start_pc
    }
    /// The end bytecode for this exception handler
    pub fn end_pc(&self) -> u16 {
        self.end_pc
    }

    /// The bytecode to go to if an exception is thrown
    pub fn handler_pc(&self) -> u16 {
        self.handler_pc
    }
    /// An optional catch type that the exception must be
    pub fn catch_type(&self) -> Option<&FQName> {
        self.catch_type
    }
}

/// One entry of the `InnerClasses` attribute
#[derive(Debug, Clone)]
pub struct InnerClass<'a> {
    inner: &'a FQName,
    outer: Option<&'a FQName>,
    simple_name: Option<&'a str>,
    access_flags: u16,
}

impl<'a> InnerClass<'a> {
    /// The nested class
    pub fn inner(&self) -> &'a FQName {
        self.inner
    }
    /// The class the nested class is a member of, absent for local and anonymous classes
    pub fn outer(&self) -> Option<&'a FQName> {
        self.outer
    }
    /// The name in source, absent for anonymous classes
    pub fn simple_name(&self) -> Option<&'a str> {
        self.simple_name
    }
    /// The access flags the nested class was declared with
    pub fn access_flags(&self) -> u16 {
        self.access_flags
    }
}

/// Parses the info of a `Code` attribute
pub(crate) fn parse_code<'a>(pool: &'a ConstantPool, bytes: &'a [u8]) -> Result<Code<'a>, Error> {
    parse_code_attr(bytes, pool)
        .finish()
        .map(|(_, code)| code)
        .map_err(|_| Error::new(ErrorKind::ResolveAttribute("Code".to_string())))
}

fn parse_code_attr<'a>(info: &'a [u8], pool: &'a ConstantPool) -> IResult<&'a [u8], Code<'a>> {
    map(
        complete(tuple((
            be_u16,
            be_u16,
            flat_map(be_u32, |code_length: u32| take(code_length)),
            flat_map(be_u16, |exception_table_length: u16| {
                count(
                    |b| parse_exception(b, pool),
                    exception_table_length as usize,
                )
            }),
            flat_map(be_u16, |attribute_length: u16| {
                count(parse_attribute_info, attribute_length as usize)
            }),
        ))),
        |(max_stack, max_locals, code, exception_table, attributes)| Code {
            pool,
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes: attributes.into_boxed_slice(),
        },
    )(info)
}

fn parse_exception<'a>(bytes: &'a [u8], pool: &'a ConstantPool) -> IResult<&'a [u8], Exception<'a>> {
    map(
        tuple((be_u16, be_u16, be_u16, be_u16)),
        |(start_pc, end_pc, handler_pc, catch_type_index)| Exception {
            start_pc,
            end_pc,
            handler_pc,
            catch_type: optional_index(catch_type_index)
                .and_then(|index| pool.class_name(index).ok()),
        },
    )(bytes)
}
