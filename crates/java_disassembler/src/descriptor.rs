//! Field and method descriptors, like `[Ljava/lang/String;` and `(IJ)V`

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::combinator::{all_consuming, map, map_opt, value};
use nom::multi::{many0, many0_count};
use nom::sequence::{delimited, pair, preceded};
use nom::{Finish, IResult};

use crate::error::{Error, ErrorKind};

/// A type as it appears in a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
    /// A class, by binary name
    Class(String),
    /// An array of up to 255 dimensions. The element is never itself an array.
    Array {
        element: Box<JavaType>,
        dimensions: u8,
    },
}

impl JavaType {
    /// The keyword for primitives and `void`, `None` for classes and arrays
    pub fn keyword(&self) -> Option<&'static str> {
        let keyword = match self {
            JavaType::Boolean => "boolean",
            JavaType::Byte => "byte",
            JavaType::Char => "char",
            JavaType::Short => "short",
            JavaType::Int => "int",
            JavaType::Long => "long",
            JavaType::Float => "float",
            JavaType::Double => "double",
            JavaType::Void => "void",
            JavaType::Class(_) | JavaType::Array { .. } => return None,
        };
        Some(keyword)
    }

    /// Strips every array level, returning the element type and the number of dimensions
    pub fn element(&self) -> (&JavaType, usize) {
        match self {
            JavaType::Array { element, dimensions } => (element, usize::from(*dimensions)),
            other => (other, 0),
        }
    }
}

impl Display for JavaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JavaType::Class(name) => write!(f, "{}", name),
            JavaType::Array { element, dimensions } => {
                write!(f, "{}{}", element, "[]".repeat(usize::from(*dimensions)))
            }
            primitive => write!(f, "{}", primitive.keyword().unwrap_or("?")),
        }
    }
}

impl FromStr for JavaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(java_type)(s)
            .finish()
            .map(|(_, parsed)| parsed)
            .map_err(|_| ErrorKind::InvalidDescriptor(s.to_string()).into())
    }
}

/// The parameter and return types of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<JavaType>,
    pub return_type: JavaType,
}

impl FromStr for MethodDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(method_descriptor)(s)
            .finish()
            .map(|(_, parsed)| parsed)
            .map_err(|_| ErrorKind::InvalidDescriptor(s.to_string()).into())
    }
}

/// A field type: any number of `[` followed by a primitive or a class
fn java_type(string: &str) -> IResult<&str, JavaType> {
    map_opt(
        pair(many0_count(tag("[")), element_type),
        |(dimensions, element)| match dimensions {
            0 => Some(element),
            dimensions => Some(JavaType::Array {
                element: Box::new(element),
                dimensions: u8::try_from(dimensions).ok()?,
            }),
        },
    )(string)
}

fn element_type(string: &str) -> IResult<&str, JavaType> {
    alt((
        value(JavaType::Boolean, tag("Z")),
        value(JavaType::Byte, tag("B")),
        value(JavaType::Char, tag("C")),
        value(JavaType::Short, tag("S")),
        value(JavaType::Int, tag("I")),
        value(JavaType::Long, tag("J")),
        value(JavaType::Float, tag("F")),
        value(JavaType::Double, tag("D")),
        map(
            delimited(tag("L"), take_till1(|c| c == ';'), tag(";")),
            |internal: &str| JavaType::Class(internal.replace('/', ".")),
        ),
    ))(string)
}

fn return_type(string: &str) -> IResult<&str, JavaType> {
    alt((value(JavaType::Void, tag("V")), java_type))(string)
}

fn method_descriptor(string: &str) -> IResult<&str, MethodDescriptor> {
    map(
        pair(delimited(tag("("), many0(java_type), tag(")")), return_type),
        |(parameters, return_type)| MethodDescriptor {
            parameters,
            return_type,
        },
    )(string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_method_descriptor() {
        let parsed: MethodDescriptor = "(Z[ILjava/lang/String;)Ljava/lang/Object;".parse().unwrap();
        assert_eq!(
            parsed,
            MethodDescriptor {
                parameters: vec![
                    JavaType::Boolean,
                    JavaType::Array {
                        element: Box::new(JavaType::Int),
                        dimensions: 1,
                    },
                    JavaType::Class("java.lang.String".to_string()),
                ],
                return_type: JavaType::Class("java.lang.Object".to_string()),
            }
        );
    }

    #[test]
    fn array_element() {
        let parsed: JavaType = "[[Ljava/util/List;".parse().unwrap();
        let (element, dimensions) = parsed.element();
        assert_eq!(element, &JavaType::Class("java.util.List".to_string()));
        assert_eq!(dimensions, 2);
        assert_eq!(parsed.to_string(), "java.util.List[][]");
    }

    #[test]
    fn rejects_malformed() {
        assert!("Ljava/lang/String".parse::<JavaType>().is_err());
        assert!("IV".parse::<JavaType>().is_err());
        assert!("(I".parse::<MethodDescriptor>().is_err());
        assert!("L;".parse::<JavaType>().is_err());
        assert!("[V".parse::<JavaType>().is_err());
        assert!("(V)V".parse::<MethodDescriptor>().is_err());
        let error = "Q".parse::<JavaType>().unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::InvalidDescriptor(d) if d == "Q"));
    }

    #[test]
    fn arrays_are_limited_to_255_dimensions() {
        let widest: JavaType = format!("{}I", "[".repeat(255)).parse().unwrap();
        assert_eq!(widest.element(), (&JavaType::Int, 255));

        let descriptor = format!("{}I", "[".repeat(256));
        let error = descriptor.parse::<JavaType>().unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::InvalidDescriptor(d) if *d == descriptor));
    }

    #[test]
    fn deep_nesting_is_rejected_without_recursion() {
        let field = format!("{}I", "[".repeat(65_000));
        assert!(field.parse::<JavaType>().is_err());
        let method = format!("({}I)V", "[".repeat(65_000));
        assert!(method.parse::<MethodDescriptor>().is_err());
    }
}
