//! The structured view of a class that rendering works from. Handles are produced by a
//! [`TypeProvider`](crate::provider::TypeProvider) and are immutable once shared.

use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter, LowerExp};
use std::sync::Arc;

use bitflags::bitflags;
use indexmap::IndexSet;

use crate::descriptor::{JavaType, MethodDescriptor};
use crate::error::Error;
use crate::instruction::Instructions;

bitflags! {
    /// Access and property flags shared by classes, fields and methods. Some bits mean
    /// different things depending on what they are attached to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        /// `ACC_SUPER` on classes
        const SYNCHRONIZED = 0x0020;
        /// `ACC_BRIDGE` on methods
        const VOLATILE = 0x0040;
        /// `ACC_VARARGS` on methods
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

/// A class, as seen by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHandle {
    name: String,
    modifiers: Modifiers,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<FieldHandle>,
    constructors: Vec<MethodHandle>,
    methods: Vec<MethodHandle>,
    nested_classes: Vec<String>,
    referenced_classes: IndexSet<String>,
    source_file: Option<String>,
    synthetic: bool,
}

impl ClassHandle {
    /// Creates a public class with the given binary name and no members
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::PUBLIC,
            super_class: None,
            interfaces: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![],
            nested_classes: vec![],
            referenced_classes: IndexSet::new(),
            source_file: None,
            synthetic: false,
        }
    }

    /// A stand-in for a class that couldn't be found. Carries nothing but its name.
    pub fn synthetic<S: Into<String>>(name: S) -> Self {
        Self {
            synthetic: true,
            ..Self::new(name)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_super_class<S: Into<String>>(mut self, super_class: S) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn with_interface<S: Into<String>>(mut self, interface: S) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_field(mut self, field: FieldHandle) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_constructor(mut self, constructor: MethodHandle) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_method(mut self, method: MethodHandle) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_nested_class<S: Into<String>>(mut self, nested: S) -> Self {
        self.nested_classes.push(nested.into());
        self
    }

    /// Records a class this one refers to. The class's own name and repeats are ignored.
    pub fn with_referenced_class<S: Into<String>>(mut self, referenced: S) -> Self {
        let referenced = referenced.into();
        if referenced != self.name {
            self.referenced_classes.insert(referenced);
        }
        self
    }

    pub fn with_source_file<S: Into<String>>(mut self, source_file: S) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// The binary name, like `java.lang.String`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Everything after the last `.` of the name
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// The package, `None` for the default package
    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(package, _)| package)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers.contains(Modifiers::INTERFACE)
    }

    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn fields(&self) -> &[FieldHandle] {
        &self.fields
    }

    pub fn constructors(&self) -> &[MethodHandle] {
        &self.constructors
    }

    pub fn methods(&self) -> &[MethodHandle] {
        &self.methods
    }

    pub fn nested_classes(&self) -> &[String] {
        &self.nested_classes
    }

    /// Classes this class refers to, in the order they were first seen, never including itself
    pub fn referenced_classes(&self) -> impl Iterator<Item = &str> {
        self.referenced_classes.iter().map(String::as_str)
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Whether this handle was made up for a class that couldn't be found
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

/// Everything after the last `.` of a binary name
pub fn simple_name(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, simple)| simple)
}

/// A field declared in a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHandle {
    name: String,
    descriptor: String,
    modifiers: Modifiers,
}

impl FieldHandle {
    pub fn new<N: Into<String>, D: Into<String>>(name: N, descriptor: D, modifiers: Modifiers) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            modifiers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw descriptor, like `Ljava/lang/String;`
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Parses the descriptor
    pub fn field_type(&self) -> Result<JavaType, Error> {
        self.descriptor.parse()
    }
}

/// A method or constructor declared in a class. Constructors are named `<init>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodHandle {
    name: String,
    descriptor: String,
    modifiers: Modifiers,
    body: Option<BytecodeBody>,
    attributes: Vec<AttributeSummary>,
}

impl MethodHandle {
    /// A method without a body
    pub fn new<N: Into<String>, D: Into<String>>(name: N, descriptor: D, modifiers: Modifiers) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            modifiers,
            body: None,
            attributes: vec![],
        }
    }

    pub fn with_body(mut self, body: BytecodeBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Records an attribute the method carries, shown when the body is missing
    pub fn with_attribute(mut self, attribute: AttributeSummary) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw descriptor, like `(I)V`
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Abstract and native methods are declared without a body
    pub fn is_bodiless(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::ABSTRACT | Modifiers::NATIVE)
    }

    pub fn body(&self) -> Option<&BytecodeBody> {
        self.body.as_ref()
    }

    pub fn attributes(&self) -> &[AttributeSummary] {
        &self.attributes
    }

    /// Parses the descriptor into parameter and return types
    pub fn signature(&self) -> Result<MethodDescriptor, Error> {
        self.descriptor.parse()
    }
}

/// The name and size of an attribute that isn't otherwise interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSummary {
    pub name: String,
    pub length: usize,
}

impl Display for AttributeSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.length)
    }
}

/// The instructions of one method, and the constants they refer to
#[derive(Debug, Clone, PartialEq)]
pub struct BytecodeBody {
    code: Vec<u8>,
    constant_pool: Arc<ConstantPool>,
}

impl BytecodeBody {
    pub fn new(code: Vec<u8>, constant_pool: Arc<ConstantPool>) -> Self {
        Self {
            code,
            constant_pool,
        }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    /// Iterates over the instructions in order
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.code)
    }
}

/// The constants instructions can refer to, keyed by their constant pool index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    entries: BTreeMap<u16, ConstantPoolRef>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: u16, entry: ConstantPoolRef) {
        self.entries.insert(index, entry);
    }

    pub fn get(&self, index: u16) -> Option<&ConstantPoolRef> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u16, ConstantPoolRef)> for ConstantPool {
    fn from_iter<T: IntoIterator<Item = (u16, ConstantPoolRef)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// What a constant pool index refers to
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolRef {
    Literal(Literal),
    /// A binary class name, or an array descriptor like `[I`
    Class(String),
    Field(MemberRef),
    Method(MemberRef),
}

/// A field or method of some class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// binary name of the owner, or an array descriptor for methods called on arrays
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MemberRef {
    pub fn new<O, N, D>(owner: O, name: N, descriptor: D) -> Self
    where
        O: Into<String>,
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// A constant that `ldc` can push
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(string) => write!(f, "{}", string),
            Literal::Int(int) => write!(f, "{}", int),
            Literal::Float(float) => write_java_decimal(f, *float),
            Literal::Long(long) => write!(f, "{}", long),
            Literal::Double(double) => write_java_decimal(f, *double),
        }
    }
}

/// Writes a float or double the way `Float.toString` and `Double.toString` do: plain decimals
/// for magnitudes in `[1e-3, 1e7)`, computerized scientific notation (`1.0E10`) outside them.
fn write_java_decimal<T>(f: &mut Formatter<'_>, value: T) -> std::fmt::Result
where
    T: Copy + Into<f64> + Debug + LowerExp,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return f.write_str("NaN");
    }
    if wide.is_infinite() {
        return f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" });
    }
    let magnitude = wide.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return write!(f, "{:?}", value);
    }
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        write!(f, "{}E{}", mantissa, exponent)
    } else {
        write!(f, "{}.0E{}", mantissa, exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_references_itself() {
        let class = ClassHandle::new("com.example.Square")
            .with_referenced_class("java.lang.Object")
            .with_referenced_class("com.example.Square")
            .with_referenced_class("java.lang.Object")
            .with_referenced_class("com.example.Shape");
        assert_eq!(
            class.referenced_classes().collect::<Vec<_>>(),
            ["java.lang.Object", "com.example.Shape"]
        );
    }

    #[test]
    fn names() {
        let class = ClassHandle::new("com.example.Square$Side");
        assert_eq!(class.simple_name(), "Square$Side");
        assert_eq!(class.package(), Some("com.example"));
        let class = ClassHandle::synthetic("Main");
        assert_eq!(class.simple_name(), "Main");
        assert_eq!(class.package(), None);
        assert!(class.is_synthetic());
    }

    #[test]
    fn literals_display_like_source() {
        assert_eq!(Literal::Int(-3).to_string(), "-3");
        assert_eq!(Literal::Float(1.0).to_string(), "1.0");
        assert_eq!(Literal::Double(0.5).to_string(), "0.5");
        assert_eq!(Literal::Long(1 << 40).to_string(), "1099511627776");
        assert_eq!(Literal::Float(f32::INFINITY).to_string(), "Infinity");
        assert_eq!(Literal::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Literal::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(Literal::Double(1e10).to_string(), "1.0E10");
        assert_eq!(Literal::Float(1e7).to_string(), "1.0E7");
        assert_eq!(Literal::Double(-1.5e-5).to_string(), "-1.5E-5");
        assert_eq!(Literal::Float(0.1).to_string(), "0.1");
        assert_eq!(Literal::Double(0.001).to_string(), "0.001");
        assert_eq!(Literal::Double(1234567.0).to_string(), "1234567.0");
        assert_eq!(Literal::Float(-0.0).to_string(), "-0.0");
    }
}
