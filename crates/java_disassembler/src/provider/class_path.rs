use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use java_class_parser::classpath::Classpath;
use java_class_parser::constant_pool::{ConstantPoolInfo, Loadable, MemberRefKind};
use java_class_parser::error::ErrorKind as ParseErrorKind;
use java_class_parser::{FQName, HasAttributes, JavaClass, JavaClassParser, Method};
use log::{trace, warn};

use crate::descriptor::JavaType;
use crate::error::{Error, ErrorKind};
use crate::model::{
    AttributeSummary, BytecodeBody, ClassHandle, ConstantPool, ConstantPoolRef, FieldHandle,
    Literal, MemberRef, MethodHandle, Modifiers,
};
use crate::provider::TypeProvider;
use crate::resolver::ROOT_TYPE;

/// Reads classes from directories, class files and jars on a classpath
#[derive(Debug)]
pub struct ClassPathProvider {
    parser: JavaClassParser,
    cache: RefCell<HashMap<String, Arc<ClassHandle>>>,
}

impl ClassPathProvider {
    pub fn new(classpath: Classpath) -> Self {
        Self {
            parser: JavaClassParser::with_classpath(classpath),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn classpath(&self) -> &Classpath {
        self.parser.classpath()
    }
}

impl<P: AsRef<std::path::Path>> FromIterator<P> for ClassPathProvider {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        Self::new(Classpath::from_iter(iter))
    }
}

impl TypeProvider for ClassPathProvider {
    fn lookup(&self, name: &str) -> Result<Arc<ClassHandle>, Error> {
        if let Some(cached) = self.cache.borrow().get(name) {
            return Ok(cached.clone());
        }
        let class = match self.parser.find(name) {
            Ok(class) => convert(&class)?,
            // every jvm has Object, even when the classpath doesn't
            Err(error) if matches!(error.kind(), ParseErrorKind::NoClassFound(_)) => {
                if name != ROOT_TYPE {
                    return Err(ErrorKind::TypeNotFound(name.to_string()).into());
                }
                ClassHandle::new(ROOT_TYPE)
            }
            Err(error) => return Err(error.into()),
        };
        trace!("loaded {} from the classpath", class.name());
        let class = Arc::new(class);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), class.clone());
        Ok(class)
    }
}

fn literal(loadable: Loadable) -> Option<Literal> {
    let literal = match loadable {
        Loadable::String(string) => Literal::String(string.to_string()),
        Loadable::Integer(int) => Literal::Int(int),
        Loadable::Float(float) => Literal::Float(float),
        Loadable::Long(long) => Literal::Long(long),
        Loadable::Double(double) => Literal::Double(double),
        Loadable::Class(_) | Loadable::Other => return None,
    };
    Some(literal)
}

/// Internal names become binary names, array descriptors are kept as they are
fn class_name(name: &FQName) -> String {
    if name.is_array() {
        name.as_str().to_string()
    } else {
        name.to_binary_name()
    }
}

fn convert(class: &JavaClass) -> Result<ClassHandle, Error> {
    let this = class.this()?.to_binary_name();
    let mut handle =
        ClassHandle::new(this.as_str()).with_modifiers(Modifiers::from_bits_retain(class.access_flags()));
    if let Some(super_name) = class.super_name()? {
        handle = handle.with_super_class(super_name.to_binary_name());
    }
    for interface in class.interfaces()? {
        handle = handle.with_interface(interface.to_binary_name());
    }
    for referenced in class.referenced_classes()? {
        if let Some(name) = import_name(referenced) {
            handle = handle.with_referenced_class(name);
        }
    }
    if let Some(source_file) = class.source_file() {
        handle = handle.with_source_file(source_file);
    }
    for nested in class.nested_classes()? {
        handle = handle.with_nested_class(nested.inner().to_binary_name());
    }

    for field in class.fields() {
        handle = handle.with_field(FieldHandle::new(
            field.name()?,
            field.descriptor()?,
            Modifiers::from_bits_retain(field.access_flags()),
        ));
    }

    let pool = Arc::new(convert_pool(class));
    for method in class.methods() {
        match method.name()? {
            "<clinit>" => {}
            "<init>" => handle = handle.with_constructor(convert_method(&this, &method, &pool)?),
            _ => handle = handle.with_method(convert_method(&this, &method, &pool)?),
        }
    }
    Ok(handle)
}

/// The class a `Class` constant makes worth importing. Arrays import their element class,
/// arrays of primitives import nothing.
fn import_name(referenced: &FQName) -> Option<String> {
    if !referenced.is_array() {
        return Some(referenced.to_binary_name());
    }
    match referenced.as_str().parse::<JavaType>().ok()?.element() {
        (JavaType::Class(element), _) => Some(element.clone()),
        _ => None,
    }
}

fn convert_method(owner: &str, method: &Method, pool: &Arc<ConstantPool>) -> Result<MethodHandle, Error> {
    let mut handle = MethodHandle::new(
        method.name()?,
        method.descriptor()?,
        Modifiers::from_bits_retain(method.access_flags()),
    );
    match method.code() {
        Some(Ok(code)) => handle = handle.with_body(BytecodeBody::new(code.code().to_vec(), pool.clone())),
        Some(Err(error)) => warn!(
            "ignoring malformed code of {}.{}: {}",
            owner,
            method.name()?,
            error
        ),
        None => {}
    }
    for attribute in method.attributes().filter_map(Result::ok) {
        handle = handle.with_attribute(AttributeSummary {
            name: attribute.attribute_name().to_string(),
            length: attribute.len(),
        });
    }
    Ok(handle)
}

/// Keeps the constants instructions can refer to. Entries that can't be resolved are left out,
/// and fail the instruction that uses them instead.
fn convert_pool(class: &JavaClass) -> ConstantPool {
    let pool = class.constant_pool();
    pool.iter()
        .filter_map(|(index, info)| {
            let entry = match info {
                ConstantPoolInfo::Class { .. } => pool
                    .class_name(index)
                    .map(|name| ConstantPoolRef::Class(class_name(name))),
                ConstantPoolInfo::FieldRef { .. }
                | ConstantPoolInfo::MethodRef { .. }
                | ConstantPoolInfo::InterfaceMethodRef { .. } => pool.member_ref(index).map(|member| {
                    let reference = MemberRef::new(class_name(member.owner), member.name, member.descriptor);
                    match member.kind {
                        MemberRefKind::Field => ConstantPoolRef::Field(reference),
                        MemberRefKind::Method | MemberRefKind::InterfaceMethod => {
                            ConstantPoolRef::Method(reference)
                        }
                    }
                }),
                ConstantPoolInfo::String { .. }
                | ConstantPoolInfo::Integer(_)
                | ConstantPoolInfo::Float(_)
                | ConstantPoolInfo::Long(_)
                | ConstantPoolInfo::Double(_) => match pool.loadable(index) {
                    Ok(loadable) => Ok(ConstantPoolRef::Literal(literal(loadable)?)),
                    Err(error) => Err(error),
                },
                _ => return None,
            };
            match entry {
                Ok(entry) => Some((index, entry)),
                Err(error) => {
                    trace!("skipping constant {}: {}", index, error);
                    None
                }
            }
        })
        .collect()
}
