//! Java-like declarations for a class and its members

use log::warn;

use crate::descriptor::JavaType;
use crate::disassembler::{Diagnostic, DiagnosticKind};
use crate::error::{Error, ErrorKind};
use crate::instruction::{write_type, InstructionRenderer};
use crate::model::{ClassHandle, FieldHandle, MethodHandle, Modifiers};
use crate::provider::TypeProvider;
use crate::resolver::{Resolver, ENUM_BASE_TYPE, ROOT_TYPE};
use crate::styled::StyledDocument;

pub(crate) const BYTECODE_ERROR: &str = "An error occurred parsing bytecode!";
pub(crate) const MISSING_CODE: &str = "Error: method is missing CodeAttribute!";

/// Renders the declarations of one class
pub struct DeclarationRenderer<'a, P> {
    resolver: &'a Resolver<P>,
    class: &'a ClassHandle,
}

impl<'a, P: TypeProvider> DeclarationRenderer<'a, P> {
    pub fn new(resolver: &'a Resolver<P>, class: &'a ClassHandle) -> Self {
        Self { resolver, class }
    }

    /// The package line, the imports and the class line up to and including its `{`
    pub fn write_header(&self, doc: &mut StyledDocument) {
        if let Some(package) = self.class.package() {
            doc.keyword("package ");
            doc.text(package);
            doc.text(";");
            doc.new_line();
            doc.new_line();
        }

        for import in self.class.referenced_classes() {
            doc.keyword("import ");
            doc.type_name(import);
            doc.text(";");
            doc.new_line();
        }
        doc.new_line();

        self.write_class_line(doc);
        doc.text("{");
        doc.new_line();
    }

    fn write_class_line(&self, doc: &mut StyledDocument) {
        let modifiers = self.class.modifiers();
        write_common_modifiers(doc, modifiers);
        if !self.class.is_interface() && modifiers.contains(Modifiers::ABSTRACT) {
            doc.keyword("abstract ");
        }
        if modifiers.contains(Modifiers::STRICT) {
            doc.keyword("strictfp ");
        }
        // annotation types carry the interface flag as well
        if modifiers.contains(Modifiers::ANNOTATION) {
            doc.keyword("@interface ");
        } else if modifiers.contains(Modifiers::INTERFACE) {
            doc.keyword("interface ");
        } else if modifiers.contains(Modifiers::ENUM) {
            doc.keyword("enum ");
        } else {
            doc.keyword("class ");
        }
        doc.type_name(self.class.simple_name());
        doc.text(" ");

        let super_class = self
            .class
            .super_class()
            .filter(|name| *name != ROOT_TYPE && *name != ENUM_BASE_TYPE)
            .and_then(|name| self.resolver.resolve(name));
        if let Some(super_class) = super_class {
            doc.keyword("extends ");
            doc.type_name(super_class.simple_name());
            doc.text(" ");
        }

        let interfaces = self.class.interfaces();
        if !interfaces.is_empty() {
            doc.keyword("implements ");
            for (i, interface) in interfaces.iter().enumerate() {
                if i > 0 {
                    doc.text(", ");
                }
                doc.type_name(self.resolver.simple_name(interface));
            }
            doc.text(" ");
        }
    }

    pub fn write_field(&self, doc: &mut StyledDocument, field: &FieldHandle) -> Result<(), Error> {
        let field_type = field.field_type()?;
        let modifiers = field.modifiers();
        write_common_modifiers(doc, modifiers);
        if modifiers.contains(Modifiers::TRANSIENT) {
            doc.keyword("transient ");
        }
        if modifiers.contains(Modifiers::VOLATILE) {
            doc.keyword("volatile ");
        }
        write_type(doc, self.resolver, &field_type);
        doc.text(" ");
        if field.is_static() {
            doc.static_name(field.name());
        } else {
            doc.text(field.name());
        }
        doc.text(";");
        doc.new_line();
        Ok(())
    }

    /// Writes a constructor with its body. Faults inside the body are rendered inline and
    /// returned.
    pub fn write_constructor(
        &self,
        doc: &mut StyledDocument,
        constructor: &MethodHandle,
    ) -> Result<Vec<Diagnostic>, Error> {
        let signature = constructor.signature()?;
        let modifiers = constructor.modifiers();
        write_common_modifiers(doc, modifiers);
        if modifiers.contains(Modifiers::SYNCHRONIZED) {
            doc.keyword("synchronized ");
        }
        if modifiers.contains(Modifiers::STRICT) {
            doc.keyword("strictfp ");
        }
        doc.type_name(self.class.simple_name());
        doc.text("(");
        self.write_parameters(doc, &signature.parameters);
        doc.text(") {");
        let diagnostics = self.write_body(doc, constructor)?;
        doc.text("}");
        doc.new_lines(2);
        Ok(diagnostics)
    }

    /// Writes a method, with its body unless it is abstract or native. Faults inside the body
    /// are rendered inline and returned.
    pub fn write_method(&self, doc: &mut StyledDocument, method: &MethodHandle) -> Result<Vec<Diagnostic>, Error> {
        let signature = method.signature()?;
        if self.class.is_interface() {
            write_interface_method_modifiers(doc, method.modifiers());
        } else {
            write_method_modifiers(doc, method.modifiers());
        }
        write_type(doc, self.resolver, &signature.return_type);
        doc.type_name(" ");
        if method.is_static() {
            doc.static_name(method.name());
        } else {
            doc.text(method.name());
        }
        doc.text("(");
        self.write_parameters(doc, &signature.parameters);
        if method.is_bodiless() {
            doc.text(");");
            doc.new_lines(2);
            return Ok(vec![]);
        }
        doc.text(") {");
        let diagnostics = self.write_body(doc, method)?;
        doc.text("}");
        doc.new_lines(2);
        Ok(diagnostics)
    }

    /// `Type argN` pairs, named by position
    fn write_parameters(&self, doc: &mut StyledDocument, parameters: &[JavaType]) {
        for (i, parameter) in parameters.iter().enumerate() {
            if i > 0 {
                doc.text(", ");
            }
            write_type(doc, self.resolver, parameter);
            doc.text(" ");
            doc.text(format!("arg{}", i));
        }
    }

    /// Writes the instructions, one per line, indented one level deeper than the declaration.
    /// Leaves the document on a fresh line at the declaration's indent.
    fn write_body(&self, doc: &mut StyledDocument, method: &MethodHandle) -> Result<Vec<Diagnostic>, Error> {
        let mut diagnostics = vec![];
        doc.increase_indent();
        doc.new_line();

        match method.body() {
            Some(body) => {
                let renderer = InstructionRenderer::new(self.resolver, body.constant_pool());
                let mut instructions = body.instructions().peekable();
                while let Some(instruction) = instructions.next() {
                    match instruction.and_then(|instruction| renderer.render(doc, &instruction)) {
                        Ok(()) => {
                            if instructions.peek().is_some() {
                                doc.new_line();
                            }
                        }
                        Err(error) if matches!(error.kind(), ErrorKind::BytecodeDecode { .. }) => {
                            warn!("{} in {}: {}", BYTECODE_ERROR, self.member_path(method), error);
                            doc.bytecode(BYTECODE_ERROR);
                            diagnostics.push(self.diagnostic(method, DiagnosticKind::BytecodeDecode, &error));
                            break;
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
            None => {
                let error = Error::new(ErrorKind::MissingCodeAttribute(member_key(method)));
                warn!("{}: {}", self.member_path(method), error);
                doc.bytecode(MISSING_CODE);
                doc.new_line();
                if method.attributes().is_empty() {
                    doc.bytecode("Attributes list is empty!  Current context: ");
                    doc.new_line();
                    doc.new_line();
                    doc.bytecode(format!("class {}", self.class.name()));
                    doc.new_line();
                    doc.bytecode(format!("method {}", member_key(method)));
                } else {
                    doc.bytecode("Attributes: ");
                    for attribute in method.attributes() {
                        doc.new_line();
                        doc.bytecode(attribute.to_string());
                    }
                }
                diagnostics.push(self.diagnostic(method, DiagnosticKind::MissingCodeAttribute, &error));
            }
        }

        doc.decrease_indent();
        doc.new_line();
        Ok(diagnostics)
    }

    fn member_path(&self, method: &MethodHandle) -> String {
        format!("{}.{}", self.class.name(), member_key(method))
    }

    fn diagnostic(&self, method: &MethodHandle, kind: DiagnosticKind, error: &Error) -> Diagnostic {
        Diagnostic {
            member: member_key(method),
            kind,
            message: error.to_string(),
        }
    }
}

/// How a method is identified in diagnostics and the member index, like `run()V`
pub fn member_key(method: &MethodHandle) -> String {
    format!("{}{}", method.name(), method.descriptor())
}

fn write_common_modifiers(doc: &mut StyledDocument, modifiers: Modifiers) {
    if modifiers.contains(Modifiers::PUBLIC) {
        doc.keyword("public ");
    } else if modifiers.contains(Modifiers::PRIVATE) {
        doc.keyword("private ");
    } else if modifiers.contains(Modifiers::PROTECTED) {
        doc.keyword("protected ");
    }
    if modifiers.contains(Modifiers::STATIC) {
        doc.keyword("static ");
    }
    if modifiers.contains(Modifiers::FINAL) {
        doc.keyword("final ");
    }
}

fn write_method_modifiers(doc: &mut StyledDocument, modifiers: Modifiers) {
    write_common_modifiers(doc, modifiers);
    if modifiers.contains(Modifiers::SYNCHRONIZED) {
        doc.keyword("synchronized ");
    }
    if modifiers.contains(Modifiers::NATIVE) {
        doc.keyword("native ");
    }
    if modifiers.contains(Modifiers::ABSTRACT) {
        doc.keyword("abstract ");
    }
    if modifiers.contains(Modifiers::STRICT) {
        doc.keyword("strictfp ");
    }
}

/// Interface methods are implicitly public and abstract. Only static ones show their modifiers.
fn write_interface_method_modifiers(doc: &mut StyledDocument, modifiers: Modifiers) {
    if modifiers.contains(Modifiers::STATIC) {
        write_method_modifiers(doc, modifiers);
    } else if modifiers.contains(Modifiers::STRICT) {
        doc.keyword("strictfp ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BytecodeBody, ConstantPool};
    use crate::provider::MemoryProvider;
    use crate::styled::OutputFormat;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn plain<F>(class: &ClassHandle, write: F) -> String
    where
        F: FnOnce(&DeclarationRenderer<MemoryProvider>, &mut StyledDocument),
    {
        let resolver = Resolver::new(MemoryProvider::new());
        let renderer = DeclarationRenderer::new(&resolver, class);
        let mut doc = StyledDocument::new();
        write(&renderer, &mut doc);
        doc.finish(OutputFormat::Plain)
    }

    fn class_line(class: &ClassHandle) -> String {
        plain(class, |renderer, doc| renderer.write_class_line(doc))
    }

    #[test]
    fn class_lines() {
        let class = ClassHandle::new("a.Shape")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .with_super_class(ROOT_TYPE)
            .with_interface("a.Drawable")
            .with_interface("java.io.Serializable");
        assert_eq!(class_line(&class), "public abstract class Shape implements Drawable, Serializable ");

        let interface = ClassHandle::new("a.Drawable")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::INTERFACE | Modifiers::ABSTRACT);
        assert_eq!(class_line(&interface), "public interface Drawable ");

        let annotation = ClassHandle::new("a.Marker").with_modifiers(
            Modifiers::PUBLIC | Modifiers::INTERFACE | Modifiers::ABSTRACT | Modifiers::ANNOTATION,
        );
        assert_eq!(class_line(&annotation), "public @interface Marker ");

        let enumeration = ClassHandle::new("a.Color")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL | Modifiers::ENUM)
            .with_super_class(ENUM_BASE_TYPE);
        assert_eq!(class_line(&enumeration), "public final enum Color ");

        let square = ClassHandle::new("a.Square")
            .with_modifiers(Modifiers::empty())
            .with_super_class("a.b.Missing");
        assert_eq!(class_line(&square), "class Square extends Missing ");
    }

    #[test]
    fn fields() {
        let class = ClassHandle::new("a.Counter");
        let rendered = plain(&class, |renderer, doc| {
            let fields = [
                FieldHandle::new("count", "I", Modifiers::PRIVATE | Modifiers::VOLATILE),
                FieldHandle::new("names", "[Ljava/lang/String;", Modifiers::STATIC | Modifiers::TRANSIENT),
            ];
            for field in &fields {
                renderer.write_field(doc, field).unwrap();
            }
        });
        assert_eq!(rendered, "private volatile int count;\nstatic transient String[] names;\n");
    }

    #[test]
    fn static_names_are_styled_apart() {
        let class = ClassHandle::new("a.Counter");
        let resolver = Resolver::new(MemoryProvider::new());
        let renderer = DeclarationRenderer::new(&resolver, &class);
        let mut doc = StyledDocument::new();
        renderer
            .write_field(&mut doc, &FieldHandle::new("count", "I", Modifiers::STATIC))
            .unwrap();
        renderer
            .write_field(&mut doc, &FieldHandle::new("count", "I", Modifiers::empty()))
            .unwrap();
        let html = doc.finish(OutputFormat::Html);
        assert_eq!(html.matches("<i>count</i>").count(), 1);
        assert_eq!(html.matches("count").count(), 2);
    }

    #[test]
    fn methods() {
        let class = ClassHandle::new("a.Shape");
        let pool = Arc::new(ConstantPool::new());
        let rendered = plain(&class, |renderer, doc| {
            let area = MethodHandle::new("area", "()D", Modifiers::PUBLIC | Modifiers::ABSTRACT);
            let scale = MethodHandle::new("scale", "(ILa/Shape;)V", Modifiers::PUBLIC | Modifiers::STRICT)
                .with_body(BytecodeBody::new(vec![0x00, 0xb1], pool.clone()));
            let init = MethodHandle::new("<init>", "()V", Modifiers::PROTECTED)
                .with_body(BytecodeBody::new(vec![0xb1], pool.clone()));
            assert!(renderer.write_method(doc, &area).unwrap().is_empty());
            assert!(renderer.write_method(doc, &scale).unwrap().is_empty());
            assert!(renderer.write_constructor(doc, &init).unwrap().is_empty());
        });
        assert_eq!(
            rendered,
            concat!(
                "public abstract double area();\n\n",
                "public strictfp void scale(int arg0, Shape arg1) {\n",
                "    nop;\n",
                "    return;\n",
                "}\n\n",
                "protected Shape() {\n",
                "    return;\n",
                "}\n\n",
            )
        );
    }

    #[test]
    fn interface_methods_hide_implicit_modifiers() {
        let class = ClassHandle::new("a.Drawable").with_modifiers(Modifiers::INTERFACE | Modifiers::ABSTRACT);
        let rendered = plain(&class, |renderer, doc| {
            let draw = MethodHandle::new("draw", "()V", Modifiers::PUBLIC | Modifiers::ABSTRACT);
            let of = MethodHandle::new("of", "()La/Drawable;", Modifiers::PUBLIC | Modifiers::STATIC)
                .with_body(BytecodeBody::new(vec![0x01, 0xb0], Arc::new(ConstantPool::new())));
            renderer.write_method(doc, &draw).unwrap();
            renderer.write_method(doc, &of).unwrap();
        });
        assert!(rendered.starts_with("void draw();\n\npublic static Drawable of() {\n"));
    }

    #[test]
    fn missing_code_is_rendered_inline() {
        let class = ClassHandle::new("a.Shape");
        let mut diagnostics = vec![];
        let rendered = plain(&class, |renderer, doc| {
            let run = MethodHandle::new("run", "()V", Modifiers::PUBLIC);
            diagnostics = renderer.write_method(doc, &run).unwrap();
        });
        assert_eq!(
            rendered,
            concat!(
                "public void run() {\n",
                "    Error: method is missing CodeAttribute!\n",
                "    Attributes list is empty!  Current context: \n",
                "\n",
                "    class a.Shape\n",
                "    method run()V\n",
                "}\n\n",
            )
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingCodeAttribute);
        assert_eq!(diagnostics[0].member, "run()V");
    }

    #[test]
    fn attributes_are_listed_when_code_is_missing() {
        use crate::model::AttributeSummary;

        let class = ClassHandle::new("a.Shape");
        let rendered = plain(&class, |renderer, doc| {
            let run = MethodHandle::new("run", "()V", Modifiers::PUBLIC).with_attribute(AttributeSummary {
                name: "Deprecated".to_string(),
                length: 0,
            });
            renderer.write_method(doc, &run).unwrap();
        });
        assert!(rendered.contains("    Attributes: \n    Deprecated (0 bytes)\n}"));
    }

    #[test]
    fn truncated_bytecode_stops_the_body() {
        let class = ClassHandle::new("a.Shape");
        let mut diagnostics = vec![];
        let rendered = plain(&class, |renderer, doc| {
            let run = MethodHandle::new("run", "()V", Modifiers::empty())
                .with_body(BytecodeBody::new(vec![0x00, 0x11, 0x01], Arc::new(ConstantPool::new())));
            diagnostics = renderer.write_method(doc, &run).unwrap();
        });
        assert_eq!(
            rendered,
            "void run() {\n    nop;\n    An error occurred parsing bytecode!\n}\n\n"
        );
        assert_eq!(diagnostics[0].kind, DiagnosticKind::BytecodeDecode);
    }

    #[test]
    fn bad_descriptors_fail_the_member() {
        let class = ClassHandle::new("a.Shape");
        plain(&class, |renderer, doc| {
            let broken = MethodHandle::new("broken", "(Q)V", Modifiers::empty());
            assert!(renderer.write_method(doc, &broken).is_err());
            let broken = FieldHandle::new("broken", "L;", Modifiers::empty());
            assert!(renderer.write_field(doc, &broken).is_err());
        });
    }
}
