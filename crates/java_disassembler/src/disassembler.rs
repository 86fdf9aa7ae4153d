//! The entry point: a whole class rendered into one document

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::declaration::{member_key, DeclarationRenderer};
use crate::error::Error;
use crate::model::ClassHandle;
use crate::provider::TypeProvider;
use crate::resolver::Resolver;
use crate::styled::{OutputFormat, StyledDocument};

const HTML_HEADER: &str = "<div style='white-space:nowrap; font-family:\"Monospaced\"'>\n";
const HTML_FOOTER: &str = "</div>";

const METHOD_FAILED: &str = "Exception occurred disassembling this method!";
const FIELD_FAILED: &str = "Exception occurred disassembling this field!";

/// What went wrong while rendering part of a class. None of these stop the rest of the class
/// from being rendered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A method body ended early or had an undecodable instruction
    BytecodeDecode,
    /// A method that should have code had none
    MissingCodeAttribute,
    /// A member could not be rendered at all, and was replaced by a marker
    MemberRender,
    /// The provider failed to read a referenced class, which was treated as missing
    Provider,
}

/// A recovered failure, reported next to the rendered text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// the field name, method name and descriptor, or class name the failure is about
    pub member: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} in {}: {}", self.kind, self.member, self.message)
    }
}

/// A rendered class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    text: String,
    diagnostics: Vec<Diagnostic>,
    members: IndexMap<String, usize>,
}

impl Disassembly {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The line a member's declaration starts on. Fields are keyed by name, methods and
    /// constructors by name and descriptor, like `<init>(I)V`.
    pub fn member_line(&self, member: &str) -> Option<usize> {
        self.members.get(member).copied()
    }

    /// Every member with the line it starts on, in the order they were rendered
    pub fn members(&self) -> impl Iterator<Item = (&str, usize)> {
        self.members
            .iter()
            .map(|(member, line)| (member.as_str(), *line))
    }
}

/// Renders classes supplied by a provider
#[derive(Debug, Clone)]
pub struct Disassembler<P> {
    provider: P,
    format: OutputFormat,
}

impl<P: TypeProvider> Disassembler<P> {
    /// A disassembler producing html
    pub fn new(provider: P) -> Self {
        Self::with_format(provider, OutputFormat::Html)
    }

    pub fn with_format(provider: P, format: OutputFormat) -> Self {
        Self { provider, format }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Looks up a class by binary name and renders it
    pub fn disassemble(&self, name: &str) -> Result<Disassembly, Error> {
        let class = self.provider.lookup(name)?;
        Ok(self.disassemble_class(&class))
    }

    /// Renders a class. Failures inside a member are rendered in its place and reported as
    /// diagnostics, they never fail the whole class.
    pub fn disassemble_class(&self, class: &ClassHandle) -> Disassembly {
        debug!("disassembling {}", class.name());
        let resolver = Resolver::new(&self.provider);
        for referenced in class.referenced_classes() {
            resolver.resolve(referenced);
        }

        let renderer = DeclarationRenderer::new(&resolver, class);
        let mut doc = StyledDocument::new();
        let mut diagnostics = vec![];
        let mut members = IndexMap::new();

        doc.raw(HTML_HEADER);
        renderer.write_header(&mut doc);
        doc.set_indent(1);
        doc.new_line();

        for field in class.fields() {
            members.insert(field.name().to_string(), doc.current_line());
            let checkpoint = doc.checkpoint();
            if let Err(error) = renderer.write_field(&mut doc, field) {
                doc.rollback(checkpoint);
                warn!("could not render field {}.{}: {}", class.name(), field.name(), error);
                write_marker(&mut doc, FIELD_FAILED);
                diagnostics.push(Diagnostic {
                    member: field.name().to_string(),
                    kind: DiagnosticKind::MemberRender,
                    message: error.to_string(),
                });
            }
        }
        doc.new_line();

        let constructors = class.constructors().iter().map(|method| (method, true));
        let methods = class.methods().iter().map(|method| (method, false));
        for (method, is_constructor) in constructors.chain(methods) {
            let key = member_key(method);
            members.insert(key.clone(), doc.current_line());
            let checkpoint = doc.checkpoint();
            let rendered = if is_constructor {
                renderer.write_constructor(&mut doc, method)
            } else {
                renderer.write_method(&mut doc, method)
            };
            match rendered {
                Ok(body_diagnostics) => diagnostics.extend(body_diagnostics),
                Err(error) => {
                    doc.rollback(checkpoint);
                    warn!("could not render method {}.{}: {}", class.name(), key, error);
                    write_marker(&mut doc, METHOD_FAILED);
                    diagnostics.push(Diagnostic {
                        member: key,
                        kind: DiagnosticKind::MemberRender,
                        message: error.to_string(),
                    });
                }
            }
        }

        doc.set_indent(0);
        doc.new_line();
        doc.text("}");
        doc.new_line();
        doc.raw(HTML_FOOTER);

        diagnostics.extend(
            resolver
                .take_failures()
                .into_iter()
                .map(|(name, message)| Diagnostic {
                    member: name,
                    kind: DiagnosticKind::Provider,
                    message,
                }),
        );

        Disassembly {
            text: doc.finish(self.format),
            diagnostics,
            members,
        }
    }
}

fn write_marker(doc: &mut StyledDocument, marker: &str) {
    doc.new_line();
    doc.bytecode(marker);
    doc.new_line();
}
