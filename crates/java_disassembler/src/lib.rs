//! Renders compiled java classes as java-like declarations, with the bytecode of every method
//! shown inline where its body would be.
//!
//! Classes come from a [`TypeProvider`][0]. The [`ClassPathProvider`][1] reads them from a
//! classpath, the [`MemoryProvider`][2] holds handles built by hand. A [`Disassembler`][3] turns
//! one class into a styled html document, or into plain text.
//!
//! [0]: provider::TypeProvider
//! [1]: provider::ClassPathProvider
//! [2]: provider::MemoryProvider
//! [3]: Disassembler
//!
//! # Example
//! ```no_run
//! # use java_disassembler::provider::ClassPathProvider;
//! # use java_disassembler::{Disassembler, OutputFormat};
//! let provider = ClassPathProvider::from_iter(["classes.jar"]);
//! let disassembler = Disassembler::with_format(provider, OutputFormat::Plain);
//! let disassembly = disassembler
//!     .disassemble("com.example.Square")
//!     .expect("couldn't find class");
//! println!("{}", disassembly.text());
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod declaration;
pub mod descriptor;
pub mod disassembler;
pub mod error;
pub mod instruction;
pub mod model;
pub mod opcode;
pub mod provider;
pub mod resolver;
pub mod styled;

pub use disassembler::{Diagnostic, DiagnosticKind, Disassembler, Disassembly};
pub use styled::OutputFormat;
