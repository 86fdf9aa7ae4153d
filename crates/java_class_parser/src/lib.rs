//! Reads java class files and finds them on a classpath.
//!
//! Classes are parsed once into a [`JavaClass`], which answers questions about the class by
//! reading through its constant pool on demand. Single classes can be read with
//! [`parse_file`] or [`parse_bytes`], while a [`JavaClassParser`] looks classes up by name
//! across directories, class files and jars, caching what it has read.
//!
//! # Example
//! ```no_run
//! # use java_class_parser::JavaClassParser;
//! let parser = JavaClassParser::from("classes.jar");
//! let square = parser.find("com.example.Square").expect("couldn't find class");
//! let shape = parser.find("com/example/Shape").expect("couldn't find class");
//! ```

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::trace;
use zip::result::ZipError;
use zip::ZipArchive;

pub mod classpath;
#[allow(missing_docs)]
pub mod constant_pool;
pub mod error;
pub(crate) mod raw_java_class;
mod structures;

use crate::classpath::Classpath;
use crate::error::{Error, ErrorKind};
pub use structures::*;

/// Access flags shared by classes, fields and methods, §4.1-4.6 of the jvm specification
#[allow(missing_docs)]
pub mod access_flags {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SYNCHRONIZED: u16 = 0x0020;
    pub const VOLATILE: u16 = 0x0040;
    pub const TRANSIENT: u16 = 0x0080;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const STRICT: u16 = 0x0800;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

/// Looks up classes on a classpath. Parsed classes and opened archives are kept for the
/// lifetime of the parser.
#[derive(Debug, Default)]
pub struct JavaClassParser {
    class_path: Classpath,
    cache: RefCell<HashMap<FQNameBuf, JavaClass>>,
    open_zips: RefCell<HashMap<PathBuf, ZipArchive<File>>>,
}

/// How a classpath entry is searched
enum EntryKind {
    Directory,
    ClassFile,
    Archive,
}

impl EntryKind {
    fn of(entry: &Path) -> Result<Self, Error> {
        if entry.is_dir() {
            return Ok(Self::Directory);
        }
        match entry.extension().and_then(|extension| extension.to_str()) {
            Some("class") if entry.is_file() => Ok(Self::ClassFile),
            Some("jar" | "zip") if entry.is_file() => Ok(Self::Archive),
            _ => Err(ErrorKind::UnsupportedEntry(entry.to_path_buf()).into()),
        }
    }
}

impl JavaClassParser {
    /// Parses a single class file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<JavaClass, Error> {
        let bytes = std::fs::read(path)?;
        raw_java_class::parse_class_file_bytes(&bytes).map(JavaClass::new)
    }

    /// Creates a parser searching the given classpath
    pub fn with_classpath(class_path: Classpath) -> Self {
        Self {
            class_path,
            ..Default::default()
        }
    }

    /// Finds a class by binary (`com.example.Square`) or internal (`com/example/Square`) name.
    ///
    /// Entries are searched in classpath order. A directory `output` holds the class above
    /// as `output/com/example/Square.class`, a jar holds it as the entry
    /// `com/example/Square.class`, and a class file entry is only a match if it declares
    /// that name.
    ///
    /// # Error
    /// [`NoClassFound`](ErrorKind::NoClassFound) if no entry has the class, or the first
    /// error met while reading an entry.
    pub fn find<S: AsRef<str> + ?Sized>(&self, name: &S) -> Result<JavaClass, Error> {
        let name = FQNameBuf::from_binary_name(name);
        if let Some(class) = self.cache.borrow().get(&*name) {
            return Ok(class.clone());
        }
        for entry in self.class_path.iter() {
            let found = match EntryKind::of(entry)? {
                EntryKind::Directory => self.find_in_directory(entry, &name)?,
                EntryKind::ClassFile => self.find_in_class_file(entry, &name)?,
                EntryKind::Archive => self.find_in_archive(entry, &name)?,
            };
            if let Some(class) = found {
                trace!("found {} in {:?}", name, entry);
                self.cache.borrow_mut().insert(name, class.clone());
                return Ok(class);
            }
        }
        Err(ErrorKind::NoClassFound(name).into())
    }

    /// Gets the classpath of the parser
    pub fn classpath(&self) -> &Classpath {
        &self.class_path
    }

    fn find_in_directory(&self, directory: &Path, name: &FQName) -> Result<Option<JavaClass>, Error> {
        let path = directory.join(name).with_extension("class");
        if !path.exists() {
            return Ok(None);
        }
        parse_file(path).map(Some)
    }

    fn find_in_class_file(&self, file: &Path, name: &FQName) -> Result<Option<JavaClass>, Error> {
        let class = parse_file(file)?;
        Ok((class.this()? == name).then_some(class))
    }

    fn find_in_archive(&self, archive: &Path, name: &FQName) -> Result<Option<JavaClass>, Error> {
        let mut open_zips = self.open_zips.borrow_mut();
        let zip = match open_zips.entry(archive.to_path_buf()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => vacant.insert(ZipArchive::new(File::open(archive)?)?),
        };
        let result = match zip.by_name(&format!("{}.class", name)) {
            Ok(entry) => parse_bytes(entry).map(Some),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error.into()),
        };
        result
    }
}

/// A parser whose classpath is the single given entry
impl<P: AsRef<Path>> From<P> for JavaClassParser {
    fn from(entry: P) -> Self {
        Self::from_iter([entry])
    }
}

impl<P: AsRef<Path>> FromIterator<P> for JavaClassParser {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        Self::with_classpath(Classpath::from_iter(iter))
    }
}

/// Reads a whole class file from `read` and parses it
///
/// # Error
/// Fails on read errors, and when the bytes are not a well formed class file
pub fn parse_bytes<R: Read>(mut read: R) -> Result<JavaClass, Error> {
    let mut buffer = vec![];
    read.read_to_end(&mut buffer)?;
    raw_java_class::parse_class_file_bytes(&buffer).map(JavaClass::new)
}

/// Parses a single class file, see [`JavaClassParser::parse_file`]
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<JavaClass, Error> {
    JavaClassParser::parse_file(path)
}
