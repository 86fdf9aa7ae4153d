//! Fixtures for integration tests: class files assembled in memory, and classpaths written to a
//! scratch directory. Nothing here needs a `javac`.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::ZipWriter;

pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
}

/// Assembles a class file. Names are given in internal form (`com/example/Square`).
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    pool: Vec<u8>,
    next_index: u16,
    utf8s: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    inner_classes: Vec<[u16; 4]>,
    source_file: Option<u16>,
}

impl ClassFileBuilder {
    pub fn new(name: &str, super_name: Option<&str>) -> Self {
        let mut builder = Self {
            pool: vec![],
            next_index: 1,
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            access_flags: access::PUBLIC | access::SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            inner_classes: vec![],
            source_file: None,
        };
        builder.this_class = builder.class(name);
        builder.super_class = super_name.map_or(0, |super_name| builder.class(super_name));
        builder
    }

    pub fn access(&mut self, access_flags: u16) -> &mut Self {
        self.access_flags = access_flags;
        self
    }

    pub fn implements(&mut self, interface: &str) -> &mut Self {
        let index = self.class(interface);
        self.interfaces.push(index);
        self
    }

    fn push_constant(&mut self, tag: u8, info: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.push(tag);
        self.pool.extend_from_slice(info);
        self.next_index += slots;
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8s.get(value) {
            return index;
        }
        let mut info = (value.len() as u16).to_be_bytes().to_vec();
        info.extend_from_slice(value.as_bytes());
        let index = self.push_constant(1, &info, 1);
        self.utf8s.insert(value.to_string(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.classes.get(name) {
            return index;
        }
        let name_index = self.utf8(name);
        let index = self.push_constant(7, &name_index.to_be_bytes(), 1);
        self.classes.insert(name.to_string(), index);
        index
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let string_index = self.utf8(value);
        self.push_constant(8, &string_index.to_be_bytes(), 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.push_constant(3, &value.to_be_bytes(), 1)
    }

    pub fn float(&mut self, value: f32) -> u16 {
        self.push_constant(4, &value.to_be_bytes(), 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.push_constant(5, &value.to_be_bytes(), 2)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let info = [name_index.to_be_bytes(), descriptor_index.to_be_bytes()].concat();
        self.push_constant(12, &info, 1)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let info = [class_index.to_be_bytes(), name_and_type_index.to_be_bytes()].concat();
        self.push_constant(tag, &info, 1)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(9, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(11, owner, name, descriptor)
    }

    fn member(&mut self, access_flags: u16, name: &str, descriptor: &str, attributes: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut member = vec![];
        member.extend_from_slice(&access_flags.to_be_bytes());
        member.extend_from_slice(&self.utf8(name).to_be_bytes());
        member.extend_from_slice(&self.utf8(descriptor).to_be_bytes());
        member.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for (attribute_name, info) in attributes {
            member.extend_from_slice(&self.utf8(attribute_name).to_be_bytes());
            member.extend_from_slice(&(info.len() as u32).to_be_bytes());
            member.extend_from_slice(info);
        }
        member
    }

    pub fn field(&mut self, access_flags: u16, name: &str, descriptor: &str) -> &mut Self {
        let field = self.member(access_flags, name, descriptor, &[]);
        self.fields.push(field);
        self
    }

    /// Adds a method. With `code` present a `Code` attribute is written around it.
    pub fn method(&mut self, access_flags: u16, name: &str, descriptor: &str, code: Option<&[u8]>) -> &mut Self {
        let attributes = match code {
            Some(code) => vec![("Code", code_attribute(code))],
            None => vec![],
        };
        let method = self.member(access_flags, name, descriptor, &attributes);
        self.methods.push(method);
        self
    }

    /// Adds a method carrying a single, arbitrary attribute
    pub fn method_with_attribute(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attribute_name: &str,
        info: &[u8],
    ) -> &mut Self {
        let method = self.member(access_flags, name, descriptor, &[(attribute_name, info.to_vec())]);
        self.methods.push(method);
        self
    }

    pub fn inner_class(&mut self, inner: &str, outer: &str, simple_name: &str, access_flags: u16) -> &mut Self {
        let entry = [self.class(inner), self.class(outer), self.utf8(simple_name), access_flags];
        self.inner_classes.push(entry);
        self
    }

    pub fn source_file(&mut self, file_name: &str) -> &mut Self {
        self.source_file = Some(self.utf8(file_name));
        self
    }

    pub fn build(&mut self) -> Vec<u8> {
        let mut attributes = vec![];
        if !self.inner_classes.is_empty() {
            let mut info = (self.inner_classes.len() as u16).to_be_bytes().to_vec();
            for entry in &self.inner_classes {
                for value in entry {
                    info.extend_from_slice(&value.to_be_bytes());
                }
            }
            attributes.push((self.utf8("InnerClasses"), info));
        }
        if let Some(file_name) = self.source_file {
            attributes.push((self.utf8("SourceFile"), file_name.to_be_bytes().to_vec()));
        }

        let mut bytes = vec![];
        bytes.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        bytes.extend_from_slice(&0_u16.to_be_bytes());
        bytes.extend_from_slice(&52_u16.to_be_bytes());
        bytes.extend_from_slice(&self.next_index.to_be_bytes());
        bytes.extend_from_slice(&self.pool);
        bytes.extend_from_slice(&self.access_flags.to_be_bytes());
        bytes.extend_from_slice(&self.this_class.to_be_bytes());
        bytes.extend_from_slice(&self.super_class.to_be_bytes());
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }
        for members in [&self.fields, &self.methods] {
            bytes.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                bytes.extend_from_slice(member);
            }
        }
        bytes.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for (name_index, info) in attributes {
            bytes.extend_from_slice(&name_index.to_be_bytes());
            bytes.extend_from_slice(&(info.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&info);
        }
        bytes
    }
}

/// The info of a `Code` attribute with no exception table and no nested attributes
pub fn code_attribute(code: &[u8]) -> Vec<u8> {
    let mut info = vec![];
    info.extend_from_slice(&4_u16.to_be_bytes());
    info.extend_from_slice(&4_u16.to_be_bytes());
    info.extend_from_slice(&(code.len() as u32).to_be_bytes());
    info.extend_from_slice(code);
    info.extend_from_slice(&0_u16.to_be_bytes());
    info.extend_from_slice(&0_u16.to_be_bytes());
    info
}

/// An empty directory, unique to this test and process
pub fn scratch_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("itest-{}-{}", std::process::id(), test_name));
    drop(fs::remove_dir_all(&dir));
    fs::create_dir_all(&dir).expect("could not create scratch dir");
    dir
}

/// Writes classes, keyed by internal name, as a class directory tree
pub fn write_class_dir(test_name: &str, classes: &[(&str, Vec<u8>)]) -> PathBuf {
    let dir = scratch_dir(test_name);
    for (name, bytes) in classes {
        let path = dir.join(format!("{name}.class"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("could not create package dir");
        }
        fs::write(&path, bytes).expect("could not write class");
    }
    dir
}

/// Writes classes, keyed by internal name, into a jar
pub fn write_jar(test_name: &str, classes: &[(&str, Vec<u8>)]) -> PathBuf {
    let path = scratch_dir(test_name).join("classes.jar");
    write_jar_at(&path, classes);
    path
}

fn write_jar_at(path: &Path, classes: &[(&str, Vec<u8>)]) {
    let mut jar = ZipWriter::new(File::create(path).expect("could not create jar"));
    for (name, bytes) in classes {
        jar.start_file(format!("{name}.class"), FileOptions::default())
            .expect("could not start entry");
        jar.write_all(bytes).expect("could not write entry");
    }
    jar.finish().expect("could not finish jar");
}
