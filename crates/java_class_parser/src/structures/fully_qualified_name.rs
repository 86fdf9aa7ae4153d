//! Internal class names, like `java/lang/Object`, and their binary (`java.lang.Object`) forms

use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::path::Path;

/// A class name in internal form, identifiers separated by `/`. Array classes are named by
/// their descriptor instead, like `[Ljava/lang/String;`.
#[derive(Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct FQName {
    name: str,
}

impl FQName {
    /// Views a string as an internal name
    pub fn new<S: AsRef<str> + ?Sized>(name: &S) -> &Self {
        // SAFETY: FQName is a repr(transparent) wrapper around str
        unsafe { &*(name.as_ref() as *const str as *const FQName) }
    }

    /// The name as stored in the class file
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Converts to the `.` separated binary name, `java/lang/Object` becomes `java.lang.Object`
    pub fn to_binary_name(&self) -> String {
        self.name.replace('/', ".")
    }

    /// Whether this is an array descriptor like `[I` rather than a class name
    pub fn is_array(&self) -> bool {
        self.name.starts_with('[')
    }
}

impl PartialEq<str> for FQName {
    fn eq(&self, other: &str) -> bool {
        &self.name == other
    }
}

impl PartialEq<&str> for FQName {
    fn eq(&self, other: &&str) -> bool {
        &self.name == *other
    }
}

/// The relative path of the class file, `java/lang/Object` is `java/lang/Object.class`
/// once an extension is added
impl AsRef<Path> for FQName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.name)
    }
}

impl Debug for FQName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.name, f)
    }
}

impl Display for FQName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.name, f)
    }
}

/// An owned [`FQName`]
#[derive(Eq, PartialEq, Hash, Clone)]
pub struct FQNameBuf {
    buf: String,
}

impl FQNameBuf {
    /// Accepts both binary (`a.b.C`) and internal (`a/b/C`) names
    pub fn from_binary_name<S: AsRef<str>>(name: S) -> Self {
        Self {
            buf: name.as_ref().replace('.', "/"),
        }
    }
}

impl Debug for FQNameBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&**self, f)
    }
}

impl Display for FQNameBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&**self, f)
    }
}

impl Deref for FQNameBuf {
    type Target = FQName;

    fn deref(&self) -> &Self::Target {
        FQName::new(&self.buf)
    }
}

impl Borrow<FQName> for FQNameBuf {
    fn borrow(&self) -> &FQName {
        self
    }
}

impl<T: ?Sized> PartialEq<T> for FQNameBuf
where
    FQName: PartialEq<T>,
{
    fn eq(&self, other: &T) -> bool {
        (**self).eq(other)
    }
}
