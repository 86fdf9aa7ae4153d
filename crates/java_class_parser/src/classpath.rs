//! The ordered entries classes are looked up in

use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(windows)] {
        /// Separates classpath entries, `;` on windows
        pub const CLASSPATH_SEPARATOR: char = ';';
    } else {
        /// Separates classpath entries, `:` everywhere but windows
        pub const CLASSPATH_SEPARATOR: char = ':';
    }
}

/// Directories, class files and jars, searched front to back
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the entries, in lookup order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }
}

/// Writes the entries the way `java -cp` expects them
impl Display for Classpath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", CLASSPATH_SEPARATOR)?;
            }
            write!(f, "{}", entry.display())?;
        }
        Ok(())
    }
}

impl<P: AsRef<Path>> FromIterator<P> for Classpath {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|entry| entry.as_ref().to_path_buf())
                .collect(),
        }
    }
}

impl FromStr for Classpath {
    type Err = Infallible;

    /// Splits on [`CLASSPATH_SEPARATOR`]. Empty entries are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(CLASSPATH_SEPARATOR)
            .filter(|entry| !entry.is_empty())
            .collect())
    }
}
