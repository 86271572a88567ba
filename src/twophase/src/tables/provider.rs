use std::{
    borrow::Cow,
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{trace, warn};

use super::{ElementWidth, TableError, TableName, TableProvider};

/// Reads each table from a file named after it inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryTables {
    dir: PathBuf,
}

impl DirectoryTables {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableProvider for DirectoryTables {
    fn load(&self, name: TableName, _width: ElementWidth) -> Result<Cow<'_, [u8]>, TableError> {
        let path = self.dir.join(name.file_name());
        trace!("Reading {}", path.display());
        match fs::read(&path) {
            Ok(bytes) => Ok(Cow::Owned(bytes)),
            Err(source) => {
                if source.kind() == io::ErrorKind::NotFound {
                    warn!(
                        "Table directory {} has no {name} table",
                        self.dir.display()
                    );
                }
                Err(TableError::Io { name, path, source })
            }
        }
    }
}

/// Tables supplied as byte buffers by the host.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    tables: HashMap<TableName, Vec<u8>>,
}

impl InMemoryTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every table present with the right size and all bytes zero. Every
    /// state looks solved to the pruning tables and every move leads to
    /// coordinate zero, which is enough to drive the solver on a solved cube.
    #[must_use]
    pub fn zeroed() -> Self {
        let tables = TableName::ALL
            .into_iter()
            .map(|name| (name, vec![0; name.entry_count() * name.width().bytes()]))
            .collect();
        Self { tables }
    }

    pub fn insert(&mut self, name: TableName, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.tables.insert(name, bytes)
    }

    pub fn remove(&mut self, name: TableName) -> Option<Vec<u8>> {
        self.tables.remove(&name)
    }
}

impl TableProvider for InMemoryTables {
    fn load(&self, name: TableName, _width: ElementWidth) -> Result<Cow<'_, [u8]>, TableError> {
        self.tables
            .get(&name)
            .map(|bytes| Cow::Borrowed(bytes.as_slice()))
            .ok_or(TableError::Missing(name))
    }
}
