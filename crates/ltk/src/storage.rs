//! Key-value stores backing persistent models.
//!
//! [`Storage`] mirrors the browser's `localStorage`: string keys, string
//! values. [`MemoryStorage`] keeps everything in memory, [`FileStorage`]
//! keeps a JSON object on disk and the `web` feature adds a `localStorage`
//! backend in [`crate::web`].
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::error::StorageError;

/// A string key-value store.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Every key currently stored.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-memory [`Storage`]. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::{
        cell::RefCell,
        collections::BTreeMap,
        io::ErrorKind,
        path::{Path, PathBuf},
    };

    use super::Storage;
    use crate::error::StorageError;

    /// [`Storage`] kept as a single JSON object in a file.
    ///
    /// The whole file is rewritten after every change.
    #[derive(Debug)]
    pub struct FileStorage {
        path: PathBuf,
        items: RefCell<BTreeMap<String, String>>,
    }

    impl FileStorage {
        /// Open the store at `path`. A missing or empty file is an empty
        /// store.
        pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
            let path = path.into();
            let items = match std::fs::read_to_string(&path) {
                Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
                Ok(contents) => serde_json::from_str(&contents)?,
                Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
                Err(err) => return Err(err.into()),
            };
            log::debug!("opened {} with {} entries", path.display(), items.len());
            Ok(FileStorage {
                path,
                items: RefCell::new(items),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self) -> Result<(), StorageError> {
            let contents = serde_json::to_string_pretty(&*self.items.borrow())?;
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&self.path, contents)?;
            Ok(())
        }
    }

    impl Storage for FileStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.items.borrow().get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.items
                .borrow_mut()
                .insert(key.to_owned(), value.to_owned());
            self.flush()
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            if self.items.borrow_mut().remove(key).is_some() {
                self.flush()?;
            }
            Ok(())
        }

        fn keys(&self) -> Result<Vec<String>, StorageError> {
            Ok(self.items.borrow().keys().cloned().collect())
        }
    }
}
