use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use super::table::Table;
use super::types::TableError;
use crate::fs_util::resolve_case_insensitive;

/// Directory-backed table cache. Directories are searched in order, so an
/// override directory listed first shadows the stock data.
#[derive(Debug, Default)]
pub struct TableStore {
    search_dirs: Vec<PathBuf>,
    cache: RefCell<HashMap<String, Rc<Table>>>,
}

impl TableStore {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Loads `<name>.2da`, reusing the cached grid on repeated calls.
    pub fn load(&self, name: &str) -> Result<Rc<Table>, TableError> {
        let key = name.to_ascii_lowercase();
        if let Some(table) = self.cache.borrow().get(&key) {
            return Ok(Rc::clone(table));
        }

        let file_name = format!("{key}.2da");
        let path = self
            .search_dirs
            .iter()
            .find_map(|dir| resolve_case_insensitive(dir, &file_name))
            .ok_or_else(|| TableError::NotFound {
                name: key.clone(),
                searched: self.search_dirs.clone(),
            })?;

        let table = Rc::new(Table::from_path(&path)?);
        debug!(
            table = %key,
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_names_count(),
            "table_loaded"
        );
        self.cache.borrow_mut().insert(key, Rc::clone(&table));
        Ok(table)
    }

    /// Like [`TableStore::load`] but a missing table is `None` instead of
    /// an error. Read failures still surface.
    pub fn load_optional(&self, name: &str) -> Result<Option<Rc<Table>>, TableError> {
        match self.load(name) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::NotFound { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}
