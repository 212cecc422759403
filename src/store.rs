use std::path::Path;

use collections::{ChainedTable, OpenTable, PersistError};

use crate::{CliError, command::Format};

/// What the command line needs from a table, whatever its variant
pub trait Store: Default {
    /// Returns false if the key was already present
    fn set(&mut self, key: &str, value: &str) -> Result<bool, CliError>;
    fn get(&self, key: &str) -> Result<Option<String>, CliError>;
    /// Returns false if there was nothing to delete
    fn del(&mut self, key: &str) -> Result<bool, CliError>;
    fn len(&self) -> usize;
    /// Entries in backing order, printed
    fn entries(&self) -> Vec<(String, String)>;

    fn load(&mut self, path: &Path, format: Format) -> Result<(), PersistError>;
    fn save(&self, path: &Path, format: Format) -> Result<(), PersistError>;
}

fn int_key(key: &str) -> Result<i64, CliError> {
    key.parse()
        .map_err(|_| CliError::Usage(format!("open tables take integer keys, got {key:?}")))
}

impl Store for OpenTable<i64, String> {
    fn set(&mut self, key: &str, value: &str) -> Result<bool, CliError> {
        Ok(self.insert(int_key(key)?, value.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<String>, CliError> {
        Ok(OpenTable::get(self, &int_key(key)?).cloned())
    }

    fn del(&mut self, key: &str) -> Result<bool, CliError> {
        Ok(self.remove(&int_key(key)?).is_some())
    }

    fn len(&self) -> usize {
        OpenTable::len(self)
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn load(&mut self, path: &Path, format: Format) -> Result<(), PersistError> {
        match format {
            Format::Text => self.load_text(path),
            Format::Binary => self.load_binary(path),
        }
    }

    fn save(&self, path: &Path, format: Format) -> Result<(), PersistError> {
        match format {
            Format::Text => self.save_text(path),
            Format::Binary => self.save_binary(path),
        }
    }
}

impl Store for ChainedTable {
    fn set(&mut self, key: &str, value: &str) -> Result<bool, CliError> {
        Ok(self.insert(key, value))
    }

    fn get(&self, key: &str) -> Result<Option<String>, CliError> {
        Ok(ChainedTable::get(self, key).map(String::from))
    }

    fn del(&mut self, key: &str) -> Result<bool, CliError> {
        Ok(self.remove(key).is_some())
    }

    fn len(&self) -> usize {
        ChainedTable::len(self)
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(&mut self, path: &Path, format: Format) -> Result<(), PersistError> {
        match format {
            Format::Text => self.load_text(path),
            Format::Binary => self.load_binary(path),
        }
    }

    fn save(&self, path: &Path, format: Format) -> Result<(), PersistError> {
        match format {
            Format::Text => self.save_text(path),
            Format::Binary => self.save_binary(path),
        }
    }
}
