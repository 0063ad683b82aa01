//! File-backed durable storage: one `<key>.json` file per key

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nmp_shared::store::DurableStorage;
use nmp_shared::{NmpError, NmpResult};

pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    /// Use `directory`, creating it if needed
    pub fn new(directory: impl AsRef<Path>) -> std::io::Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl DurableStorage for FileStorage {
    fn read(&self, key: &str) -> NmpResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NmpError::Storage(e.to_string())),
        }
    }

    fn write(&self, key: &str, value: &str) -> NmpResult<()> {
        // Staged write, then rename over the old file
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|e| NmpError::Storage(e.to_string()))?;
        fs::rename(&staging, &path).map_err(|e| NmpError::Storage(e.to_string()))
    }
}
