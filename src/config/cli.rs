use crate::core::{ConfigProvider, Storage};
use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_FILE_MODE: u32 = 0o777;

/// Writes fetched blobs into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
    file_mode: u32,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self {
            base_path,
            file_mode: DEFAULT_FILE_MODE,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.output_dir().to_string()).with_file_mode(config.file_mode())
    }

    /// Mode applied when a file is created; existing files keep theirs.
    pub fn with_file_mode(mut self, file_mode: u32) -> Self {
        self.file_mode = file_mode;
        self
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.file_mode);
        }

        let mut file = options.open(&full_path)?;
        file.write_all(data)?;
        file.flush()?;

        Ok(full_path.to_string_lossy().into_owned())
    }
}
