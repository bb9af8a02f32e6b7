//! On-disk [`ModelStore`] with atomic publish.
//!
//! The snapshot is serialized to JSON next to its final location and then
//! renamed into place, so a reader never observes a half-written file. A
//! missing file means "not trained yet", not an error.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use simrec_core::index::Snapshot;
use simrec_core::store::ModelStore;

pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create model directory: {}", parent.display())
            })?;
        }

        let temp = self.temp_path();
        {
            let file = File::create(&temp)
                .with_context(|| format!("Failed to create {}", temp.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, snapshot)
                .with_context(|| "Failed to serialize model snapshot")?;
            writer.flush()?;
        }

        fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to publish {}", self.path.display()))?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to open model snapshot: {}", self.path.display())
                })
            }
        };
        let reader = BufReader::new(file);
        let snapshot = serde_json::from_reader(reader)
            .with_context(|| format!("Corrupt model snapshot: {}", self.path.display()))?;
        Ok(Some(snapshot))
    }
}
