// src/speech/store.rs
// Artifact storage keyed by generated id. Writes are tmp + rename so a
// half-written file is never visible under its final name.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl AudioStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.mp3"))
    }

    /// Write bytes under a fresh id and return that id.
    pub fn put(&self, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating audio dir {}", self.dir.display()))?;
        let id = uuid::Uuid::new_v4().to_string();
        let path = self.path_for(&id);
        let tmp = path.with_extension("mp3.tmp");
        let mut f = fs::File::create(&tmp).context("creating audio tmp file")?;
        f.write_all(bytes).context("writing audio bytes")?;
        fs::rename(&tmp, &path).context("publishing audio file")?;
        Ok(id)
    }

    /// Read an artifact back by id. `Ok(None)` when the id is unknown.
    pub fn read(&self, id: &str) -> Result<Option<Vec<u8>>> {
        if !is_valid_id(id) {
            bail!("malformed artifact id");
        }
        match fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("reading audio file"),
        }
    }

    /// Number of published artifacts; test hook for the no-write guarantees.
    pub fn artifact_count(&self) -> usize {
        match fs::read_dir(&self.dir) {
            Ok(entries) => entries
                .flatten()
                .filter(|e| {
                    e.path().extension().and_then(|s| s.to_str()) == Some("mp3")
                })
                .count(),
            Err(_) => 0,
        }
    }
}
