//! File-backed session store: one JSON document per session.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use super::{Session, SessionStore};
use crate::error::ReckonError;

const FILE_VERSION: u32 = 1;

/// Session store writing `<dir>/<id>.json`.
///
/// Ids are normalized to a filesystem-safe label; distinct ids that
/// normalize to the same label are disambiguated by the id stored inside
/// the file, so a mismatch reads as "no session".
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_label(id)))
    }

    /// A scratch file private to one write, next to the session file.
    fn scratch_path(&self, id: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}.tmp", normalize_label(id), Uuid::new_v4()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>, ReckonError> {
        let path = self.session_path(id);
        let raw = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let file: SessionFile = serde_json::from_str(&raw)?;
        if file.session.id != id {
            return Ok(None);
        }
        Ok(Some(file.session))
    }

    async fn put(&self, session: Session) -> Result<(), ReckonError> {
        fs::create_dir_all(&self.base_dir).await?;
        let path = self.session_path(&session.id);
        let file = SessionFile {
            version: FILE_VERSION,
            session,
        };
        let serialized = serde_json::to_vec_pretty(&file)?;
        // Write then rename so readers never observe a partial file.
        let tmp = self.scratch_path(&file.session.id);
        if let Err(err) = fs::write(&tmp, serialized).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn evict(&self, id: &str) -> Result<(), ReckonError> {
        match fs::remove_file(self.session_path(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    session: Session,
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    trimmed
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}
