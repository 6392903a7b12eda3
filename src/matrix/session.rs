//! On-disk Matrix session.
//!
//! The session directory contains:
//! - `session`: JSON file with the login tokens and the last sync token
//! - `sqlite`: SQLite store of the Matrix SDK

use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, trace};
use matrix_sdk::authentication::matrix;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Content of the `session` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    user_session: matrix::MatrixSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// Matrix session manager.
///
/// Holds the login of a previous run, if any, and persists new logins and sync
/// tokens.
#[derive(Debug, Clone)]
pub struct MatrixSession {
    stored: Option<StoredSession>,
    sqlite_path: PathBuf,
    session_path: PathBuf,
}

impl MatrixSession {
    /// Opens the session directory, creating it if needed.
    ///
    /// A missing or unreadable `session` file means a fresh login is needed; it is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn load(dir_path: &str) -> anyhow::Result<Self> {
        debug!("read session at {}", dir_path);
        fs::create_dir_all(dir_path)
            .await
            .with_context(|| format!("failed to create session directory {dir_path}"))?;

        let dir = Path::new(dir_path);
        let session_path = dir.join("session");
        let stored = match Self::read(&session_path).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                debug!("no usable session at {}: {e:#}", session_path.display());
                None
            }
        };

        Ok(MatrixSession {
            stored,
            sqlite_path: dir.join("sqlite"),
            session_path,
        })
    }

    async fn read(session_path: &Path) -> anyhow::Result<StoredSession> {
        let data = fs::read_to_string(session_path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// Login tokens of a previous run.
    pub fn user_session(&self) -> Option<&matrix::MatrixSession> {
        self.stored.as_ref().map(|stored| &stored.user_session)
    }

    pub fn sync_token(&self) -> Option<String> {
        self.stored.as_ref().and_then(|stored| stored.sync_token.clone())
    }

    /// Replaces the sync token in the `session` file, keeping the login tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or written.
    pub async fn save_sync_token(&self, sync_token: String) -> anyhow::Result<()> {
        trace!("persist sync token {}", sync_token);

        let mut stored = Self::read(&self.session_path).await?;
        stored.sync_token = Some(sync_token);
        fs::write(&self.session_path, serde_json::to_string(&stored)?).await?;
        Ok(())
    }

    /// Writes the login tokens of a fresh login, without a sync token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_user_session(
        &self,
        user_session: &matrix::MatrixSession,
    ) -> anyhow::Result<()> {
        trace!("persist user session");

        let stored = StoredSession {
            user_session: user_session.clone(),
            sync_token: None,
        };
        fs::write(&self.session_path, serde_json::to_string(&stored)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_sdk::{SessionMeta, SessionTokens};
    use tempfile::TempDir;

    fn create_test_user_session() -> matrix::MatrixSession {
        matrix::MatrixSession {
            meta: SessionMeta {
                user_id: "@spawnscope:example.com".try_into().unwrap(),
                device_id: "DEVICEID".into(),
            },
            tokens: SessionTokens {
                access_token: "access_token".to_owned(),
                refresh_token: None,
            },
        }
    }

    #[tokio::test]
    async fn test_load_without_session() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path().join("session");
        let dir_path = dir_path.to_string_lossy();

        let session = MatrixSession::load(&dir_path).await.unwrap();

        assert!(session.user_session().is_none());
        assert!(session.sync_token().is_none());
        assert_eq!(session.sqlite_path(), temp_dir.path().join("session/sqlite"));
        assert!(fs::metadata(temp_dir.path().join("session")).await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_load_invalid_session_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("session"), "invalid json")
            .await
            .unwrap();

        let session = MatrixSession::load(&temp_dir.path().to_string_lossy())
            .await
            .unwrap();

        assert!(session.user_session().is_none());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path().to_string_lossy().to_string();

        let session = MatrixSession::load(&dir_path).await.unwrap();
        session
            .save_user_session(&create_test_user_session())
            .await
            .unwrap();
        session.save_sync_token("s42_1".to_owned()).await.unwrap();

        let reloaded = MatrixSession::load(&dir_path).await.unwrap();
        assert_eq!(
            reloaded.user_session().unwrap().meta.user_id.to_string(),
            "@spawnscope:example.com"
        );
        assert_eq!(reloaded.sync_token(), Some("s42_1".to_owned()));
    }

    #[tokio::test]
    async fn test_save_sync_token_without_login_fails() {
        let temp_dir = TempDir::new().unwrap();
        let session = MatrixSession::load(&temp_dir.path().to_string_lossy())
            .await
            .unwrap();

        assert!(session.save_sync_token("s1".to_owned()).await.is_err());
    }

    #[test]
    fn test_sync_token_is_omitted_when_unset() {
        let stored = StoredSession {
            user_session: create_test_user_session(),
            sync_token: None,
        };

        let json = serde_json::to_string(&stored).unwrap();

        assert!(!json.contains("sync_token"));
        assert!(json.contains("@spawnscope:example.com"));
    }
}
