//! Session persistence between CLI invocations.
//!
//! The backend keeps credentials in HTTP-only cookies. The CLI saves the
//! cookie jar's `name=value` pairs for the configured endpoint so that a login
//! survives the process, and restores them into a fresh jar on startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nextbyte_core::{ApiClient, HttpTransport};

use crate::config::Config;

/// Errors reading or writing the session file
#[derive(Debug)]
pub enum SessionFileError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_yaml::Error),
    Serialize(serde_yaml::Error),
}

impl std::fmt::Display for SessionFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionFileError::Io(path, e) => {
                write!(f, "Failed to access session file '{}': {}", path.display(), e)
            }
            SessionFileError::Parse(path, e) => {
                write!(f, "Failed to parse session file '{}': {}", path.display(), e)
            }
            SessionFileError::Serialize(e) => write!(f, "Failed to serialize session: {}", e),
        }
    }
}

impl std::error::Error for SessionFileError {}

/// On-disk session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    /// Endpoint the cookies belong to
    pub endpoint: String,
    /// Cookie pairs, `name=value; name2=value2`
    pub cookies: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Session file at a fixed path
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved session, if any.
    pub fn load(&self) -> Result<Option<SavedSession>, SessionFileError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| SessionFileError::Io(self.path.clone(), e))?;
        let saved = serde_yaml::from_str(&contents)
            .map_err(|e| SessionFileError::Parse(self.path.clone(), e))?;
        Ok(Some(saved))
    }

    pub fn save(&self, session: &SavedSession) -> Result<(), SessionFileError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionFileError::Io(parent.to_path_buf(), e))?;
        }
        let yaml = serde_yaml::to_string(session).map_err(SessionFileError::Serialize)?;
        std::fs::write(&self.path, yaml).map_err(|e| SessionFileError::Io(self.path.clone(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| SessionFileError::Io(self.path.clone(), e))?;
        }
        Ok(())
    }

    /// Removes the session file. Missing files are fine.
    pub fn clear(&self) -> Result<(), SessionFileError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionFileError::Io(self.path.clone(), e)),
        }
    }
}

/// API client wired to a persisted cookie session.
pub struct Session {
    transport: Arc<HttpTransport>,
    client: ApiClient,
    file: SessionFile,
}

impl Session {
    /// Builds the client for the configured endpoint and restores saved
    /// cookies when they belong to the same endpoint.
    pub fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = Arc::new(HttpTransport::new(&config.graphql_url.value)?);
        let client = ApiClient::new(transport.clone());
        let file = SessionFile::new(config.session_path());

        match file.load() {
            Ok(Some(saved)) if saved.endpoint == transport.endpoint() => {
                transport.import_cookies(&saved.cookies);
                client.session().set_user_id(saved.user_id);
                tracing::debug!("Restored session from {}", file.path().display());
            }
            Ok(Some(saved)) => {
                tracing::debug!(
                    "Ignoring saved session for different endpoint {}",
                    saved.endpoint
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        Ok(Self {
            transport,
            client,
            file,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Returns true if any cookies are held for the endpoint.
    pub fn has_credentials(&self) -> bool {
        self.transport.export_cookies().is_some()
    }

    /// Writes the current cookies to disk. With no cookies left, removes the
    /// file only if it belongs to this endpoint.
    pub fn persist(&self) -> Result<(), SessionFileError> {
        match self.transport.export_cookies() {
            Some(cookies) => self.file.save(&SavedSession {
                endpoint: self.transport.endpoint().to_string(),
                cookies,
                user_id: self.client.session().user_id(),
            }),
            None => match self.file.load() {
                Ok(Some(saved)) if saved.endpoint != self.endpoint() => Ok(()),
                _ => self.file.clear(),
            },
        }
    }

    /// Forgets the local session regardless of what the server did.
    pub fn forget(&self) -> Result<(), SessionFileError> {
        self.file.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, ConfigValue};
    use tempfile::tempdir;

    fn saved() -> SavedSession {
        SavedSession {
            endpoint: "http://localhost:9000/graphql".to_string(),
            cookies: "access_token=abc; refresh_token=def".to_string(),
            user_id: Some("u1".to_string()),
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let temp_dir = tempdir().unwrap();
        let file = SessionFile::new(temp_dir.path().join("session.yaml"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let file = SessionFile::new(temp_dir.path().join("nested").join("session.yaml"));

        file.save(&saved()).unwrap();
        assert_eq!(file.load().unwrap(), Some(saved()));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let file = SessionFile::new(temp_dir.path().join("session.yaml"));
        file.save(&saved()).unwrap();

        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let file = SessionFile::new(temp_dir.path().join("session.yaml"));

        file.save(&saved()).unwrap();
        file.clear().unwrap();
        file.clear().unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("session.yaml");
        std::fs::write(&path, "cookies: [unterminated").unwrap();

        let err = SessionFile::new(path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse session file"));
    }

    fn config_for(endpoint: &str, data_dir: &Path) -> Config {
        Config {
            graphql_url: ConfigValue::new(endpoint.to_string(), ConfigSource::File),
            data_dir: ConfigValue::new(data_dir.to_path_buf(), ConfigSource::File),
            config_file: None,
        }
    }

    #[test]
    fn test_other_endpoint_keeps_saved_session() {
        let temp_dir = tempdir().unwrap();
        let config = config_for("http://other:9000/graphql", temp_dir.path());
        let file = SessionFile::new(config.session_path());
        file.save(&saved()).unwrap();

        let session = Session::open(&config).unwrap();
        assert!(!session.has_credentials());
        session.persist().unwrap();

        assert_eq!(file.load().unwrap(), Some(saved()));
    }

    #[test]
    fn test_persist_without_cookies_clears_own_session() {
        let temp_dir = tempdir().unwrap();
        let config = config_for("http://localhost:9000/graphql", temp_dir.path());
        let file = SessionFile::new(config.session_path());
        file.save(&SavedSession {
            cookies: String::new(),
            ..saved()
        })
        .unwrap();

        let session = Session::open(&config).unwrap();
        assert!(!session.has_credentials());
        session.persist().unwrap();

        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_session_restores_matching_endpoint() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            format!(
                "graphql_url: http://localhost:9000/graphql\ndata_dir: {}\n",
                temp_dir.path().display()
            ),
        )
        .unwrap();
        let config = Config::load(Some(config_path)).unwrap();
        if config.graphql_url.value != "http://localhost:9000/graphql" {
            // overridden from the environment
            return;
        }

        SessionFile::new(config.session_path()).save(&saved()).unwrap();

        let session = Session::open(&config).unwrap();
        assert!(session.has_credentials());
        assert_eq!(session.client().session().user_id(), Some("u1".to_string()));
    }
}
