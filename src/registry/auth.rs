//! Composer HTTP basic credentials
//!
//! Reads the `http-basic` section of composer's `auth.json`:
//!
//! ```json
//! { "http-basic": { "repo.example.com": { "username": "u", "password": "p" } } }
//! ```
//!
//! The project file overrides the global file host by host.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const AUTH_FILE: &str = "auth.json";

/// Username and password for one host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
struct AuthFile {
    #[serde(default, rename = "http-basic")]
    http_basic: HashMap<String, Credentials>,
}

/// Credentials by host, merged from the global and project auth files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStore {
    hosts: HashMap<String, Credentials>,
}

impl CredentialStore {
    /// Load the global auth file and `auth.json` in `project_dir`
    pub fn load(project_dir: &Path) -> Self {
        Self::from_files(
            global_auth_path().as_deref(),
            Some(&project_dir.join(AUTH_FILE)),
        )
    }

    /// Load from explicit file locations; missing files are skipped
    pub fn from_files(global: Option<&Path>, project: Option<&Path>) -> Self {
        let global = global.map(read_auth_file).unwrap_or_default();
        let project = project.map(read_auth_file).unwrap_or_default();
        Self::merge(global, project)
    }

    /// Merge two host maps, `project` entries winning on collision
    pub fn merge(
        global: HashMap<String, Credentials>,
        project: HashMap<String, Credentials>,
    ) -> Self {
        let mut hosts = global;
        hosts.extend(project);
        Self { hosts }
    }

    /// Credentials configured for `host`
    pub fn for_host(&self, host: &str) -> Option<&Credentials> {
        self.hosts.get(host)
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// `$COMPOSER_HOME/auth.json`, else `~/.composer/auth.json`, else the XDG location
fn global_auth_path() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("COMPOSER_HOME") {
        return Some(PathBuf::from(home).join(AUTH_FILE));
    }
    let legacy = dirs::home_dir().map(|home| home.join(".composer").join(AUTH_FILE));
    match legacy {
        Some(path) if path.exists() => Some(path),
        _ => dirs::config_dir().map(|dir| dir.join("composer").join(AUTH_FILE)),
    }
}

fn read_auth_file(path: &Path) -> HashMap<String, Credentials> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("no auth file at {}: {}", path.display(), e);
            return HashMap::new();
        }
    };
    match serde_json::from_str::<AuthFile>(&raw) {
        Ok(file) => file.http_basic,
        Err(e) => {
            warn!("ignoring malformed auth file {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(user: &str, pass: &str) -> Credentials {
        Credentials {
            username: user.to_string(),
            password: pass.to_string(),
        }
    }

    #[test]
    fn test_project_overrides_global() {
        let global = HashMap::from([
            ("a.test".to_string(), creds("global", "g")),
            ("b.test".to_string(), creds("global-b", "gb")),
        ]);
        let project = HashMap::from([("a.test".to_string(), creds("project", "p"))]);

        let store = CredentialStore::merge(global, project);
        assert_eq!(store.for_host("a.test"), Some(&creds("project", "p")));
        assert_eq!(store.for_host("b.test"), Some(&creds("global-b", "gb")));
        assert!(store.for_host("c.test").is_none());
    }

    #[test]
    fn test_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.json");
        let project = dir.path().join("project.json");
        std::fs::write(
            &global,
            r#"{"http-basic": {"repo.acme.test": {"username": "g", "password": "1"}}, "github-oauth": {"github.com": "x"}}"#,
        )
        .unwrap();
        std::fs::write(
            &project,
            r#"{"http-basic": {"repo.acme.test": {"username": "p", "password": "2"}}}"#,
        )
        .unwrap();

        let store = CredentialStore::from_files(Some(&global), Some(&project));
        assert_eq!(store.for_host("repo.acme.test"), Some(&creds("p", "2")));
    }

    #[test]
    fn test_missing_and_malformed_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let malformed = dir.path().join("auth.json");
        std::fs::write(&malformed, "{ nope").unwrap();

        let store =
            CredentialStore::from_files(Some(&dir.path().join("missing.json")), Some(&malformed));
        assert!(store.is_empty());
    }
}
