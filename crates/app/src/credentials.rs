use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{HexlightError, HexlightResult};

/// File backed cache of the streaming service user credentials.
#[derive(Debug, Clone)]
pub struct CredentialsStore {
    path: PathBuf,
}

impl CredentialsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the cached credentials.
    ///
    /// Clients send the credentials with single quoted strings, they are stored
    /// with double quotes so the cache is valid JSON.
    pub fn store(&self, credentials: &str) -> HexlightResult<()> {
        let credentials = credentials.replace('\'', "\"");
        fs::write(&self.path, credentials).map_err(HexlightError::storage)?;
        log::info!("Cached credentials in {}", self.path.display());
        Ok(())
    }

    /// Returns the cached credentials, if any.
    pub fn load(&self) -> HexlightResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(HexlightError::storage(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_normalizes_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialsStore::new(dir.path().join("credentials.txt"));

        assert_eq!(store.load().unwrap(), None);
        store
            .store("{'access_token': 'abc', 'expires_in': 3600}")
            .unwrap();

        let cached = store.load().unwrap().unwrap();
        assert_eq!(cached, r#"{"access_token": "abc", "expires_in": 3600}"#);
        let json: serde_json::Value = serde_json::from_str(&cached).unwrap();
        assert_eq!(json["access_token"], "abc");
    }

    #[test]
    fn test_store_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialsStore::new(dir.path().join("missing").join("credentials.txt"));
        assert!(matches!(
            store.store("{}").unwrap_err(),
            HexlightError::Storage(_)
        ));
    }
}
