//! Credential resolution for remote backends.
//!
//! A [`TokenProvider`] yields an API token on demand. Providers can be
//! chained so a token file takes precedence over the environment.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{HalError, HalResult};

/// Token provider trait for dependency injection.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get a valid access token.
    async fn get_token(&self) -> HalResult<String>;

    /// Check if authentication is available.
    fn has_valid_token(&self) -> bool;
}

/// Environment variable token provider.
pub struct EnvTokenProvider {
    env_var: String,
}

impl EnvTokenProvider {
    /// Create a new environment variable token provider.
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }

    /// Create provider for `IBM_QUANTUM_TOKEN`.
    pub fn ibm() -> Self {
        Self::new("IBM_QUANTUM_TOKEN")
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn get_token(&self) -> HalResult<String> {
        match std::env::var(&self.env_var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(HalError::Auth(format!(
                "Environment variable {} not set",
                self.env_var
            ))),
        }
    }

    fn has_valid_token(&self) -> bool {
        std::env::var(&self.env_var).is_ok_and(|t| !t.trim().is_empty())
    }
}

/// Reads the token from the first line of a file.
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    /// Create a provider for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this provider reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn get_token(&self) -> HalResult<String> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            HalError::Auth(format!(
                "Cannot read token file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        let token = contents.lines().next().unwrap_or("");
        if token.is_empty() {
            return Err(HalError::Auth(format!(
                "Token file '{}' is empty",
                self.path.display()
            )));
        }
        Ok(token.to_string())
    }

    fn has_valid_token(&self) -> bool {
        self.path.is_file()
    }
}

/// Tries each provider in order and returns the first token found.
pub struct ChainTokenProvider {
    providers: Vec<Box<dyn TokenProvider>>,
}

impl ChainTokenProvider {
    /// Create a chain from providers in priority order.
    pub fn new(providers: Vec<Box<dyn TokenProvider>>) -> Self {
        Self { providers }
    }

    /// Token file first, then `IBM_QUANTUM_TOKEN`.
    pub fn ibm(token_file: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(FileTokenProvider::new(token_file)),
            Box::new(EnvTokenProvider::ibm()),
        ])
    }
}

#[async_trait]
impl TokenProvider for ChainTokenProvider {
    async fn get_token(&self) -> HalResult<String> {
        let mut reasons = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.get_token().await {
                Ok(token) => return Ok(token),
                Err(e) => {
                    debug!("token provider skipped: {}", e);
                    reasons.push(e.to_string());
                }
            }
        }
        Err(HalError::Auth(format!(
            "no credential available ({})",
            reasons.join("; ")
        )))
    }

    fn has_valid_token(&self) -> bool {
        self.providers.iter().any(|p| p.has_valid_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_token_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "abc123").unwrap();
        writeln!(file, "ignored").unwrap();

        let provider = FileTokenProvider::new(file.path());
        assert!(provider.has_valid_token());
        assert_eq!(provider.get_token().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_file_token_read_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, " tok en \r\n").unwrap();

        let provider = FileTokenProvider::new(file.path());
        assert_eq!(provider.get_token().await.unwrap(), " tok en ");
    }

    #[tokio::test]
    async fn test_file_token_missing() {
        let provider = FileTokenProvider::new("/nonexistent/qdimer/APItoken.txt");
        assert!(!provider.has_valid_token());
        assert!(matches!(provider.get_token().await, Err(HalError::Auth(_))));
    }

    #[tokio::test]
    async fn test_file_token_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let provider = FileTokenProvider::new(file.path());
        assert!(provider.get_token().await.is_err());
    }

    #[tokio::test]
    async fn test_chain_falls_through() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();

        let chain = ChainTokenProvider::new(vec![
            Box::new(FileTokenProvider::new("/nonexistent/token")),
            Box::new(FileTokenProvider::new(file.path())),
        ]);
        assert!(chain.has_valid_token());
        assert_eq!(chain.get_token().await.unwrap(), "from-file");
    }

    #[tokio::test]
    async fn test_chain_reports_all_failures() {
        let chain = ChainTokenProvider::new(vec![
            Box::new(FileTokenProvider::new("/nonexistent/a")),
            Box::new(EnvTokenProvider::new("QDIMER_TEST_UNSET_TOKEN_VAR")),
        ]);
        let err = chain.get_token().await.unwrap_err().to_string();
        assert!(err.contains("/nonexistent/a"));
        assert!(err.contains("QDIMER_TEST_UNSET_TOKEN_VAR"));
    }
}
