//! Lazily built blocking HTTP client
//!
//! `reqwest::blocking::Client` must not be constructed on an async worker
//! thread. Providers are usually created at startup inside the runtime but
//! only called from the blocking pool, so the client is built on first use.

use crate::LlmError;
use std::sync::OnceLock;
use std::time::Duration;

pub(crate) struct LazyClient {
    timeout: Duration,
    cell: OnceLock<reqwest::blocking::Client>,
}

impl LazyClient {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cell: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self) -> Result<&reqwest::blocking::Client, LlmError> {
        if let Some(client) = self.cell.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;
        // A concurrent first call may have won the race; either client is fine.
        let _ = self.cell.set(client);
        self.cell
            .get()
            .ok_or_else(|| LlmError::Config("HTTP client unavailable".to_string()))
    }
}
