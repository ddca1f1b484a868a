use std::fs;

use crate::error::{Result, SyncError};

/// Reads the CRM access token from its mounted secret file. The run must
/// abort before any network call when the token is unavailable.
pub fn load_api_token(path: &str) -> Result<String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| SyncError::Config(format!("failed to read token file '{}': {}", path, e)))?;
    let token = raw.trim();
    if token.is_empty() {
        return Err(SyncError::Config(format!("token file '{}' is empty", path)));
    }
    Ok(token.to_string())
}
