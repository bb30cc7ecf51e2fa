// ABOUTME: Credential discovery with a flag-then-environment precedence chain
// ABOUTME: dev.to API key is required; the Imgur client id is optional

use crate::{Error, Result};
use std::env;

pub const API_KEY_VAR: &str = "DEVTO_API_KEY";
pub const IMGUR_CLIENT_ID_VAR: &str = "IMGUR_CLIENT_ID";

pub fn resolve_api_key(cli_key: Option<String>) -> Result<String> {
    resolve(cli_key, API_KEY_VAR).ok_or_else(|| {
        Error::Auth(format!(
            "No dev.to API key found. Provide via --devto-api-key or {} env var",
            API_KEY_VAR
        ))
    })
}

/// Image rehosting is disabled when this returns `None`.
pub fn resolve_imgur_client_id(cli_id: Option<String>) -> Option<String> {
    resolve(cli_id, IMGUR_CLIENT_ID_VAR)
}

fn resolve(cli_value: Option<String>, var: &str) -> Option<String> {
    cli_value
        .or_else(|| env::var(var).ok())
        .filter(|value| !value.trim().is_empty())
}
