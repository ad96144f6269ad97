use std::path::PathBuf;

use crate::config::{config_dir, ServerConfig};
use crate::error::{AdminError, Result};

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    tracing::debug!(command, status = %output.status, "token command yielded nothing");
    None
}

/// Stored token path: ~/.config/cine-admin/token
fn token_path() -> Option<PathBuf> {
    Some(config_dir()?.join("token"))
}

fn load_stored_token() -> Option<String> {
    let path = token_path()?;
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn save_token(token: &str) -> std::io::Result<()> {
    if let Some(path) = token_path() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, token)?;
    }
    Ok(())
}

fn env_token(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|t| !t.is_empty())
}

/// Load the session token, trying in order:
/// 1. Env var named in config
/// 2. Stored token from ~/.config/cine-admin/token
/// 3. token_command from config (the result is stored)
pub fn load_token(server: &ServerConfig) -> Result<String> {
    if let Some(token) = server.token_env.as_deref().and_then(env_token) {
        return Ok(token);
    }

    if let Some(token) = load_stored_token() {
        return Ok(token);
    }

    if let Some(cmd) = &server.token_command {
        if let Some(token) = try_cli_token(cmd) {
            if let Err(e) = save_token(&token) {
                tracing::warn!(error = %e, "could not store token");
            }
            return Ok(token);
        }
    }

    Err(AdminError::Auth(format!(
        "No session token found. Set {} or configure a token_command.",
        server.token_env.as_deref().unwrap_or("a token env var")
    )))
}

/// Remove the stored token so the next start has to sign in again.
pub fn forget_token() -> Result<()> {
    let Some(path) = token_path() else {
        return Ok(());
    };
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
