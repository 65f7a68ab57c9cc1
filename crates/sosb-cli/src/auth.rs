//! `auth` command: one-time Google Ads OAuth setup.
//!
//! `auth url` prints the consent URL; after granting access the user pastes
//! the `code` query parameter into `auth exchange`, which stores the refresh
//! token in the env file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use sosb_core::AppConfig;
use sosb_volume::{OAuthClient, DEFAULT_REDIRECT_URI};

const REFRESH_TOKEN_VAR: &str = "GOOGLE_REFRESH_TOKEN";

#[derive(Debug, Subcommand)]
pub enum AuthCommands {
    /// Print the Google consent URL
    Url {
        /// Redirect URI registered for the OAuth client
        #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
        redirect_uri: String,
    },
    /// Exchange an authorization code and save the refresh token
    Exchange {
        /// The `code` query parameter from the consent redirect
        #[arg(long)]
        code: String,
        /// Env file that receives GOOGLE_REFRESH_TOKEN
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        /// Must match the redirect URI used for `auth url`
        #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
        redirect_uri: String,
    },
}

/// Print the consent URL for the configured OAuth client.
///
/// # Errors
///
/// Returns an error if `GOOGLE_CLIENT_ID` or `GOOGLE_CLIENT_SECRET` is unset.
pub(crate) fn run_auth_url(config: &AppConfig, redirect_uri: &str) -> anyhow::Result<()> {
    let client = OAuthClient::from_app_config(config)?;
    println!("Open this URL in a browser and grant access:\n");
    println!("{}\n", client.authorization_url(redirect_uri));
    println!("Then run: sosb-cli auth exchange --code <code from the redirect URL>");
    Ok(())
}

/// Exchange `code` for tokens and upsert the refresh token into `env_file`.
///
/// # Errors
///
/// Returns an error if the OAuth credentials are missing, Google rejects the
/// code, no refresh token is returned, or the env file cannot be written.
pub(crate) async fn run_auth_exchange(
    config: &AppConfig,
    code: &str,
    env_file: &Path,
    redirect_uri: &str,
) -> anyhow::Result<()> {
    let client = OAuthClient::from_app_config(config)?;
    let tokens = client.exchange_code(code.trim(), redirect_uri).await?;
    let refresh_token = tokens.refresh_token.ok_or_else(|| {
        anyhow::anyhow!(
            "Google returned no refresh token; revoke the app's access and run `auth url` again"
        )
    })?;

    let existing = match std::fs::read_to_string(env_file) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", env_file.display()));
        }
    };
    let updated = upsert_env_var(&existing, REFRESH_TOKEN_VAR, &refresh_token);
    std::fs::write(env_file, updated)
        .with_context(|| format!("failed to write {}", env_file.display()))?;

    tracing::info!(path = %env_file.display(), "stored Google Ads refresh token");
    println!("{REFRESH_TOKEN_VAR} saved to {}", env_file.display());
    Ok(())
}

/// Sets `key=value` in env-file `contents`, replacing the first existing
/// assignment (with or without `export`) and dropping later duplicates.
pub(crate) fn upsert_env_var(contents: &str, key: &str, value: &str) -> String {
    let assignment = format!("{key}={value}");
    let matches_key = |line: &str| {
        let line = line.trim_start();
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
        line.strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    };

    let mut replaced = false;
    let mut lines: Vec<String> = Vec::new();
    for line in contents.lines() {
        if matches_key(line) {
            if !replaced {
                lines.push(assignment.clone());
                replaced = true;
            }
        } else {
            lines.push(line.to_owned());
        }
    }
    if !replaced {
        lines.push(assignment);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
