/// `load_config` module: loads and adapts a static YAML config — including
/// environment secret injection — into the runtime configuration.
///
/// This module is the only place where untrusted YAML is parsed and mapped
/// to rich, strongly-typed internal structs.
///
/// # Responsibilities
/// - Parse user-supplied YAML configuration files into type-safe Rust structs
/// - Inject environment variables for the two session tokens (upload vs
///   reply posting) so secrets never live in the YAML file
/// - Validate cross-field constraints (pacing bounds ordered)
/// - Ensure robust error messages for CLI and tests: any failure in loading
///   must result in clear diagnostics
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich
/// diagnostics, and are surfaced at the CLI boundary.
use anyhow::Result;
use nickpack_core::distribute::Pacing;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Env var holding the upload-session token.
pub const UPLOAD_TOKEN_VAR: &str = "NICKPACK_UPLOAD_TOKEN";
/// Env var holding the reply-session token.
pub const REPLY_TOKEN_VAR: &str = "NICKPACK_REPLY_TOKEN";

#[derive(Debug, Deserialize)]
pub struct WatchSection {
    /// Watched post id; compared against incoming numeric post ids by
    /// string equality.
    pub post_id: String,
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_label() -> String {
    "nick".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub version: String,
    pub group_id: i64,
    #[serde(default = "default_poll_wait")]
    pub poll_wait_secs: u32,
}

fn default_api_version() -> String {
    "5.131".to_string()
}

fn default_poll_wait() -> u32 {
    25
}

#[derive(Debug, Deserialize)]
pub struct AssetsSection {
    pub dir: PathBuf,
}

#[derive(Debug)]
pub struct CliConfig {
    pub watch: WatchSection,
    pub api: ApiSection,
    pub assets: AssetsSection,
    pub pacing: Pacing,
    pub upload_token: String,
    pub reply_token: String,
}

/// Loads a static YAML config file (no secrets) and injects required env
/// vars for the two session tokens. Returns the full runtime config.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    #[derive(Debug, Deserialize)]
    struct RawConfig {
        watch: WatchSection,
        api: ApiSection,
        assets: AssetsSection,
        #[serde(default)]
        pacing: Option<Pacing>,
    }

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let pacing = raw.pacing.unwrap_or_default();
    if pacing.min_ms > pacing.max_ms {
        return Err(anyhow::anyhow!(
            "Invalid pacing bounds: min_ms {} > max_ms {}",
            pacing.min_ms,
            pacing.max_ms
        ));
    }

    let upload_token = std::env::var(UPLOAD_TOKEN_VAR)
        .map_err(|_| anyhow::anyhow!("{UPLOAD_TOKEN_VAR} env var must be set"))?;
    let reply_token = std::env::var(REPLY_TOKEN_VAR)
        .map_err(|_| anyhow::anyhow!("{REPLY_TOKEN_VAR} env var must be set"))?;

    Ok(CliConfig {
        watch: raw.watch,
        api: raw.api,
        assets: raw.assets,
        pacing,
        upload_token,
        reply_token,
    })
}
