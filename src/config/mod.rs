// ABOUTME: Configuration types and parsing for renova.yml.
// ABOUTME: Handles YAML parsing, discovery, defaults, and resolved paths.

mod healthcheck;
mod init;
mod local_changes;

pub use healthcheck::HealthcheckConfig;
pub use init::init_config;
pub use local_changes::LocalChangesPolicy;

use crate::error::{Error, Result};
use crate::types::ServiceName;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "renova.yml";
pub const CONFIG_FILENAME_ALT: &str = "renova.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".renova/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub service: ServiceName,

    /// Live deployment directory. Must exist before a run starts.
    pub target: PathBuf,

    /// Clone URL of the source repository (used by the merge path).
    pub repo: String,

    /// Remote name the fast path fetches from.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch the fast path resets to.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Entries (relative to `target`) that survive a merge-path resync.
    /// Matched by exact name, never by prefix or glob.
    #[serde(default = "default_preserve")]
    pub preserve: Vec<String>,

    /// Shell-invoked control scripts: CRLF-fixed and marked executable.
    #[serde(default = "default_control_scripts")]
    pub control_scripts: Vec<String>,

    /// Helper scripts: CRLF-fixed only.
    #[serde(default = "default_support_scripts")]
    pub support_scripts: Vec<String>,

    /// Backend directory (relative to `target`) where dependencies are
    /// installed and the service entrypoint lives.
    #[serde(default = "default_backend_dir")]
    pub backend_dir: PathBuf,

    /// Service entrypoint (relative to the backend dir), used by the
    /// raw-process restart strategy and first `pm2 start`.
    #[serde(default = "default_entrypoint")]
    pub entrypoint: String,

    #[serde(default = "default_frontend")]
    pub frontend: Option<FrontendConfig>,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default)]
    pub healthcheck: HealthcheckConfig,

    #[serde(default)]
    pub on_local_changes: LocalChangesPolicy,

    /// Bound on git network operations (fetch, clone).
    #[serde(default = "default_network_timeout", with = "humantime_serde")]
    pub network_timeout: Duration,

    /// Alternate global git config file the environment tweaks are written
    /// to (git's `GIT_CONFIG_GLOBAL`). Defaults to the invoking user's own.
    #[serde(default)]
    pub git_config_global: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackupConfig {
    /// Directory snapshots are written to. Defaults to a `backups` directory
    /// next to the deployment target.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Snapshot name prefix. Defaults to the service name.
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    /// Built assets produced by the frontend build, relative to `target`.
    #[serde(default = "default_frontend_src")]
    pub src: PathBuf,

    /// Directory the web server serves, relative to `target`.
    #[serde(default = "default_frontend_dest")]
    pub dest: PathBuf,

    /// Stamp `index.html` with the deployed revision and time.
    #[serde(default = "default_true")]
    pub stamp: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            src: default_frontend_src(),
            dest: default_frontend_dest(),
            stamp: true,
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_preserve() -> Vec<String> {
    ["uploads", ".env", "data", "node_modules"]
        .map(String::from)
        .to_vec()
}

fn default_control_scripts() -> Vec<String> {
    ["deploy.sh", "auto-deploy.sh", "update-server.sh"]
        .map(String::from)
        .to_vec()
}

fn default_support_scripts() -> Vec<String> {
    vec![]
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from("backend")
}

fn default_entrypoint() -> String {
    "server.js".to_string()
}

fn default_frontend() -> Option<FrontendConfig> {
    Some(FrontendConfig::default())
}

fn default_frontend_src() -> PathBuf {
    PathBuf::from("frontend-src/dist")
}

fn default_frontend_dest() -> PathBuf {
    PathBuf::from("frontend/dist")
}

fn default_true() -> bool {
    true
}

fn default_network_timeout() -> Duration {
    Duration::from_secs(300)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Directory snapshots are written to.
    pub fn backup_dir(&self) -> PathBuf {
        match &self.backup.dir {
            Some(dir) => dir.clone(),
            None => self
                .target
                .parent()
                .unwrap_or(Path::new("/"))
                .join("backups"),
        }
    }

    /// Snapshot name prefix.
    pub fn backup_prefix(&self) -> &str {
        self.backup
            .prefix
            .as_deref()
            .unwrap_or_else(|| self.service.as_str())
    }

    /// Absolute backend directory.
    pub fn backend_path(&self) -> PathBuf {
        self.target.join(&self.backend_dir)
    }

    pub fn template() -> Self {
        Config {
            service: ServiceName::new("my-app").unwrap(),
            target: PathBuf::from("/var/www/my-app"),
            repo: "git@git.example.com:org/my-app.git".to_string(),
            remote: default_remote(),
            branch: default_branch(),
            preserve: default_preserve(),
            control_scripts: default_control_scripts(),
            support_scripts: default_support_scripts(),
            backend_dir: default_backend_dir(),
            entrypoint: default_entrypoint(),
            frontend: default_frontend(),
            backup: BackupConfig::default(),
            healthcheck: HealthcheckConfig::default(),
            on_local_changes: LocalChangesPolicy::default(),
            network_timeout: default_network_timeout(),
            git_config_global: None,
        }
    }
}

// Custom deserializers

fn deserialize_service_name<'de, D>(deserializer: D) -> std::result::Result<ServiceName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ServiceName::new(&s).map_err(serde::de::Error::custom)
}
