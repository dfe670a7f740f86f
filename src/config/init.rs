// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates renova.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ServiceName;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(
    dir: &Path,
    service: Option<&str>,
    target: Option<&str>,
    repo: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(s) = service {
        config.service = ServiceName::new(s).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    if let Some(t) = target {
        config.target = t.into();
    }

    if let Some(r) = repo {
        config.repo = r.to_string();
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"service: {}
target: {}
repo: {}
branch: {}
preserve:
{}"#,
        config.service,
        config.target.display(),
        config.repo,
        config.branch,
        config
            .preserve
            .iter()
            .map(|p| format!("  - {}\n", p))
            .collect::<String>()
    )
}
