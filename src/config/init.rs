// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a commented cutover.yml template.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, host: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, template_yaml(host.unwrap_or("deploy@server.example.com")))?;

    Ok(())
}

fn template_yaml(server: &str) -> String {
    format!(
        r#"# Group name used as the task prefix, e.g. `staging:deployer:deploy`
# name: staging

deployer:
  from: ./
  to: ~/app
  # exclude:
  #   - "*.log"
  #   - "tmp/"
  # before_script: scripts/before.sh
  # after_script: scripts/after.sh

servers:
  - {server}
    # SSH host key verification (default: false for security)
    # Use the detailed form with trust_first_connection: true to enable
    # Trust-On-First-Use, or pre-populate ~/.ssh/known_hosts
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn template_parses() {
        let config = Config::from_yaml(&template_yaml("deploy@web1.example.com")).unwrap();
        assert_eq!(config.servers.first().host, "web1.example.com");
        assert_eq!(config.deployer.to.as_deref(), Some("~/app"));
        assert!(config.name.is_none());
    }
}
