use anyhow::Result;
use tracing::debug;

use crate::{
    app::{load_config, Config},
    cli::{handle_command, Cli},
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = load_config(cli.config.as_deref())?;

        // CLI argument overrides configuration
        if let Some(server) = &cli.server {
            config.server.url = server.clone();
        }
        debug!(server = %config.server.url, cache = %config.cache.version, "configuration loaded");

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the requested command, listing stations when none was given
    pub async fn run(self) -> Result<()> {
        let command = self.cli.command.clone().unwrap_or_default();
        handle_command(&command, &self.config, self.cli.config.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_server_flag_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nurl = \"http://from-file.test\"\n").unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let cli = Cli::parse_from(["mybike", "--config", &path_arg, "status"]);
        let orchestrator = Orchestrator::new(cli).unwrap();
        assert_eq!(orchestrator.config().server.url, "http://from-file.test");

        let cli = Cli::parse_from([
            "mybike",
            "--config",
            &path_arg,
            "--server",
            "http://from-flag.test",
            "status",
        ]);
        let orchestrator = Orchestrator::new(cli).unwrap();
        assert_eq!(orchestrator.config().server.url, "http://from-flag.test");
    }
}
