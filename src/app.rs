//! Per-invocation application context.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{self, CENTRAL_DIR_NAME, Config};
use crate::error::Result;

/// State shared by every command handler.
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    /// Resolved home directory (`SP_HOME` override honored).
    pub home: PathBuf,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let home = config::home_dir()?;
        Ok(Self {
            config,
            home,
            robot_mode: cli.robot,
            verbosity: cli.verbose,
        })
    }

    /// The central working copy path, before any CLI `--dir` override.
    pub fn central_dir(&self) -> Result<PathBuf> {
        match &self.config.source.dir {
            Some(dir) => config::expand_home(dir),
            None => Ok(self.home.join(CENTRAL_DIR_NAME)),
        }
    }
}
