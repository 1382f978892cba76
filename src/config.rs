//! Config for usbscan binary
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};
use crate::scanner::{ExternalCommand, Scanner, DEFAULT_BUFFER_SIZE, DEFAULT_COMMAND};

const CONF_DIR: &str = "usbscan";
const CONF_NAME: &str = "usbscan.json";

/// Overrides for the command that is streamed and how
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Program to run instead of `lsusb`
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
    /// Line buffer capacity in bytes
    #[serde(default)]
    pub buffer_size: Option<usize>,
}

impl Config {
    /// Default new
    pub fn new() -> Config {
        Config {
            ..Default::default()
        }
    }

    /// Path of the system config file; `None` if the platform has no config dir
    pub fn sys_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONF_DIR).join(CONF_NAME))
    }

    /// Config from the system config file if it exists, otherwise [`Config::new`]
    pub fn sys() -> Result<Config> {
        match Self::sys_path() {
            Some(path) if path.exists() => {
                log::info!("Using system config {:?}", path);
                Config::from_file(&path)
            }
            _ => {
                log::debug!("No system config, using default");
                Ok(Config::new())
            }
        }
    }

    /// Attempt to read from .json format config at `file_path`
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Config> {
        let f = File::open(file_path.as_ref()).map_err(|e| {
            Error::new(
                ErrorKind::Config,
                &format!("Failed to open {:?}: {}", file_path.as_ref(), e),
            )
        })?;
        let mut br = BufReader::new(f);
        let mut data = String::new();

        br.read_to_string(&mut data)?;
        Config::from_json(&data)
    }

    /// Parse config from json string
    pub fn from_json(data: &str) -> Result<Config> {
        Ok(serde_json::from_str::<Config>(data)?)
    }

    /// Run `program` instead; args from config belonged to the previous program so are cleared
    pub fn set_command(&mut self, program: &str) {
        self.command = Some(program.to_string());
        self.args.clear();
    }

    /// The [`ExternalCommand`] described by config
    pub fn command(&self) -> ExternalCommand {
        ExternalCommand::new(self.command.as_deref().unwrap_or(DEFAULT_COMMAND))
            .args(self.args.iter())
    }

    /// Build a [`Scanner`] from config
    pub fn scanner(&self) -> Scanner {
        Scanner::new(self.command())
            .with_buffer_size(self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE))
    }
}
