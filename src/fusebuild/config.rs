use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};

const DEFAULT_COMPILER: &str = "gcc";
const DEFAULT_SOURCE: &str = "passthrough.c";
const DEFAULT_OUTPUT: &str = "passthrough";
const DEFAULT_PKG_CONFIG: &str = "pkg-config";
const DEFAULT_PACKAGE: &str = "fuse3";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to read config file [{}]: {}", path.display(), source))]
    ReadConfig { source: io::Error, path: PathBuf },

    #[snafu(display("Invalid config file [{}]: {}", path.display(), source))]
    ParseConfig {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("Config field `{}` must not be empty", field))]
    EmptyField { field: &'static str },

    #[snafu(display("Output [{}] would overwrite the source file", output.display()))]
    OutputIsSource { output: PathBuf },
}
type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything the builder needs to know. The default value reproduces
/// `gcc -Wall passthrough.c `pkg-config fuse3 --cflags --libs` -o passthrough`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub compiler: String,
    pub warnings: Vec<String>,
    pub source: PathBuf,
    pub pkg_config: String,
    pub pkg_config_args: Vec<String>,
    pub package: String,
    pub min_version: Option<String>,
    pub extra_flags: Vec<String>,
    pub output: PathBuf,
    pub working_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            compiler: String::from(DEFAULT_COMPILER),
            warnings: vec![String::from("-Wall")],
            source: PathBuf::from(DEFAULT_SOURCE),
            pkg_config: String::from(DEFAULT_PKG_CONFIG),
            pkg_config_args: Vec::new(),
            package: String::from(DEFAULT_PACKAGE),
            min_version: None,
            extra_flags: Vec::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            working_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        log::debug!("loading config from {}", path.display());
        let raw = fs::read_to_string(path).context(ReadConfig { path })?;
        serde_json::from_str(&raw).context(ParseConfig { path })
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.compiler.is_empty(), EmptyField { field: "compiler" });
        ensure!(
            !self.source.as_os_str().is_empty(),
            EmptyField { field: "source" }
        );
        ensure!(
            !self.pkg_config.is_empty(),
            EmptyField {
                field: "pkg_config"
            }
        );
        ensure!(!self.package.is_empty(), EmptyField { field: "package" });
        ensure!(
            !self.output.as_os_str().is_empty(),
            EmptyField { field: "output" }
        );
        ensure!(
            self.output != self.source,
            OutputIsSource {
                output: self.output.clone()
            }
        );
        Ok(())
    }

    /// Source file, relative to the working directory.
    pub fn source_path(&self) -> PathBuf {
        self.working_dir.join(&self.source)
    }

    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output)
    }
}
