use std::io;
use std::path::Path;
use std::process::{Command, Output};

use serde::Serialize;
use snafu::{ensure, Snafu};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Package tool [{}] not found", tool))]
    ToolNotFound { tool: String, source: io::Error },

    #[snafu(display("Failed to run package tool [{}]: {}", tool, source))]
    ToolSpawn { tool: String, source: io::Error },

    #[snafu(display("Package [{}] could not be resolved: {}", package, stderr.trim()))]
    Unresolved { package: String, stderr: String },

    #[snafu(display(
        "Package [{}] is older than the required version {}: {}",
        package,
        version,
        stderr.trim()
    ))]
    TooOld {
        package: String,
        version: String,
        stderr: String,
    },
}
type Result<T, E = Error> = std::result::Result<T, E>;

/// Compile and link flags reported for a package, in the order the tool printed them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PkgFlags {
    pub flags: Vec<String>,
}

impl PkgFlags {
    /// Splits tool output on whitespace, the way an unquoted command
    /// substitution is word-split by the shell.
    pub fn parse(raw: &str) -> PkgFlags {
        PkgFlags {
            flags: raw.split_whitespace().map(String::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

pub struct PkgConfig<'a> {
    tool: &'a str,
    tool_args: &'a [String],
    working_dir: &'a Path,
}

impl<'a> PkgConfig<'a> {
    /// `tool_args` go before every query, e.g. `--static`.
    pub fn new(tool: &'a str, tool_args: &'a [String], working_dir: &'a Path) -> PkgConfig<'a> {
        PkgConfig {
            tool,
            tool_args,
            working_dir,
        }
    }

    /// Arguments of the flags query, in the order the classic makefile one-liner uses.
    pub fn query_args(package: &str) -> [&str; 3] {
        [package, "--cflags", "--libs"]
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        log::debug!(
            "running {} {} {}",
            self.tool,
            self.tool_args.join(" "),
            args.join(" ")
        );
        Command::new(self.tool)
            .args(self.tool_args)
            .args(args)
            .current_dir(self.working_dir)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::ToolNotFound {
                    tool: String::from(self.tool),
                    source: e,
                },
                _ => Error::ToolSpawn {
                    tool: String::from(self.tool),
                    source: e,
                },
            })
    }

    pub fn require_version(&self, package: &str, version: &str) -> Result<()> {
        let arg = format!("--atleast-version={}", version);
        let out = self.run(&[&arg, package])?;
        ensure!(
            out.status.success(),
            TooOld {
                package,
                version,
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            }
        );
        Ok(())
    }

    pub fn flags(&self, package: &str) -> Result<PkgFlags> {
        let out = self.run(&PkgConfig::query_args(package))?;
        ensure!(
            out.status.success(),
            Unresolved {
                package,
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            }
        );

        let flags = PkgFlags::parse(&String::from_utf8_lossy(&out.stdout));
        if flags.is_empty() {
            log::warn!("{} reported no flags for {}", self.tool, package);
        }
        log::debug!("{} flags: {:?}", package, flags.flags);
        Ok(flags)
    }
}
