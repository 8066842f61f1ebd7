use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use snafu::{ResultExt, Snafu};

use crate::fusebuild::{Builder, Config, ConfigError, Error as BuildError};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{}", source))]
    LoadConfig { source: ConfigError },

    #[snafu(display("{}", source))]
    Build { source: BuildError },

    #[snafu(display("Failed to serialize report: {}", source))]
    SerializeReport { source: serde_json::Error },

    #[snafu(display("Failed to write to stdout: {}", source))]
    Stdout { source: io::Error },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::LoadConfig { .. } => 78,
            Error::Build { source } => source.exit_code(),
            Error::SerializeReport { .. } | Error::Stdout { .. } => 74,
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Compile a FUSE passthrough filesystem from its C source.
///
/// With no arguments, runs
/// gcc -Wall passthrough.c `pkg-config fuse3 --cflags --libs` -o passthrough
#[derive(Parser, Debug)]
#[command(name = "fusebuild", version = VERSION, author = "William Dussault")]
pub struct CLI {
    /// Debug logging. Raises the level even when RUST_LOG is set.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// JSON config file. Command line flags override its fields.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Directory the compiler runs in.
    #[arg(short = 'C', long = "dir")]
    dir: Option<PathBuf>,

    #[arg(long = "compiler")]
    compiler: Option<String>,

    #[arg(long = "source")]
    source: Option<PathBuf>,

    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Library whose flags are queried.
    #[arg(long = "package")]
    package: Option<String>,

    #[arg(long = "pkg-config")]
    pkg_config: Option<String>,

    /// Argument placed before every package query, e.g. --static.
    #[arg(long = "pkg-config-arg", allow_hyphen_values = true)]
    pkg_config_args: Vec<String>,

    /// Fail unless the library is at least this version.
    #[arg(long = "min-version")]
    min_version: Option<String>,

    /// Extra compiler flag, appended after the library flags.
    #[arg(long = "flag", allow_hyphen_values = true)]
    flags: Vec<String>,

    /// Print the command instead of running it.
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Only resolve the library flags.
    #[arg(long = "check", conflicts_with = "dry_run")]
    check: bool,

    /// Print results as JSON.
    #[arg(long = "json")]
    json: bool,
}

impl CLI {
    pub fn config(&self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_file(path).context(LoadConfig)?,
            None => Config::default(),
        };

        if let Some(dir) = &self.dir {
            cfg.working_dir = dir.clone();
        }
        if let Some(compiler) = &self.compiler {
            cfg.compiler = compiler.clone();
        }
        if let Some(source) = &self.source {
            cfg.source = source.clone();
        }
        if let Some(output) = &self.output {
            cfg.output = output.clone();
        }
        if let Some(package) = &self.package {
            cfg.package = package.clone();
        }
        if let Some(pkg_config) = &self.pkg_config {
            cfg.pkg_config = pkg_config.clone();
        }
        if let Some(version) = &self.min_version {
            cfg.min_version = Some(version.clone());
        }
        cfg.pkg_config_args
            .extend(self.pkg_config_args.iter().cloned());
        cfg.extra_flags.extend(self.flags.iter().cloned());

        Ok(cfg)
    }

    fn print<T: serde::Serialize, W: Write>(&self, out: &mut W, value: &T, text: &str) -> Result<()> {
        let line = if self.json {
            serde_json::to_string_pretty(value).context(SerializeReport)?
        } else {
            String::from(text)
        };
        writeln!(out, "{}", line).context(Stdout)
    }

    pub fn run(&self) -> Result<()> {
        self.run_to(&mut io::stdout())
    }

    /// Runs the selected mode, writing results to `out`.
    pub fn run_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let builder = Builder::new(self.config()?)
            .context(Build)?
            .stdout_to_stderr(self.json);

        if self.dry_run {
            return self.print(out, builder.plan(), &builder.plan().render());
        }

        if self.check {
            let flags = builder.resolve_dependencies().context(Build)?;
            return self.print(out, &flags, &flags.flags.join(" "));
        }

        let report = builder.build().context(Build)?;
        if self.json {
            self.print(out, &report, "")?;
        }
        Ok(())
    }
}
