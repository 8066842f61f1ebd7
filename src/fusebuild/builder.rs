use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Serialize;
use snafu::{ensure, ResultExt, Snafu};

use super::pkgconfig::Error as PkgError;
use super::{BuildPlan, Config, ConfigError, Invocation, PkgConfig, PkgFlags};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{}", source))]
    InvalidConfig { source: ConfigError },

    #[snafu(display("Source file [{}] not found", path.display()))]
    SourceNotFound { path: PathBuf },

    #[snafu(display("Dependency resolution failed: {}", source))]
    DependencyResolution { source: PkgError },

    #[snafu(display("Compiler [{}] not found", compiler))]
    CompilerNotFound { compiler: String, source: io::Error },

    #[snafu(display("Failed to run compiler [{}]: {}", compiler, source))]
    CompilerSpawn { compiler: String, source: io::Error },

    #[snafu(display("Compiler exited with non-zero status code: {}", code))]
    CompileFailed { code: i32, stderr: String },
}
type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CompileFailed { code, .. } => *code,
            Error::SourceNotFound { .. } => 66,
            Error::DependencyResolution { .. } => 69,
            Error::CompilerNotFound { .. } => 127,
            Error::CompilerSpawn { .. } => 71,
            Error::InvalidConfig { .. } => 78,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BuildReport {
    pub output: PathBuf,
    pub invocation: Invocation,
    pub code: i32,
    pub stderr: String,
}

/// Builder compiles a single C source against the flags of one pkg-config package.
pub struct Builder {
    cfg: Config,
    plan: BuildPlan,
    stdout_to_stderr: bool,
}

impl Builder {
    pub fn new(cfg: Config) -> Result<Builder> {
        cfg.validate().context(InvalidConfig)?;
        let plan = BuildPlan::new(&cfg);
        Ok(Builder {
            cfg,
            plan,
            stdout_to_stderr: false,
        })
    }

    /// Sends compiler stdout to our stderr, keeping stdout for machine-readable output.
    pub fn stdout_to_stderr(mut self, enabled: bool) -> Builder {
        self.stdout_to_stderr = enabled;
        self
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    fn pkg_config(&self) -> PkgConfig<'_> {
        PkgConfig::new(
            &self.cfg.pkg_config,
            &self.cfg.pkg_config_args,
            &self.cfg.working_dir,
        )
    }

    /// Resolves the package flags without compiling anything.
    pub fn resolve_dependencies(&self) -> Result<PkgFlags> {
        let pkg = self.pkg_config();
        if let Some(version) = &self.cfg.min_version {
            pkg.require_version(&self.cfg.package, version)
                .context(DependencyResolution)?;
        }
        pkg.flags(&self.cfg.package).context(DependencyResolution)
    }

    /// Runs the compiler to completion.
    ///
    /// Compiler stderr is captured and only replayed to our stderr once the
    /// compiler exits, so diagnostics of a long build appear at the end.
    pub fn build(&self) -> Result<BuildReport> {
        log::info!("building: {}", self.plan);

        let source = self.cfg.source_path();
        ensure!(source.is_file(), SourceNotFound { path: source });

        let flags = self.resolve_dependencies()?;
        let invocation = self.plan.resolve(&flags, &self.cfg.working_dir);
        log::debug!("exec: {}", invocation);

        let stdout = if self.stdout_to_stderr {
            Stdio::piped()
        } else {
            Stdio::inherit()
        };

        let out = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::CompilerNotFound {
                    compiler: invocation.program.clone(),
                    source: e,
                },
                _ => Error::CompilerSpawn {
                    compiler: invocation.program.clone(),
                    source: e,
                },
            })?;

        // Diagnostics still belong on the console.
        forward_to_stderr(&out.stdout);
        forward_to_stderr(&out.stderr);
        let stderr = String::from_utf8_lossy(&out.stderr).into_owned();

        ensure!(
            out.status.success(),
            CompileFailed {
                code: out.status.code().unwrap_or(1),
                stderr,
            }
        );

        let output = self.cfg.output_path();
        log::info!("built {} successfully", output.display());
        Ok(BuildReport {
            output,
            code: out.status.code().unwrap_or(0),
            invocation,
            stderr,
        })
    }
}

fn forward_to_stderr(buf: &[u8]) {
    if buf.is_empty() {
        return;
    }
    if let Err(e) = io::stderr().write_all(buf) {
        log::warn!("error forwarding compiler output: {}", e);
    }
}
