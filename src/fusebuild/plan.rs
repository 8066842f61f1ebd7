use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{Config, PkgConfig, PkgFlags};

/// The compiler command before the package flags are known.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildPlan {
    pub compiler: String,
    pub warnings: Vec<String>,
    pub source: String,
    pub pkg_config: String,
    pub pkg_config_args: Vec<String>,
    pub package: String,
    pub extra_flags: Vec<String>,
    pub output: String,
}

impl BuildPlan {
    pub fn new(cfg: &Config) -> BuildPlan {
        BuildPlan {
            compiler: cfg.compiler.clone(),
            warnings: cfg.warnings.clone(),
            source: cfg.source.to_string_lossy().to_string(),
            pkg_config: cfg.pkg_config.clone(),
            pkg_config_args: cfg.pkg_config_args.clone(),
            package: cfg.package.clone(),
            extra_flags: cfg.extra_flags.clone(),
            output: cfg.output.to_string_lossy().to_string(),
        }
    }

    /// Shell-equivalent rendering, with the package query left as a command substitution.
    pub fn render(&self) -> String {
        let mut query = vec![quote_word(&self.pkg_config)];
        query.extend(self.pkg_config_args.iter().map(|a| quote_word(a)));
        query.extend(PkgConfig::query_args(&self.package).iter().map(|a| quote_word(a)));

        let mut parts = vec![quote_word(&self.compiler)];
        parts.extend(self.warnings.iter().map(|w| quote_word(w)));
        parts.push(quote_word(&self.source));
        parts.push(format!("`{}`", query.join(" ")));
        parts.extend(self.extra_flags.iter().map(|f| quote_word(f)));
        parts.push(String::from("-o"));
        parts.push(quote_word(&self.output));
        parts.join(" ")
    }

    pub fn resolve(&self, flags: &PkgFlags, working_dir: &Path) -> Invocation {
        let mut args = self.warnings.clone();
        args.push(self.source.clone());
        args.extend(flags.flags.iter().cloned());
        args.extend(self.extra_flags.iter().cloned());
        args.push(String::from("-o"));
        args.push(self.output.clone());

        Invocation {
            program: self.compiler.clone(),
            args,
            working_dir: PathBuf::from(working_dir),
        }
    }
}

impl fmt::Display for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A fully resolved argument list, spawned without a shell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_word(&self.program))?;
        for a in &self.args {
            write!(f, " {}", quote_word(a))?;
        }
        Ok(())
    }
}

fn is_plain_word(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            matches!(c,
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | '/' | ':' | '+' | '%' | '@' | '=' | ',')
        })
}

/// Single-quotes a word for POSIX shells unless it is made only of safe characters.
pub fn quote_word(s: &str) -> String {
    if is_plain_word(s) {
        return String::from(s);
    }
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}
