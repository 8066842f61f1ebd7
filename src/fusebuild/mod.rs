mod builder;
mod config;
mod pkgconfig;
mod plan;


// === Private Exports ===
use pkgconfig::PkgConfig;

// === Public Exports ===
pub use builder::{Builder, Error};
pub use config::{Config, Error as ConfigError};
pub use pkgconfig::PkgFlags;
pub use plan::{BuildPlan, Invocation};
