use crate::catalog::Axis;
use crate::fs::WalkOptions;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1MB
const DEFAULT_MAX_WALK_DEPTH: usize = 12;
const DEFAULT_MAX_WALK_FILES: usize = 5000;

const ENV_LOG_LEVEL: &str = "STACKPROBE_LOG_LEVEL";
const ENV_MAX_FILE_SIZE: &str = "STACKPROBE_MAX_FILE_SIZE";
const ENV_MAX_WALK_DEPTH: &str = "STACKPROBE_MAX_WALK_DEPTH";
const ENV_MAX_WALK_FILES: &str = "STACKPROBE_MAX_WALK_FILES";
const ENV_STACK_CATALOG: &str = "STACKPROBE_STACK_CATALOG";
const ENV_PHASE_CATALOG: &str = "STACKPROBE_PHASE_CATALOG";
const ENV_LANGUAGE_CATALOG: &str = "STACKPROBE_LANGUAGE_CATALOG";
const ENV_WORKSPACE_CATALOG: &str = "STACKPROBE_WORKSPACE_CATALOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Per-scan resource bounds used by the signal probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeLimits {
    /// Files larger than this are never read
    pub max_file_size_bytes: u64,
    pub walk: WalkOptions,
}

impl Default for ProbeLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            walk: WalkOptions {
                max_depth: DEFAULT_MAX_WALK_DEPTH,
                max_files: DEFAULT_MAX_WALK_FILES,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct StackprobeConfig {
    pub log_level: String,
    pub max_file_size_bytes: u64,
    pub max_walk_depth: usize,
    pub max_walk_files: usize,
    pub stack_catalog: Option<PathBuf>,
    pub phase_catalog: Option<PathBuf>,
    pub language_catalog: Option<PathBuf>,
    pub workspace_catalog: Option<PathBuf>,
}

impl Default for StackprobeConfig {
    fn default() -> Self {
        let log_level = env::var(ENV_LOG_LEVEL)
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let max_file_size_bytes = env::var(ENV_MAX_FILE_SIZE)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_BYTES);

        let max_walk_depth = env::var(ENV_MAX_WALK_DEPTH)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_WALK_DEPTH);

        let max_walk_files = env::var(ENV_MAX_WALK_FILES)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_WALK_FILES);

        Self {
            log_level,
            max_file_size_bytes,
            max_walk_depth,
            max_walk_files,
            stack_catalog: env::var(ENV_STACK_CATALOG).ok().map(PathBuf::from),
            phase_catalog: env::var(ENV_PHASE_CATALOG).ok().map(PathBuf::from),
            language_catalog: env::var(ENV_LANGUAGE_CATALOG).ok().map(PathBuf::from),
            workspace_catalog: env::var(ENV_WORKSPACE_CATALOG).ok().map(PathBuf::from),
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: format!("{:?}: {}", raw, e),
            }),
        Err(_) => Ok(None),
    }
}

impl StackprobeConfig {
    /// Strict variant of `default()`: malformed values are reported instead
    /// of silently replaced, and the result is validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = parse_env(ENV_MAX_FILE_SIZE)? {
            config.max_file_size_bytes = v;
        }
        if let Some(v) = parse_env(ENV_MAX_WALK_DEPTH)? {
            config.max_walk_depth = v;
        }
        if let Some(v) = parse_env(ENV_MAX_WALK_FILES)? {
            config.max_walk_files = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.max_file_size_bytes < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Max file size must be at least 1KB".to_string(),
            ));
        }
        if self.max_file_size_bytes > 104_857_600 {
            return Err(ConfigError::ValidationFailed(
                "Max file size cannot exceed 100MB".to_string(),
            ));
        }

        if self.max_walk_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max walk depth must be at least 1".to_string(),
            ));
        }
        if self.max_walk_depth > 64 {
            return Err(ConfigError::ValidationFailed(
                "Max walk depth cannot exceed 64".to_string(),
            ));
        }

        if self.max_walk_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max walk files must be at least 1".to_string(),
            ));
        }
        if self.max_walk_files > 1_000_000 {
            return Err(ConfigError::ValidationFailed(
                "Max walk files cannot exceed 1000000".to_string(),
            ));
        }

        Ok(())
    }

    pub fn probe_limits(&self) -> ProbeLimits {
        ProbeLimits {
            max_file_size_bytes: self.max_file_size_bytes,
            walk: WalkOptions {
                max_depth: self.max_walk_depth,
                max_files: self.max_walk_files,
            },
        }
    }

    /// Catalog file replacing the bundled one for `axis`, if any.
    ///
    /// An explicitly configured path wins; otherwise
    /// `<config dir>/stackprobe/{stack,phase,language,workspace}.yaml` is used
    /// when it exists.
    pub fn catalog_override(&self, axis: Axis) -> Option<PathBuf> {
        let explicit = match axis {
            Axis::Framework => self.stack_catalog.clone(),
            Axis::Phase => self.phase_catalog.clone(),
            Axis::Language => self.language_catalog.clone(),
            Axis::Workspace => self.workspace_catalog.clone(),
        };
        explicit.or_else(|| {
            let file = match axis {
                Axis::Framework => "stack.yaml",
                Axis::Phase => "phase.yaml",
                Axis::Language => "language.yaml",
                Axis::Workspace => "workspace.yaml",
            };
            dirs::config_dir()
                .map(|dir| dir.join("stackprobe").join(file))
                .filter(|path| path.is_file())
        })
    }
}

impl fmt::Display for StackprobeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stackprobe Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Max File Size: {} bytes", self.max_file_size_bytes)?;
        writeln!(f, "  Max Walk Depth: {}", self.max_walk_depth)?;
        writeln!(f, "  Max Walk Files: {}", self.max_walk_files)?;
        if let Some(ref path) = self.stack_catalog {
            writeln!(f, "  Stack Catalog: {}", path.display())?;
        }
        if let Some(ref path) = self.phase_catalog {
            writeln!(f, "  Phase Catalog: {}", path.display())?;
        }
        if let Some(ref path) = self.language_catalog {
            writeln!(f, "  Language Catalog: {}", path.display())?;
        }
        if let Some(ref path) = self.workspace_catalog {
            writeln!(f, "  Workspace Catalog: {}", path.display())?;
        }
        Ok(())
    }
}
