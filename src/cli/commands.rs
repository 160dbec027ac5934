use crate::catalog::Axis;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Classify a project's technology stack and development phase
#[derive(Parser, Debug)]
#[command(
    name = "stackprobe",
    about = "Classify a project's technology stack and development phase",
    version,
    author,
    long_about = "stackprobe inspects a project directory and scores it against weighted \
                  signal catalogs for the technology stack, the development phase, the \
                  primary language and the monorepo workspace manager. Each axis reports \
                  its best category with a 0-100 confidence, the runner-up categories, \
                  and the evidence behind every score."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Classify a project directory",
        long_about = "Scores the project against the stack, phase and language catalogs, \
                      plus the workspace catalog when asked for.\n\n\
                      Exit status: 0 when every requested axis has a confident answer, \
                      2 when at least one axis is unknown, 1 on error.\n\n\
                      Examples:\n  \
                      stackprobe detect\n  \
                      stackprobe detect /path/to/project --format json\n  \
                      stackprobe detect --axis stack,workspace\n  \
                      stackprobe detect --axis phase --phase-catalog my-phases.yaml"
    )]
    Detect(DetectArgs),

    #[command(subcommand, about = "Inspect and validate signal catalogs")]
    Catalog(CatalogCommands),
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the project (defaults to current directory)"
    )]
    pub project_path: Option<PathBuf>,

    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "stack,phase,language",
        help = "Axes to classify (repeatable or comma-separated)"
    )]
    pub axis: Vec<AxisArg>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, value_name = "FILE", help = "Stack catalog replacing the bundled one")]
    pub stack_catalog: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Phase catalog replacing the bundled one")]
    pub phase_catalog: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Language catalog replacing the bundled one")]
    pub language_catalog: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Workspace catalog replacing the bundled one")]
    pub workspace_catalog: Option<PathBuf>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Abort if classification takes longer than this"
    )]
    pub timeout: Option<u64>,

    #[arg(long, help = "Include every evidence record in human output")]
    pub evidence: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    #[command(about = "Load and validate a catalog file (YAML, JSON or TOML)")]
    Validate(ValidateArgs),

    #[command(about = "Print the catalog that `detect` would use")]
    Show(ShowArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(long, value_enum, default_value = "stack", help = "Which catalog to show")]
    pub axis: SingleAxisArg,

    #[arg(long, value_name = "FILE", help = "Show this catalog file instead")]
    pub catalog: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisArg {
    Stack,
    Phase,
    Language,
    Workspace,
    All,
}

impl AxisArg {
    fn covers(self, axis: Axis) -> bool {
        match self {
            AxisArg::Stack => axis == Axis::Framework,
            AxisArg::Phase => axis == Axis::Phase,
            AxisArg::Language => axis == Axis::Language,
            AxisArg::Workspace => axis == Axis::Workspace,
            AxisArg::All => true,
        }
    }
}

impl DetectArgs {
    /// Requested axes, deduplicated and in report order
    pub fn axes(&self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|axis| self.axis.iter().any(|arg| arg.covers(*axis)))
            .collect()
    }

    /// Catalog file given on the command line for `axis`
    pub fn catalog_for(&self, axis: Axis) -> Option<&Path> {
        match axis {
            Axis::Framework => self.stack_catalog.as_deref(),
            Axis::Phase => self.phase_catalog.as_deref(),
            Axis::Language => self.language_catalog.as_deref(),
            Axis::Workspace => self.workspace_catalog.as_deref(),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleAxisArg {
    Stack,
    Phase,
    Language,
    Workspace,
}

impl From<SingleAxisArg> for Axis {
    fn from(arg: SingleAxisArg) -> Self {
        match arg {
            SingleAxisArg::Stack => Axis::Framework,
            SingleAxisArg::Phase => Axis::Phase,
            SingleAxisArg::Language => Axis::Language,
            SingleAxisArg::Workspace => Axis::Workspace,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_detect_args() {
        let args = CliArgs::parse_from(["stackprobe", "detect"]);
        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(detect_args.format, OutputFormatArg::Human);
                assert_eq!(
                    detect_args.axes(),
                    vec![Axis::Framework, Axis::Phase, Axis::Language]
                );
                assert!(detect_args.project_path.is_none());
                assert!(detect_args.timeout.is_none());
                assert!(detect_args.stack_catalog.is_none());
                assert!(!detect_args.evidence);
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_detect_with_options() {
        let args = CliArgs::parse_from([
            "stackprobe",
            "detect",
            "/tmp/project",
            "--axis",
            "phase",
            "--format",
            "json",
            "--phase-catalog",
            "phases.toml",
            "--timeout",
            "30",
        ]);
        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(detect_args.project_path, Some(PathBuf::from("/tmp/project")));
                assert_eq!(detect_args.axes(), vec![Axis::Phase]);
                assert_eq!(detect_args.format, OutputFormatArg::Json);
                assert_eq!(detect_args.phase_catalog, Some(PathBuf::from("phases.toml")));
                assert_eq!(detect_args.timeout, Some(30));
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_axis_selection() {
        let axes = |args: &[&str]| {
            let mut argv = vec!["stackprobe", "detect"];
            argv.extend_from_slice(args);
            match CliArgs::parse_from(argv).command {
                Commands::Detect(detect_args) => detect_args.axes(),
                _ => panic!("Expected Detect command"),
            }
        };

        assert_eq!(
            axes(&["--axis", "workspace,stack"]),
            vec![Axis::Framework, Axis::Workspace]
        );
        assert_eq!(
            axes(&["--axis", "language", "--axis", "language"]),
            vec![Axis::Language]
        );
        assert_eq!(axes(&["--axis", "all"]), Axis::ALL.to_vec());
    }

    #[test]
    fn test_catalog_subcommands() {
        let args = CliArgs::parse_from(["stackprobe", "catalog", "validate", "stack.yaml"]);
        match args.command {
            Commands::Catalog(CatalogCommands::Validate(validate)) => {
                assert_eq!(validate.file, PathBuf::from("stack.yaml"));
            }
            _ => panic!("Expected catalog validate"),
        }

        let args = CliArgs::parse_from(["stackprobe", "catalog", "show", "--axis", "phase"]);
        match args.command {
            Commands::Catalog(CatalogCommands::Show(show)) => {
                assert_eq!(Axis::from(show.axis), Axis::Phase);
            }
            _ => panic!("Expected catalog show"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["stackprobe", "detect", "-v"]);
        assert!(args.verbose);

        let args = CliArgs::parse_from(["stackprobe", "--log-level", "trace", "detect"]);
        assert_eq!(args.log_level.as_deref(), Some("trace"));

        assert!(CliArgs::try_parse_from(["stackprobe", "detect", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_invalid_axis_rejected() {
        assert!(CliArgs::try_parse_from(["stackprobe", "detect", "--axis", "runtime"]).is_err());
    }
}
