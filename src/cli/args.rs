use clap::Parser;
use anyhow::Result;
use std::path::PathBuf;
use log::debug;

/// Resolve the monitoring console plugin manifest for a UIPlugin resource
#[derive(Parser, Debug)]
#[command(name = "uiplugin-resolver")]
#[command(
    about = "Validate a monitoring UIPlugin, resolve its features against cluster \
             compatibility and print the console plugin manifest and service"
)]
#[command(version)]
pub struct Args {
    /// UIPlugin resource (YAML or JSON)
    #[arg(value_name = "PLUGIN_FILE")]
    pub plugin_file: PathBuf,

    /// Namespace the plugin is deployed into
    #[arg(short = 'n', long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Plugin deployment and service name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Plugin container image
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<String>,

    /// Features supported by the cluster (comma-separated); overrides --cluster-version lookup
    #[arg(short = 'f', long, value_name = "FEATURES")]
    pub features: Option<String>,

    /// Cluster version used to look up supported features
    #[arg(long, value_name = "VERSION")]
    pub cluster_version: Option<String>,

    /// Version reported by the ACM installation
    #[arg(long, value_name = "VERSION")]
    pub acm_version: Option<String>,

    /// Minimum ACM version required for acm-alerting
    #[arg(long, value_name = "VERSION")]
    pub min_acm_version: Option<String>,

    /// Output format: yaml, json or summary
    #[arg(short, long, value_name = "FORMAT", default_value = "yaml")]
    pub output: String,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    /// Disable coloured summary output
    #[arg(long)]
    pub no_color: bool,
}

/// How the resolved objects are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
    Summary,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            "summary" => Ok(OutputFormat::Summary),
            _ => Err(format!("Invalid output format '{}'. Valid options: yaml, json, summary", s)),
        }
    }
}

pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    args.log_format
        .parse::<crate::logging::LogFormat>()
        .map_err(|e| anyhow::anyhow!(e))?;

    args.output
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!(e))?;

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!("--log-file-level requires --log-file"));
    }

    if let Some(features) = &args.features {
        crate::monitoring::FeatureSet::parse_list(features).map_err(|e| anyhow::anyhow!(e))?;
    }

    Ok(())
}
