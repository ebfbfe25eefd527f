mod demo;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use cmdspec_core::render_manpages;
use cmdspec_engine::{Engine, EngineConfig, LogConfig, ReportOptions, ResultFormat};
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

impl From<CliOutputFormat> for ResultFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cmdspec")]
#[command(about = "Run, inspect and document declarative command trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the bundled demo application with the remaining arguments.
    Run(RunArgs),
    /// Print the compiled command tree.
    Spec(SpecArgs),
    /// Render one manual page per command level.
    Manpages(ManpagesArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Configuration file (replaces the default locations).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the return value of the selected operation.
    #[arg(long)]
    print_return: bool,
    /// Format for structured return values.
    #[arg(long)]
    format: Option<CliOutputFormat>,
    /// Arguments passed to the demo application (use `--` before them).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct SpecArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ManpagesArgs {
    /// Output directory for the pages.
    #[arg(long)]
    output: PathBuf,
    /// Manual section number.
    #[arg(long, default_value_t = 1)]
    section: u8,
    /// Gzip each page.
    #[arg(long)]
    compressed: bool,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Configuration file (replaces the default locations).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run_run(args),
        Command::Spec(args) => run_spec(args),
        Command::Manpages(args) => run_manpages(args),
        Command::Config(args) => run_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Global then per-user configuration for `app`.
fn default_config_locations(app: &str) -> Vec<PathBuf> {
    let mut paths = vec![Path::new("/etc/cmdspec").join(app).join("config.yaml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cmdspec").join(app).join("config.yaml"));
    }
    paths
}

fn load_config(explicit: Option<&Path>) -> Result<EngineConfig, String> {
    match explicit {
        Some(path) => EngineConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display())),
        None => EngineConfig::load_layered(&default_config_locations(demo::APP_NAME))
            .map_err(|e| format!("Failed to load configuration: {e}")),
    }
}

fn init_logging(log: &LogConfig) {
    if !log.console {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log.filter()));
    // A subscriber may already be installed; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_engine(report: ReportOptions) -> Result<Engine, String> {
    Engine::new(demo::app(), report).map_err(|e| format!("Invalid command tree: {e}"))
}

// ---------------------------------------------------------------------------
// run command
// ---------------------------------------------------------------------------

fn run_run(args: RunArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    init_logging(&config.log);

    let mut report = config.report;
    report.print_return |= args.print_return;
    if let Some(format) = args.format {
        report.format = format.into();
    }

    let engine = build_engine(report)?;
    engine.run_from(args.args).map_err(|err| format!("{err:#}"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// spec command
// ---------------------------------------------------------------------------

fn run_spec(args: SpecArgs) -> Result<(), String> {
    let engine = build_engine(ReportOptions::default())?;
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(engine.spec())
            .map_err(|e| format!("Failed to serialize command tree: {e}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(engine.spec())
            .map_err(|e| format!("Failed to serialize command tree: {e}"))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

// ---------------------------------------------------------------------------
// manpages command
// ---------------------------------------------------------------------------

fn run_manpages(args: ManpagesArgs) -> Result<(), String> {
    let engine = build_engine(ReportOptions::default())?;
    fs::create_dir_all(&args.output).map_err(|e| {
        format!(
            "Failed to create output directory '{}': {e}",
            args.output.display()
        )
    })?;

    let pages = render_manpages(engine.spec(), args.section);
    for (name, page) in &pages {
        let path = if args.compressed {
            args.output.join(format!("{name}.{}.gz", args.section))
        } else {
            args.output.join(format!("{name}.{}", args.section))
        };
        write_page(&path, page, args.compressed)
            .map_err(|e| format!("Failed to write '{}': {e}", path.display()))?;
    }

    println!(
        "Wrote {} manual pages to {}",
        pages.len(),
        args.output.display()
    );
    Ok(())
}

fn write_page(path: &Path, page: &str, compressed: bool) -> std::io::Result<()> {
    if compressed {
        let mut encoder = GzEncoder::new(fs::File::create(path)?, Compression::default());
        encoder.write_all(page.as_bytes())?;
        encoder.finish()?;
        Ok(())
    } else {
        fs::write(path, page)
    }
}

// ---------------------------------------------------------------------------
// config command
// ---------------------------------------------------------------------------

fn run_config(args: ConfigArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let yaml =
        serde_yaml::to_string(&config).map_err(|e| format!("Failed to serialize config: {e}"))?;
    print!("{yaml}");
    Ok(())
}
