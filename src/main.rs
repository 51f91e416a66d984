use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use interlink::core::{LinkOptions, LinkReport, WorkspaceLinker};
use interlink::formatters::{JsonFormatter, TextFormatter};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "interlink",
    version,
    author = "interlink developers",
    about = "Link locally developed packages to each other instead of registry copies"
)]
struct Cli {
    /// Directory whose immediate children are the local packages
    #[arg(long, value_name = "PATH", env = "INTERLINK_PACKAGES_ROOT")]
    packages_root: Option<PathBuf>,

    /// Only link the dependencies of this package
    #[arg(long, value_name = "NAME", env = "INTERLINK_SINGLE_PACKAGE")]
    single_package: Option<String>,

    /// Stream package manager output and show debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Package manager executable that provides `link` and `unlink`
    #[arg(
        long,
        value_name = "PROGRAM",
        env = "INTERLINK_LINK_TOOL",
        default_value = interlink::core::linker::DEFAULT_LINK_TOOL
    )]
    link_tool: String,

    /// Print the planned commands without running them
    #[arg(long)]
    dry_run: bool,

    /// Report format: text, json
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn link_options(&self) -> Result<LinkOptions> {
        let packages_root = match &self.packages_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };

        let mut options = LinkOptions::new(packages_root)
            .with_verbose(self.verbose)
            .with_link_tool(resolve_link_tool(&self.link_tool)?)
            .with_dry_run(self.dry_run);
        if let Some(name) = &self.single_package {
            options = options.with_single_package(name.clone());
        }
        Ok(options)
    }
}

/// Jobs run inside each package directory, so a relative tool path such as
/// `./bin/npm` is pinned to the invoking directory. Bare names stay on `PATH`.
fn resolve_link_tool(link_tool: &str) -> Result<String> {
    let path = Path::new(link_tool);
    if path.is_relative() && path.components().count() > 1 {
        let absolute = std::env::current_dir()?.join(path);
        return Ok(absolute.to_string_lossy().into_owned());
    }
    Ok(link_tool.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => bail_out(&e.into()),
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        bail_out(&e);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("interlink=debug")
        } else {
            EnvFilter::new("interlink=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn bail_out(error: &anyhow::Error) -> ! {
    eprintln!("error: {:#}", error);
    eprintln!("Bailing: no further link commands will run.");
    std::process::exit(1);
}

async fn run(cli: Cli) -> Result<()> {
    let options = cli.link_options()?;
    let linker = WorkspaceLinker::new(options);
    let report = linker.link().await?;

    match &cli.output {
        Some(path) => write_report(&report, cli.format, cli.verbose, path),
        None => {
            print!("{}", render(&report, cli.format, cli.verbose)?);
            Ok(())
        }
    }
}

/// Tolerated failures are only listed when the run is verbose.
fn text_formatter(verbose: bool) -> TextFormatter {
    TextFormatter::new().with_failures(verbose)
}

fn write_report(
    report: &LinkReport,
    format: OutputFormat,
    verbose: bool,
    path: &Path,
) -> Result<()> {
    match format {
        OutputFormat::Text => text_formatter(verbose).format_to_file(report, path),
        OutputFormat::Json => JsonFormatter::new()
            .with_pretty(true)
            .format_to_file(report, path),
    }
}

fn render(report: &LinkReport, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Text => text_formatter(verbose).format_report(report),
        OutputFormat::Json => {
            let mut rendered = JsonFormatter::new().with_pretty(true).format_report(report)?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}
