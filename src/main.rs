use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ripple::config::OutputFormat;
use ripple::core::ScanRequest;
use ripple::format::write_report;
use ripple::locale::Locale;
use ripple::{CancelToken, RippleConfig, run};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Plain,
    Md,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Plain => OutputFormat::Plain,
            CliOutputFormat::Md => OutputFormat::Markdown,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLocale {
    En,
    Id,
}

impl From<CliLocale> for Locale {
    fn from(l: CliLocale) -> Self {
        match l {
            CliLocale::En => Locale::En,
            CliLocale::Id => Locale::Id,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate the blast radius of changing a source file", long_about = None)]
struct Args {
    /// File you intend to change
    target: PathBuf,

    /// Function or method in the target file you intend to change
    symbol: Option<String>,

    /// Project root to search
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<CliOutputFormat>,

    /// Report language
    #[arg(short, long, value_enum)]
    lang: Option<CliLocale>,

    /// Additional source extension to scan (repeatable)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Additional directory or file name to skip (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Follow symbolic links while walking the project
    #[arg(long)]
    follow_symlinks: bool,

    /// Worker threads for scanning (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Timeout in seconds for each git query
    #[arg(long)]
    git_timeout: Option<u64>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load from file or default
    let mut config = RippleConfig::load(&args.root)?.unwrap_or_default();

    // 2. Override with CLI args
    if let Some(f) = args.format {
        config.output_format = f.into();
    }
    if let Some(l) = args.lang {
        config.language = l.into();
    }
    config.add_extensions(args.extensions);
    config.add_exclusions(args.exclude);
    if args.follow_symlinks {
        config.follow_symlinks = true;
    }
    if let Some(j) = args.jobs {
        config.jobs = Some(j);
    }
    if let Some(t) = args.git_timeout {
        config.git_timeout_secs = t;
    }
    if args.verbose {
        config.verbose = true;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if config.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;

    // Ctrl+C cancels the scan and any running git query
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .context("Failed to set Ctrl+C handler")?;

    let request = ScanRequest::new(args.target, args.symbol, args.root);
    let report = match run(&config, &request, &cancel) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("❌ {}", config.language.messages().describe_error(&err));
            std::process::exit(if cancel.is_cancelled() { 130 } else { 1 });
        }
    };

    match args.output {
        Some(path) => {
            let file = File::create(&path).with_context(|| format!("Failed to create output: {:?}", path))?;
            let mut writer = BufWriter::new(file);
            write_report(&mut writer, &report, config.output_format, config.language)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_report(&mut handle, &report, config.output_format, config.language)?;
        }
    }

    Ok(())
}
