// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use doctrans::app_config::{self, BackendKind, ChunkStrategyKind, Config, OutputFormat};
use doctrans::app_controller::{Controller, RunOutcome};
use doctrans::translation::CancellationFlag;

/// CLI Wrapper for BackendKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBackend {
    Remote,
    Local,
}

impl From<CliBackend> for BackendKind {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::Remote => BackendKind::Remote,
            CliBackend::Local => BackendKind::Local,
        }
    }
}

/// CLI Wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOutputFormat {
    Txt,
    Docx,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli_format: CliOutputFormat) -> Self {
        match cli_format {
            CliOutputFormat::Txt => OutputFormat::Txt,
            CliOutputFormat::Docx => OutputFormat::Docx,
        }
    }
}

/// CLI Wrapper for ChunkStrategyKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliChunkStrategy {
    Lines,
    Words,
    Window,
}

impl From<CliChunkStrategy> for ChunkStrategyKind {
    fn from(cli_strategy: CliChunkStrategy) -> Self {
        match cli_strategy {
            CliChunkStrategy::Lines => ChunkStrategyKind::Lines,
            CliChunkStrategy::Words => ChunkStrategyKind::Words,
            CliChunkStrategy::Window => ChunkStrategyKind::Window,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a document or a folder of documents (default command)
    Translate(TranslateArgs),

    /// Print the text extracted from a document without translating it
    Extract {
        /// PDF, DOCX or TXT file
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct TranslateArgs {
    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Source language: es, zh, auto, or a language name
    #[arg(short, long)]
    source_language: Option<String>,

    /// Output file format
    #[arg(short, long, value_enum)]
    output_format: Option<CliOutputFormat>,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Backend endpoint; repeat to build a failover pool
    #[arg(short, long = "endpoint", value_name = "URL")]
    endpoints: Vec<String>,

    /// How the text is split into chunks
    #[arg(long, value_enum)]
    chunk_strategy: Option<CliChunkStrategy>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Write the translation to stdout instead of a file
    #[arg(long)]
    print: bool,
}

/// doctrans - document translation to English
///
/// Extracts text from PDF, DOCX and TXT documents, translates it chunk by
/// chunk through one or more translation backends, and writes the English
/// result as TXT or DOCX.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version)]
#[command(about = "Translate PDF, DOCX and TXT documents to English")]
#[command(long_about = "doctrans extracts the text of a document and translates it to English through LibreTranslate-compatible services or a local model.

EXAMPLES:
    doctrans informe.pdf                                # Translate using default config
    doctrans -f informe.pdf                             # Force overwrite existing output
    doctrans -o docx -s zh report.docx                  # Chinese to English, write DOCX
    doctrans -e http://a:5000 -e http://b:5000 doc.txt  # Fail over across two services
    doctrans -b local -s es carta.txt                   # Use the local model backend
    doctrans --print notas.txt                          # Print the translation
    doctrans extract informe.pdf                        # Show the original text
    doctrans --log-level debug /documents/              # Process a whole directory
    doctrans completions bash > doctrans.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

BACKENDS:
    remote - LibreTranslate-compatible HTTP service (default: http://localhost:5000)
    local  - Local model served by Ollama (Spanish and Chinese to English only)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Source language: es, zh, auto, or a language name
    #[arg(short, long)]
    source_language: Option<String>,

    /// Output file format
    #[arg(short, long, value_enum)]
    output_format: Option<CliOutputFormat>,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Backend endpoint; repeat to build a failover pool
    #[arg(short, long = "endpoint", value_name = "URL")]
    endpoints: Vec<String>,

    /// How the text is split into chunks
    #[arg(long, value_enum)]
    chunk_strategy: Option<CliChunkStrategy>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Write the translation to stdout instead of a file
    #[arg(long)]
    print: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Extract { input_path }) => run_extract(&input_path),
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                source_language: cli.source_language,
                output_format: cli.output_format,
                backend: cli.backend,
                endpoints: cli.endpoints,
                chunk_strategy: cli.chunk_strategy,
                config_path: cli.config_path,
                log_level: cli.log_level,
                print: cli.print,
            };
            run_translate(translate_args).await
        }
    }
}

fn run_extract(input_path: &Path) -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    let text = controller.extract(input_path)?;
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Load the configuration file and apply command line overrides
fn load_config(options: &TranslateArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)
        .with_context(|| format!("Failed to load configuration from {}", options.config_path))?;

    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(format) = &options.output_format {
        config.output_format = format.clone().into();
    }
    if let Some(backend) = &options.backend {
        config.translation.backend = backend.clone().into();
    }
    if !options.endpoints.is_empty() {
        config.translation.set_active_endpoints(options.endpoints.clone());
    }
    if let Some(strategy) = &options.chunk_strategy {
        config.translation.chunking.strategy = strategy.clone().into();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config = load_config(&options)?;
    log::set_max_level(level_filter(&config.log_level));
    info!(
        "Translating from {} using the {} backend",
        config.source_language,
        config.translation.backend.display_name()
    );

    // Ctrl-C stops the run before the next chunk
    let cancellation = CancellationFlag::new();
    let signal_flag = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current chunk");
            signal_flag.cancel();
        }
    });

    let controller = Controller::with_config(config)?
        .with_cancellation(cancellation)
        .with_progress_bar(!options.print);

    if options.print {
        if !options.input_path.is_file() {
            return Err(anyhow!("--print needs a single input file: {:?}", options.input_path));
        }
        let translated = controller.translate_file(&options.input_path).await.map_err(|e| {
            error!("{} failed: {}", e.stage(), e);
            anyhow!(e)
        })?;
        let mut stdout = std::io::stdout();
        stdout.write_all(translated.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    if options.input_path.is_file() {
        let output_dir = options
            .input_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        match controller
            .run(options.input_path.clone(), output_dir, options.force_overwrite)
            .await
        {
            Ok(RunOutcome::Written(_)) | Ok(RunOutcome::Skipped(_)) => Ok(()),
            Err(e) => {
                error!("{} failed: {}", e.stage(), e);
                Err(anyhow!(e))
            }
        }
    } else if options.input_path.is_dir() {
        let summary = controller
            .run_folder(options.input_path.clone(), options.force_overwrite)
            .await?;
        if summary.errors > 0 {
            return Err(anyhow!("{} file(s) failed to translate", summary.errors));
        }
        Ok(())
    } else {
        Err(anyhow!("Input path does not exist: {:?}", options.input_path))
    }
}
