// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use dmate::app_config::{self, Config, SlotRule};
use dmate::app_controller::Controller;
use dmate::persistence::SaveTarget;

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

/// Parse `--rule` through `SlotRule`'s own parser (accepts `per-step` and `per_step`)
fn parse_slot_rule(value: &str) -> Result<SlotRule> {
    value.parse()
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align a demo (or every demo in a directory) with its script and audio
    Align(AlignArgs),

    /// Print the structure of a demo and a few statistics
    Inspect(InspectArgs),

    /// Generate shell completions for dmate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Demo file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Script file (defaults to the sibling <stem>.script)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Soundbite directory (defaults to the sibling <stem>_Audio)
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Also require section count and grouping to match the script
    #[arg(long)]
    strict: bool,

    /// Audio slot rule: narration, per-step or existing
    #[arg(short, long, value_parser = parse_slot_rule)]
    rule: Option<SlotRule>,

    /// Run corrective sectioning before attaching audio
    #[arg(long)]
    sectioning: bool,

    /// Save the result: `original`, `copy`, or a file path
    #[arg(long, value_name = "TARGET")]
    save: Option<String>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Demo file
    #[arg(value_name = "DEMO")]
    demo: PathBuf,

    /// Show the most frequent narration words
    #[arg(short, long, default_value_t = 0)]
    words: usize,

    /// Search steps for a phrase
    #[arg(short, long)]
    search: Option<String>,

    /// Restrict the search to click instructions
    #[arg(long, requires = "search")]
    instructions_only: bool,
}

/// dmate - demo script / narration / audio alignment
///
/// Aligns a demo's steps with its talking-point script and recorded soundbites.
#[derive(Parser, Debug)]
#[command(name = "dmate")]
#[command(version)]
#[command(about = "Align demo steps with narration and audio")]
#[command(long_about = "dmate aligns a demo's section/step structure with its talking-point script and recorded soundbites.

EXAMPLES:
    dmate align reports.demo                       # Script and audio from sibling files
    dmate align reports.demo --strict --save copy  # Check grouping, save reports.demo_aligned
    dmate align --rule per-step --sectioning demos/ # Every demo in a directory
    dmate inspect reports.demo --words 10          # Structure and top narration words
    dmate completions bash > dmate.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "dmate", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    match cli.command {
        Commands::Align(args) => run_align(config, args),
        Commands::Inspect(args) => run_inspect(config, args),
        Commands::Completions { .. } => Ok(()),
    }
}

// @loads: Configuration file, creating a default one when missing
fn load_config(config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &cli_log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(level) = cli_log_level {
        config.log_level = level.into();
    }
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

fn run_align(mut config: Config, args: AlignArgs) -> Result<()> {
    // Override config with CLI options if provided
    if args.strict {
        config.alignment.strict_narration = true;
    }
    if args.sectioning {
        config.alignment.corrective_sectioning = true;
    }
    if let Some(rule) = args.rule {
        config.alignment.slot_rule = rule;
    }

    let save = args.save.as_deref().map(|target| match target {
        "original" => SaveTarget::Original,
        "copy" => SaveTarget::Suffix(config.files.copy_suffix.clone()),
        path => SaveTarget::Path(PathBuf::from(path)),
    });

    let controller = Controller::with_config(config)?;

    if args.input_path.is_file() {
        let summary = controller.run(
            &args.input_path,
            args.script.as_deref(),
            args.audio.as_deref(),
            save.as_ref(),
        )?;
        print!("{}", summary);
    } else if args.input_path.is_dir() {
        if args.script.is_some() || args.audio.is_some() {
            warn!("--script and --audio are ignored in folder mode; sibling files are used");
        }
        if matches!(save, Some(SaveTarget::Path(_))) {
            return Err(anyhow!("Saving to a single path is not supported in folder mode"));
        }
        for summary in controller.run_folder(&args.input_path, save.as_ref())? {
            print!("{}", summary);
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    Ok(())
}

fn run_inspect(config: Config, args: InspectArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let tree = controller.load_demo(&args.demo);
    if !tree.is_loaded() {
        return Err(anyhow!("Demo could not be loaded: {:?}", args.demo));
    }

    print!("{}", tree);
    let engine = dmate::AlignmentEngine::new(controller.config().alignment.clone());
    println!(
        "Expected audio slots ({}): {}",
        engine.slot_rule(),
        engine.expected_audio_slots(&tree)
    );

    if args.words > 0 {
        let mut words: Vec<(String, usize)> = tree.word_frequency().into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        println!("Top words:");
        for (word, count) in words.into_iter().take(args.words) {
            println!("  {:>5}  {}", count, word);
        }
    }

    if let Some(phrase) = &args.search {
        let hits = tree.search(phrase, args.instructions_only);
        info!("'{}' found in {} steps", phrase, hits.len());
        for flat in hits {
            let step = tree.flat_get(flat)?;
            println!("  [{}] {} | {}", flat, step.instruction, step.narration);
        }
    }

    Ok(())
}
