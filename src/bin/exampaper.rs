use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use exampaper::{
    config::ExamConfig,
    gen::html::{ExamMeta, HtmlExam, Style},
    math_engine::PrimitiveEngine,
    provider::{exam_prompt, title_prompt},
    render, FmtToIo,
};
use tracing::info;

/// Render AI-generated exam text into a print-ready paper
#[derive(Parser, Debug)]
#[command(name = "exampaper", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a generated exam text file
    Render(RenderArgs),
    /// Print the prompts that would be sent to the provider
    Prompt(PromptArgs),
    /// Write a config file with default values
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Generated text, `-` for stdin
    input: PathBuf,

    /// Output file, stdout if not given
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    topic: Option<String>,

    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    duration: Option<String>,

    #[arg(long)]
    calculators: bool,

    /// Json file with presentation settings
    #[arg(long)]
    style: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PromptArgs {
    #[arg(long)]
    config: PathBuf,

    /// Print the title prompt instead of the exam one
    #[arg(long)]
    title: bool,
}

#[derive(Args, Debug)]
struct InitConfigArgs {
    path: PathBuf,

    #[arg(long, default_value = "")]
    topic: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exampaper=info".parse()?),
        )
        .init();

    match Cli::parse().command {
        Commands::Render(args) => run_render(args),
        Commands::Prompt(args) => run_prompt(args),
        Commands::InitConfig(args) => run_init_config(args),
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Cannot read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(input).with_context(|| format!("Cannot read '{}'", input.display()))
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    let output: Box<dyn Write> = match output {
        Some(path) => Box::new(io::BufWriter::new(
            fs::File::create(path).with_context(|| format!("Cannot create '{}'", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    Ok(output)
}

fn run_render(args: RenderArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let outcome = render(&text);
    if let Some(document) = outcome.document() {
        info!(
            "Parsed {} questions in {} sections, {} warnings",
            document.stats.questions,
            document.stats.sections,
            document.warnings.len()
        );
    } else {
        info!("Input has no content, rendering an empty paper");
    }

    let mut output = open_output(args.output.as_deref())?;
    match args.format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut output, &outcome)?;
            writeln!(output)?;
        }
        Format::Html => {
            let style = match &args.style {
                Some(path) => Style::load(path)
                    .with_context(|| format!("Cannot load style '{}'", path.display()))?,
                None => Style::default(),
            };
            let mut meta = outcome
                .document()
                .map(ExamMeta::collect)
                .unwrap_or_default()
                .with_calculators(args.calculators);
            if let Some(title) = &args.title {
                meta = meta.with_title(title);
            }
            if let Some(topic) = args.topic {
                meta = meta.with_topic(topic);
            }
            if let Some(date) = args.date {
                meta = meta.with_date(date);
            }
            if let Some(duration) = args.duration {
                meta = meta.with_duration(duration);
            }

            let mut writer = FmtToIo::new(&mut output);
            let written = HtmlExam::new(PrimitiveEngine, style).write_page(&mut writer, &meta, &outcome);
            if let Some(err) = writer.get_error() {
                return Err(err).context("Cannot write the page");
            }
            written?;
        }
    }
    output.flush()?;
    Ok(())
}

fn run_prompt(args: PromptArgs) -> Result<()> {
    let config = ExamConfig::load(&args.config)
        .with_context(|| format!("Cannot load config '{}'", args.config.display()))?;
    config.validate()?;
    let prompt = if args.title {
        title_prompt(&config.topic)
    } else {
        exam_prompt(&config)
    };
    println!("{prompt}");
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<()> {
    let config = ExamConfig {
        topic: args.topic,
        ..Default::default()
    };
    config
        .save(&args.path)
        .with_context(|| format!("Cannot write config '{}'", args.path.display()))?;
    info!("Config written to {}", args.path.display());
    Ok(())
}
