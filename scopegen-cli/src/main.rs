use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use scopegen_core::compile;
use simple_logger::SimpleLogger;

mod demo;

#[derive(Parser)]
#[command(name = "scopegen")]
#[command(about = "Scopegen - TextMate grammars from typed pattern and rule trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the bundled Lumen grammar to a TextMate JSON document
    Generate {
        /// Where to write the document, `-` for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// The amount of logging to perform
        #[arg(long, value_enum, default_value_t = LogLevel::Off)]
        log: LogLevel,
    },
    /// Summarize the bundled grammar without writing it
    Inspect {
        /// The amount of logging to perform
        #[arg(long, value_enum, default_value_t = LogLevel::Off)]
        log: LogLevel,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { output, log } => {
            init_logging(log);
            cmd_generate(output);
        }
        Commands::Inspect { log } => {
            init_logging(log);
            cmd_inspect();
        }
    }
}

fn init_logging(level: LogLevel) {
    if let Err(e) = SimpleLogger::new()
        .with_level(level.to_level_filter())
        .init()
    {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }
}

fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    std::process::exit(1);
}

fn cmd_generate(output: Option<PathBuf>) {
    let grammar = demo::grammar().unwrap_or_else(|e| fail(e));
    let json = compile(&grammar).unwrap_or_else(|e| fail(e));

    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}.tmLanguage.json", grammar.name().to_lowercase()))
    });
    if path.as_os_str() == "-" {
        println!("{}", json);
        return;
    }

    log::info!("writing {} bytes to {}", json.len(), path.display());
    if let Err(e) = std::fs::write(&path, &json) {
        fail(format!("cannot write {}: {}", path.display(), e));
    }

    println!("{}", "✓ Grammar generated".green().bold());
    println!("  Name:       {}", grammar.name().cyan());
    println!("  Scope:      {}", grammar.scope_root().cyan());
    println!("  Patterns:   {}", grammar.top_level().len());
    println!("  Repository: {}", grammar.repository().len());
    println!("  Output:     {}", path.display().to_string().yellow());
}

fn cmd_inspect() {
    let grammar = demo::grammar().unwrap_or_else(|e| fail(e));
    let json = compile(&grammar).unwrap_or_else(|e| fail(e));

    println!("{}", "Grammar:".bold());
    println!("  Name:      {}", grammar.name().cyan());
    println!("  Scope:     {}", grammar.scope_root().cyan());
    println!("  Top level: {} rules", grammar.top_level().len());
    println!();

    println!("{}", "Repository:".bold());
    if grammar.repository().is_empty() {
        println!("  (empty)");
    }
    for entry in grammar.repository().entries() {
        println!("  #{} {}", entry.name.green(), entry.rule.describe());
    }
    println!();

    println!("{} {} bytes", "Document:".bold(), json.len());
}
