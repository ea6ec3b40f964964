//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use ragbridge_core::InjectionMethod;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragbridge")]
#[command(
    author,
    version,
    about = "Augment LLM requests with context retrieved from RAGFlow"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "RAGBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite (if enabled) and retrieve context for a question
    Retrieve(RetrieveArgs),

    /// Run the augmentation pipeline on a request read as JSON
    Augment(AugmentArgs),

    /// Show the effective configuration with secrets masked
    Config,
}

#[derive(Args)]
pub struct RetrieveArgs {
    /// Question to retrieve context for
    #[arg(required = true)]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct AugmentArgs {
    /// Request JSON file, or '-' for stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Override the configured injection method
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    SystemPrompt,
    UserPrompt,
    InsertSystemPrompt,
}

impl From<MethodArg> for InjectionMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::SystemPrompt => InjectionMethod::SystemPrompt,
            MethodArg::UserPrompt => InjectionMethod::UserPromptPrefix,
            MethodArg::InsertSystemPrompt => InjectionMethod::InsertSystemMessage,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Cli,
    Json,
}
