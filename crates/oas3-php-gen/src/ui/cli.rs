use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

pub const DEFAULT_NAMESPACE: &str = "App\\Api\\V1";

#[derive(Parser, Debug)]
#[command(name = "oas3-php-gen")]
#[command(author, version, about = "OpenAPI 3.0 to PHP value class generator")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from OpenAPI specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate PHP value classes from OpenAPI specification
  Generate(GenerateCommand),
  /// Flatten a JSON property tree and print the flat table
  Flatten(FlattenCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Path to the OpenAPI 3.0 specification file (JSON or YAML)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Directory where one PHP file per class will be written
  #[arg(short, long, value_name = "DIR")]
  pub output: PathBuf,

  /// PHP namespace for generated classes
  #[arg(short, long, value_name = "NAMESPACE", default_value = DEFAULT_NAMESPACE)]
  pub namespace: String,

  /// Custom class template; placeholders are {{namespace}}, {{imports}},
  /// {{className}}, {{description}} and {{properties}}
  #[arg(short, long, value_name = "FILE")]
  pub template: Option<PathBuf>,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FlattenCommand {
  /// Path to a JSON property tree keyed by root name
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Write the flat table here instead of stdout
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List every class the specification flattens into
  Types {
    /// Path to the OpenAPI 3.0 specification file (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
