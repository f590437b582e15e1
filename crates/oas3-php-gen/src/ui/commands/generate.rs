use std::path::PathBuf;

use anyhow::Context;
use crossterm::style::Stylize;

use super::format_timestamp;
use crate::{
  generator::{
    metrics::GenerationStats,
    orchestrator::Orchestrator,
    render::{PhpRenderer, RenderedFile, is_valid_namespace},
    template::Template,
  },
  ui::{Colors, GenerateCommand},
  utils::spec::{OpenApiDocument, SpecLoader},
};

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub namespace: String,
  pub template: Option<PathBuf>,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      namespace,
      template,
      verbose,
      quiet,
    } = command;

    let namespace = namespace.trim_matches('\\').to_string();
    if !is_valid_namespace(&namespace) {
      anyhow::bail!("Invalid PHP namespace '{namespace}': expected segments like App\\Api\\V1");
    }
    if verbose && quiet {
      anyhow::bail!("--verbose and --quiet cannot be used together");
    }

    Ok(Self {
      input,
      output,
      namespace,
      template,
      verbose,
      quiet,
    })
  }

  async fn load_spec(&self) -> anyhow::Result<OpenApiDocument> {
    SpecLoader::open(&self.input).await?.parse()
  }

  async fn load_template(&self) -> anyhow::Result<Template> {
    let Some(path) = &self.template else {
      return Ok(Template::default());
    };
    let source = tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("Failed to read template {}", path.display()))?;
    Ok(Template::parse(source)?)
  }

  async fn write_files(&self, files: &[RenderedFile], logger: &GenerateLogger<'_>) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&self.output)
      .await
      .with_context(|| format!("Failed to create output directory {}", self.output.display()))?;

    for file in files {
      let path = self.output.join(&file.file_name);
      tokio::fs::write(&path, &file.contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
      logger.detail(&format!("Generated: {}", file.file_name));
    }
    Ok(())
  }
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn detail(&self, message: &str) {
    if self.config.verbose {
      println!("            {}", message.with(self.colors.info()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading OpenAPI spec from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_generating(&self, title: &str, version: &str) {
    self.info(
      &format!("Generating PHP classes for {title} {version}...")
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Roots parsed:", stats.roots_parsed.to_string());
    self.stat("Types extracted:", stats.types_extracted.to_string());
    self.stat("Classes rendered:", stats.types_rendered.to_string());
    self.stat("Namespace:", self.config.namespace.clone());
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_back_references(stats);
    self.print_warnings(stats);
  }

  fn print_back_references(&self, stats: &GenerationStats) {
    if stats.back_references.is_empty() {
      return;
    }

    self.stat("Cycles cut:", stats.back_references.len().to_string());

    if self.config.verbose {
      for back_reference in &stats.back_references {
        println!(
          "              {} -> {}",
          back_reference.path.to_string().with(self.colors.accent()),
          format!("#{}", back_reference.target).with(self.colors.info())
        );
      }
    }
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    let mut printed_header = false;
    for warning in &stats.warnings {
      if !warning.is_skipped_item() && !self.config.verbose {
        continue;
      }

      if !printed_header {
        println!();
        printed_header = true;
      }

      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    self.info(
      &format!("Writing to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_success(&self, count: usize) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        format!("Successfully generated {count} PHP classes").with(self.colors.success())
      );
    }
  }
}

pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let document = config.load_spec().await?;
  let renderer = PhpRenderer::new(config.namespace.clone(), config.load_template().await?)?;

  let orchestrator = Orchestrator::new(document);
  let metadata = orchestrator.metadata();
  logger.log_generating(&metadata.title, &metadata.version);
  let output = orchestrator.generate(&renderer)?;
  logger.print_statistics(&output.stats);

  logger.log_writing();
  config.write_files(&output.files, &logger).await?;

  logger.log_success(output.files.len());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ui::{cli::DEFAULT_NAMESPACE, colors::Theme};

  fn command(namespace: &str) -> GenerateCommand {
    GenerateCommand {
      input: PathBuf::from("openapi.json"),
      output: PathBuf::from("out"),
      namespace: namespace.to_string(),
      template: None,
      verbose: false,
      quiet: true,
    }
  }

  #[test]
  fn test_from_command_accepts_default_namespace() {
    let config = GenerateConfig::from_command(command(DEFAULT_NAMESPACE)).unwrap();
    assert_eq!(config.namespace, "App\\Api\\V1");
  }

  #[test]
  fn test_from_command_strips_surrounding_separators() {
    let config = GenerateConfig::from_command(command("\\App\\Models\\")).unwrap();
    assert_eq!(config.namespace, "App\\Models");
  }

  #[test]
  fn test_from_command_rejects_invalid_namespace() {
    for namespace in ["", "App\\\\Models", "1App", "App.Models"] {
      let err = GenerateConfig::from_command(command(namespace)).unwrap_err();
      assert!(
        err.to_string().contains("Invalid PHP namespace"),
        "{namespace:?} should be rejected"
      );
    }
  }

  #[test]
  fn test_from_command_rejects_verbose_with_quiet() {
    let mut cmd = command(DEFAULT_NAMESPACE);
    cmd.verbose = true;
    let err = GenerateConfig::from_command(cmd).unwrap_err();
    assert!(err.to_string().contains("cannot be used together"));
  }

  #[tokio::test]
  async fn test_generate_code_writes_one_file_per_class() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("openapi.json");
    let spec = serde_json::json!({
      "openapi": "3.0.3",
      "info": { "title": "Store", "version": "1.0.0" },
      "paths": {},
      "components": { "schemas": {
        "User": {
          "type": "object",
          "properties": {
            "name": { "type": "string" },
            "address": { "type": "object", "properties": { "city": { "type": "string" } } }
          }
        }
      } }
    });
    tokio::fs::write(&input, serde_json::to_vec(&spec)?).await?;

    let config = GenerateConfig {
      input,
      output: dir.path().join("generated"),
      namespace: "App\\Models".to_string(),
      template: None,
      verbose: false,
      quiet: true,
    };
    generate_code(config, &Colors::new(false, Theme::Dark)).await?;

    let user = tokio::fs::read_to_string(dir.path().join("generated/User.php")).await?;
    let address = tokio::fs::read_to_string(dir.path().join("generated/UserAddress.php")).await?;
    assert!(user.contains("namespace App\\Models;"));
    assert!(user.contains("use App\\Models\\UserAddress;"));
    assert!(user.contains("public UserAddress $address,"));
    assert!(address.contains("readonly class UserAddress"));
    assert!(address.contains("public string $city\n"));
    Ok(())
  }

  #[tokio::test]
  async fn test_generate_code_uses_custom_template() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("openapi.yaml");
    let template = dir.path().join("class.tpl");
    tokio::fs::write(
      &input,
      "openapi: 3.0.0\ninfo:\n  title: Tags\n  version: '1'\npaths: {}\ncomponents:\n  schemas:\n    Tag:\n      type: object\n      properties:\n        label:\n          type: string\n",
    )
    .await?;
    tokio::fs::write(&template, "{{ namespace }}\\{{className}}\n{{properties}}").await?;

    let config = GenerateConfig {
      input,
      output: dir.path().join("out"),
      namespace: "Acme".to_string(),
      template: Some(template),
      verbose: false,
      quiet: true,
    };
    generate_code(config, &Colors::new(false, Theme::Dark)).await?;

    let tag = tokio::fs::read_to_string(dir.path().join("out/Tag.php")).await?;
    assert_eq!(tag, "Acme\\Tag\n        public string $label\n");
    Ok(())
  }

  #[tokio::test]
  async fn test_generate_code_rejects_other_openapi_versions() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("openapi.json");
    let spec = serde_json::json!({
      "openapi": "3.1.0",
      "info": { "title": "Next", "version": "1.0.0" },
      "paths": {}
    });
    tokio::fs::write(&input, serde_json::to_vec(&spec)?).await?;

    let config = GenerateConfig {
      input,
      output: dir.path().join("out"),
      namespace: DEFAULT_NAMESPACE.to_string(),
      template: None,
      verbose: false,
      quiet: true,
    };
    let err = generate_code(config, &Colors::new(false, Theme::Dark)).await.unwrap_err();

    assert_eq!(err.to_string(), "Only OpenAPI 3.0.x is supported, provided version: 3.1.0");
    assert!(!dir.path().join("out").exists());
    Ok(())
  }
}
