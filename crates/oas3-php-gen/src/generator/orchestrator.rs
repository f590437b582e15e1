//! Parse, flatten, render.
//!
//! ```ignore
//! # use crate::generator::{orchestrator::Orchestrator, render::PhpRenderer, template::Template};
//! # fn example(document: crate::utils::spec::OpenApiDocument) -> anyhow::Result<()> {
//! let renderer = PhpRenderer::new("App\\Api\\V1", Template::default())?;
//! let output = Orchestrator::new(document).generate(&renderer)?;
//! println!("{} classes", output.stats.types_rendered);
//! # Ok(())
//! # }
//! ```

use oas3_flatten::{Flattened, Flattener};

use crate::{
  generator::{
    metrics::{GenerationStats, GenerationWarning},
    parser::SchemaParser,
    render::{PhpRenderer, RenderedFile},
  },
  utils::spec::OpenApiDocument,
};

pub struct Orchestrator {
  document: OpenApiDocument,
}

#[derive(Debug, Clone)]
pub struct SpecMetadata {
  pub title: String,
  pub version: String,
}

#[derive(Debug)]
pub struct FlattenedSpec {
  pub flattened: Flattened,
  pub stats: GenerationStats,
}

#[derive(Debug)]
pub struct GeneratedOutput {
  pub files: Vec<RenderedFile>,
  pub stats: GenerationStats,
}

impl Orchestrator {
  pub fn new(document: OpenApiDocument) -> Self {
    Self { document }
  }

  pub fn metadata(&self) -> SpecMetadata {
    SpecMetadata {
      title: self.document.spec.info.title.clone(),
      version: self.document.spec.info.version.clone(),
    }
  }

  /// Parses every root and flattens them into one table.
  pub fn flatten(&self) -> anyhow::Result<FlattenedSpec> {
    let mut stats = GenerationStats::default();

    let parsed = SchemaParser::new(&self.document).parse();
    stats.record_roots(parsed.roots.len());
    stats.record_warnings(parsed.warnings);

    let flattened = Flattener::new(parsed.roots)?.run()?;
    stats.record_flattened(&flattened);

    Ok(FlattenedSpec { flattened, stats })
  }

  pub fn generate(&self, renderer: &PhpRenderer) -> anyhow::Result<GeneratedOutput> {
    let FlattenedSpec { flattened, mut stats } = self.flatten()?;

    let files = renderer.render(&flattened.table)?;
    stats.record_rendered(files.len());
    stats.record_warnings(
      files
        .iter()
        .filter(|file| file.class_name != file.entry_name)
        .map(|file| GenerationWarning::ClassRenamed {
          original: file.entry_name.clone(),
          renamed: file.class_name.clone(),
        }),
    );

    Ok(GeneratedOutput { files, stats })
  }
}
