use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use crossterm::style::Stylize;
use oas3_flatten::Flattened;

use crate::{
  generator::orchestrator::{FlattenedSpec, Orchestrator},
  ui::{
    Colors,
    colors::to_comfy,
    term_width,
  },
  utils::spec::SpecLoader,
};

const ROOT_ORIGIN: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeRow {
  pub name: String,
  pub id: u64,
  pub properties: usize,
  pub origin: String,
}

pub(crate) fn type_rows(flattened: &Flattened) -> Vec<TypeRow> {
  flattened
    .table
    .iter()
    .map(|(name, node)| TypeRow {
      name: name.clone(),
      id: node.id.get(),
      properties: node.properties.len(),
      origin: flattened
        .extracted
        .get(name)
        .map_or_else(|| ROOT_ORIGIN.to_string(), ToString::to_string),
    })
    .collect()
}

pub async fn list_types(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let document = SpecLoader::open(input).await?.parse()?;
  let FlattenedSpec { flattened, stats } = Orchestrator::new(document).flatten()?;

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut header = Row::new();
  for title in ["TYPE", "ID", "PROPERTIES", "ORIGIN"] {
    header.add_cell(Cell::new(title).fg(to_comfy(colors.label())));
  }
  table.set_header(header);

  for row in type_rows(&flattened) {
    let origin_color = if row.origin == ROOT_ORIGIN {
      colors.primary()
    } else {
      colors.info()
    };

    let mut cells = Row::new();
    cells.add_cell(
      Cell::new(row.name)
        .fg(to_comfy(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    cells.add_cell(
      Cell::new(row.id)
        .fg(to_comfy(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    cells.add_cell(
      Cell::new(row.properties)
        .fg(to_comfy(colors.primary()))
        .set_alignment(CellAlignment::Right),
    );
    cells.add_cell(Cell::new(row.origin).fg(to_comfy(origin_color)));
    table.add_row(cells);
  }

  println!("{table}");

  for warning in &stats.warnings {
    eprintln!(
      "{} {}",
      "Skipped:".with(colors.accent()),
      warning.to_string().with(colors.primary())
    );
  }

  Ok(())
}
