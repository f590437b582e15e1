pub mod metrics;
pub mod orchestrator;
pub(crate) mod parser;
pub mod render;
pub mod template;

#[cfg(test)]
mod tests;
