pub mod flatten;
pub mod generate;
pub mod list;

pub use flatten::flatten_tree;
pub use generate::{GenerateConfig, generate_code};
pub use list::list_types;

use chrono::{Local, Timelike};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}
