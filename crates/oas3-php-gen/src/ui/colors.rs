use std::io::IsTerminal;

use clap::{
  ValueEnum,
  builder::styling::{Ansi256Color, AnsiColor, Color as ClapColor, RgbColor, Style, Styles},
};
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

struct Palette {
  timestamp: Color,
  primary: Color,
  accent: Color,
  info: Color,
  success: Color,
  label: Color,
  value: Color,
}

const DARK: Palette = Palette {
  timestamp: Color::Rgb { r: 120, g: 132, b: 170 },
  primary: Color::Rgb { r: 137, g: 147, b: 190 },
  accent: Color::Rgb { r: 214, g: 110, b: 96 },
  info: Color::Rgb { r: 120, g: 160, b: 196 },
  success: Color::Rgb { r: 126, g: 190, b: 140 },
  label: Color::Rgb { r: 176, g: 152, b: 220 },
  value: Color::Rgb { r: 236, g: 220, b: 160 },
};

const LIGHT: Palette = Palette {
  timestamp: Color::Rgb { r: 72, g: 79, b: 120 },
  primary: Color::Rgb { r: 52, g: 58, b: 104 },
  accent: Color::Rgb { r: 180, g: 62, b: 52 },
  info: Color::Rgb { r: 36, g: 98, b: 150 },
  success: Color::Rgb { r: 34, g: 122, b: 70 },
  label: Color::Rgb { r: 98, g: 72, b: 150 },
  value: Color::Rgb { r: 140, g: 100, b: 30 },
};

pub struct Colors {
  enabled: bool,
  theme: Theme,
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  fn pick(&self, color: fn(&Palette) -> Color) -> Color {
    if !self.enabled {
      return Color::Reset;
    }
    match self.theme {
      Theme::Dark => color(&DARK),
      Theme::Light => color(&LIGHT),
    }
  }

  pub fn timestamp(&self) -> Color {
    self.pick(|p| p.timestamp)
  }

  pub fn primary(&self) -> Color {
    self.pick(|p| p.primary)
  }

  pub fn accent(&self) -> Color {
    self.pick(|p| p.accent)
  }

  pub fn info(&self) -> Color {
    self.pick(|p| p.info)
  }

  pub fn success(&self) -> Color {
    self.pick(|p| p.success)
  }

  pub fn label(&self) -> Color {
    self.pick(|p| p.label)
  }

  pub fn value(&self) -> Color {
    self.pick(|p| p.value)
  }

  pub fn clap_styles() -> Styles {
    let colors = Self::new(true, Theme::Dark);

    Styles::styled()
      .header(Style::new().bold().underline().fg_color(to_clap(colors.label())))
      .usage(Style::new().bold().fg_color(to_clap(colors.label())))
      .literal(Style::new().fg_color(to_clap(colors.success())))
      .placeholder(Style::new().fg_color(to_clap(colors.info())))
      .error(Style::new().bold().fg_color(to_clap(colors.accent())))
      .valid(Style::new().fg_color(to_clap(colors.success())))
      .invalid(Style::new().bold().fg_color(to_clap(colors.accent())))
  }
}

fn to_clap(color: Color) -> Option<ClapColor> {
  match color {
    Color::Black => Some(ClapColor::Ansi(AnsiColor::Black)),
    Color::Blue | Color::DarkBlue => Some(ClapColor::Ansi(AnsiColor::Blue)),
    Color::Cyan | Color::DarkCyan => Some(ClapColor::Ansi(AnsiColor::Cyan)),
    Color::DarkGreen | Color::Green => Some(ClapColor::Ansi(AnsiColor::Green)),
    Color::DarkGrey | Color::Grey => Some(ClapColor::Ansi(AnsiColor::BrightBlack)),
    Color::DarkMagenta | Color::Magenta => Some(ClapColor::Ansi(AnsiColor::Magenta)),
    Color::DarkRed | Color::Red => Some(ClapColor::Ansi(AnsiColor::Red)),
    Color::DarkYellow | Color::Yellow => Some(ClapColor::Ansi(AnsiColor::Yellow)),
    Color::White => Some(ClapColor::Ansi(AnsiColor::White)),
    Color::AnsiValue(val) => Some(ClapColor::Ansi256(Ansi256Color(val))),
    Color::Rgb { r, g, b } => Some(ClapColor::Rgb(RgbColor(r, g, b))),
    Color::Reset => None,
  }
}

/// Table cells take comfy-table colors; both crates model the same terminal palette.
pub fn to_comfy(color: Color) -> ComfyColor {
  match color {
    Color::Reset => ComfyColor::Reset,
    Color::Black => ComfyColor::Black,
    Color::DarkGrey => ComfyColor::DarkGrey,
    Color::Red => ComfyColor::Red,
    Color::DarkRed => ComfyColor::DarkRed,
    Color::Green => ComfyColor::Green,
    Color::DarkGreen => ComfyColor::DarkGreen,
    Color::Yellow => ComfyColor::Yellow,
    Color::DarkYellow => ComfyColor::DarkYellow,
    Color::Blue => ComfyColor::Blue,
    Color::DarkBlue => ComfyColor::DarkBlue,
    Color::Magenta => ComfyColor::Magenta,
    Color::DarkMagenta => ComfyColor::DarkMagenta,
    Color::Cyan => ComfyColor::Cyan,
    Color::DarkCyan => ComfyColor::DarkCyan,
    Color::White => ComfyColor::White,
    Color::Grey => ComfyColor::Grey,
    Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
    Color::AnsiValue(val) => ComfyColor::AnsiValue(val),
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => detect_terminal_theme(),
  }
}

/// `COLORFGBG` is `fg;bg`; background indices 8 and up are the bright, light colors.
fn detect_terminal_theme() -> Theme {
  std::env::var("COLORFGBG")
    .ok()
    .and_then(|value| value.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
    .map_or(Theme::Dark, |bg| if bg >= 8 { Theme::Light } else { Theme::Dark })
}
