//! Handle the color theme
use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};

use crate::options::RosterOptions;
use crate::record::Health;

/// Theme defaults to Dark256
pub static DEFAULT_THEME: LazyLock<ColorTheme> = LazyLock::new(ColorTheme::dark256);

/// The color scheme of roster's UI
///
/// <pre>
/// +--------------------------------------------+
/// | > query                       [2 selected] |  --> prompt & query & info
/// | [ ] Name   Location  Health   Power ↕      |  --> header
/// |>[x] Naruto Konoha    Healthy  5000   ●     |  --> cursor & current & selected & viewed
/// |  [ ] Gaara Suna      Critical 3500         |  --> normal & health colours
/// | Showing 1 to 2 of 2 rows  ⠋                |  --> info & spinner & error
/// +--------------------------------------------+
/// </pre>
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorTheme {
    /// Rows and general text
    pub normal: Style,
    /// Row under the cursor
    pub current: Style,
    /// Query text/input
    pub query: Style,
    /// In-flight indicator
    pub spinner: Style,
    /// Footer and counters
    pub info: Style,
    /// Prompt prefix
    pub prompt: Style,
    /// Cursor/pointer (prefix of current row)
    pub cursor: Style,
    /// Selection checkbox of selected rows
    pub selected: Style,
    /// Column headers
    pub header: Style,
    /// Viewed marker
    pub viewed: Style,
    /// Error messages
    pub error: Style,
    /// Health column, healthy records
    pub healthy: Style,
    /// Health column, injured records
    pub injured: Style,
    /// Health column, critical records
    pub critical: Style,
}

impl ColorTheme {
    /// Setup the theme from the roster options
    pub fn init_from_options(options: &RosterOptions) -> ColorTheme {
        if let Some(color) = options.color.clone() {
            ColorTheme::from_options(&color)
        } else {
            // Check for NO_COLOR environment variable
            match std::env::var_os("NO_COLOR") {
                Some(no_color) if !no_color.is_empty() => ColorTheme::none(),
                _ => ColorTheme::dark256(),
            }
        }
    }

    /// Style of the health column for `health`
    pub fn health(&self, health: Health) -> Style {
        match health {
            Health::Healthy => self.healthy,
            Health::Injured => self.injured,
            Health::Critical => self.critical,
        }
    }

    fn none() -> Self {
        Self {
            spinner: Style::default().bold(),
            header: Style::default().bold(),
            ..ColorTheme::default()
        }
    }

    fn bw() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.reversed(),
            critical: base.critical.bold(),
            error: base.error.bold(),
            ..base
        }
    }

    fn default16() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.fg(Color::Yellow),
            spinner: base.spinner.fg(Color::Green),
            info: base.info.fg(Color::White),
            prompt: base.prompt.fg(Color::Blue),
            cursor: base.cursor.fg(Color::Red),
            selected: base.selected.fg(Color::Magenta),
            header: base.header.fg(Color::Cyan),
            viewed: base.viewed.fg(Color::Blue),
            error: base.error.fg(Color::Red),
            healthy: base.healthy.fg(Color::Green),
            injured: base.injured.fg(Color::Yellow),
            critical: base.critical.fg(Color::Red),
            ..base
        }
    }

    fn dark256() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.bg(Color::Indexed(236)),
            spinner: base.spinner.fg(Color::Indexed(148)),
            info: base.info.fg(Color::Indexed(144)),
            prompt: base.prompt.fg(Color::Indexed(110)),
            cursor: base.cursor.fg(Color::Indexed(161)),
            selected: base.selected.fg(Color::Indexed(168)),
            header: base.header.fg(Color::Indexed(109)),
            viewed: base.viewed.fg(Color::Indexed(75)),
            error: base.error.fg(Color::Indexed(203)),
            healthy: base.healthy.fg(Color::Indexed(108)),
            injured: base.injured.fg(Color::Indexed(179)),
            critical: base.critical.fg(Color::Indexed(167)),
            ..base
        }
    }

    fn light256() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.bg(Color::Indexed(251)),
            spinner: base.spinner.fg(Color::Indexed(65)),
            info: base.info.fg(Color::Indexed(101)),
            prompt: base.prompt.fg(Color::Indexed(25)),
            cursor: base.cursor.fg(Color::Indexed(161)),
            selected: base.selected.fg(Color::Indexed(168)),
            header: base.header.fg(Color::Indexed(31)),
            viewed: base.viewed.fg(Color::Indexed(26)),
            error: base.error.fg(Color::Indexed(160)),
            healthy: base.healthy.fg(Color::Indexed(28)),
            injured: base.injured.fg(Color::Indexed(130)),
            critical: base.critical.fg(Color::Indexed(124)),
            ..base
        }
    }

    fn set_color(&mut self, name: &str, spec: &str) {
        let spec_parts: Vec<_> = spec.split(&['+', ':']).collect();

        let raw_color = spec_parts[0];
        let new_color = if raw_color.len() == 7 && raw_color.is_ascii() && raw_color.starts_with('#') {
            // RGB Hex color
            let r = u8::from_str_radix(&raw_color[1..3], 16).unwrap_or(255);
            let g = u8::from_str_radix(&raw_color[3..5], 16).unwrap_or(255);
            let b = u8::from_str_radix(&raw_color[5..7], 16).unwrap_or(255);
            Some(Color::Rgb(r, g, b))
        } else {
            raw_color.parse::<u8>().ok().map(Color::Indexed).or_else(|| {
                debug!("Unknown color '{}'", spec_parts[0]);
                None
            })
        };

        let mut modifier = Modifier::empty();
        for part in spec_parts.iter().skip(1) {
            if matches!(*part, "x" | "regular") {
                modifier = Modifier::empty()
            } else {
                modifier |= match *part {
                    "b" | "bold" => Modifier::BOLD,
                    "u" | "underlined" => Modifier::UNDERLINED,
                    "c" | "crossed-out" => Modifier::CROSSED_OUT,
                    "d" | "dim" => Modifier::DIM,
                    "i" | "italic" => Modifier::ITALIC,
                    "r" | "reverse" => Modifier::REVERSED,
                    m => {
                        debug!("Unknown modifier '{m}'");
                        Modifier::empty()
                    }
                };
            }
        }
        let (component_name, layer) = if let Some(n) = name.strip_suffix("_fg").or(name.strip_suffix("-fg")) {
            (n, "fg")
        } else if let Some(n) = name.strip_suffix("_bg").or(name.strip_suffix("-bg")) {
            (n, "bg")
        } else if name == "bg" {
            ("", "bg")
        } else {
            (name, "fg")
        };

        let target = match component_name {
            "" | "normal" => &mut self.normal,
            "current" | "fg+" => &mut self.current,
            "bg+" => {
                set_style(&mut self.current, "bg", new_color, modifier);
                return;
            }
            "query" => &mut self.query,
            "spinner" => &mut self.spinner,
            "info" => &mut self.info,
            "prompt" => &mut self.prompt,
            "cursor" | "pointer" => &mut self.cursor,
            "selected" | "marker" => &mut self.selected,
            "header" => &mut self.header,
            "viewed" => &mut self.viewed,
            "error" => &mut self.error,
            "healthy" => &mut self.healthy,
            "injured" => &mut self.injured,
            "critical" => &mut self.critical,
            c => {
                debug!("Unknown theme component '{c}'");
                return;
            }
        };
        set_style(target, layer, new_color, modifier);
    }

    fn from_options(color: &str) -> Self {
        let mut theme = ColorTheme::dark256();
        for pair in color.split(',') {
            if let Some((name, spec)) = pair.split_once(':') {
                theme.set_color(name, spec);
            } else {
                theme = match pair {
                    "light" => ColorTheme::light256(),
                    "16" => ColorTheme::default16(),
                    "bw" => ColorTheme::bw(),
                    "none" | "empty" => ColorTheme::none(),
                    "dark" | "default" => ColorTheme::dark256(),
                    t => {
                        debug!("Unknown color theme '{t}'");
                        ColorTheme::dark256()
                    }
                };
            }
        }
        theme
    }
}

fn set_style(s: &mut Style, layer: &str, color: Option<Color>, modifier: Modifier) {
    if let Some(c) = color {
        *s = match layer {
            "fg" => s.fg(c),
            "bg" => s.bg(c),
            _ => *s,
        }
    }
    *s = s.add_modifier(modifier);
}
