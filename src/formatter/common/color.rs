use std::{env, ffi::OsStr, io, str::FromStr};

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum ColorSetting {
    #[default]
    Automatic,
    Always,
    Never,
}

impl From<bool> for ColorSetting {
    fn from(value: bool) -> Self {
        match value {
            true => Self::Always,
            false => Self::Never,
        }
    }
}

impl FromStr for ColorSetting {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "automatic" => Ok(Self::Automatic),
            "always" | "on" => Ok(Self::Always),
            "never" | "off" => Ok(Self::Never),
            _ => Err(()),
        }
    }
}

pub(crate) mod colors {
    pub const RESET: &str = "\x1b[m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const DIM: &str = "\x1b[38;5;8m";
}

/// The escape codes a formatter writes, empty when color is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub red: &'static str,
    pub green: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        match enabled {
            true => Self {
                red: colors::RED,
                green: colors::GREEN,
                dim: colors::DIM,
                reset: colors::RESET,
            },
            false => Self {
                red: "",
                green: "",
                dim: "",
                reset: "",
            },
        }
    }
}

pub trait SupportsColor {
    fn supports_color(&self) -> bool;
}

impl<T: io::IsTerminal> SupportsColor for T {
    fn supports_color(&self) -> bool {
        self.is_terminal()
    }
}

/// Whether the environment allows colored output.
///
/// Color is refused when `NO_COLOR` is set or `TERM` is unset or `dumb`.
pub fn env_allows_color() -> bool {
    allows_color(
        env::var_os("NO_COLOR").as_deref(),
        env::var_os("TERM").as_deref(),
    )
}

fn allows_color(no_color: Option<&OsStr>, term: Option<&OsStr>) -> bool {
    no_color.is_none() && term.is_some_and(|term| term != "dumb")
}
