use std::io;

use crate::formatter::{
    common::color::{ColorSetting, Palette, SupportsColor, env_allows_color},
    *,
};

/// The default console formatter.
///
/// Prints a `[group]` header for every group that runs, a green ` ✓ title`
/// line for every passing test and a red ` ✗ title` line followed by one
/// `file:line: FAIL: message` line per failure for failing tests. The run ends
/// with a boxed `PASS`/`FAIL` summary.
#[derive(Debug)]
pub struct PrettyFormatter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
}

impl Default for PrettyFormatter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: Default::default(),
        }
    }
}

impl<W: io::Write> PrettyFormatter<W> {
    pub fn with_target<WithTarget: io::Write>(
        self,
        with_target: WithTarget,
    ) -> PrettyFormatter<WithTarget> {
        PrettyFormatter {
            target: with_target,
            color_setting: self.color_setting,
        }
    }

    pub fn with_color_setting(self, color_setting: impl Into<ColorSetting>) -> Self {
        PrettyFormatter {
            color_setting: color_setting.into(),
            ..self
        }
    }
}

impl<W: io::Write + SupportsColor> PrettyFormatter<W> {
    /// Return whether this formatter will currently emit colored output.
    pub fn use_color(&self) -> bool {
        match self.color_setting {
            ColorSetting::Automatic => self.target.supports_color() && env_allows_color(),
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }

    fn palette(&self) -> Palette {
        Palette::new(self.use_color())
    }
}

impl<W: io::Write + SupportsColor> TestFormatter for PrettyFormatter<W> {
    type Error = io::Error;

    fn fmt_group_start(&mut self, data: FmtGroupStart<'_>) -> Result<(), Self::Error> {
        writeln!(self.target, "\n[{}]", data.name)
    }

    fn fmt_test_failure(&mut self, data: &FmtTestFailure) -> Result<(), Self::Error> {
        let Palette { red, reset, .. } = self.palette();
        if data.nth == 1 {
            writeln!(self.target, "{red} ✗ {}{reset}", data.meta.title)?;
        }
        writeln!(self.target, "{}: FAIL: {}", data.origin, data.message)
    }

    fn fmt_test_outcome(&mut self, data: FmtTestOutcome<'_>) -> Result<(), Self::Error> {
        // failing tests were announced with their first failure
        if !data.outcome.passed() {
            return Ok(());
        }

        let Palette { green, reset, .. } = self.palette();
        writeln!(self.target, "{green} ✓ {}{reset}", data.outcome.meta.title)
    }

    fn fmt_run_outcomes(
        &mut self,
        FmtRunOutcomes {
            failed, skipped, ..
        }: FmtRunOutcomes,
    ) -> Result<(), Self::Error> {
        let Palette {
            red,
            green,
            dim,
            reset,
        } = self.palette();
        let (color, label) = match failed {
            0 => (green, "PASS"),
            _ => (red, "FAIL"),
        };

        write!(self.target, "{color}\n┌──────┐")?;
        write!(self.target, "\n│ {label} │")?;
        if skipped > 0 {
            write!(self.target, "{dim} ({skipped} skipped){color}")?;
        }
        writeln!(self.target, "\n└──────┘{reset}")?;
        self.target.flush()
    }
}
