//! Human-readable run summary.
//!
//! ```text
//! Linked local dependencies:
//!   web-app  /ws/web-app
//!     -> ui-kit  /ws/ui-kit
//! Done. 1 package linked.
//! ```

use anyhow::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::LinkReport;

pub struct TextFormatter {
    /// List tolerated job failures below the summary.
    show_failures: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            show_failures: true,
        }
    }

    pub fn with_failures(mut self, show: bool) -> Self {
        self.show_failures = show;
        self
    }

    pub fn format_to_file(&self, report: &LinkReport, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format_report(report)?)?;
        Ok(())
    }

    pub fn format_report(&self, report: &LinkReport) -> Result<String> {
        let mut output = String::with_capacity(1024);

        if report.dry_run {
            self.format_plan(&mut output, report)?;
        }

        if report.links.is_empty() {
            writeln!(output, "No local dependencies to link.")?;
        } else {
            let heading = if report.dry_run {
                "Would link local dependencies:"
            } else {
                "Linked local dependencies:"
            };
            writeln!(output, "{heading}")?;
            for link in &report.links {
                writeln!(output, "  {}  {}", link.name, link.path.display())?;
                for dependency in &link.dependencies {
                    writeln!(
                        output,
                        "    -> {}  {}",
                        dependency.name,
                        dependency.path.display()
                    )?;
                }
            }
        }

        if self.show_failures {
            let failures: Vec<_> = report.tolerated_failures().collect();
            if !failures.is_empty() {
                writeln!(output, "Ignored failures:")?;
                for (phase, failure) in failures {
                    let error = failure.error.replace('\n', "\n      ");
                    writeln!(output, "  [{}] {}: {}", phase, failure.command, error)?;
                }
            }
        }

        let count = report.links.len();
        let noun = if count == 1 { "package" } else { "packages" };
        if report.dry_run {
            writeln!(output, "Dry run complete. {count} {noun} would be linked.")?;
        } else {
            writeln!(output, "Done. {count} {noun} linked.")?;
        }

        Ok(output)
    }

    fn format_plan(&self, output: &mut String, report: &LinkReport) -> Result<()> {
        writeln!(output, "Planned commands:")?;
        if report.planned.is_empty() {
            writeln!(output, "  (none)")?;
        }
        for planned in &report.planned {
            writeln!(
                output,
                "  [{}] {}  (in {})",
                planned.phase,
                planned.command,
                planned.cwd.display()
            )?;
        }
        Ok(())
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}
