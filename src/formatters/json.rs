use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::core::LinkReport;

/// JSON summary for scripts and CI logs.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format_to_file(&self, report: &LinkReport, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format_report(report)?)?;
        Ok(())
    }

    pub fn format_report(&self, report: &LinkReport) -> Result<String> {
        let tolerated_failures: Vec<_> = report
            .tolerated_failures()
            .map(|(phase, failure)| {
                json!({
                    "phase": phase,
                    "command": failure.command,
                    "error": failure.error
                })
            })
            .collect();

        let output = json!({
            "meta": {
                "links": report.links.len(),
                "dry_run": report.dry_run
            },
            "links": report.links,
            "warnings": report.warnings,
            "tolerated_failures": tolerated_failures,
            "planned": report.planned
        });

        if self.pretty {
            Ok(serde_json::to_string_pretty(&output)?)
        } else {
            Ok(serde_json::to_string(&output)?)
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
