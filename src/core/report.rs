use serde::Serialize;
use std::path::PathBuf;

use super::executor::{BatchOutcome, JobFailure};
use super::graph::DependencyLink;
use super::planner::{Batch, Phase};

/// A command as it would be run, for dry runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommand {
    pub phase: Phase,
    pub command: String,
    pub cwd: PathBuf,
}

impl PlannedCommand {
    pub fn from_batches(batches: &[Batch], program: &str) -> Vec<Self> {
        batches
            .iter()
            .flat_map(|batch| {
                batch.commands.iter().map(move |command| PlannedCommand {
                    phase: batch.phase,
                    command: command.display_with(program),
                    cwd: command.cwd.clone(),
                })
            })
            .collect()
    }
}

/// Everything a run produced, left to the caller to render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkReport {
    /// Links that were (or in a dry run, would be) attached. Skippable links
    /// never appear here.
    pub links: Vec<DependencyLink>,
    pub warnings: Vec<String>,
    pub batches: Vec<BatchOutcome>,
    pub dry_run: bool,
    pub planned: Vec<PlannedCommand>,
}

impl LinkReport {
    pub fn tolerated_failures(&self) -> impl Iterator<Item = (Phase, &JobFailure)> {
        self.batches
            .iter()
            .flat_map(|batch| batch.failures.iter().map(move |failure| (batch.phase, failure)))
    }
}
