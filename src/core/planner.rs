use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::graph::{DependencyLink, DependencyRef};

/// Package-manager subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Unlink,
    Link,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Unlink => "unlink",
            Verb::Link => "link",
        }
    }
}

/// One package-manager invocation, kept tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub verb: Verb,
    pub cwd: PathBuf,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(verb: Verb, cwd: PathBuf) -> Self {
        Self {
            verb,
            cwd,
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments handed to the link tool: the verb, then `args`.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.verb.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Human readable command line, used in logs and errors only.
    pub fn display_with(&self, program: &str) -> String {
        let mut line = String::from(program);
        for arg in self.argv() {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {})", self.argv().join(" "), self.cwd.display())
    }
}

/// How a batch reacts to a failing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Failures are recorded and the batch still completes.
    Tolerant,
    /// The first failure fails the run.
    Strict,
}

/// The three ordered phases of a link run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Unlink,
    LinkDependency,
    LinkDependee,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Unlink, Phase::LinkDependency, Phase::LinkDependee];

    pub fn announcement(self) -> &'static str {
        match self {
            Phase::Unlink => "Unlinking dependencies...",
            Phase::LinkDependency => "Linking dependencies...",
            Phase::LinkDependee => "Linking dependees...",
        }
    }

    pub fn policy(self) -> FailurePolicy {
        match self {
            Phase::Unlink | Phase::LinkDependency => FailurePolicy::Tolerant,
            Phase::LinkDependee => FailurePolicy::Strict,
        }
    }

    fn command_for(self, link: &DependencyLink, dependency: &DependencyRef) -> Command {
        match self {
            Phase::Unlink => Command::new(Verb::Unlink, dependency.path.clone()).with_arg("--force"),
            Phase::LinkDependency => Command::new(Verb::Link, dependency.path.clone()),
            Phase::LinkDependee => {
                Command::new(Verb::Link, link.path.clone()).with_arg(dependency.name.clone())
            }
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Unlink => "unlink",
            Phase::LinkDependency => "link-dependency",
            Phase::LinkDependee => "link-dependee",
        };
        f.write_str(label)
    }
}

/// Commands for one phase; all of them may run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub phase: Phase,
    pub policy: FailurePolicy,
    pub commands: Vec<Command>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

pub struct CommandPlanner;

impl CommandPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Unlink, link-as-dependency and link-as-dependee batches, in run order.
    pub fn plan(&self, links: &[DependencyLink]) -> Vec<Batch> {
        Phase::ALL
            .into_iter()
            .map(|phase| self.plan_phase(phase, links))
            .collect()
    }

    /// Skippable links are dropped as a whole, together with every
    /// dependency they list.
    pub fn plan_phase(&self, phase: Phase, links: &[DependencyLink]) -> Batch {
        let commands = links
            .iter()
            .filter(|link| !link.is_skippable)
            .flat_map(|link| {
                link.dependencies
                    .iter()
                    .map(move |dependency| phase.command_for(link, dependency))
            })
            .collect();

        Batch {
            phase,
            policy: phase.policy(),
            commands,
        }
    }
}

impl Default for CommandPlanner {
    fn default() -> Self {
        Self::new()
    }
}
