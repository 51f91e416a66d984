use async_trait::async_trait;
use futures_util::future::{join_all, try_join_all, BoxFuture};
use futures_util::FutureExt;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use tracing::{debug, info};

use super::planner::{Batch, Command, FailurePolicy, Phase};
use crate::error::{LinkError, Result};

/// Runs a single planned command to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &Command) -> Result<()>;

    /// Label used in logs and failure records.
    fn describe(&self, command: &Command) -> String {
        command.to_string()
    }
}

/// Spawns the link tool as a child process.
///
/// Verbose runners hand the child the parent's stdout and stderr; quiet ones
/// capture stderr so a failure can report it.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    verbose: bool,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &Command) -> Result<()> {
        let line = command.display_with(&self.program);
        debug!("Running `{}` in {}", line, command.cwd.display());

        let mut process = tokio::process::Command::new(&self.program);
        process
            .args(command.argv())
            .current_dir(&command.cwd)
            .stdin(Stdio::null());

        let spawn_error = |source| LinkError::Spawn {
            command: line.clone(),
            source,
        };

        let (status, stderr) = if self.verbose {
            process.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            let status = process.status().await.map_err(spawn_error)?;
            (status, String::new())
        } else {
            let output = process.output().await.map_err(spawn_error)?;
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            (output.status, stderr)
        };

        if status.success() {
            Ok(())
        } else {
            Err(LinkError::CommandFailed {
                command: line,
                code: status.code(),
                stderr,
            })
        }
    }

    fn describe(&self, command: &Command) -> String {
        format!("{} (in {})", command.display_with(&self.program), command.cwd.display())
    }
}

/// A deferred unit of work: nothing runs until [`Job::start`] is called.
pub struct Job {
    description: String,
    work: Box<dyn FnOnce() -> BoxFuture<'static, Result<()>> + Send>,
}

impl Job {
    pub fn new<F>(description: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, Result<()>> + Send + 'static,
    {
        Self {
            description: description.into(),
            work: Box::new(work),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start(self) -> BoxFuture<'static, Result<()>> {
        (self.work)()
    }
}

/// A job failure swallowed by a tolerant batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    pub command: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub phase: Phase,
    pub jobs: usize,
    pub failures: Vec<JobFailure>,
}

pub struct JobExecutor {
    runner: Arc<dyn CommandRunner>,
}

impl JobExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub fn job(&self, command: Command) -> Job {
        let runner = Arc::clone(&self.runner);
        let description = runner.describe(&command);
        Job::new(description, move || {
            async move { runner.run(&command).await }.boxed()
        })
    }

    /// Runs batches strictly one after another. A batch starts only after
    /// every job of the previous one has settled.
    pub async fn series(&self, batches: Vec<Batch>) -> Result<Vec<BatchOutcome>> {
        let mut outcomes = Vec::with_capacity(batches.len());
        for batch in batches {
            info!("{}", batch.phase.announcement());
            let jobs: Vec<Job> = batch
                .commands
                .into_iter()
                .map(|command| self.job(command))
                .collect();
            let total = jobs.len();
            let failures = Self::parallel(jobs, batch.policy).await?;
            outcomes.push(BatchOutcome {
                phase: batch.phase,
                jobs: total,
                failures,
            });
        }
        Ok(outcomes)
    }

    /// Starts every job at once and waits for all of them to settle.
    ///
    /// Under [`FailurePolicy::Strict`] the first failure is returned as soon
    /// as it is observed; siblings already spawned keep running detached.
    pub async fn parallel(jobs: Vec<Job>, policy: FailurePolicy) -> Result<Vec<JobFailure>> {
        let settled = jobs.into_iter().map(|job| {
            let description = job.description().to_string();
            let handle = tokio::spawn(job.start());
            async move {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(join_error) => Err(LinkError::JobAborted {
                        command: description.clone(),
                        reason: join_error.to_string(),
                    }),
                };
                (description, result)
            }
        });

        match policy {
            FailurePolicy::Strict => {
                try_join_all(settled.map(|job| async move { job.await.1 })).await?;
                Ok(Vec::new())
            }
            FailurePolicy::Tolerant => {
                let failures = join_all(settled)
                    .await
                    .into_iter()
                    .filter_map(|(command, result)| {
                        let err = result.err()?;
                        debug!("Ignoring failed job {}: {}", command, err);
                        Some(JobFailure {
                            command,
                            error: err.to_string(),
                        })
                    })
                    .collect();
                Ok(failures)
            }
        }
    }
}
