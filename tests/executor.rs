use async_trait::async_trait;
use interlink::core::executor::{CommandRunner, JobExecutor};
use interlink::core::planner::{Batch, Command, FailurePolicy, Phase, Verb};
use interlink::{LinkError, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Start(String),
    Finish(String),
}

/// Records start/finish of every command. Commands whose cwd ends in
/// "bad" fail; a trailing "slow" delays completion.
#[derive(Default)]
struct RecordingRunner {
    events: Mutex<Vec<Event>>,
}

impl RecordingRunner {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &Command) -> Result<()> {
        let label = format!("{}@{}", command.argv().join(" "), command.cwd.display());
        self.events.lock().unwrap().push(Event::Start(label.clone()));

        let delay = if command.cwd.ends_with("slow") { 30 } else { 5 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.events.lock().unwrap().push(Event::Finish(label.clone()));
        if command.cwd.ends_with("bad") {
            return Err(LinkError::CommandFailed {
                command: label,
                code: Some(1),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

fn batch(phase: Phase, dirs: &[&str]) -> Batch {
    let verb = if phase == Phase::Unlink { Verb::Unlink } else { Verb::Link };
    Batch {
        phase,
        policy: phase.policy(),
        commands: dirs
            .iter()
            .map(|d| Command::new(verb, PathBuf::from("/ws").join(d)))
            .collect(),
    }
}

#[tokio::test]
async fn batches_settle_before_the_next_one_starts() {
    let runner = Arc::new(RecordingRunner::default());
    let executor = JobExecutor::new(runner.clone());

    let outcomes = executor
        .series(vec![
            batch(Phase::Unlink, &["slow", "fast", "bad"]),
            batch(Phase::LinkDependency, &["slow", "fast"]),
            batch(Phase::LinkDependee, &["app"]),
        ])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);

    let events = runner.events();
    assert_eq!(events.len(), 12);

    // First three events are the unlink starts, then its three finishes.
    assert!(events[..3].iter().all(|e| matches!(e, Event::Start(l) if l.starts_with("unlink"))));
    assert!(events[3..6].iter().all(|e| matches!(e, Event::Finish(l) if l.starts_with("unlink"))));
    assert!(events[6..8].iter().all(|e| matches!(e, Event::Start(_))));
    assert!(events[8..10].iter().all(|e| matches!(e, Event::Finish(_))));
    assert_eq!(events[10], Event::Start("link@/ws/app".to_string()));
    assert_eq!(events[11], Event::Finish("link@/ws/app".to_string()));
}

#[tokio::test]
async fn tolerant_batches_record_failures_and_continue() {
    let runner = Arc::new(RecordingRunner::default());
    let executor = JobExecutor::new(runner.clone());

    let outcomes = executor
        .series(vec![
            batch(Phase::Unlink, &["bad", "ok"]),
            batch(Phase::LinkDependency, &["bad"]),
            batch(Phase::LinkDependee, &["app"]),
        ])
        .await
        .unwrap();

    assert_eq!(outcomes[0].jobs, 2);
    assert_eq!(outcomes[0].failures.len(), 1);
    assert!(outcomes[0].failures[0].command.contains("/ws/bad"));
    assert_eq!(outcomes[1].failures.len(), 1);
    assert!(outcomes[2].failures.is_empty());
    assert!(runner
        .events()
        .contains(&Event::Finish("link@/ws/app".to_string())));
}

#[tokio::test]
async fn one_strict_failure_fails_the_run() {
    let runner = Arc::new(RecordingRunner::default());
    let executor = JobExecutor::new(runner.clone());

    let mut dependee = batch(Phase::LinkDependee, &["one", "bad", "two"]);
    assert_eq!(dependee.policy, FailurePolicy::Strict);
    dependee.commands[1] = dependee.commands[1].clone().with_arg("lib");

    let err = executor
        .series(vec![batch(Phase::Unlink, &["ok"]), dependee])
        .await
        .unwrap_err();

    match err {
        LinkError::CommandFailed { command, .. } => assert_eq!(command, "link lib@/ws/bad"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn strict_failure_stops_later_batches() {
    let runner = Arc::new(RecordingRunner::default());
    let executor = JobExecutor::new(runner.clone());

    let result = executor
        .series(vec![
            batch(Phase::LinkDependee, &["bad"]),
            batch(Phase::LinkDependee, &["never"]),
        ])
        .await;

    assert!(result.is_err());
    assert!(!runner
        .events()
        .iter()
        .any(|e| matches!(e, Event::Start(l) if l.ends_with("never"))));
}

#[tokio::test]
async fn jobs_are_deferred_until_started() {
    let runner = Arc::new(RecordingRunner::default());
    let executor = JobExecutor::new(runner.clone());

    let job = executor.job(Command::new(Verb::Link, PathBuf::from("/ws/lib")));
    assert!(job.description().contains("/ws/lib"));
    assert!(runner.events().is_empty());

    job.start().await.unwrap();
    assert_eq!(runner.events().len(), 2);
}

#[tokio::test]
async fn parallel_with_no_jobs_completes() {
    let failures = JobExecutor::parallel(Vec::new(), FailurePolicy::Strict)
        .await
        .unwrap();
    assert!(failures.is_empty());
}

#[cfg(unix)]
mod process {
    use interlink::core::executor::{CommandRunner, ProcessRunner};
    use interlink::core::planner::{Command, Verb};
    use interlink::LinkError;

    #[tokio::test]
    async fn successful_exit_resolves() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = ProcessRunner::new("true", false);
        let command = Command::new(Verb::Link, dir.path().to_path_buf());
        runner.run(&command).await.unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_command_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = ProcessRunner::new("false", false);
        let command = Command::new(Verb::Unlink, dir.path().to_path_buf()).with_arg("--force");

        match runner.run(&command).await.unwrap_err() {
            LinkError::CommandFailed { command, code, .. } => {
                assert_eq!(command, "false unlink --force");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = ProcessRunner::new("interlink-no-such-tool", false);
        let command = Command::new(Verb::Link, dir.path().to_path_buf());

        assert!(matches!(
            runner.run(&command).await.unwrap_err(),
            LinkError::Spawn { .. }
        ));
    }

    #[tokio::test]
    async fn verbose_runner_streams_and_resolves() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = ProcessRunner::new("true", true);
        let command = Command::new(Verb::Link, dir.path().to_path_buf()).with_arg("lib");
        runner.run(&command).await.unwrap();
    }

    #[tokio::test]
    async fn verbose_failure_has_no_captured_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = ProcessRunner::new("false", true);
        let command = Command::new(Verb::Link, dir.path().to_path_buf());

        match runner.run(&command).await.unwrap_err() {
            LinkError::CommandFailed { command, code, stderr } => {
                assert_eq!(command, "false link");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
