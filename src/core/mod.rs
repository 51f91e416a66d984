pub mod executor;
pub mod graph;
pub mod linker;
pub mod module;
pub mod planner;
pub mod report;
pub mod scanner;

pub use executor::{BatchOutcome, CommandRunner, Job, JobExecutor, JobFailure, ProcessRunner};
pub use graph::{DependencyGraph, DependencyLink, DependencyRef, GraphBuilder};
pub use linker::{LinkOptions, LinkPlan, WorkspaceLinker};
pub use module::{Module, ModuleMap};
pub use planner::{Batch, Command, CommandPlanner, FailurePolicy, Phase, Verb};
pub use report::{LinkReport, PlannedCommand};
pub use scanner::{ModuleScanner, ScanOutcome};
