use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::executor::{CommandRunner, JobExecutor, ProcessRunner};
use super::graph::{DependencyLink, GraphBuilder};
use super::planner::{Batch, CommandPlanner};
use super::report::{LinkReport, PlannedCommand};
use super::scanner::ModuleScanner;
use crate::error::Result;

pub const DEFAULT_LINK_TOOL: &str = "npm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    pub packages_root: PathBuf,
    /// Focus mode: only this module gets commands generated.
    pub single_package: Option<String>,
    pub verbose: bool,
    pub link_tool: String,
    pub dry_run: bool,
}

impl LinkOptions {
    pub fn new(packages_root: impl Into<PathBuf>) -> Self {
        Self {
            packages_root: packages_root.into(),
            single_package: None,
            verbose: false,
            link_tool: DEFAULT_LINK_TOOL.to_string(),
            dry_run: false,
        }
    }

    pub fn with_single_package(mut self, name: impl Into<String>) -> Self {
        self.single_package = Some(name.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_link_tool(mut self, link_tool: impl Into<String>) -> Self {
        self.link_tool = link_tool.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Discovery, graph and command batches for one packages root.
#[derive(Debug, Clone)]
pub struct LinkPlan {
    pub links: Vec<DependencyLink>,
    pub batches: Vec<Batch>,
    pub warnings: Vec<String>,
}

impl LinkPlan {
    /// Links that will actually be attached.
    pub fn active_links(&self) -> Vec<DependencyLink> {
        self.links
            .iter()
            .filter(|link| !link.is_skippable)
            .cloned()
            .collect()
    }
}

pub struct WorkspaceLinker {
    options: LinkOptions,
    scanner: ModuleScanner,
    planner: CommandPlanner,
    executor: JobExecutor,
}

impl WorkspaceLinker {
    pub fn new(options: LinkOptions) -> Self {
        let runner = ProcessRunner::new(options.link_tool.clone(), options.verbose);
        Self::with_runner(options, Arc::new(runner))
    }

    pub fn with_runner(options: LinkOptions, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            options,
            scanner: ModuleScanner::new(),
            planner: CommandPlanner::new(),
            executor: JobExecutor::new(runner),
        }
    }

    /// Scans the root and plans every batch without running anything.
    pub fn plan(&self) -> Result<LinkPlan> {
        let root = &self.options.packages_root;
        info!("Scanning {}...", root.display());
        let scan = self
            .scanner
            .scan_directory(root, self.options.single_package.as_deref())?;

        let builder = GraphBuilder::from_modules(&scan.modules);
        if builder.has_cycles() {
            debug!("Local dependency graph contains a cycle");
        }
        let links = builder.links();
        debug!(
            "{} of {} modules depend on other local modules",
            links.len(),
            scan.modules.len()
        );

        let batches = self.planner.plan(&links);

        Ok(LinkPlan {
            links,
            batches,
            warnings: scan.warnings,
        })
    }

    /// Runs the three batches in order and reports what was linked.
    ///
    /// Unlink and link-as-dependency failures are tolerated and recorded;
    /// a failing link-as-dependee job fails the whole run.
    pub async fn link(&self) -> Result<LinkReport> {
        let plan = self.plan()?;
        let links = plan.active_links();

        if self.options.dry_run {
            return Ok(LinkReport {
                links,
                warnings: plan.warnings,
                batches: Vec::new(),
                dry_run: true,
                planned: PlannedCommand::from_batches(&plan.batches, &self.options.link_tool),
            });
        }

        let batches = self.executor.series(plan.batches).await?;

        Ok(LinkReport {
            links,
            warnings: plan.warnings,
            batches,
            dry_run: false,
            planned: Vec::new(),
        })
    }
}
