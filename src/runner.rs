//! Drives the mirror engine over every configured project.

use std::time::{Duration, Instant};

use tracing::{error, info, info_span};

use crate::config::ProjectSpec;
use crate::error::MirrorError;
use crate::mirror::{MirrorEngine, MirrorStats};
use crate::remote::Connector;

/// Exit status when every project was mirrored.
pub const EXIT_OK: u8 = 0;
/// Exit status when at least one project failed.
pub const EXIT_PROJECT_FAILED: u8 = 2;

#[derive(Debug)]
pub struct ProjectOutcome {
    pub name: String,
    pub result: Result<MirrorStats, MirrorError>,
    pub elapsed: Duration,
}

impl ProjectOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<ProjectOutcome>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&ProjectOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn exit_code(&self) -> u8 {
        if self.all_succeeded() {
            EXIT_OK
        } else {
            EXIT_PROJECT_FAILED
        }
    }
}

/// Mirror each project in order. A failing project is logged and skipped;
/// it never stops the remaining ones.
pub fn run_all<C: Connector>(engine: &MirrorEngine<C>, projects: &[ProjectSpec]) -> RunSummary {
    let mut summary = RunSummary::default();

    for project in projects {
        let span = info_span!("project", project = %project.name);
        let _enter = span.enter();

        let start = Instant::now();
        let result = engine.mirror_project(project);
        let elapsed = start.elapsed();

        match &result {
            Ok(stats) => info!(
                deleted = stats.remote_entries_deleted,
                dirs = stats.dirs_created,
                files = stats.files_uploaded,
                bytes = stats.bytes_uploaded,
                seconds = elapsed.as_secs_f64(),
                "project mirrored"
            ),
            Err(e) => error!(phase = e.phase(), error = %e, "project failed"),
        }

        summary.outcomes.push(ProjectOutcome {
            name: project.name.clone(),
            result,
            elapsed,
        });
    }

    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "run finished"
    );
    summary
}
