//! Per-file analysis pipeline
//!
//! load -> select active core -> extract, once per dump. Dumps share no
//! state, so they can run on separate threads; results always come back in
//! input order.

use crate::dump::{label_for, StatDump};
use crate::error::Result;
use crate::extractor::StatPatterns;
use crate::selector::{find_active_core, ActiveCore};
use crate::stats::RunStatistics;
use serde::Serialize;
use std::panic;
use std::path::{Path, PathBuf};
use std::thread;

/// Everything known about one analyzed dump
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub label: String,
    pub active_core: ActiveCore,
    pub stats: RunStatistics,
}

/// Outcome for one input path
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub label: String,
    pub result: Result<RunReport>,
}

/// Analyze a dump already in memory
pub fn analyze_dump(dump: &StatDump) -> Result<RunReport> {
    let active_core = find_active_core(dump.lines())?;
    let stats = StatPatterns::for_core(&active_core.core)?.extract(dump.lines())?;

    Ok(RunReport {
        label: dump.label(),
        active_core,
        stats,
    })
}

/// Read and analyze one dump
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<RunReport> {
    let dump = StatDump::from_file(path)?;
    analyze_dump(&dump)
}

fn outcome_for(path: &Path) -> FileOutcome {
    let result = analyze_file(path);
    match &result {
        Ok(report) => tracing::info!(
            "{}: active core {} ({} cycles, {} committed)",
            report.label,
            report.active_core.core,
            report.active_core.cycles,
            report.active_core.committed_insts
        ),
        Err(e) => tracing::warn!("{}: {}", path.display(), e),
    }
    FileOutcome {
        path: path.to_path_buf(),
        label: label_for(path),
        result,
    }
}

/// Analyze every path, keeping input order
///
/// A failure in one file is recorded in its outcome and does not stop the
/// others.
pub fn analyze_files<P: AsRef<Path> + Sync>(paths: &[P], parallel: bool) -> Vec<FileOutcome> {
    if !parallel || paths.len() < 2 {
        return paths.iter().map(|p| outcome_for(p.as_ref())).collect();
    }

    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|p| scope.spawn(move || outcome_for(p.as_ref())))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    })
}
