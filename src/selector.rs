//! Active core selection
//!
//! A gem5 run with several cores usually has one that did the real work while
//! the rest idled. The active core is the one with the most cycles, ties
//! broken by committed instructions.

use crate::error::{Result, StatsError};
use regex::Regex;
use serde::Serialize;

/// Cycle and committed instruction counts seen for one core
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreCandidate {
    /// Core label as it appears in the dump, e.g. `cpu3`
    pub core: String,
    pub cycles: u64,
    pub committed_insts: u64,
}

impl CoreCandidate {
    fn new(core: &str) -> Self {
        Self {
            core: core.to_string(),
            cycles: 0,
            committed_insts: 0,
        }
    }

    /// Selection key: cycles first, then committed instructions
    fn key(&self) -> (u64, u64) {
        (self.cycles, self.committed_insts)
    }
}

/// The core picked for detailed reporting
pub type ActiveCore = CoreCandidate;

/// Line matchers for per-core cycle and committed instruction counts
#[derive(Debug, Clone)]
pub struct CoreProbes {
    cycles: Regex,
    committed: Regex,
}

impl CoreProbes {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cycles: Regex::new(r"system\.clusters\.(cpu\d+)\.numCycles\s+(\d+)")?,
            committed: Regex::new(r"system\.clusters\.(cpu\d+)\.committedInsts\s+(\d+)")?,
        })
    }
}

/// Collect one candidate per core, in first-seen order
///
/// Repeated lines overwrite earlier values for the same core and metric.
pub fn collect_candidates<S: AsRef<str>>(lines: &[S]) -> Result<Vec<CoreCandidate>> {
    let probes = CoreProbes::new()?;
    let mut candidates: Vec<CoreCandidate> = Vec::new();

    for line in lines {
        let line = line.as_ref();

        if let Some(caps) = probes.cycles.captures(line) {
            let cycles = parse_count("numCycles", &caps[2])?;
            candidate_for(&mut candidates, &caps[1]).cycles = cycles;
        }

        if let Some(caps) = probes.committed.captures(line) {
            let committed = parse_count("committedInsts", &caps[2])?;
            candidate_for(&mut candidates, &caps[1]).committed_insts = committed;
        }
    }

    Ok(candidates)
}

fn candidate_for<'a>(candidates: &'a mut Vec<CoreCandidate>, core: &str) -> &'a mut CoreCandidate {
    let index = match candidates.iter().position(|c| c.core == core) {
        Some(index) => index,
        None => {
            candidates.push(CoreCandidate::new(core));
            candidates.len() - 1
        }
    };
    &mut candidates[index]
}

fn parse_count(field: &'static str, text: &str) -> Result<u64> {
    text.parse().map_err(|_| StatsError::MalformedNumber {
        field,
        text: text.to_string(),
    })
}

/// Pick the active core of a dump
///
/// Among candidates with identical (cycles, committed) keys the one seen
/// first in the dump wins.
pub fn find_active_core<S: AsRef<str>>(lines: &[S]) -> Result<ActiveCore> {
    let candidates = collect_candidates(lines)?;

    let mut best: Option<CoreCandidate> = None;
    for candidate in candidates {
        let better = match &best {
            None => true,
            Some(current) => candidate.key() > current.key(),
        };
        if better {
            best = Some(candidate);
        }
    }

    let active = best.ok_or(StatsError::NoActiveCoreFound)?;
    tracing::debug!(
        "Active CPU is {} with {} cycles and {} committed instructions",
        active.core,
        active.cycles,
        active.committed_insts
    );
    Ok(active)
}

/// Identifier of the active core, e.g. `cpu1`
pub fn select_active_core<S: AsRef<str>>(lines: &[S]) -> Result<String> {
    find_active_core(lines).map(|active| active.core)
}
