//! Side-by-side comparison tables
//!
//! Every category renders to the same [`ComparisonTable`] shape whether one
//! run or several are shown. Cells a run cannot fill are `None` and become
//! the "not available" marker at render time.

use crate::config::ReportConfig;
use crate::stats::{FuBusy, MemCtrlStats, RunStatistics};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Statistic category selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Cycles, instructions, CPI and IPC
    Cpu,
    /// Load/store queue counters
    Lsq,
    /// Functional unit busy counts
    Fu,
    /// L1 data cache hits, misses and latency
    Cache,
    /// Memory dependence unit events
    #[value(alias = "mem_dep")]
    MemDep,
    /// Branch target buffer counters
    Bp,
    /// Headline counters of memory controller 0
    #[value(alias = "mem_ctrl")]
    MemCtrl,
    /// Bandwidth balance across all memory controllers
    #[value(alias = "mem_ctrl_balance")]
    MemCtrlBalance,
}

impl Category {
    pub fn title(self) -> &'static str {
        match self {
            Category::Cpu => "CPU Statistics",
            Category::Lsq => "Load/Store Queue Statistics",
            Category::Fu => "Functional Unit Busy Stats",
            Category::Cache => "Cache Stats",
            Category::MemDep => "Memory Dependency Unit Stats",
            Category::Bp => "Branch Prediction Stats",
            Category::MemCtrl => "Memory Controller Stats",
            Category::MemCtrlBalance => "Memory Controller Balance Stats",
        }
    }
}

/// A value, or `None` when the run never reported it
pub type Cell = Option<String>;

/// One table row: label columns followed by value cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub labels: Vec<String>,
    pub cells: Vec<Cell>,
}

/// A rendered-agnostic table for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub title: String,
    pub label_headers: Vec<String>,
    pub value_headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl ComparisonTable {
    /// Every header, label columns first
    pub fn headers(&self) -> Vec<&str> {
        self.label_headers
            .iter()
            .chain(self.value_headers.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn width(&self) -> usize {
        self.label_headers.len() + self.value_headers.len()
    }

    /// Rows with missing cells replaced by `marker`
    pub fn display_rows(&self, marker: &str) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.labels
                    .iter()
                    .cloned()
                    .chain(
                        row.cells
                            .iter()
                            .map(|cell| cell.clone().unwrap_or_else(|| marker.to_string())),
                    )
                    .collect()
            })
            .collect()
    }
}

/// A labelled run to place in a table column
#[derive(Debug, Clone, Copy)]
pub struct RunColumn<'a> {
    pub label: &'a str,
    pub stats: &'a RunStatistics,
}

type ScalarGetter = fn(&RunStatistics) -> Cell;

fn int(value: Option<u64>) -> Cell {
    value.map(|v| v.to_string())
}

fn float(value: Option<f64>) -> Cell {
    value.map(|v| v.to_string())
}

fn percent(value: f64, precision: usize) -> String {
    format!("{:.*}%", precision, value)
}

const CPU_METRICS: &[(&str, ScalarGetter)] = &[
    ("Cycles", |s| int(s.cpu.num_cycles)),
    ("Instructions Issued", |s| int(s.cpu.insts_issued)),
    ("Instructions Committed", |s| int(s.cpu.committed_insts)),
    ("CPI", |s| float(s.cpu.cpi)),
    ("IPC", |s| float(s.cpu.ipc)),
];

const LSQ_METRICS: &[(&str, ScalarGetter)] = &[
    ("Forwarded Loads", |s| int(s.lsq.forw_loads)),
    ("Squashed Loads", |s| int(s.lsq.squashed_loads)),
    ("Squashed Stores", |s| int(s.lsq.squashed_stores)),
    ("Ignored Responses", |s| int(s.lsq.ignored_responses)),
    ("Memory Order Violations", |s| int(s.lsq.mem_order_violations)),
    ("Rescheduled Loads", |s| int(s.lsq.rescheduled_loads)),
    ("Blocked By Cache", |s| int(s.lsq.blocked_by_cache)),
];

const CACHE_METRICS: &[(&str, ScalarGetter)] = &[
    ("Cache Hits", |s| int(s.cache.hits)),
    ("Cache Misses", |s| int(s.cache.misses)),
    ("Cache Miss Rate", |s| float(s.cache.miss_rate)),
    ("Cache Miss Latency", |s| float(s.cache.avg_miss_latency)),
];

const BP_METRICS: &[(&str, ScalarGetter)] = &[
    ("BTB Lookups", |s| int(s.branch_pred.btb_lookups)),
    ("BTB Hits", |s| int(s.branch_pred.btb_hits)),
    ("BTB Hit Ratio", |s| float(s.branch_pred.btb_hit_ratio)),
];

const MEM_CTRL_METRICS: &[(&str, ScalarGetter)] = &[
    ("Read Bandwidth (Bytes/s)", |s| {
        s.mem_ctrls.get(0).and_then(|c| int(c.bw_read))
    }),
    ("Write Bandwidth (Bytes/s)", |s| {
        s.mem_ctrls.get(0).and_then(|c| int(c.bw_write))
    }),
    ("Read Bursts", |s| {
        s.mem_ctrls.get(0).and_then(|c| int(c.read_bursts))
    }),
    ("Write Bursts", |s| {
        s.mem_ctrls.get(0).and_then(|c| int(c.write_bursts))
    }),
];

const BALANCE_FIELDS: &[&str] = &[
    "Read Bandwidth (Bytes/s)",
    "Write Bandwidth (Bytes/s)",
    "Read Bursts",
    "Write Bursts",
    "Queue Latency",
    "Total Accesses",
    "Read % Share",
    "Write % Share",
];

/// Value headers for `fields` across `runs`
///
/// A single run keeps the bare field names; several runs get one column per
/// (field, run) pair, grouped by field so the runs sit next to each other.
fn value_headers(fields: &[&str], runs: &[RunColumn<'_>]) -> Vec<String> {
    if runs.len() == 1 {
        return fields.iter().map(|f| f.to_string()).collect();
    }
    fields
        .iter()
        .flat_map(|field| runs.iter().map(move |run| format!("{} [{}]", field, run.label)))
        .collect()
}

/// Regroup per-run cell lists (run-major) into field-major order
fn interleave(per_run: Vec<Vec<Cell>>, field_count: usize) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(per_run.len() * field_count);
    for field in 0..field_count {
        for run_cells in &per_run {
            cells.push(run_cells.get(field).cloned().flatten());
        }
    }
    cells
}

fn scalar_table(
    category: Category,
    metrics: &[(&str, ScalarGetter)],
    runs: &[RunColumn<'_>],
) -> ComparisonTable {
    let value_headers = if runs.len() == 1 {
        vec!["Value".to_string()]
    } else {
        runs.iter().map(|run| run.label.to_string()).collect()
    };

    let rows = metrics
        .iter()
        .map(|(name, getter)| Row {
            labels: vec![name.to_string()],
            cells: runs.iter().map(|run| getter(run.stats)).collect(),
        })
        .collect();

    ComparisonTable {
        title: category.title().to_string(),
        label_headers: vec!["Metric".to_string()],
        value_headers,
        rows,
    }
}

/// Union of keys in first-seen order: first run's order, then new keys from later runs
fn union_in_order<'a, I>(key_lists: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = &'a str>,
{
    let mut keys: Vec<String> = Vec::new();
    for list in key_lists {
        for key in list {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

fn fu_cells(busy: Option<&FuBusy>) -> Vec<Cell> {
    match busy {
        Some(busy) => vec![Some(busy.count.to_string()), Some(format!("{}%", busy.rate))],
        None => vec![None, None],
    }
}

fn fu_table(runs: &[RunColumn<'_>]) -> ComparisonTable {
    let fields = ["Busy Count", "Busy Rate"];
    let units = union_in_order(runs.iter().map(|run| run.stats.fu_busy.keys()));

    let rows = units
        .into_iter()
        .map(|unit| {
            let per_run = runs
                .iter()
                .map(|run| fu_cells(run.stats.fu_busy.get(&unit)))
                .collect();
            Row {
                cells: interleave(per_run, fields.len()),
                labels: vec![unit],
            }
        })
        .collect();

    ComparisonTable {
        title: Category::Fu.title().to_string(),
        label_headers: vec!["Functional Unit".to_string()],
        value_headers: value_headers(&fields, runs),
        rows,
    }
}

fn mem_dep_table(runs: &[RunColumn<'_>]) -> ComparisonTable {
    let units = union_in_order(runs.iter().map(|run| run.stats.mem_dep.keys()));

    let mut rows = Vec::new();
    for unit in units {
        let events = union_in_order(
            runs.iter()
                .filter_map(|run| run.stats.mem_dep.get(&unit))
                .map(|table| table.keys()),
        );
        for event in events {
            let cells = runs
                .iter()
                .map(|run| {
                    run.stats
                        .mem_dep
                        .get(&unit)
                        .and_then(|table| table.get(&event))
                        .map(|count| count.to_string())
                })
                .collect();
            rows.push(Row {
                labels: vec![format!("MemDepUnit__{}", unit), event],
                cells,
            });
        }
    }

    ComparisonTable {
        title: Category::MemDep.title().to_string(),
        label_headers: vec!["Unit".to_string(), "Event".to_string()],
        value_headers: value_headers(&["Count"], runs),
        rows,
    }
}

fn balance_cells(ctrl: Option<&MemCtrlStats>, precision: usize) -> Vec<Cell> {
    match ctrl {
        Some(ctrl) => vec![
            int(ctrl.bw_read),
            int(ctrl.bw_write),
            int(ctrl.read_bursts),
            int(ctrl.write_bursts),
            float(ctrl.avg_queue_latency),
            int(ctrl.accesses),
            Some(percent(ctrl.read_share, precision)),
            Some(percent(ctrl.write_share, precision)),
        ],
        None => vec![None; BALANCE_FIELDS.len()],
    }
}

fn balance_table(runs: &[RunColumn<'_>], precision: usize) -> ComparisonTable {
    let mut ids: Vec<u32> = runs.iter().flat_map(|run| run.stats.mem_ctrls.ids()).collect();
    ids.sort_unstable();
    ids.dedup();

    let rows = ids
        .into_iter()
        .map(|id| {
            let per_run = runs
                .iter()
                .map(|run| balance_cells(run.stats.mem_ctrls.get(id), precision))
                .collect();
            Row {
                labels: vec![format!("Memory Controller {}", id)],
                cells: interleave(per_run, BALANCE_FIELDS.len()),
            }
        })
        .collect();

    ComparisonTable {
        title: Category::MemCtrlBalance.title().to_string(),
        label_headers: vec!["Memory Controller".to_string()],
        value_headers: value_headers(BALANCE_FIELDS, runs),
        rows,
    }
}

/// Build the `category` table for one or more runs
pub fn build_table(
    category: Category,
    runs: &[RunColumn<'_>],
    config: &ReportConfig,
) -> ComparisonTable {
    match category {
        Category::Cpu => scalar_table(category, CPU_METRICS, runs),
        Category::Lsq => scalar_table(category, LSQ_METRICS, runs),
        Category::Fu => fu_table(runs),
        Category::Cache => scalar_table(category, CACHE_METRICS, runs),
        Category::MemDep => mem_dep_table(runs),
        Category::Bp => scalar_table(category, BP_METRICS, runs),
        Category::MemCtrl => scalar_table(category, MEM_CTRL_METRICS, runs),
        Category::MemCtrlBalance => balance_table(runs, config.share_precision),
    }
}
