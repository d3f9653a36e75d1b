//! Per-run statistics records
//!
//! Every scalar counter is an `Option`: `None` means the dump never reported
//! it, which is different from a reported zero.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Headline CPU counters for the active core
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuStats {
    pub num_cycles: Option<u64>,
    pub insts_issued: Option<u64>,
    pub committed_insts: Option<u64>,
    pub cpi: Option<f64>,
    pub ipc: Option<f64>,
}

/// Load/store queue counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LsqStats {
    pub forw_loads: Option<u64>,
    pub squashed_loads: Option<u64>,
    pub squashed_stores: Option<u64>,
    pub ignored_responses: Option<u64>,
    pub mem_order_violations: Option<u64>,
    pub rescheduled_loads: Option<u64>,
    pub blocked_by_cache: Option<u64>,
}

/// One `statFuBusy::<unit>` entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuBusy {
    /// Cycles the unit was busy when an instruction wanted it
    pub count: u64,
    /// Share of all busy events, in percent
    pub rate: f64,
}

/// L1 data cache counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: Option<u64>,
    pub misses: Option<u64>,
    pub miss_rate: Option<f64>,
    pub avg_miss_latency: Option<f64>,
}

/// Branch target buffer counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BranchPredStats {
    pub btb_lookups: Option<u64>,
    pub btb_hits: Option<u64>,
    pub btb_hit_ratio: Option<f64>,
}

/// DRAM counters for one memory controller
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemCtrlStats {
    /// Read bandwidth (bytes/s)
    pub bw_read: Option<u64>,
    /// Write bandwidth (bytes/s)
    pub bw_write: Option<u64>,
    pub read_bursts: Option<u64>,
    pub write_bursts: Option<u64>,
    pub avg_queue_latency: Option<f64>,
    pub accesses: Option<u64>,
    /// This controller's percentage of the run's total read bandwidth
    pub read_share: f64,
    /// This controller's percentage of the run's total write bandwidth
    pub write_share: f64,
}

/// String-keyed table that remembers first-seen key order
///
/// Re-inserting a key replaces its value without moving it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedTable<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value for `key`
    pub fn insert(&mut self, key: &str, value: V) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Mutable access to the value for `key`, inserting a default first
    pub fn entry_or_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let index = match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for OrderedTable<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Functional unit name -> busy entry
pub type FuBusyTable = OrderedTable<FuBusy>;

/// Memory dependence unit id -> (event name -> count)
pub type MemDepTable = OrderedTable<OrderedTable<u64>>;

/// Summed bandwidth across every controller in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandwidthTotals {
    pub read: u128,
    pub write: u128,
}

/// Memory controller id -> DRAM counters, ordered by id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MemCtrlTable {
    ctrls: BTreeMap<u32, MemCtrlStats>,
}

impl MemCtrlTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entry(&mut self, id: u32) -> &mut MemCtrlStats {
        self.ctrls.entry(id).or_default()
    }

    pub fn get(&self, id: u32) -> Option<&MemCtrlStats> {
        self.ctrls.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ctrls.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &MemCtrlStats)> {
        self.ctrls.iter().map(|(id, ctrl)| (*id, ctrl))
    }

    pub fn len(&self) -> usize {
        self.ctrls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctrls.is_empty()
    }

    /// Sum read and write bandwidth; controllers without a reading add nothing
    pub fn totals(&self) -> BandwidthTotals {
        self.ctrls.values().fold(
            BandwidthTotals { read: 0, write: 0 },
            |acc, ctrl| BandwidthTotals {
                read: acc.read + u128::from(ctrl.bw_read.unwrap_or(0)),
                write: acc.write + u128::from(ctrl.bw_write.unwrap_or(0)),
            },
        )
    }

    /// Fill in `read_share` / `write_share` for every controller
    pub(crate) fn compute_shares(&mut self) {
        let totals = self.totals();
        for ctrl in self.ctrls.values_mut() {
            ctrl.read_share = share_percent(ctrl.bw_read.unwrap_or(0), totals.read);
            ctrl.write_share = share_percent(ctrl.bw_write.unwrap_or(0), totals.write);
        }
    }
}

/// `part` as a percentage of `total`, 0.0 when the total is zero
pub fn share_percent(part: u64, total: u128) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 * 100.0) / total as f64
    }
}

/// Everything extracted from one dump for its active core
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    pub cpu: CpuStats,
    pub lsq: LsqStats,
    pub fu_busy: FuBusyTable,
    pub cache: CacheStats,
    pub mem_dep: MemDepTable,
    pub branch_pred: BranchPredStats,
    pub mem_ctrls: MemCtrlTable,
}
