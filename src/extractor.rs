//! Statistics extraction for the active core
//!
//! Every metric is a regex probe run independently against each line, so a
//! line may feed more than one field. Core-scoped probes are built from the
//! exact core label; memory controller probes are system-wide.

use crate::error::{Result, StatsError};
use crate::stats::{FuBusy, MemCtrlStats, RunStatistics};
use regex::Regex;

type U64Slot = fn(&mut RunStatistics) -> &mut Option<u64>;
type F64Slot = fn(&mut RunStatistics) -> &mut Option<f64>;
type CtrlU64Slot = fn(&mut MemCtrlStats) -> &mut Option<u64>;
type CtrlF64Slot = fn(&mut MemCtrlStats) -> &mut Option<f64>;

/// Where a scalar probe stores its value
#[derive(Clone, Copy)]
enum ScalarSlot {
    Int(U64Slot),
    Float(F64Slot),
}

/// Where a memory controller probe stores its value
#[derive(Clone, Copy)]
enum CtrlSlot {
    Int(CtrlU64Slot),
    Float(CtrlF64Slot),
}

/// One `<path> <value>` matcher with a single capture group
#[derive(Clone)]
struct ScalarProbe {
    field: &'static str,
    regex: Regex,
    slot: ScalarSlot,
}

/// One `system.mem_ctrlsN.dram.<stat> <value>` matcher
#[derive(Clone)]
struct CtrlProbe {
    field: &'static str,
    regex: Regex,
    slot: CtrlSlot,
}

/// Compiled line matchers for one core
///
/// Build once per core label and reuse; extraction itself holds no state
/// between calls.
#[derive(Clone)]
pub struct StatPatterns {
    core: String,
    scalars: Vec<ScalarProbe>,
    fu_busy: Regex,
    mem_dep: Regex,
    mem_ctrls: Vec<CtrlProbe>,
}

impl std::fmt::Debug for StatPatterns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatPatterns")
            .field("core", &self.core)
            .field("scalars", &self.scalars.len())
            .field("mem_ctrls", &self.mem_ctrls.len())
            .finish()
    }
}

const INT: &str = r"\s+(\d+)";
const FLOAT: &str = r"\s+([\d.]+)";

impl StatPatterns {
    /// Compile the matchers for `core` (e.g. `cpu1`)
    pub fn for_core(core: &str) -> Result<Self> {
        let prefix = format!(r"system\.clusters\.{}\.", regex::escape(core));

        let int = |field: &'static str, path: &str, slot: U64Slot| -> Result<ScalarProbe> {
            Ok(ScalarProbe {
                field,
                regex: Regex::new(&format!("{prefix}{path}{INT}"))?,
                slot: ScalarSlot::Int(slot),
            })
        };
        let float = |field: &'static str, path: &str, slot: F64Slot| -> Result<ScalarProbe> {
            Ok(ScalarProbe {
                field,
                regex: Regex::new(&format!("{prefix}{path}{FLOAT}"))?,
                slot: ScalarSlot::Float(slot),
            })
        };

        let scalars = vec![
            // CPU
            int("numCycles", r"numCycles", |s| &mut s.cpu.num_cycles)?,
            int("instsIssued", r"instsIssued", |s| &mut s.cpu.insts_issued)?,
            int("committedInsts", r"committedInsts", |s| &mut s.cpu.committed_insts)?,
            float("cpi", r"cpi", |s| &mut s.cpu.cpi)?,
            float("ipc", r"ipc", |s| &mut s.cpu.ipc)?,
            // Load/store queue
            int("forwLoads", r"lsq\d+\.forwLoads", |s| &mut s.lsq.forw_loads)?,
            int("squashedLoads", r"lsq\d+\.squashedLoads", |s| &mut s.lsq.squashed_loads)?,
            int("squashedStores", r"lsq\d+\.squashedStores", |s| &mut s.lsq.squashed_stores)?,
            int("ignoredResponses", r"lsq\d+\.ignoredResponses", |s| {
                &mut s.lsq.ignored_responses
            })?,
            int("memOrderViolation", r"lsq\d+\.memOrderViolation", |s| {
                &mut s.lsq.mem_order_violations
            })?,
            int("rescheduledLoads", r"lsq\d+\.rescheduledLoads", |s| {
                &mut s.lsq.rescheduled_loads
            })?,
            int("blockedByCache", r"lsq\d+\.blockedByCache", |s| {
                &mut s.lsq.blocked_by_cache
            })?,
            // L1 data cache
            int("overallHits", r"dcache\.overallHits::total", |s| &mut s.cache.hits)?,
            int("overallMisses", r"dcache\.overallMisses::total", |s| {
                &mut s.cache.misses
            })?,
            float("overallMissRate", r"dcache\.overallMissRate::total", |s| {
                &mut s.cache.miss_rate
            })?,
            float(
                "overallAvgMissLatency",
                r"dcache\.overallAvgMissLatency::total",
                |s| &mut s.cache.avg_miss_latency,
            )?,
            // Branch prediction
            int("BTBLookups", r"branchPred\.BTBLookups", |s| {
                &mut s.branch_pred.btb_lookups
            })?,
            int("BTBHits", r"branchPred\.BTBHits", |s| &mut s.branch_pred.btb_hits)?,
            float("BTBHitRatio", r"branchPred\.BTBHitRatio", |s| {
                &mut s.branch_pred.btb_hit_ratio
            })?,
        ];

        let ctrl_prefix = r"system\.mem_ctrls(\d+)\.dram\.";
        let ctrl_int = |field: &'static str, path: &str, slot: CtrlU64Slot| -> Result<CtrlProbe> {
            Ok(CtrlProbe {
                field,
                regex: Regex::new(&format!("{ctrl_prefix}{path}{INT}"))?,
                slot: CtrlSlot::Int(slot),
            })
        };
        let ctrl_float =
            |field: &'static str, path: &str, slot: CtrlF64Slot| -> Result<CtrlProbe> {
                Ok(CtrlProbe {
                    field,
                    regex: Regex::new(&format!("{ctrl_prefix}{path}{FLOAT}"))?,
                    slot: CtrlSlot::Float(slot),
                })
            };

        let mem_ctrls = vec![
            ctrl_int("bwRead", r"bwRead::total", |c| &mut c.bw_read)?,
            ctrl_int("bwWrite", r"bwWrite::total", |c| &mut c.bw_write)?,
            ctrl_int("readBursts", r"readBursts", |c| &mut c.read_bursts)?,
            ctrl_int("writeBursts", r"writeBursts", |c| &mut c.write_bursts)?,
            ctrl_float("avgQueueLatency", r"avgQueueLatency", |c| {
                &mut c.avg_queue_latency
            })?,
            ctrl_int("accesses", r"accesses::total", |c| &mut c.accesses)?,
        ];

        Ok(Self {
            core: core.to_string(),
            scalars,
            fu_busy: Regex::new(&format!(r"{prefix}statFuBusy::(\w+)\s+(\d+)\s+([\d.]+)%"))?,
            mem_dep: Regex::new(&format!(r"{prefix}MemDepUnit__(\d+)\.(\w+){INT}"))?,
            mem_ctrls,
        })
    }

    /// Core label these matchers were built for
    pub fn core(&self) -> &str {
        &self.core
    }

    /// Scan `lines` once and build the run record
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Result<RunStatistics> {
        let mut stats = RunStatistics::default();
        let mut matched = 0usize;

        for line in lines {
            if self.apply_line(line.as_ref(), &mut stats)? {
                matched += 1;
            }
        }

        stats.mem_ctrls.compute_shares();

        tracing::debug!(
            "Extracted {} stat lines for {} ({} functional units, {} memory controllers)",
            matched,
            self.core,
            stats.fu_busy.len(),
            stats.mem_ctrls.len()
        );
        Ok(stats)
    }

    /// Probe one line against every matcher; true if any matched
    fn apply_line(&self, line: &str, stats: &mut RunStatistics) -> Result<bool> {
        let mut matched = false;

        for probe in &self.scalars {
            if let Some(caps) = probe.regex.captures(line) {
                let text = &caps[1];
                match probe.slot {
                    ScalarSlot::Int(slot) => *slot(stats) = Some(parse_int(probe.field, text)?),
                    ScalarSlot::Float(slot) => {
                        *slot(stats) = Some(parse_float(probe.field, text)?)
                    }
                }
                matched = true;
            }
        }

        if let Some(caps) = self.fu_busy.captures(line) {
            let busy = FuBusy {
                count: parse_int("statFuBusy", &caps[2])?,
                rate: parse_float("statFuBusy", &caps[3])?,
            };
            stats.fu_busy.insert(&caps[1], busy);
            matched = true;
        }

        if let Some(caps) = self.mem_dep.captures(line) {
            let count = parse_int("MemDepUnit", &caps[3])?;
            stats
                .mem_dep
                .entry_or_default(&caps[1])
                .insert(&caps[2], count);
            matched = true;
        }

        for probe in &self.mem_ctrls {
            if let Some(caps) = probe.regex.captures(line) {
                let id: u32 = caps[1].parse().map_err(|_| StatsError::MalformedNumber {
                    field: "mem_ctrls",
                    text: caps[1].to_string(),
                })?;
                let ctrl = stats.mem_ctrls.entry(id);
                match probe.slot {
                    CtrlSlot::Int(slot) => *slot(ctrl) = Some(parse_int(probe.field, &caps[2])?),
                    CtrlSlot::Float(slot) => {
                        *slot(ctrl) = Some(parse_float(probe.field, &caps[2])?)
                    }
                }
                matched = true;
            }
        }

        Ok(matched)
    }
}

fn parse_int(field: &'static str, text: &str) -> Result<u64> {
    text.parse().map_err(|_| StatsError::MalformedNumber {
        field,
        text: text.to_string(),
    })
}

fn parse_float(field: &'static str, text: &str) -> Result<f64> {
    text.parse().map_err(|_| StatsError::MalformedNumber {
        field,
        text: text.to_string(),
    })
}

/// Build the statistics record for `core` from a dump's lines
pub fn extract_statistics<S: AsRef<str>>(lines: &[S], core: &str) -> Result<RunStatistics> {
    StatPatterns::for_core(core)?.extract(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
---------- Begin Simulation Statistics ----------
simSeconds                                   0.000512                       # Number of seconds simulated (Second)
system.clusters.cpu0.numCycles                   1000                       # Number of cpu cycles simulated (Cycle)
system.clusters.cpu1.numCycles                   5000                       # Number of cpu cycles simulated (Cycle)
system.clusters.cpu1.instsIssued                 4200                       # Number of instructions issued (Count)
system.clusters.cpu1.committedInsts              3000                       # Number of instructions committed (Count)
system.clusters.cpu1.cpi                     1.666667                       # CPI: cycles per instruction ((Cycle/Count))
system.clusters.cpu1.ipc                     0.600000                       # IPC: instructions per cycle ((Count/Cycle))
system.clusters.cpu1.lsq0.forwLoads                12                       # Number of loads that had data forwarded from stores (Count)
system.clusters.cpu1.lsq0.squashedLoads            34                       # Number of loads squashed (Count)
system.clusters.cpu1.lsq0.squashedStores            5                       # Number of stores squashed (Count)
system.clusters.cpu1.lsq0.ignoredResponses          0                       # Number of memory responses ignored because the instruction is squashed (Count)
system.clusters.cpu1.lsq0.memOrderViolation         2                       # Number of memory ordering violations (Count)
system.clusters.cpu1.lsq0.rescheduledLoads          1                       # Number of loads that were rescheduled (Count)
system.clusters.cpu1.lsq0.blockedByCache            7                       # Number of times an access to memory failed due to the cache being blocked (Count)
system.clusters.cpu1.statFuBusy::No_OpClass         0      0.00%      0.00% # attempts to use FU when none available (Count)
system.clusters.cpu1.statFuBusy::IntAlu            58     31.52%     31.52% # attempts to use FU when none available (Count)
system.clusters.cpu1.statFuBusy::MemRead          126     68.48%    100.00% # attempts to use FU when none available (Count)
system.clusters.cpu1.dcache.overallHits::total   8800                       # number of overall hits (Count)
system.clusters.cpu1.dcache.overallMisses::total  200                       # number of overall misses (Count)
system.clusters.cpu1.dcache.overallMissRate::total 0.022222                 # miss rate for overall accesses (Ratio)
system.clusters.cpu1.dcache.overallAvgMissLatency::total 81234.5            # average overall miss latency ((Tick/Count))
system.clusters.cpu1.MemDepUnit__0.insertedLoads  900                       # Number of loads inserted to the mem dependence unit. (Count)
system.clusters.cpu1.MemDepUnit__0.insertedStores 400                       # Number of stores inserted to the mem dependence unit. (Count)
system.clusters.cpu1.MemDepUnit__0.conflictingLoads 3                       # Number of conflicting loads. (Count)
system.clusters.cpu1.branchPred.BTBLookups       1500                       # Number of BTB lookups (Count)
system.clusters.cpu1.branchPred.BTBHits          1350                       # Number of BTB hits (Count)
system.clusters.cpu1.branchPred.BTBHitRatio  0.900000                       # BTB Hit Ratio (Ratio)
system.clusters.cpu0.branchPred.BTBLookups         99                       # Number of BTB lookups (Count)
system.mem_ctrls0.dram.bwRead::total              400                       # Total read bandwidth from this memory (Byte/Second)
system.mem_ctrls0.dram.bwWrite::total             100                       # Write bandwidth from this memory (Byte/Second)
system.mem_ctrls0.dram.readBursts                  20                       # Number of DRAM read bursts (Count)
system.mem_ctrls0.dram.writeBursts                  5                       # Number of DRAM write bursts (Count)
system.mem_ctrls0.dram.avgQueueLatency      12.500000                       # Average queueing delay per DRAM burst (Tick)
system.mem_ctrls0.dram.accesses::total             25                       # Number of accesses (Count)
system.mem_ctrls1.dram.bwRead::total              600                       # Total read bandwidth from this memory (Byte/Second)
system.mem_ctrls1.dram.bwWrite::total             300                       # Write bandwidth from this memory (Byte/Second)
---------- End Simulation Statistics   ----------
";

    fn sample_lines() -> Vec<&'static str> {
        SAMPLE.lines().collect()
    }

    #[test]
    fn test_cpu_scalars() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        assert_eq!(stats.cpu.num_cycles, Some(5000));
        assert_eq!(stats.cpu.insts_issued, Some(4200));
        assert_eq!(stats.cpu.committed_insts, Some(3000));
        assert_eq!(stats.cpu.cpi, Some(1.666667));
        assert_eq!(stats.cpu.ipc, Some(0.6));
    }

    #[test]
    fn test_other_core_lines_ignored() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        assert_eq!(stats.branch_pred.btb_lookups, Some(1500));

        let idle = extract_statistics(&sample_lines(), "cpu0").unwrap();
        assert_eq!(idle.cpu.num_cycles, Some(1000));
        assert_eq!(idle.branch_pred.btb_lookups, Some(99));
        assert_eq!(idle.cpu.committed_insts, None);
        assert!(idle.fu_busy.is_empty());
    }

    #[test]
    fn test_core_label_is_not_a_prefix_match() {
        let lines = [
            "system.clusters.cpu10.numCycles 777",
            "system.clusters.cpu1.numCycles 5",
        ];
        let stats = extract_statistics(&lines, "cpu1").unwrap();
        assert_eq!(stats.cpu.num_cycles, Some(5));
    }

    #[test]
    fn test_lsq_counters() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        assert_eq!(stats.lsq.forw_loads, Some(12));
        assert_eq!(stats.lsq.squashed_loads, Some(34));
        assert_eq!(stats.lsq.squashed_stores, Some(5));
        assert_eq!(stats.lsq.ignored_responses, Some(0));
        assert_eq!(stats.lsq.mem_order_violations, Some(2));
        assert_eq!(stats.lsq.rescheduled_loads, Some(1));
        assert_eq!(stats.lsq.blocked_by_cache, Some(7));
    }

    #[test]
    fn test_fu_busy_table() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        let units: Vec<&str> = stats.fu_busy.keys().collect();
        assert_eq!(units, vec!["No_OpClass", "IntAlu", "MemRead"]);
        assert_eq!(
            stats.fu_busy.get("MemRead"),
            Some(&FuBusy {
                count: 126,
                rate: 68.48
            })
        );
        assert_eq!(stats.fu_busy.get("No_OpClass").unwrap().count, 0);
    }

    #[test]
    fn test_fu_busy_update_keeps_position() {
        let lines = [
            "system.clusters.cpu0.statFuBusy::IntAlu 5 50.00%",
            "system.clusters.cpu0.statFuBusy::MemRead 5 50.00%",
            "system.clusters.cpu0.statFuBusy::IntAlu 9 90.00%",
        ];
        let stats = extract_statistics(&lines, "cpu0").unwrap();
        let units: Vec<&str> = stats.fu_busy.keys().collect();
        assert_eq!(units, vec!["IntAlu", "MemRead"]);
        assert_eq!(stats.fu_busy.get("IntAlu").unwrap().count, 9);
        assert_eq!(stats.fu_busy.get("IntAlu").unwrap().rate, 90.0);
    }

    #[test]
    fn test_cache_counters() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        assert_eq!(stats.cache.hits, Some(8800));
        assert_eq!(stats.cache.misses, Some(200));
        assert_eq!(stats.cache.miss_rate, Some(0.022222));
        assert_eq!(stats.cache.avg_miss_latency, Some(81234.5));
    }

    #[test]
    fn test_mem_dep_table() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        let unit = stats.mem_dep.get("0").unwrap();
        let events: Vec<&str> = unit.keys().collect();
        assert_eq!(
            events,
            vec!["insertedLoads", "insertedStores", "conflictingLoads"]
        );
        assert_eq!(unit.get("insertedStores"), Some(&400));
    }

    #[test]
    fn test_branch_prediction() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        assert_eq!(stats.branch_pred.btb_lookups, Some(1500));
        assert_eq!(stats.branch_pred.btb_hits, Some(1350));
        assert_eq!(stats.branch_pred.btb_hit_ratio, Some(0.9));
    }

    #[test]
    fn test_memory_controllers_and_shares() {
        let stats = extract_statistics(&sample_lines(), "cpu1").unwrap();
        assert_eq!(stats.mem_ctrls.len(), 2);

        let ctrl0 = stats.mem_ctrls.get(0).unwrap();
        assert_eq!(ctrl0.bw_read, Some(400));
        assert_eq!(ctrl0.bw_write, Some(100));
        assert_eq!(ctrl0.read_bursts, Some(20));
        assert_eq!(ctrl0.write_bursts, Some(5));
        assert_eq!(ctrl0.avg_queue_latency, Some(12.5));
        assert_eq!(ctrl0.accesses, Some(25));
        assert_eq!(ctrl0.read_share, 40.0);
        assert_eq!(ctrl0.write_share, 25.0);

        let ctrl1 = stats.mem_ctrls.get(1).unwrap();
        assert_eq!(ctrl1.read_share, 60.0);
        assert_eq!(ctrl1.write_share, 75.0);
        assert_eq!(ctrl1.read_bursts, None);
    }

    #[test]
    fn test_memory_controllers_ignore_active_core() {
        let lines = [
            "system.mem_ctrls0.dram.bwRead::total 400",
            "system.mem_ctrls1.dram.bwRead::total 600",
        ];
        let stats = extract_statistics(&lines, "cpu7").unwrap();
        assert_eq!(stats.mem_ctrls.get(0).unwrap().read_share, 40.0);
        assert_eq!(stats.mem_ctrls.get(1).unwrap().read_share, 60.0);
    }

    #[test]
    fn test_no_matches_is_valid_empty_record() {
        let lines = ["simSeconds 0.1", "hostSeconds 2.3"];
        let stats = extract_statistics(&lines, "cpu0").unwrap();
        assert_eq!(stats, RunStatistics::default());
    }

    #[test]
    fn test_zero_is_not_absent() {
        let lines = ["system.clusters.cpu0.instsIssued 0"];
        let stats = extract_statistics(&lines, "cpu0").unwrap();
        assert_eq!(stats.cpu.insts_issued, Some(0));
        assert_eq!(stats.cpu.num_cycles, None);
    }

    #[test]
    fn test_nan_ratio_is_absent() {
        let lines = ["system.clusters.cpu0.cpi nan"];
        let stats = extract_statistics(&lines, "cpu0").unwrap();
        assert_eq!(stats.cpu.cpi, None);
    }

    #[test]
    fn test_malformed_float_is_fatal() {
        let lines = ["system.clusters.cpu0.ipc 1.2.3"];
        let result = extract_statistics(&lines, "cpu0");
        assert!(matches!(
            result,
            Err(StatsError::MalformedNumber { field: "ipc", .. })
        ));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let patterns = StatPatterns::for_core("cpu1").unwrap();
        let first = patterns.extract(&sample_lines()).unwrap();
        let second = patterns.extract(&sample_lines()).unwrap();
        assert_eq!(first, second);
        assert_eq!(patterns.core(), "cpu1");
    }

    #[test]
    fn test_core_label_is_escaped() {
        // A label with regex metacharacters must not blow up compilation
        let patterns = StatPatterns::for_core("cpu(1)").unwrap();
        let stats = patterns
            .extract(&["system.clusters.cpu(1).numCycles 3"])
            .unwrap();
        assert_eq!(stats.cpu.num_cycles, Some(3));
    }
}
