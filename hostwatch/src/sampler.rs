//! Per-process CPU accounting across refresh cycles.
//!
//! The host only exposes cumulative CPU time per process. Percentages are
//! derived from the difference between two consecutive observations of the
//! same process, so each process needs one baseline carried between cycles.

use log::debug;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::types::ProcessSample;

/// One process as listed by the host in the current cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessObservation {
    pub pid: u32,
    pub name: String,
    /// Seconds since epoch the process started; distinguishes reused pids.
    pub start_time: u64,
    /// Accumulated CPU time in milliseconds, `None` when it could not be read
    /// (process exited mid-query, access denied).
    pub cpu_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    start_time: u64,
    cpu_time_ms: u64,
    taken_at: Instant,
}

#[derive(Debug, Default)]
pub struct ProcessSampler {
    baselines: HashMap<u32, Baseline>,
}

impl ProcessSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce one sample per readable process and roll baselines forward.
    ///
    /// Pids missing from `observed` are evicted before returning.
    pub fn sample(&mut self, observed: &[ProcessObservation], now: Instant) -> Vec<ProcessSample> {
        let mut live = HashSet::with_capacity(observed.len());
        let mut samples = Vec::with_capacity(observed.len());

        for proc in observed {
            let Some(cpu_time_ms) = proc.cpu_time_ms else {
                continue;
            };
            live.insert(proc.pid);

            let baseline = Baseline {
                start_time: proc.start_time,
                cpu_time_ms,
                taken_at: now,
            };
            let cpu_percent = match self.baselines.insert(proc.pid, baseline) {
                // Same pid, different process: the old baseline belongs to a dead one.
                Some(prev) if prev.start_time == proc.start_time => cpu_delta_percent(&prev, &baseline),
                _ => 0.0,
            };

            samples.push(ProcessSample {
                pid: proc.pid,
                name: proc.name.clone(),
                cpu_percent,
            });
        }

        let before = self.baselines.len();
        self.baselines.retain(|pid, _| live.contains(pid));
        let evicted = before - self.baselines.len();
        if evicted > 0 {
            debug!("[sampler] evicted {evicted} stale baselines");
        }

        samples
    }

    pub fn tracked(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_tracking(&self, pid: u32) -> bool {
        self.baselines.contains_key(&pid)
    }
}

fn cpu_delta_percent(prev: &Baseline, cur: &Baseline) -> f32 {
    let wall_ms = cur.taken_at.saturating_duration_since(prev.taken_at).as_millis();
    if wall_ms == 0 {
        return 0.0;
    }
    let cpu_ms = cur.cpu_time_ms.saturating_sub(prev.cpu_time_ms);
    (cpu_ms as f64 / wall_ms as f64 * 100.0) as f32
}

/// The `k` highest-CPU samples, ties kept in input order.
pub fn top_by_cpu(mut samples: Vec<ProcessSample>, k: usize) -> Vec<ProcessSample> {
    samples.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    samples.truncate(k);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn obs(pid: u32, name: &str, cpu_time_ms: u64) -> ProcessObservation {
        ProcessObservation {
            pid,
            name: name.to_string(),
            start_time: 1_000,
            cpu_time_ms: Some(cpu_time_ms),
        }
    }

    #[test]
    fn first_observation_is_zero() {
        let mut sampler = ProcessSampler::new();
        let samples = sampler.sample(&[obs(1, "init", 50_000)], Instant::now());
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].cpu_percent, 0.0);
        assert!(sampler.is_tracking(1));
    }

    #[test]
    fn delta_since_previous_cycle() {
        let mut sampler = ProcessSampler::new();
        let t0 = Instant::now();
        sampler.sample(&[obs(7, "worker", 1_000)], t0);

        let t1 = t0 + Duration::from_secs(1);
        let samples = sampler.sample(&[obs(7, "worker", 1_500)], t1);
        assert!((samples[0].cpu_percent - 50.0).abs() < 0.01);
    }

    #[test]
    fn idle_process_trends_to_zero() {
        let mut sampler = ProcessSampler::new();
        let t0 = Instant::now();
        sampler.sample(&[obs(7, "sleeper", 9_000)], t0);
        sampler.sample(&[obs(7, "sleeper", 9_400)], t0 + Duration::from_secs(1));
        let samples = sampler.sample(&[obs(7, "sleeper", 9_400)], t0 + Duration::from_secs(2));
        assert_eq!(samples[0].cpu_percent, 0.0);
    }

    #[test]
    fn absent_pid_is_evicted() {
        let mut sampler = ProcessSampler::new();
        let t0 = Instant::now();
        sampler.sample(&[obs(1, "a", 10), obs(2, "b", 10)], t0);
        assert_eq!(sampler.tracked(), 2);

        let samples = sampler.sample(&[obs(1, "a", 20)], t0 + Duration::from_secs(1));
        assert_eq!(samples.len(), 1);
        assert!(!sampler.is_tracking(2));
        assert_eq!(sampler.tracked(), 1);
    }

    #[test]
    fn unreadable_process_is_skipped() {
        let mut sampler = ProcessSampler::new();
        let denied = ProcessObservation {
            cpu_time_ms: None,
            ..obs(3, "secret", 0)
        };
        let samples = sampler.sample(&[obs(1, "a", 10), denied], Instant::now());
        assert_eq!(samples.len(), 1);
        assert!(!sampler.is_tracking(3));
    }

    #[test]
    fn reused_pid_starts_fresh() {
        let mut sampler = ProcessSampler::new();
        let t0 = Instant::now();
        sampler.sample(&[obs(42, "old", 100)], t0);

        let reborn = ProcessObservation {
            start_time: 2_000,
            ..obs(42, "new", 90_000)
        };
        let samples = sampler.sample(&[reborn], t0 + Duration::from_secs(1));
        assert_eq!(samples[0].cpu_percent, 0.0);
        assert_eq!(samples[0].name, "new");
    }

    #[test]
    fn top_three_is_stable() {
        let sample = |pid, cpu| ProcessSample {
            pid,
            name: format!("p{pid}"),
            cpu_percent: cpu,
        };
        let top = top_by_cpu(
            vec![
                sample(1, 5.0),
                sample(2, 40.0),
                sample(3, 12.0),
                sample(4, 40.0),
                sample(5, 1.0),
            ],
            3,
        );
        let pids: Vec<u32> = top.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![2, 4, 3]);
    }
}
