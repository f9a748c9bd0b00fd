use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Default, Clone)]
struct OpStats {
    total: f64,
    count: u64,
    min: f64,
    max: f64,
    samples: Vec<f64>,
}

impl OpStats {
    fn add(&mut self, secs: f64) {
        if self.count == 0 {
            self.min = secs;
            self.max = secs;
        } else {
            self.min = self.min.min(secs);
            self.max = self.max.max(secs);
        }
        self.total += secs;
        self.count += 1;
        self.samples.push(secs);
    }
}

/// Per-operation wall-clock timing for an optimization run.
///
/// A disabled profiler does no bookkeeping at all: `time` just calls the
/// closure and the mark methods return immediately.
pub struct Profiler {
    enabled: bool,
    ops: HashMap<String, OpStats>,
    open: HashMap<String, Instant>,
    run_start: Option<Instant>,
    setup_done: Option<Instant>,
    run_end: Option<Instant>,
    best_at: Option<Instant>,
    best_generation: usize,
}

impl Profiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ops: HashMap::new(),
            open: HashMap::new(),
            run_start: None,
            setup_done: None,
            run_end: None,
            best_at: None,
            best_generation: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_optimization(&mut self) {
        if self.enabled {
            self.run_start = Some(Instant::now());
            debug!("profiler: optimization started");
        }
    }

    pub fn mark_setup_complete(&mut self) {
        if self.enabled {
            self.setup_done = Some(Instant::now());
        }
    }

    pub fn mark_best_solution(&mut self, generation: usize) {
        if self.enabled {
            self.best_at = Some(Instant::now());
            self.best_generation = generation;
            debug!("profiler: best solution at generation {generation}");
        }
    }

    pub fn end_optimization(&mut self) {
        if self.enabled {
            self.run_end = Some(Instant::now());
        }
    }

    pub fn start(&mut self, op: &str) {
        if self.enabled {
            self.open.insert(op.to_string(), Instant::now());
        }
    }

    pub fn stop(&mut self, op: &str) {
        if !self.enabled {
            return;
        }
        if let Some(started) = self.open.remove(op) {
            self.ops
                .entry(op.to_string())
                .or_default()
                .add(started.elapsed().as_secs_f64());
        }
    }

    /// Times a closure under the given operation name.
    pub fn time<R>(&mut self, op: &str, f: impl FnOnce() -> R) -> R {
        if !self.enabled {
            return f();
        }
        let started = Instant::now();
        let result = f();
        self.ops
            .entry(op.to_string())
            .or_default()
            .add(started.elapsed().as_secs_f64());
        result
    }

    /// The structured report embedded in optimization results.
    /// None when the profiler is disabled or never started.
    pub fn report(&self) -> Option<ProfilingReport> {
        if !self.enabled {
            return None;
        }
        let start = self.run_start?;
        let end = self.run_end.unwrap_or_else(Instant::now);

        let setup_time = self
            .setup_done
            .map(|t| t.duration_since(start).as_secs_f64())
            .unwrap_or(0.0);
        let total_time = end.duration_since(start).as_secs_f64();

        let operations = self
            .ops
            .iter()
            .map(|(name, stats)| {
                (
                    name.clone(),
                    OpReport {
                        total: stats.total,
                        count: stats.count,
                        avg: if stats.count > 0 {
                            stats.total / stats.count as f64
                        } else {
                            0.0
                        },
                        min: stats.min,
                        max: stats.max,
                    },
                )
            })
            .collect();

        Some(ProfilingReport {
            total_time,
            setup_time,
            loop_time: total_time - setup_time,
            time_to_best_solution: self
                .best_at
                .map(|t| t.duration_since(start).as_secs_f64())
                .unwrap_or(0.0),
            best_solution_generation: self.best_generation,
            operations,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpReport {
    pub total: f64,
    pub count: u64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilingReport {
    pub total_time: f64,
    pub setup_time: f64,
    pub loop_time: f64,
    pub time_to_best_solution: f64,
    pub best_solution_generation: usize,
    pub operations: BTreeMap<String, OpReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_profiler_reports_nothing() {
        let mut profiler = Profiler::disabled();
        profiler.start_optimization();
        let out = profiler.time("fitness", || 42);
        profiler.end_optimization();
        assert_eq!(out, 42);
        assert!(profiler.report().is_none());
    }

    #[test]
    fn aggregates_track_counts() {
        let mut profiler = Profiler::new(true);
        profiler.start_optimization();
        profiler.mark_setup_complete();
        for _ in 0..3 {
            profiler.time("validate", || std::thread::sleep(std::time::Duration::from_millis(1)));
        }
        profiler.mark_best_solution(2);
        profiler.end_optimization();

        let report = profiler.report().unwrap();
        let validate = &report.operations["validate"];
        assert_eq!(validate.count, 3);
        assert!(validate.total >= validate.max);
        assert!(validate.min <= validate.avg && validate.avg <= validate.max);
        assert_eq!(report.best_solution_generation, 2);
        assert!(report.total_time >= report.setup_time);
    }

    #[test]
    fn start_stop_pairs_accumulate() {
        let mut profiler = Profiler::new(true);
        profiler.start_optimization();
        profiler.start("select");
        profiler.stop("select");
        profiler.end_optimization();
        assert_eq!(profiler.report().unwrap().operations["select"].count, 1);
    }
}
