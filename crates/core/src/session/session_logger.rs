use std::collections::HashMap;
use std::time::Instant;

pub const INFERENCE_STAGE: &str = "inference";
pub const FACES_METRIC: &str = "faces";
pub const FAILURES_METRIC: &str = "failed_ticks";

/// Cross-cutting logger for detection loop events.
///
/// Lets callers observe per-tick behavior without the session knowing
/// where the output goes.
pub trait SessionLogger: Send {
    /// Record how long a named stage took for one tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces per tick).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Records per-stage timings and metrics and reports a summary through
/// the `log` facade when the session ends.
pub struct StdoutSessionLogger {
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    messages: Vec<String>,
}

impl StdoutSessionLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let ticks = self.timings.get(INFERENCE_STAGE).map_or(0, Vec::len);
        let mut lines = vec![format!(
            "Session summary ({ticks} ticks, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = average(durations);
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  max {max_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            lines.push(format!("  {name}: avg {:.1}", average(values)));
        }

        if ticks > 0 && elapsed_ms > 0.0 {
            let rate = ticks as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Detection rate: {rate:.1} ticks/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullSessionLogger;
        logger.timing(INFERENCE_STAGE, 5.0);
        logger.metric(FACES_METRIC, 1.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutSessionLogger::new();
        logger.timing(INFERENCE_STAGE, 20.0);
        logger.timing(INFERENCE_STAGE, 30.0);

        let values = logger.timings_for(INFERENCE_STAGE).unwrap();
        assert_eq!(values, &[20.0, 30.0]);
        assert!(logger.timings_for("render").is_none());
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = StdoutSessionLogger::new();
        logger.metric(FACES_METRIC, 1.0);
        logger.metric(FACES_METRIC, 2.0);
        assert_eq!(logger.metrics_for(FACES_METRIC).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_summary_includes_ticks_timing_and_metrics() {
        let mut logger = StdoutSessionLogger::new();
        logger.timing(INFERENCE_STAGE, 10.0);
        logger.timing(INFERENCE_STAGE, 30.0);
        logger.metric(FACES_METRIC, 1.0);
        logger.metric(FACES_METRIC, 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Session summary (2 ticks"));
        assert!(summary.contains("inference"));
        assert!(summary.contains("max   30.0ms"));
        assert!(summary.contains("faces: avg 1.5"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutSessionLogger::new().summary_string().is_none());
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutSessionLogger::new();
        logger.info("camera started");
        assert_eq!(logger.messages, vec!["camera started".to_string()]);
    }
}
