/// Sink for advisory notices raised while generating records.
pub trait Reporter {
    /// Write one diagnostic line.
    fn report(&mut self, line: &str);
}

/// Forwards notices to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, line: &str) {
        tracing::warn!("{line}");
    }
}

/// Collects notices, mostly useful in tests and for summaries.
impl Reporter for Vec<String> {
    fn report(&mut self, line: &str) {
        self.push(line.to_string());
    }
}
