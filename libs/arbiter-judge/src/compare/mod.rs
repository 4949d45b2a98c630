/// Output Comparator
///
/// **Decision order:**
/// 1. Exact string equality
/// 2. If the expected output looks like interleaved concurrent output,
///    logical equivalence: same message multiset, then the first
///    applicable [`OrderingValidator`] checks the partial order
/// 3. Otherwise a mismatch
pub mod ordering;

use crate::scan::parse_list_output;
use ordering::{BarrierPhase, CountdownGate, OrderingValidator, WorkerTask};
use tracing::debug;

pub struct OutputComparator {
    validators: Vec<Box<dyn OrderingValidator>>,
}

impl Default for OutputComparator {
    fn default() -> Self {
        Self::new(vec![
            Box::new(CountdownGate),
            Box::new(WorkerTask),
            Box::new(BarrierPhase),
        ])
    }
}

impl OutputComparator {
    /// Validators are tried in order; the first applicable one decides
    pub fn new(validators: Vec<Box<dyn OrderingValidator>>) -> Self {
        Self { validators }
    }

    pub fn compare(&self, actual: &str, expected: &str) -> bool {
        if actual == expected {
            return true;
        }
        if !is_concurrent_output(expected) {
            return false;
        }

        let actual_messages = split_messages(actual);
        let expected_messages = split_messages(expected);
        if actual_messages.len() != expected_messages.len() {
            return false;
        }

        let mut actual_sorted = actual_messages.clone();
        let mut expected_sorted = expected_messages;
        actual_sorted.sort();
        expected_sorted.sort();
        if actual_sorted != expected_sorted {
            return false;
        }

        match self.validators.iter().find(|v| v.applies_to(expected)) {
            Some(validator) => {
                let ok = validator.validate(&actual_messages);
                debug!(validator = validator.name(), ok, "Logical-order comparison");
                ok
            }
            None => true,
        }
    }
}

/// Markers of worker/thread lifecycle messages
fn is_concurrent_output(output: &str) -> bool {
    let worker = output.contains("Worker")
        && (output.contains("ready") || output.contains("finished") || output.contains("processing"));
    let thread = output.contains("Thread")
        && (output.contains("started") || output.contains("Barrier") || output.contains("Phase"));
    let process = output.contains("Main process") || output.contains("All workers finished");
    worker || thread || process
}

/// Message list from bracketed list syntax, else non-blank lines
fn split_messages(output: &str) -> Vec<String> {
    let output = output.trim();
    if output.starts_with('[') && output.ends_with(']') {
        return parse_list_output(output);
    }
    if output.contains('\n') {
        return output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
    }
    if output.is_empty() {
        Vec::new()
    } else {
        vec![output.to_string()]
    }
}
