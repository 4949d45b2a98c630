/// Ordering Validators
///
/// Each validator recognises one concurrency pattern from the expected
/// output and checks the partial order it guarantees over the actual
/// message list. Literal interleaving is never required.
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

pub trait OrderingValidator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the expected output exhibits this pattern
    fn applies_to(&self, expected: &str) -> bool;

    fn validate(&self, messages: &[String]) -> bool;
}

/// Latch pattern: "initiated" first, "proceeding" last, worker-ready and
/// "waiting" messages before "proceeding"
pub struct CountdownGate;

impl OrderingValidator for CountdownGate {
    fn name(&self) -> &'static str {
        "countdown-gate"
    }

    fn applies_to(&self, expected: &str) -> bool {
        expected.contains("Main process") && expected.contains("Worker")
    }

    fn validate(&self, messages: &[String]) -> bool {
        let mut initiated = None;
        let mut waiting = None;
        let mut proceeding = None;
        let mut workers = Vec::new();

        for (idx, msg) in messages.iter().enumerate() {
            if msg.contains("initiated") {
                initiated = Some(idx);
            } else if msg.contains("waiting") {
                waiting = Some(idx);
            } else if msg.contains("proceeding") {
                proceeding = Some(idx);
            } else if msg.contains("Worker") && msg.contains("ready") {
                workers.push(idx);
            }
        }

        let Some(proceeding) = proceeding else {
            return false;
        };
        if initiated != Some(0) || proceeding + 1 != messages.len() {
            return false;
        }
        if waiting.is_some_and(|w| w >= proceeding) {
            return false;
        }
        workers.iter().all(|w| *w < proceeding)
    }
}

/// Worker/report pattern: every "Worker .. finished" precedes the aggregate
/// report start, which precedes "Report generation complete" (last if present)
pub struct WorkerTask;

impl OrderingValidator for WorkerTask {
    fn name(&self) -> &'static str {
        "worker-task"
    }

    fn applies_to(&self, expected: &str) -> bool {
        expected.contains("processing") && expected.contains("finished")
    }

    fn validate(&self, messages: &[String]) -> bool {
        let mut last_finished = None;
        let mut report_start = None;
        let mut report_complete = None;

        for (idx, msg) in messages.iter().enumerate() {
            if msg.contains("Worker") && msg.contains("finished") {
                last_finished = Some(idx);
            } else if msg.contains("All workers finished") || msg.contains("Starting report generation") {
                report_start = Some(idx);
            } else if msg.contains("Report generation complete") {
                report_complete = Some(idx);
            }
        }

        if let (Some(start), Some(finished)) = (report_start, last_finished) {
            if finished >= start {
                return false;
            }
        }
        if let (Some(complete), Some(start)) = (report_complete, report_start) {
            if start >= complete {
                return false;
            }
        }
        report_complete.map_or(true, |complete| complete + 1 == messages.len())
    }
}

lazy_static! {
    static ref PHASE: Regex = Regex::new(r"Phase (\d+)").unwrap();
}

/// Barrier pattern: messages grouped by the latest phase marker; inside a
/// phase no barrier message may precede a "finished" message
pub struct BarrierPhase;

impl OrderingValidator for BarrierPhase {
    fn name(&self) -> &'static str {
        "barrier-phase"
    }

    fn applies_to(&self, expected: &str) -> bool {
        expected.contains("Barrier") || expected.contains("Phase")
    }

    fn validate(&self, messages: &[String]) -> bool {
        let mut phases: BTreeMap<u64, Vec<&str>> = BTreeMap::new();
        let mut current = 0u64;

        for msg in messages {
            if let Some(phase) = PHASE
                .captures(msg)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
            {
                current = phase;
            }
            phases.entry(current).or_default().push(msg);
        }

        phases.values().all(|phase| {
            let mut last_finished = None;
            let mut last_barrier = None;
            for (idx, msg) in phase.iter().enumerate() {
                if msg.contains("finished") {
                    last_finished = Some(idx);
                } else if msg.contains("Barrier") {
                    last_barrier = Some(idx);
                }
            }
            match (last_barrier, last_finished) {
                (Some(barrier), Some(finished)) => barrier >= finished,
                _ => true,
            }
        })
    }
}
