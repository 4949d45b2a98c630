/// Counter-race strategy
///
/// For counters exposing zero-argument `increment` and `getValue`, fed
/// `initialValue,threadCount,incrementsPerThread`. One shared instance is
/// hammered by real OS threads; the judge joins them all and compares the
/// final value exactly. Correctness of the counter's own synchronisation is
/// the property under test, so an unsynchronised submission may fail
/// nondeterministically.
use super::worker::WorkerError;
use super::StrategyContext;
use crate::error::{ArgumentError, InvokeError};
use crate::java_type::JavaType;
use crate::unit::{CallableUnit, Plan, TypeDescriptor};
use crate::value::Value;
use arbiter_common::types::{TestCase, TestResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

const INCREMENT: &str = "increment";
const READ: &str = "getValue";
const ERROR_PREFIX: &str = "Error executing counter simulation: ";

lazy_static! {
    static ref RACE_INPUT: Regex = Regex::new(r"^[0-9]+,[0-9]+,[0-9]+$").unwrap();
}

pub(super) fn can_handle(descriptor: &TypeDescriptor, test_case: &TestCase) -> bool {
    descriptor.has_nullary(INCREMENT)
        && descriptor.has_nullary(READ)
        && RACE_INPUT.is_match(&test_case.input)
}

struct RaceInput {
    initial: i32,
    threads: u32,
    per_thread: u32,
}

fn parse_input(input: &str) -> Result<Option<RaceInput>, ArgumentError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [initial, threads, per_thread] = parts.as_slice() else {
        return Ok(None);
    };
    let number = |s: &str| ArgumentError::Number(s.to_string());
    Ok(Some(RaceInput {
        initial: initial.parse().map_err(|_| number(initial))?,
        threads: threads.parse().map_err(|_| number(threads))?,
        per_thread: per_thread.parse().map_err(|_| number(per_thread))?,
    }))
}

fn build_plan(descriptor: &TypeDescriptor, input: &RaceInput) -> Result<Plan, InvokeError> {
    let not_found = |what: String| InvokeError::NotFound(what);

    let plan = match descriptor.constructor_with(&[JavaType::Int]) {
        Some(ctor) => Plan::new().construct(ctor.clone(), vec![Value::Int(input.initial.into())]),
        None => {
            let ctor = descriptor
                .nullary_constructor()
                .ok_or_else(|| not_found(format!("{}.<init>()", descriptor.name)))?;
            Plan::new().construct(ctor.clone(), Vec::new())
        }
    };

    let increment = descriptor
        .find_by_arity(INCREMENT, 0)
        .ok_or_else(|| not_found(format!("{}.{}()", descriptor.name, INCREMENT)))?;
    let read = descriptor
        .find_by_arity(READ, 0)
        .ok_or_else(|| not_found(format!("{}.{}()", descriptor.name, READ)))?;

    Ok(plan.race(increment.clone(), read.clone(), input.threads, input.per_thread))
}

pub(super) async fn execute<U: CallableUnit>(
    unit: &Arc<U>,
    test_case: &TestCase,
    ctx: &StrategyContext<'_>,
) -> TestResult {
    let input = match parse_input(&test_case.input) {
        Ok(Some(input)) => input,
        Ok(None) => {
            return TestResult::failed(test_case, "Invalid input format for counter simulation test")
        }
        Err(e) => return TestResult::failed(test_case, format!("{}{}", ERROR_PREFIX, e)),
    };

    let plan = match build_plan(unit.descriptor(), &input) {
        Ok(plan) => plan,
        Err(e) => return TestResult::failed(test_case, format!("{}{}", ERROR_PREFIX, e)),
    };

    let deadline = ctx.worker.scaled(input.threads);
    match ctx.worker.run(unit, plan, deadline).await {
        Ok(values) => {
            let actual = values.last().unwrap_or(&Value::Null).to_string();
            let passed = actual == test_case.expected_output;
            debug!(
                test_id = test_case.id,
                threads = input.threads,
                per_thread = input.per_thread,
                passed,
                "Counter race finished"
            );
            TestResult::compared(test_case, actual, passed)
        }
        Err(WorkerError::Timeout(_)) => TestResult::failed(test_case, "Time Limit Exceeded"),
        Err(e) => TestResult::failed(test_case, format!("{}{}", ERROR_PREFIX, e)),
    }
}
