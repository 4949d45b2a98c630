// Single-call strategy: parse arguments, call the signature's method once, compare
use super::worker::{seconds_label, WorkerError};
use super::StrategyContext;
use crate::args::parse_arguments;
use crate::error::InvokeError;
use crate::format::format_value;
use crate::unit::{CallableUnit, Plan};
use crate::value::Value;
use arbiter_common::types::{TestCase, TestResult};
use std::sync::Arc;
use tracing::debug;

pub(super) async fn execute<U: CallableUnit>(
    unit: &Arc<U>,
    test_case: &TestCase,
    ctx: &StrategyContext<'_>,
) -> TestResult {
    let signature = ctx.signature;
    let args = match parse_arguments(&test_case.input, &signature.params) {
        Ok(args) => args,
        Err(e) => return TestResult::failed(test_case, e.to_string()),
    };

    let descriptor = unit.descriptor();
    let member = descriptor
        .resolve(&signature.name, &signature.params)
        .or_else(|| descriptor.find_by_arity(&signature.name, args.len()));
    let Some(member) = member else {
        let err = InvokeError::NotFound(format!(
            "Method {} not found with {} parameters",
            signature.name,
            signature.params.len()
        ));
        return TestResult::failed(test_case, err.to_string());
    };

    if member.arity() != args.len() {
        return TestResult::failed(
            test_case,
            "IllegalArgumentException: wrong number of arguments",
        );
    }

    let mut plan = Plan::new();
    if !member.is_static {
        let Some(ctor) = descriptor.nullary_constructor() else {
            let err = InvokeError::NotFound(format!("{}.<init>()", descriptor.name));
            return TestResult::failed(test_case, err.to_string());
        };
        plan = plan.construct(ctor.clone(), Vec::new());
    }
    let plan = plan.invoke(member.clone(), args);

    let deadline = ctx.worker.base_timeout();
    match ctx.worker.run(unit, plan, deadline).await {
        Ok(values) => {
            let actual = format_value(values.last().unwrap_or(&Value::Null));
            let passed = ctx.comparator.compare(&actual, &test_case.expected_output);
            debug!(test_id = test_case.id, method = %member.name, passed, "Single call finished");
            TestResult::compared(test_case, actual, passed)
        }
        Err(WorkerError::Timeout(_)) => TestResult::failed(
            test_case,
            format!("Time Limit Exceeded ({})", seconds_label(deadline)),
        ),
        Err(e) => TestResult::failed(test_case, e.to_string()),
    }
}
