/// Operation-sequence strategy
///
/// Replays `Operations: [..], Arguments: [[..], ..]` scripts against one
/// instance. An operation named after the type constructs a fresh instance
/// and contributes `null`; every other operation is resolved by name and
/// argument count. The actual output is each step's default string form,
/// joined as `[a, b, ..]`, and must match exactly.
use super::worker::WorkerError;
use super::StrategyContext;
use crate::args::parse_operation_args;
use crate::error::InvokeError;
use crate::scan::{argument_sets, bracket_list_after};
use crate::unit::{CallableUnit, Plan};
use arbiter_common::types::{TestCase, TestResult};
use std::sync::Arc;
use tracing::debug;

const MARKER: &str = "Operations:";
const ERROR_PREFIX: &str = "Error executing operations: ";

pub(super) fn can_handle(test_case: &TestCase) -> bool {
    test_case.input.contains(MARKER)
}

pub(super) async fn execute<U: CallableUnit>(
    unit: &Arc<U>,
    test_case: &TestCase,
    ctx: &StrategyContext<'_>,
) -> TestResult {
    let operations: Vec<String> = bracket_list_after(&test_case.input, MARKER)
        .into_iter()
        .map(|op| op.replace('"', "").trim().to_string())
        .collect();
    let argument_sets = argument_sets(&test_case.input);

    if operations.len() != argument_sets.len() {
        return TestResult::failed(test_case, "Mismatch between operations and arguments count");
    }

    let plan = match build_plan(unit.descriptor(), &operations, &argument_sets) {
        Ok(plan) => plan,
        Err(e) => return TestResult::failed(test_case, format!("{}{}", ERROR_PREFIX, e)),
    };

    let deadline = ctx.worker.scaled(operations.len() as u32);
    match ctx.worker.run(unit, plan, deadline).await {
        Ok(values) => {
            let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let actual = format!("[{}]", rendered.join(", "));
            let passed = actual == test_case.expected_output;
            debug!(test_id = test_case.id, operations = operations.len(), passed, "Operation sequence finished");
            TestResult::compared(test_case, actual, passed)
        }
        Err(WorkerError::Timeout(_)) => TestResult::failed(test_case, "Time Limit Exceeded"),
        Err(e) => TestResult::failed(test_case, format!("{}{}", ERROR_PREFIX, e)),
    }
}

fn build_plan(
    descriptor: &crate::unit::TypeDescriptor,
    operations: &[String],
    argument_sets: &[String],
) -> Result<Plan, InvokeError> {
    let mut plan = Plan::new();

    for (operation, raw_args) in operations.iter().zip(argument_sets) {
        let args = parse_operation_args(raw_args);

        if *operation == descriptor.name {
            let ctor = descriptor
                .constructor_by_arity(args.len())
                .or_else(|| descriptor.nullary_constructor())
                .ok_or_else(|| InvokeError::NotFound(format!("{}.<init>()", descriptor.name)))?;
            let args = if ctor.arity() == args.len() { args } else { Vec::new() };
            plan = plan.construct(ctor.clone(), args);
        } else {
            let member = descriptor
                .find_by_arity(operation, args.len())
                .ok_or_else(|| {
                    InvokeError::NotFound(format!(
                        "Method {} with {} parameters not found",
                        operation,
                        args.len()
                    ))
                })?;
            plan = plan.invoke(member.clone(), args);
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use crate::compare::OutputComparator;
    use crate::signature::MethodSignature;
    use crate::strategy::{ExecutionStrategy, StrategyContext, Worker};
    use crate::testing::{case, SleepyUnit, StackUnit};
    use crate::unit::CallableUnit;
    use arbiter_common::types::TestResult;
    use std::sync::Arc;
    use std::time::Duration;

    async fn run<U: CallableUnit>(unit: U, input: &str, expected: &str, timeout: Duration) -> TestResult {
        let signature = MethodSignature::parse("");
        let comparator = OutputComparator::default();
        let worker = Worker::new(timeout);
        let ctx = StrategyContext {
            signature: &signature,
            comparator: &comparator,
            worker: &worker,
        };
        ExecutionStrategy::OperationSequence
            .execute(&Arc::new(unit), &case(1, input, expected), &ctx)
            .await
    }

    #[tokio::test]
    async fn test_min_stack_script() {
        let input = r#"Operations: ["MinStack", "push", "push", "push", "getMin", "pop", "top", "getMin"], Arguments: [[], [-2], [0], [-3], [], [], [], []]"#;
        let expected = "[null, null, null, null, -3, -3, 0, -2]";
        let result = run(StackUnit::new(), input, expected, Duration::from_secs(2)).await;
        assert!(result.passed, "{:?}", result.error);
        assert_eq!(result.actual_output.as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn test_order_matters() {
        let input = "Operations: [MinStack, push, top], Arguments: [[], [4], []]";
        let result = run(StackUnit::new(), input, "[null, 4, null]", Duration::from_secs(2)).await;
        assert!(!result.passed);
        assert_eq!(result.actual_output.as_deref(), Some("[null, null, 4]"));
    }

    #[tokio::test]
    async fn test_count_mismatch() {
        let input = r#"Operations: ["MinStack", "push"], Arguments: [[]]"#;
        let result = run(StackUnit::new(), input, "[null, null]", Duration::from_secs(2)).await;
        assert_eq!(
            result.error.as_deref(),
            Some("Mismatch between operations and arguments count")
        );
        assert!(result.actual_output.is_none());
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let input = r#"Operations: ["MinStack", "peekAll"], Arguments: [[], [1]]"#;
        let result = run(StackUnit::new(), input, "[null, null]", Duration::from_secs(2)).await;
        assert_eq!(
            result.error.as_deref(),
            Some("Error executing operations: NoSuchMethodException: Method peekAll with 1 parameters not found")
        );
    }

    #[tokio::test]
    async fn test_fault_inside_script() {
        let input = r#"Operations: ["MinStack", "pop"], Arguments: [[], []]"#;
        let result = run(StackUnit::new(), input, "[null, null]", Duration::from_secs(2)).await;
        assert_eq!(
            result.error.as_deref(),
            Some("Error executing operations: EmptyStackException")
        );
    }

    #[tokio::test]
    async fn test_deadline_scales_with_operation_count() {
        // Three steps of a 50ms base allow a 60ms plan to finish.
        let input = r#"Operations: ["spin", "spin", "spin"], Arguments: [[], [], []]"#;
        let result = run(
            SleepyUnit::new(Duration::from_millis(60)),
            input,
            "[null, null, null]",
            Duration::from_millis(50),
        )
        .await;
        assert!(result.passed, "{:?}", result.error);

        let input = r#"Operations: ["spin"], Arguments: [[]]"#;
        let result = run(
            SleepyUnit::new(Duration::from_secs(30)),
            input,
            "[null]",
            Duration::from_millis(50),
        )
        .await;
        assert_eq!(result.error.as_deref(), Some("Time Limit Exceeded"));
    }
}
