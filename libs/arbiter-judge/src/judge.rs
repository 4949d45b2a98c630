/// Judge - Orchestration of One Submission Run
///
/// **Core Responsibility:**
/// Take a submission and its question through every stage and return one
/// `ExecutionResult`.
///
/// **Stages:**
/// `Validating → Compiling → Executing → Aggregating → Done`
///
/// - A security violation or compilation failure short-circuits to a failed
///   result with zero tests and a stage-tagged error
/// - During execution each case is judged independently; a failing case
///   never stops its siblings
/// - A panic while driving a case ends the run as a runtime error carrying
///   the verdicts gathered so far
use crate::compare::OutputComparator;
use crate::compiler::{Compiler, JavacCompiler};
use crate::error::JudgeError;
use crate::signature::MethodSignature;
use crate::strategy::{StrategyContext, StrategySelector, Worker};
use crate::unit::CallableUnit;
use crate::validator::SourceValidator;
use arbiter_common::config::JudgeConfig;
use arbiter_common::types::{ExecutionResult, Question, Submission, TestCase, TestResult};
use futures_util::stream::{self, StreamExt};
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Compiling,
    Executing,
    Aggregating,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Compiling => "compiling",
            Stage::Executing => "executing",
            Stage::Aggregating => "aggregating",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

pub struct Judge<C: Compiler> {
    compiler: C,
    validator: SourceValidator,
    comparator: OutputComparator,
    worker: Worker,
    selector: StrategySelector,
    max_parallel: usize,
}

impl Judge<JavacCompiler> {
    /// Judge backed by the host JDK
    pub fn javac(config: &JudgeConfig) -> Self {
        Self::new(JavacCompiler::new(config), config)
    }
}

impl<C: Compiler> Judge<C> {
    pub fn new(compiler: C, config: &JudgeConfig) -> Self {
        Self::with_parts(
            compiler,
            SourceValidator::new(config.max_source_chars),
            OutputComparator::default(),
            Worker::new(config.test_timeout()),
            config.max_parallel_tests,
        )
    }

    pub fn with_parts(
        compiler: C,
        validator: SourceValidator,
        comparator: OutputComparator,
        worker: Worker,
        max_parallel: usize,
    ) -> Self {
        Self {
            compiler,
            validator,
            comparator,
            worker,
            selector: StrategySelector,
            max_parallel: max_parallel.max(1),
        }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Validate then compile; the two stages that can abort a run
    pub async fn prepare(&self, source: &str) -> Result<C::Unit, JudgeError> {
        debug!(stage = %Stage::Validating, "Judge stage");
        self.validator.validate(source)?;

        debug!(stage = %Stage::Compiling, "Judge stage");
        Ok(self.compiler.compile(source).await?)
    }

    #[tracing::instrument(
        name = "judge_run",
        skip_all,
        fields(question_id = %question.id, visible_only = submission.visible_only)
    )]
    pub async fn run(&self, submission: &Submission, question: &Question) -> ExecutionResult {
        let start = Instant::now();
        let elapsed_ms = || start.elapsed().as_millis() as u64;

        let unit = match self.prepare(&submission.source).await {
            Ok(unit) => Arc::new(unit),
            Err(e) => {
                warn!(error = %e, elapsed_ms = elapsed_ms(), "Submission rejected before execution");
                return ExecutionResult::aborted(e.to_string(), elapsed_ms());
            }
        };

        let cases = question.selected_cases(submission.visible_only);
        debug!(stage = %Stage::Executing, cases = cases.len(), parallel = self.max_parallel, "Judge stage");

        let signature = MethodSignature::parse(&question.method_signature);
        let ctx = StrategyContext {
            signature: &signature,
            comparator: &self.comparator,
            worker: &self.worker,
        };

        let pending: Vec<_> = cases
            .iter()
            .map(|test_case| self.run_case(&unit, test_case, &ctx))
            .collect();
        let mut outcomes = stream::iter(pending).buffered(self.max_parallel);

        let mut results = Vec::with_capacity(cases.len());
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(result) => results.push(result),
                Err(message) => {
                    error!(error = %message, completed = results.len(), "Judge run aborted");
                    let mut result = ExecutionResult::from_results(results, elapsed_ms());
                    result.success = false;
                    result.error = Some(format!("Runtime error: {}", message));
                    return result;
                }
            }
        }

        debug!(stage = %Stage::Aggregating, "Judge stage");
        let result = ExecutionResult::from_results(results, elapsed_ms());
        info!(
            passed = result.passed_tests,
            total = result.total_tests,
            success = result.success,
            elapsed_ms = result.execution_time_ms,
            "Judged submission"
        );
        debug!(stage = %Stage::Done, "Judge stage");
        result
    }

    async fn run_case(
        &self,
        unit: &Arc<C::Unit>,
        test_case: &TestCase,
        ctx: &StrategyContext<'_>,
    ) -> Result<TestResult, String> {
        let start = Instant::now();
        let driven = AssertUnwindSafe(async {
            let strategy = self.selector.select(unit.descriptor(), test_case);
            let result = strategy.execute(unit, test_case, ctx).await;
            (strategy, result)
        })
        .catch_unwind()
        .await;

        match driven {
            Ok((strategy, result)) => {
                debug!(
                    test_id = test_case.id,
                    strategy = %strategy,
                    passed = result.passed,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Test case judged"
                );
                Ok(result)
            }
            Err(panic) => Err(panic_message(panic.as_ref())),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
