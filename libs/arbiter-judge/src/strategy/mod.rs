/// Execution Strategies
///
/// **Responsibility:**
/// Drive one test case against a compiled unit and produce its `TestResult`.
///
/// **Selection:** a closed set tried in a fixed order, specific first:
/// 1. [`ExecutionStrategy::OperationSequence`] when the input is an operation script
/// 2. [`ExecutionStrategy::CounterRace`] for `increment`/`getValue` counters fed `int,int,int`
/// 3. [`ExecutionStrategy::SingleCall`] for everything else
///
/// Every strategy runs its plan through the [`Worker`] as one bounded-time
/// unit of work, and records failures on the case instead of propagating them.
mod race;
mod sequence;
mod single;
pub mod worker;

use crate::compare::OutputComparator;
use crate::signature::MethodSignature;
use crate::unit::{CallableUnit, TypeDescriptor};
use arbiter_common::types::TestCase;
use std::fmt;
use std::sync::Arc;

pub use worker::{Worker, WorkerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    OperationSequence,
    CounterRace,
    SingleCall,
}

/// Everything a strategy needs besides the unit and the case
pub struct StrategyContext<'a> {
    pub signature: &'a MethodSignature,
    pub comparator: &'a OutputComparator,
    pub worker: &'a Worker,
}

impl ExecutionStrategy {
    /// Probe order; the last entry always applies
    pub const ORDER: [ExecutionStrategy; 3] = [
        ExecutionStrategy::OperationSequence,
        ExecutionStrategy::CounterRace,
        ExecutionStrategy::SingleCall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExecutionStrategy::OperationSequence => "operation-sequence",
            ExecutionStrategy::CounterRace => "counter-race",
            ExecutionStrategy::SingleCall => "single-call",
        }
    }

    pub fn can_handle(&self, descriptor: &TypeDescriptor, test_case: &TestCase) -> bool {
        match self {
            ExecutionStrategy::OperationSequence => sequence::can_handle(test_case),
            ExecutionStrategy::CounterRace => race::can_handle(descriptor, test_case),
            ExecutionStrategy::SingleCall => true,
        }
    }

    pub async fn execute<U: CallableUnit>(
        &self,
        unit: &Arc<U>,
        test_case: &TestCase,
        ctx: &StrategyContext<'_>,
    ) -> arbiter_common::types::TestResult {
        match self {
            ExecutionStrategy::OperationSequence => sequence::execute(unit, test_case, ctx).await,
            ExecutionStrategy::CounterRace => race::execute(unit, test_case, ctx).await,
            ExecutionStrategy::SingleCall => single::execute(unit, test_case, ctx).await,
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Picks the first strategy in [`ExecutionStrategy::ORDER`] that can handle the case
#[derive(Debug, Default, Clone, Copy)]
pub struct StrategySelector;

impl StrategySelector {
    pub fn select(&self, descriptor: &TypeDescriptor, test_case: &TestCase) -> ExecutionStrategy {
        ExecutionStrategy::ORDER
            .into_iter()
            .find(|s| s.can_handle(descriptor, test_case))
            .unwrap_or(ExecutionStrategy::SingleCall)
    }
}
