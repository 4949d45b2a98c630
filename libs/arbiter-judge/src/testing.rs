// In-process units and a compiler stub so strategy and judge tests need no JDK
use crate::compiler::Compiler;
use crate::error::{CompilationError, Fault, InvokeError};
use crate::java_type::JavaType;
use crate::unit::{CallableUnit, Constructor, Member, Plan, Step, TypeDescriptor};
use crate::value::Value;
use arbiter_common::types::TestCase;
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn case(id: u32, input: &str, expected: &str) -> TestCase {
    TestCase {
        id,
        input: input.to_string(),
        expected_output: expected.to_string(),
        hidden: false,
    }
}

fn member(name: &str, is_static: bool, params: Vec<JavaType>, returns: &str) -> Member {
    Member {
        name: name.to_string(),
        is_static,
        erased: params.iter().map(JavaType::java_name).collect(),
        params,
        returns: returns.to_string(),
    }
}

fn constructor(params: Vec<JavaType>) -> Constructor {
    Constructor {
        erased: params.iter().map(JavaType::java_name).collect(),
        params,
    }
}

fn raised(name: &str, message: Option<&str>) -> InvokeError {
    InvokeError::Raised(vec![Fault {
        name: name.to_string(),
        message: message.map(str::to_string),
    }])
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, InvokeError> {
    match args.get(index) {
        Some(Value::Int(v)) | Some(Value::Long(v)) => Ok(*v),
        _ => Err(raised("IllegalArgumentException", Some("argument type mismatch"))),
    }
}

/// `public static int square(int x)` on `Solution`
pub(crate) struct SquareUnit {
    descriptor: TypeDescriptor,
}

impl SquareUnit {
    pub(crate) fn new() -> Self {
        Self {
            descriptor: TypeDescriptor {
                name: "Solution".to_string(),
                methods: vec![Self::square()],
                constructors: vec![constructor(vec![])],
            },
        }
    }

    fn square() -> Member {
        member("square", true, vec![JavaType::Int], "int")
    }

    pub(crate) fn plan(x: i64) -> Plan {
        Plan::new().invoke(Self::square(), vec![Value::Int(x)])
    }
}

impl CallableUnit for SquareUnit {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    async fn execute(&self, plan: Plan) -> Result<Vec<Value>, InvokeError> {
        let mut values = Vec::with_capacity(plan.len());
        for step in &plan.steps {
            match step {
                Step::Invoke { args, .. } => {
                    let x = int_arg(args, 0)?;
                    values.push(Value::Int(x * x));
                }
                _ => values.push(Value::Null),
            }
        }
        Ok(values)
    }
}

/// Counts drops of the execution future
struct DropGuard(Arc<AtomicUsize>);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// `public static void spin()` that sleeps once per plan
pub(crate) struct SleepyUnit {
    descriptor: TypeDescriptor,
    delay: Duration,
    pub(crate) finished: Arc<AtomicUsize>,
    pub(crate) dropped: Arc<AtomicUsize>,
}

impl SleepyUnit {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            descriptor: TypeDescriptor {
                name: "Sleeper".to_string(),
                methods: vec![Self::spin()],
                constructors: vec![constructor(vec![])],
            },
            delay,
            finished: Arc::new(AtomicUsize::new(0)),
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn spin() -> Member {
        member("spin", true, vec![], "void")
    }

    pub(crate) fn plan() -> Plan {
        Plan::new().invoke(Self::spin(), vec![])
    }
}

impl CallableUnit for SleepyUnit {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    async fn execute(&self, plan: Plan) -> Result<Vec<Value>, InvokeError> {
        let _guard = DropGuard(Arc::clone(&self.dropped));
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Value::Null; plan.len()])
    }
}

lazy_static! {
    static ref CALCULATOR: TypeDescriptor = TypeDescriptor {
        name: "Calculator".to_string(),
        methods: vec![member("divide", false, vec![JavaType::Int, JavaType::Int], "int")],
        constructors: vec![constructor(vec![])],
    };
}

/// Instance `divide(int, int)` that raises a two-link chain on a zero divisor
pub(crate) struct ThrowingUnit;

impl CallableUnit for ThrowingUnit {
    fn descriptor(&self) -> &TypeDescriptor {
        &CALCULATOR
    }

    async fn execute(&self, plan: Plan) -> Result<Vec<Value>, InvokeError> {
        let mut values = Vec::with_capacity(plan.len());
        for step in &plan.steps {
            match step {
                Step::Invoke { args, .. } => {
                    let (a, b) = (int_arg(args, 0)?, int_arg(args, 1)?);
                    if b == 0 {
                        return Err(InvokeError::Raised(vec![
                            Fault {
                                name: "IllegalStateException".to_string(),
                                message: Some("division failed".to_string()),
                            },
                            Fault {
                                name: "ArithmeticException".to_string(),
                                message: Some("/ by zero".to_string()),
                            },
                        ]));
                    }
                    values.push(Value::Int(a / b));
                }
                _ => values.push(Value::Null),
            }
        }
        Ok(values)
    }
}

/// `MinStack` with `push(int)`, `pop()`, `top()` and `getMin()`
pub(crate) struct StackUnit {
    descriptor: TypeDescriptor,
}

impl StackUnit {
    pub(crate) fn new() -> Self {
        Self {
            descriptor: TypeDescriptor {
                name: "MinStack".to_string(),
                methods: vec![
                    member("push", false, vec![JavaType::Int], "void"),
                    member("pop", false, vec![], "int"),
                    member("top", false, vec![], "int"),
                    member("getMin", false, vec![], "int"),
                ],
                constructors: vec![constructor(vec![])],
            },
        }
    }
}

impl CallableUnit for StackUnit {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    async fn execute(&self, plan: Plan) -> Result<Vec<Value>, InvokeError> {
        let mut stack: Option<Vec<i64>> = None;
        let mut values = Vec::with_capacity(plan.len());

        for step in &plan.steps {
            let value = match step {
                Step::Construct { .. } => {
                    stack = Some(Vec::new());
                    Value::Null
                }
                Step::Invoke { member, args } => {
                    let items = stack
                        .as_mut()
                        .ok_or_else(|| raised("NullPointerException", None))?;
                    match member.name.as_str() {
                        "push" => {
                            items.push(int_arg(args, 0)?);
                            Value::Null
                        }
                        "pop" => Value::Int(items.pop().ok_or_else(|| raised("EmptyStackException", None))?),
                        "top" => Value::Int(*items.last().ok_or_else(|| raised("EmptyStackException", None))?),
                        "getMin" => Value::Int(
                            items
                                .iter()
                                .copied()
                                .min()
                                .ok_or_else(|| raised("EmptyStackException", None))?,
                        ),
                        other => return Err(InvokeError::NotFound(other.to_string())),
                    }
                }
                Step::Race { .. } => return Err(InvokeError::Protocol("race on a stack".into())),
            };
            values.push(value);
        }
        Ok(values)
    }
}

/// `Counter` with `increment()` and `getValue()`, optionally racy
pub(crate) struct CounterUnit {
    descriptor: TypeDescriptor,
    synchronized: bool,
}

impl CounterUnit {
    fn with(synchronized: bool) -> Self {
        Self {
            descriptor: TypeDescriptor {
                name: "Counter".to_string(),
                methods: vec![
                    member("increment", false, vec![], "void"),
                    member("getValue", false, vec![], "int"),
                ],
                constructors: vec![constructor(vec![JavaType::Int]), constructor(vec![])],
            },
            synchronized,
        }
    }

    pub(crate) fn synchronized() -> Self {
        Self::with(true)
    }

    pub(crate) fn unsynchronized() -> Self {
        Self::with(false)
    }

    pub(crate) fn without_int_constructor(mut self) -> Self {
        self.descriptor.constructors.retain(|c| c.arity() == 0);
        self
    }
}

fn bump(value: &AtomicI64, synchronized: bool) {
    if synchronized {
        value.fetch_add(1, Ordering::SeqCst);
    } else {
        let seen = value.load(Ordering::SeqCst);
        std::thread::yield_now();
        value.store(seen + 1, Ordering::SeqCst);
    }
}

impl CallableUnit for CounterUnit {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    async fn execute(&self, plan: Plan) -> Result<Vec<Value>, InvokeError> {
        let counter = Arc::new(AtomicI64::new(0));
        let synchronized = self.synchronized;
        let mut values = Vec::with_capacity(plan.len());

        for step in plan.steps {
            let value = match step {
                Step::Construct { args, .. } => {
                    let initial = if args.is_empty() { 0 } else { int_arg(&args, 0)? };
                    counter.store(initial, Ordering::SeqCst);
                    Value::Null
                }
                Step::Invoke { member, .. } if member.name == "increment" => {
                    bump(&counter, synchronized);
                    Value::Null
                }
                Step::Invoke { .. } => Value::Int(counter.load(Ordering::SeqCst)),
                Step::Race {
                    threads, per_thread, ..
                } => {
                    let shared = Arc::clone(&counter);
                    tokio::task::spawn_blocking(move || {
                        std::thread::scope(|scope| {
                            for _ in 0..threads {
                                scope.spawn(|| {
                                    for _ in 0..per_thread {
                                        bump(&shared, synchronized);
                                    }
                                });
                            }
                        });
                    })
                    .await
                    .map_err(|e| InvokeError::Crashed(e.to_string()))?;
                    Value::Int(counter.load(Ordering::SeqCst))
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}

type Outcome<U> = dyn Fn(&str) -> Result<U, CompilationError> + Send + Sync;

/// Compiler whose outcome is a closure over the source; counts invocations
pub(crate) struct StubCompiler<U> {
    outcome: Box<Outcome<U>>,
    pub(crate) compiles: AtomicUsize,
}

impl<U: CallableUnit> StubCompiler<U> {
    pub(crate) fn new(outcome: impl Fn(&str) -> Result<U, CompilationError> + Send + Sync + 'static) -> Self {
        Self {
            outcome: Box::new(outcome),
            compiles: AtomicUsize::new(0),
        }
    }
}

impl<U: CallableUnit> Compiler for StubCompiler<U> {
    type Unit = U;

    async fn compile(&self, source: &str) -> Result<U, CompilationError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        (self.outcome)(source)
    }
}
