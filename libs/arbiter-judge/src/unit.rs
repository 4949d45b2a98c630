/// Callable Units
///
/// **Core Responsibility:**
/// The capability boundary between judging logic and compiled submissions.
///
/// **Architectural Boundary:**
/// - A unit describes its members through a neutral [`TypeDescriptor`]
/// - Strategies resolve members against the descriptor and build a [`Plan`]
/// - The unit only executes already-resolved steps against one instance slot
///
/// Nothing here depends on how a unit introspects or invokes code; the
/// javac-backed unit and the in-process test doubles implement the same
/// trait.
use crate::error::InvokeError;
use crate::java_type::JavaType;
use crate::value::Value;
use std::future::Future;

/// A declared method of the primary type
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub is_static: bool,
    /// Parameter types as the judge understands them
    pub params: Vec<JavaType>,
    /// Erased binary parameter names, used to pin the exact overload
    pub erased: Vec<String>,
    pub returns: String,
}

impl Member {
    pub fn arity(&self) -> usize {
        self.erased.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub params: Vec<JavaType>,
    pub erased: Vec<String>,
}

impl Constructor {
    pub fn arity(&self) -> usize {
        self.erased.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeDescriptor {
    /// Simple name of the primary type
    pub name: String,
    pub methods: Vec<Member>,
    pub constructors: Vec<Constructor>,
}

impl TypeDescriptor {
    /// Method with this name and exactly these parameter types
    pub fn find_exact(&self, name: &str, params: &[JavaType]) -> Option<&Member> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.params.as_slice() == params)
    }

    /// First declared method with this name and parameter count
    pub fn find_by_arity(&self, name: &str, arity: usize) -> Option<&Member> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.arity() == arity)
    }

    /// Exact match first, then name plus arity
    pub fn resolve(&self, name: &str, params: &[JavaType]) -> Option<&Member> {
        self.find_exact(name, params)
            .or_else(|| self.find_by_arity(name, params.len()))
    }

    pub fn has_nullary(&self, name: &str) -> bool {
        self.find_by_arity(name, 0).is_some()
    }

    pub fn nullary_constructor(&self) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.arity() == 0)
    }

    pub fn constructor_with(&self, params: &[JavaType]) -> Option<&Constructor> {
        self.constructors
            .iter()
            .find(|c| c.params.as_slice() == params)
    }

    pub fn constructor_by_arity(&self, arity: usize) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.arity() == arity)
    }
}

/// One resolved action against the unit's instance slot
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replace the instance slot with a new instance; yields null
    Construct { ctor: Constructor, args: Vec<Value> },
    /// Call a member on the slot (unbound for static members); yields its return
    Invoke { member: Member, args: Vec<Value> },
    /// Run `threads` OS threads each calling `increment` `per_thread` times on
    /// the slot, join them all, then yield `read`
    Race {
        increment: Member,
        read: Member,
        threads: u32,
        per_thread: u32,
    },
}

/// Ordered steps executed in one isolated run; one value per step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn construct(mut self, ctor: Constructor, args: Vec<Value>) -> Self {
        self.steps.push(Step::Construct { ctor, args });
        self
    }

    pub fn invoke(mut self, member: Member, args: Vec<Value>) -> Self {
        self.steps.push(Step::Invoke { member, args });
        self
    }

    pub fn race(mut self, increment: Member, read: Member, threads: u32, per_thread: u32) -> Self {
        self.steps.push(Step::Race {
            increment,
            read,
            threads,
            per_thread,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A compiled submission that can execute plans
pub trait CallableUnit: Send + Sync + 'static {
    fn descriptor(&self) -> &TypeDescriptor;

    /// Execute every step in order and return one value per step.
    ///
    /// Dropping the returned future must stop the work.
    fn execute(&self, plan: Plan) -> impl Future<Output = Result<Vec<Value>, InvokeError>> + Send;
}
