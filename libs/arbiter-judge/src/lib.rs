pub mod args;
pub mod compare;
pub mod compiler;
pub mod error;
pub mod format;
pub mod java_type;
pub mod judge;
pub mod scan;
pub mod signature;
pub mod strategy;
pub mod unit;
pub mod validator;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use compiler::{Compiler, JavaUnit, JavacCompiler};
pub use error::{CompilationError, InvokeError, JudgeError, SecurityViolation};
pub use judge::{Judge, Stage};
pub use unit::{CallableUnit, Plan, TypeDescriptor};
pub use value::Value;
