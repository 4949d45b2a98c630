/// Dynamic Compilation
///
/// **Core Responsibility:**
/// Turn validated source text into a [`CallableUnit`], or diagnostics.
///
/// **Isolation:**
/// Every compilation owns a private workspace and runs its code in its own
/// runtime process, so no loaded type survives into, or collides with, a
/// later compilation that reuses the same type name.
pub mod harness;
pub mod javac;
pub mod protocol;

use crate::error::CompilationError;
use crate::unit::CallableUnit;
use std::future::Future;

pub use javac::{extract_type_name, JavaUnit, JavacCompiler};

pub trait Compiler: Send + Sync + 'static {
    type Unit: CallableUnit;

    fn compile(&self, source: &str) -> impl Future<Output = Result<Self::Unit, CompilationError>> + Send;
}
