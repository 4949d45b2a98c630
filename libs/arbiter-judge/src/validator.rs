/// Source Validator
///
/// **Responsibility:**
/// Advisory hardening over raw submission text: a deny-list of process,
/// filesystem, network, class-loading, unsafe-memory, thread-kill and
/// native-method constructs, plus a size cap that bounds compile cost.
///
/// **Not a security boundary:** the scan is substring based and runs
/// before compilation; it cannot see through string concatenation or
/// aliasing.
use crate::error::SecurityViolation;

pub const MAX_SOURCE_CHARS: usize = 50_000;

/// Checked in order; the first hit is reported
pub const FORBIDDEN_APIS: &[&str] = &[
    "System.exit",
    "Runtime.getRuntime()",
    "Runtime.exec",
    "ProcessBuilder",
    "java.io.File",
    "java.nio.file.Files",
    "java.net.Socket",
    "java.net.ServerSocket",
    "java.net.URL",
    "java.net.HttpURLConnection",
    "ClassLoader",
    "sun.misc.Unsafe",
    "reflection.Field.setAccessible",
    "System.setSecurityManager",
    "Thread.stop()",
    "native ",
];

#[derive(Debug, Clone)]
pub struct SourceValidator {
    max_chars: usize,
}

impl Default for SourceValidator {
    fn default() -> Self {
        Self::new(MAX_SOURCE_CHARS)
    }
}

impl SourceValidator {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn validate(&self, source: &str) -> Result<(), SecurityViolation> {
        if let Some(token) = FORBIDDEN_APIS.iter().find(|token| source.contains(**token)) {
            return Err(SecurityViolation::ForbiddenApi(*token));
        }

        if source.chars().count() > self.max_chars {
            return Err(SecurityViolation::TooLong(self.max_chars));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = "public class Solution { public static int square(int x) { return x * x; } }";

    #[test]
    fn test_clean_source_passes() {
        assert!(SourceValidator::default().validate(CLEAN).is_ok());
    }

    #[test]
    fn test_every_forbidden_token_is_rejected() {
        let validator = SourceValidator::default();
        for token in FORBIDDEN_APIS {
            let source = format!("public class Solution {{ void f() {{ {} }} }}", token);
            match validator.validate(&source) {
                Err(SecurityViolation::ForbiddenApi(found)) => {
                    assert!(source.contains(found), "reported token must be present");
                }
                other => panic!("expected rejection for {:?}, got {:?}", token, other),
            }
        }
    }

    #[test]
    fn test_error_names_the_token() {
        let err = SourceValidator::default()
            .validate("class A { void f() { System.exit(1); } }")
            .unwrap_err();
        assert_eq!(err.to_string(), "Forbidden API detected: System.exit");
    }

    #[test]
    fn test_size_limit() {
        let source = format!("class A {{}}{}", " ".repeat(MAX_SOURCE_CHARS));
        let err = SourceValidator::default().validate(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Code exceeds maximum length of 50000 characters"
        );

        let exact = "x".repeat(MAX_SOURCE_CHARS);
        assert!(SourceValidator::default().validate(&exact).is_ok());
    }
}
