// CLI commands for judging submissions locally
use anyhow::{bail, Context, Result};
use arbiter_common::config::JudgeConfig;
use arbiter_common::types::{ExecutionResult, Question, Submission};
use arbiter_judge::unit::{Member, TypeDescriptor};
use arbiter_judge::{CallableUnit, Judge, JavacCompiler};
use std::fs;
use std::path::Path;

fn load_question(path: &Path) -> Result<Question> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn judge() -> Result<Judge<JavacCompiler>> {
    let config = JudgeConfig::load_default().context("Failed to load judge configuration")?;
    Ok(Judge::javac(&config))
}

/// Judge a source file against a question file
pub async fn run(question_path: &Path, source_path: &Path, submit: bool, json: bool) -> Result<()> {
    let question = load_question(question_path)?;
    let source = load_source(source_path)?;

    if question.test_cases.is_empty() {
        bail!("Question {} has no test cases", question_path.display());
    }

    let submission = if submit {
        Submission::submit_run(question.id.clone(), source)
    } else {
        Submission::test_run(question.id.clone(), source)
    };

    if !json {
        let mode = if submit { "submit" } else { "test" };
        println!("🚀 Judging {} ({} mode)", source_path.display(), mode);
        println!("  Signature: {}", question.method_signature);
        println!();
    }

    let result = judge()?.run(&submission, &question).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }
    Ok(())
}

fn print_report(result: &ExecutionResult) {
    if let Some(error) = &result.error {
        if result.results.is_empty() {
            println!("❌ {}", error);
            return;
        }
    }

    println!("{:<6} {:<8} {:<30} {:<30}", "TEST", "VERDICT", "EXPECTED", "ACTUAL");
    println!("{}", "─".repeat(76));
    for test in &result.results {
        let verdict = if test.passed { "PASS" } else { "FAIL" };
        println!(
            "{:<6} {:<8} {:<30} {:<30}",
            test.test_id,
            verdict,
            test.expected_output,
            test.actual_output.as_deref().unwrap_or("-")
        );
        if let Some(error) = test.error.as_deref().filter(|_| !test.passed) {
            println!("       ↳ {}", error);
        }
    }

    if let Some(error) = &result.error {
        println!("\n❌ {}", error);
    }

    let icon = if result.success { "✅" } else { "❌" };
    println!(
        "\n{} Passed {}/{} in {}ms",
        icon, result.passed_tests, result.total_tests, result.execution_time_ms
    );
}

/// Validate and compile without running any test case
pub async fn check(source_path: &Path) -> Result<()> {
    let source = load_source(source_path)?;

    println!("🔍 Checking {}...", source_path.display());
    let unit = judge()?.prepare(&source).await?;

    println!("✅ {} compiled successfully", unit.qualified_name());
    Ok(())
}

/// Compile and list the callable members of the primary type
pub async fn describe(source_path: &Path) -> Result<()> {
    let source = load_source(source_path)?;
    let unit = judge()?.prepare(&source).await?;

    print_descriptor(unit.descriptor());
    Ok(())
}

fn print_descriptor(descriptor: &TypeDescriptor) {
    println!("📋 {}\n", descriptor.name);

    println!("Constructors:");
    if descriptor.constructors.is_empty() {
        println!("  (none)");
    }
    for ctor in &descriptor.constructors {
        println!("  {}({})", descriptor.name, ctor.erased.join(", "));
    }

    println!("\nMethods:");
    if descriptor.methods.is_empty() {
        println!("  (none)");
    }
    for member in &descriptor.methods {
        println!("  {}", render_member(member));
    }
}

fn render_member(member: &Member) -> String {
    let params: Vec<String> = member.params.iter().map(|p| p.java_name()).collect();
    let params = if params.len() == member.arity() {
        params
    } else {
        member.erased.clone()
    };
    format!(
        "{}{} {}({})",
        if member.is_static { "static " } else { "" },
        member.returns,
        member.name,
        params.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_judge::java_type::JavaType;

    #[test]
    fn test_render_member() {
        let member = Member {
            name: "twoSum".to_string(),
            is_static: false,
            params: vec![JavaType::Array(Box::new(JavaType::Int)), JavaType::Int],
            erased: vec!["[I".to_string(), "int".to_string()],
            returns: "int[]".to_string(),
        };
        assert_eq!(render_member(&member), "int[] twoSum(int[], int)");

        let member = Member {
            name: "square".to_string(),
            is_static: true,
            params: vec![JavaType::Int],
            erased: vec!["int".to_string()],
            returns: "int".to_string(),
        };
        assert_eq!(render_member(&member), "static int square(int)");
    }

    #[test]
    fn test_question_file_must_parse() {
        let dir = std::env::temp_dir().join(format!("arbiter-cli-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("question.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_question(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
