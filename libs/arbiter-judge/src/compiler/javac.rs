/// Javac-backed Compiler
///
/// **Flow:**
/// 1. Find the primary type name (public declaration first, then any
///    top-level declaration)
/// 2. Write the submission and the harness into a fresh temp workspace
/// 3. Run `javac` under the compile timeout and parse its diagnostics
/// 4. Run the harness once in `describe` mode to learn the type's members
///
/// Each plan later runs in its own `java` process spawned with
/// `kill_on_drop`, so dropping the execution future on a deadline kills
/// the submission outright.
use super::harness::{HARNESS_CLASS, HARNESS_SOURCE};
use super::protocol::{decode_descriptor, decode_run, encode_plan, RunReport};
use super::Compiler;
use crate::error::{CompilationError, InvokeError};
use crate::unit::{CallableUnit, Plan, TypeDescriptor};
use crate::value::Value;
use arbiter_common::config::JudgeConfig;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

lazy_static! {
    static ref PUBLIC_CLASS: Regex = Regex::new(r"public\s+class\s+(\w+)").unwrap();
    static ref ANY_CLASS: Regex = Regex::new(r"\bclass\s+(\w+)").unwrap();
    static ref PACKAGE: Regex = Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").unwrap();
    static ref DIAGNOSTIC: Regex =
        Regex::new(r"^(?:.*[/\\])?([^/\\:]+\.java):(\d+): (?:error|warning): (.*)$").unwrap();
}

/// Lines of stderr kept when a runtime dies without reporting
const CRASH_CONTEXT_LINES: usize = 5;

/// Bytes of child stdout kept; harness output past this is not decoded
const STDOUT_LIMIT: usize = 8 * 1024 * 1024;

/// Bytes of child stderr kept
const STDERR_LIMIT: usize = 64 * 1024;

/// Primary type name: the first `public class`, else the first `class`
/// declaration not directly preceded by `static`
pub fn extract_type_name(source: &str) -> Option<String> {
    if let Some(caps) = PUBLIC_CLASS.captures(source) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    ANY_CLASS.captures_iter(source).find_map(|caps| {
        let whole = caps.get(0)?;
        let nested = source[..whole.start()]
            .strip_suffix(|c: char| c.is_whitespace())
            .is_some_and(|before| before.ends_with("static"));
        if nested {
            None
        } else {
            caps.get(1).map(|m| m.as_str().to_string())
        }
    })
}

fn package_of(source: &str) -> Option<String> {
    PACKAGE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// javac stderr as `Line N: message` lines; raw text when nothing parses
pub fn render_diagnostics(stderr: &str) -> String {
    let lines: Vec<String> = stderr
        .lines()
        .filter_map(|line| DIAGNOSTIC.captures(line.trim_end()))
        .filter_map(|caps| Some(format!("Line {}: {}", caps.get(2)?.as_str(), caps.get(3)?.as_str())))
        .collect();

    if lines.is_empty() {
        stderr.trim().to_string()
    } else {
        lines.join("\n")
    }
}

fn crash_context(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let context: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(CRASH_CONTEXT_LINES)
        .collect();
    if context.is_empty() {
        format!("runtime exited with {}", output.status)
    } else {
        context.join("\n")
    }
}

/// Read at most `limit + 1` bytes, then drain the rest so the writer never
/// blocks on a full pipe. A result longer than `limit` means output was cut.
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    (&mut reader).take(limit as u64 + 1).read_to_end(&mut buf).await?;
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(buf)
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>, limit: usize) -> std::io::Result<Vec<u8>> {
    match pipe {
        Some(reader) => read_capped(reader, limit).await,
        None => Ok(Vec::new()),
    }
}

/// Like `wait_with_output`, with both pipes read under a byte cap
async fn wait_capped(mut child: Child) -> std::io::Result<Output> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (stdout, stderr) = tokio::try_join!(
        read_pipe(stdout, STDOUT_LIMIT),
        read_pipe(stderr, STDERR_LIMIT)
    )?;
    let status = child.wait().await?;
    Ok(Output { status, stdout, stderr })
}

async fn output_capped(cmd: &mut Command) -> std::io::Result<Output> {
    let child = cmd.spawn()?;
    wait_capped(child).await
}

#[derive(Debug, Clone)]
pub struct JavacCompiler {
    javac: String,
    java: String,
    jvm_args: Vec<String>,
    compile_timeout: Duration,
    work_dir: Option<PathBuf>,
}

impl JavacCompiler {
    pub fn new(config: &JudgeConfig) -> Self {
        Self {
            javac: config.javac_path.clone(),
            java: config.java_path.clone(),
            jvm_args: config.jvm_args.clone(),
            compile_timeout: config.compile_timeout(),
            work_dir: config.work_dir.clone(),
        }
    }

    fn workspace(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("arbiter-");
        match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }

    async fn run_javac(&self, classes: &Path, sources: &[PathBuf]) -> Result<(), CompilationError> {
        let mut cmd = Command::new(&self.javac);
        cmd.arg("-encoding")
            .arg("UTF-8")
            .arg("-proc:none")
            .arg("-nowarn")
            .arg("-d")
            .arg(classes)
            .args(sources)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.compile_timeout, output_capped(&mut cmd)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CompilationError::ToolchainUnavailable(format!(
                    "'{}' not found. Ensure a JDK is installed, not just a JRE.",
                    self.javac
                )));
            }
            Ok(Err(e)) => return Err(CompilationError::Io(e)),
            Err(_) => {
                return Err(CompilationError::Timeout(
                    self.compile_timeout.as_millis() as u64,
                ))
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if stderr.trim().is_empty() {
            stderr = String::from_utf8_lossy(&output.stdout).into_owned();
        }
        Err(CompilationError::Diagnostics(render_diagnostics(&stderr)))
    }

    async fn describe(&self, unit_classes: &Path, qualified: &str, name: &str) -> Result<TypeDescriptor, CompilationError> {
        let mut cmd = Command::new(&self.java);
        cmd.args(&self.jvm_args)
            .arg("-cp")
            .arg(unit_classes)
            .arg(HARNESS_CLASS)
            .arg("describe")
            .arg(qualified)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.compile_timeout, output_capped(&mut cmd)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CompilationError::ToolchainUnavailable(format!(
                    "failed to launch '{}': {}",
                    self.java, e
                )))
            }
            Err(_) => {
                return Err(CompilationError::Timeout(
                    self.compile_timeout.as_millis() as u64,
                ))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        decode_descriptor(name, &stdout).map_err(|e| {
            if stdout.contains("END") {
                CompilationError::Introspection(e)
            } else {
                CompilationError::Introspection(crash_context(&output))
            }
        })
    }
}

impl Compiler for JavacCompiler {
    type Unit = JavaUnit;

    #[tracing::instrument(name = "javac_compile", skip(self, source), fields(source_len = source.len()))]
    async fn compile(&self, source: &str) -> Result<JavaUnit, CompilationError> {
        let start = Instant::now();

        let name = extract_type_name(source).ok_or(CompilationError::NoTypeName)?;
        if name == HARNESS_CLASS {
            return Err(CompilationError::ReservedName(name));
        }
        let qualified = match package_of(source) {
            Some(package) => format!("{}.{}", package, name),
            None => name.clone(),
        };

        let workspace = self.workspace()?;
        let src_dir = workspace.path().join("src");
        let classes = workspace.path().join("classes");
        tokio::fs::create_dir_all(&src_dir).await?;
        tokio::fs::create_dir_all(&classes).await?;

        let submission_path = src_dir.join(format!("{}.java", name));
        let harness_path = src_dir.join(format!("{}.java", HARNESS_CLASS));
        tokio::fs::write(&submission_path, source).await?;
        tokio::fs::write(&harness_path, HARNESS_SOURCE).await?;

        debug!(type_name = %qualified, workspace = %workspace.path().display(), "Compiling submission");
        self.run_javac(&classes, &[submission_path, harness_path]).await?;

        let descriptor = self.describe(&classes, &qualified, &name).await?;
        info!(
            type_name = %qualified,
            methods = descriptor.methods.len(),
            constructors = descriptor.constructors.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Compiled submission"
        );

        Ok(JavaUnit {
            descriptor,
            qualified_name: qualified,
            java: self.java.clone(),
            jvm_args: self.jvm_args.clone(),
            classes,
            _workspace: workspace,
        })
    }
}

/// A compiled submission on disk; the workspace is removed on drop
#[derive(Debug)]
pub struct JavaUnit {
    descriptor: TypeDescriptor,
    qualified_name: String,
    java: String,
    jvm_args: Vec<String>,
    classes: PathBuf,
    _workspace: TempDir,
}

impl JavaUnit {
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    async fn run(&self, plan: Plan) -> Result<Vec<Value>, InvokeError> {
        let mut child = Command::new(&self.java)
            .args(&self.jvm_args)
            .arg("-cp")
            .arg(&self.classes)
            .arg(HARNESS_CLASS)
            .arg("run")
            .arg(&self.qualified_name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(encode_plan(&plan).as_bytes()).await {
                // The runtime may already have died; its output says why.
                warn!(error = %e, "Failed to send plan to runtime");
            }
        }

        let output = wait_capped(child).await?;
        if output.stdout.len() > STDOUT_LIMIT {
            return Err(InvokeError::Crashed(format!(
                "output exceeded {} bytes",
                STDOUT_LIMIT
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = match decode_run(&stdout) {
            Ok(report) => report,
            Err(e) if stdout.contains("END") => return Err(InvokeError::Protocol(e)),
            Err(_) => RunReport::default(),
        };

        if let Some(chain) = report.fault {
            return Err(InvokeError::Raised(chain));
        }
        if !report.finished {
            return Err(InvokeError::Crashed(crash_context(&output)));
        }
        if report.values.len() != plan.len() {
            return Err(InvokeError::Protocol(format!(
                "expected {} results, got {}",
                plan.len(),
                report.values.len()
            )));
        }
        Ok(report.values)
    }
}

impl CallableUnit for JavaUnit {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    async fn execute(&self, plan: Plan) -> Result<Vec<Value>, InvokeError> {
        self.run(plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_class_wins() {
        let source = "class Helper {}\npublic class Solution { static class Node {} }";
        assert_eq!(extract_type_name(source).as_deref(), Some("Solution"));
    }

    #[test]
    fn test_nested_static_class_is_skipped() {
        let source = "  static class Node {}\nclass LRUCache { }";
        assert_eq!(extract_type_name(source).as_deref(), Some("LRUCache"));
    }

    #[test]
    fn test_no_type_name() {
        assert_eq!(extract_type_name("interface Shape {}"), None);
    }

    #[test]
    fn test_package_detection() {
        assert_eq!(
            package_of("package com.example.app;\npublic class A {}").as_deref(),
            Some("com.example.app")
        );
        assert_eq!(package_of("public class A {}"), None);
    }

    #[test]
    fn test_render_diagnostics() {
        let stderr = "/tmp/arbiter-x1/src/Solution.java:3: error: ';' expected\n        return x * x\n                    ^\n\
                      /tmp/arbiter-x1/src/Solution.java:7: error: cannot find symbol\n2 errors\n";
        assert_eq!(
            render_diagnostics(stderr),
            "Line 3: ';' expected\nLine 7: cannot find symbol"
        );
        assert_eq!(
            render_diagnostics(r"C:\work\src\Solution.java:1: error: class, interface, enum, or record expected"),
            "Line 1: class, interface, enum, or record expected"
        );
        assert_eq!(render_diagnostics("error: invalid flag\n"), "error: invalid flag");
    }

    #[tokio::test]
    async fn test_read_capped_truncates_and_drains() {
        let noisy = vec![b'x'; STDERR_LIMIT * 3];
        let mut reader: &[u8] = &noisy;
        let kept = read_capped(&mut reader, STDERR_LIMIT).await.unwrap();
        assert_eq!(kept.len(), STDERR_LIMIT + 1);
        assert!(reader.is_empty());

        let short: &[u8] = b"Exception in thread main\n";
        let kept = read_capped(short, STDERR_LIMIT).await.unwrap();
        assert_eq!(kept, b"Exception in thread main\n");
    }

    #[tokio::test]
    async fn test_read_pipe_without_pipe_is_empty() {
        let kept = read_pipe(None::<&[u8]>, STDOUT_LIMIT).await.unwrap();
        assert!(kept.is_empty());
    }

    #[tokio::test]
    async fn test_missing_type_name_fails_before_toolchain() {
        let compiler = JavacCompiler::new(&JudgeConfig::default());
        let err = compiler.compile("enum Color { RED }").await.unwrap_err();
        assert!(matches!(err, CompilationError::NoTypeName));
    }

    #[tokio::test]
    async fn test_reserved_name_is_rejected() {
        let compiler = JavacCompiler::new(&JudgeConfig::default());
        let err = compiler
            .compile("public class ArbiterHarness {}")
            .await
            .unwrap_err();
        assert!(matches!(err, CompilationError::ReservedName(_)));
    }

    #[tokio::test]
    async fn test_missing_javac_is_reported() {
        let config = JudgeConfig {
            javac_path: "/nonexistent/bin/javac".to_string(),
            ..Default::default()
        };
        let err = JavacCompiler::new(&config)
            .compile("public class Solution {}")
            .await
            .unwrap_err();
        assert!(matches!(err, CompilationError::ToolchainUnavailable(_)));
        assert!(err.to_string().starts_with("Java compiler not available"));
    }
}
