use serde::{Deserialize, Deserializer, Serialize};

/// Difficulty band assigned by the question author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Display-only worked example shown alongside a question
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default)]
    pub time_complexity: String,
    #[serde(default)]
    pub space_complexity: String,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// One judged case of a question.
///
/// `input` is a loosely-typed, human-readable argument list (or an
/// operation script); `expected_output` is the canonical string form the
/// submission's result is compared against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: u32,
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub hidden: bool,
}

/// A generated coding question: the judge only reads `method_signature`
/// and `test_cases`, everything else is carried for the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub topic_id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub examples: Vec<Example>,
    pub method_signature: String,
    #[serde(default)]
    pub starter_code: String,
    pub test_cases: Vec<TestCase>,
    #[serde(default, deserialize_with = "hints_from_text_or_list")]
    pub hints: Vec<String>,
    #[serde(default)]
    pub constraints: Constraints,
}

impl Question {
    /// Test cases selected for a run: visible ones only in "test" mode,
    /// every case in "submit" mode. Display order is preserved.
    pub fn selected_cases(&self, visible_only: bool) -> Vec<&TestCase> {
        self.test_cases
            .iter()
            .filter(|tc| !(visible_only && tc.hidden))
            .collect()
    }
}

/// Question authors emit hints either as one block of text or as a list.
fn hints_from_text_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hints {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<Hints>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Hints::Text(text)) if text.trim().is_empty() => Vec::new(),
        Some(Hints::Text(text)) => vec![text],
        Some(Hints::List(list)) => list,
    })
}

/// Learner source text aimed at one question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub question_id: String,
    pub source: String,
    /// `true` runs only non-hidden cases ("test"), `false` runs all ("submit")
    #[serde(default)]
    pub visible_only: bool,
}

impl Submission {
    pub fn test_run(question_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            source: source.into(),
            visible_only: true,
        }
    }

    pub fn submit_run(question_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            source: source.into(),
            visible_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: u32,
    pub passed: bool,
    pub input: String,
    pub expected_output: String,
    pub actual_output: Option<String>,
    pub error: Option<String>,
}

impl TestResult {
    /// Verdict for a case whose output was computed and compared
    pub fn compared(test_case: &TestCase, actual_output: String, passed: bool) -> Self {
        let error = (!passed).then(|| {
            format!(
                "Expected: {}, but got: {}",
                test_case.expected_output, actual_output
            )
        });
        Self {
            test_id: test_case.id,
            passed,
            input: test_case.input.clone(),
            expected_output: test_case.expected_output.clone(),
            actual_output: Some(actual_output),
            error,
        }
    }

    /// Verdict for a case that never produced an output
    pub fn failed(test_case: &TestCase, error: impl Into<String>) -> Self {
        Self {
            test_id: test_case.id,
            passed: false,
            input: test_case.input.clone(),
            expected_output: test_case.expected_output.clone(),
            actual_output: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub passed_tests: u32,
    pub total_tests: u32,
    pub results: Vec<TestResult>,
    /// Set only when the run aborted before any case executed
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    /// Aggregate per-case verdicts. `success` needs at least one case and
    /// every case passing.
    pub fn from_results(results: Vec<TestResult>, execution_time_ms: u64) -> Self {
        let passed_tests = results.iter().filter(|r| r.passed).count() as u32;
        let total_tests = results.len() as u32;
        Self {
            success: total_tests > 0 && passed_tests == total_tests,
            passed_tests,
            total_tests,
            results,
            error: None,
            execution_time_ms,
        }
    }

    /// Terminal failure raised before execution (security or compilation)
    pub fn aborted(error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            passed_tests: 0,
            total_tests: 0,
            results: Vec::new(),
            error: Some(error.into()),
            execution_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: u32, hidden: bool) -> TestCase {
        TestCase {
            id,
            input: "5".to_string(),
            expected_output: "25".to_string(),
            hidden,
        }
    }

    #[test]
    fn test_selected_cases_respects_visibility() {
        let question = Question {
            method_signature: "public static int square(int x)".to_string(),
            test_cases: vec![case(1, false), case(2, true), case(3, false)],
            ..Default::default()
        };

        let visible: Vec<u32> = question.selected_cases(true).iter().map(|tc| tc.id).collect();
        let all: Vec<u32> = question.selected_cases(false).iter().map(|tc| tc.id).collect();

        assert_eq!(visible, vec![1, 3]);
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[test]
    fn test_aggregate_invariants() {
        let tc = case(1, false);
        let results = vec![
            TestResult::compared(&tc, "25".to_string(), true),
            TestResult::compared(&tc, "24".to_string(), false),
        ];

        let result = ExecutionResult::from_results(results, 12);

        assert_eq!(result.passed_tests, 1);
        assert_eq!(result.total_tests, 2);
        assert!(!result.success);
        assert!(result.error.is_none());
        assert_eq!(
            result.results[1].error.as_deref(),
            Some("Expected: 25, but got: 24")
        );
    }

    #[test]
    fn test_empty_run_is_not_success() {
        let result = ExecutionResult::from_results(Vec::new(), 0);
        assert_eq!(result.total_tests, 0);
        assert!(!result.success);
    }

    #[test]
    fn test_aborted_result_has_no_cases() {
        let result = ExecutionResult::aborted("Compilation error: Line 1: ';' expected", 40);
        assert!(!result.success);
        assert_eq!(result.total_tests, 0);
        assert_eq!(result.passed_tests, 0);
        assert!(result.results.is_empty());
    }

    #[test]
    fn test_question_deserializes_authoring_json() {
        let json = r#"{
            "id": "q-1",
            "title": "Square",
            "difficulty": "EASY",
            "methodSignature": "public static int square(int x)",
            "testCases": [
                {"id": 1, "input": "5", "expectedOutput": "25", "hidden": false},
                {"id": 2, "input": "-3", "expectedOutput": "9", "hidden": true}
            ],
            "hints": "Multiply the number by itself",
            "constraints": {"timeComplexity": "O(1)", "spaceComplexity": "O(1)", "rules": []}
        }"#;

        let question: Question = serde_json::from_str(json).unwrap();

        assert_eq!(question.difficulty, Difficulty::Easy);
        assert_eq!(question.test_cases.len(), 2);
        assert!(question.test_cases[1].hidden);
        assert_eq!(question.hints, vec!["Multiply the number by itself".to_string()]);
        assert_eq!(question.constraints.time_complexity, "O(1)");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ExecutionResult::aborted("Security violation: Forbidden API detected: System.exit", 1);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalTests"], 0);
        assert_eq!(json["executionTimeMs"], 1);
        assert!(json["error"].as_str().unwrap().starts_with("Security violation"));
    }
}
