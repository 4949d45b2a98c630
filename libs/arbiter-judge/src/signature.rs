/// Method Signature Parsing
///
/// Extracts the callable name and declared parameter types from the
/// human-authored signature on a question, e.g.
/// `public static int[] twoSum(int[] nums, int target)`.
use crate::java_type::JavaType;
use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_METHOD_NAME: &str = "solution";

lazy_static! {
    static ref METHOD_NAME: Regex = Regex::new(r"\s(\w+)\s*\(").unwrap();
    static ref PARAMETERS: Regex = Regex::new(r"\(([^)]*)\)").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<JavaType>,
}

impl MethodSignature {
    pub fn parse(signature: &str) -> Self {
        Self {
            name: extract_name(signature),
            params: extract_param_types(signature),
        }
    }
}

/// Identifier immediately preceding the parameter list
pub fn extract_name(signature: &str) -> String {
    METHOD_NAME
        .captures(signature)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_METHOD_NAME.to_string())
}

/// Declared parameter types in order. Parameters whose type is outside the
/// known vocabulary are dropped.
pub fn extract_param_types(signature: &str) -> Vec<JavaType> {
    let Some(list) = PARAMETERS.captures(signature).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };

    split_params(list.as_str())
        .iter()
        .filter_map(|param| param_type_name(param))
        .filter_map(|name| JavaType::resolve(&name))
        .collect()
}

/// Split on commas outside generic brackets
fn split_params(list: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for c in list.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                params.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    params.push(current);
    params
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Type portion of one declaration (`final int[] nums` -> `int[]`,
/// `int nums[]` -> `int[]`, bare `int` -> `int`)
fn param_type_name(param: &str) -> Option<String> {
    let tokens: Vec<&str> = param
        .split_whitespace()
        .filter(|t| *t != "final" && !t.starts_with('@'))
        .collect();

    match tokens.as_slice() {
        [] => None,
        [only] => Some((*only).to_string()),
        [ty @ .., name] => {
            let mut ty = ty.concat();
            let dims = name.matches("[]").count();
            for _ in 0..dims {
                ty.push_str("[]");
            }
            Some(ty)
        }
    }
}
