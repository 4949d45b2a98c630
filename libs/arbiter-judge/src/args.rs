/// Argument Parser
///
/// **Responsibility:**
/// Turn a test case's human-readable input string into typed argument
/// values for the declared parameter list.
///
/// **Input shapes (tried in order):**
/// 1. Named assignments: `nums = [2, 7], target = 9`
/// 2. A single bracketed collection for a single parameter: `[1, 2, 3]`
/// 3. Positional values for several parameters: `2, [100, 50]`
/// 4. Otherwise the whole input is one value
///
/// The authoring side emits loosely typed strings, so values without a
/// usable declared type fall back to heuristics (quotes mean string, a
/// decimal point means double, and so on).
use crate::error::ArgumentError;
use crate::java_type::JavaType;
use crate::scan::{has_unquoted_equals, is_bracketed, split_quote_aware, split_top_level, unquote};
use crate::value::Value;

type ParseResult<T> = Result<T, ArgumentError>;

/// Parse a full argument list against the declared parameter types
pub fn parse_arguments(input: &str, types: &[JavaType]) -> ParseResult<Vec<Value>> {
    let input = input.trim();

    if types.is_empty() && input.is_empty() {
        return Ok(Vec::new());
    }

    if has_unquoted_equals(input) {
        return split_top_level(input)
            .iter()
            .enumerate()
            .filter_map(|(idx, part)| {
                part.split_once('=')
                    .map(|(_, rhs)| parse_value(rhs, types.get(idx)))
            })
            .collect();
    }

    if types.len() == 1 && is_bracketed(input) && split_top_level(input).len() == 1 {
        return Ok(vec![parse_value(input, types.first())?]);
    }

    if types.len() > 1 {
        return split_top_level(input)
            .iter()
            .zip(types)
            .map(|(part, ty)| parse_value(part, Some(ty)))
            .collect();
    }

    Ok(vec![parse_value(input, types.first())?])
}

/// Parse one value, using the declared type when there is one
pub fn parse_value(value: &str, ty: Option<&JavaType>) -> ParseResult<Value> {
    let value = value.trim();
    let Some(ty) = ty else {
        return Ok(parse_untyped(value));
    };

    match ty {
        JavaType::Array(component) => parse_array(value, component),
        JavaType::List(_) => Ok(parse_list(value)),
        JavaType::String => Ok(Value::Str(unquote(value).to_string())),
        JavaType::Int => parse_number::<i32>(value).map(|n| Value::Int(n.into())),
        JavaType::Short => parse_number::<i16>(value).map(|n| Value::Int(n.into())),
        JavaType::Byte => parse_number::<i8>(value).map(|n| Value::Int(n.into())),
        JavaType::Long => parse_number::<i64>(strip_long_suffix(value)).map(Value::Long),
        JavaType::Double => parse_number::<f64>(value).map(Value::Double),
        JavaType::Float => parse_number::<f32>(value).map(Value::Float),
        JavaType::Boolean => Ok(Value::Bool(value.eq_ignore_ascii_case("true"))),
        JavaType::Char => {
            let stripped = value.trim_matches(|c: char| c == '\'' || c == '"');
            stripped
                .chars()
                .next()
                .or_else(|| value.chars().next())
                .map(Value::Char)
                .ok_or(ArgumentError::EmptyChar)
        }
        JavaType::Class(_) => Ok(parse_untyped(value)),
    }
}

/// Heuristic parse with no type hint
pub fn parse_untyped(value: &str) -> Value {
    let value = value.trim();

    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return Value::Str(unquote(value).to_string());
    }
    if value == "true" || value == "false" {
        return Value::Bool(value == "true");
    }
    if value.ends_with('L') || value.ends_with('l') {
        if let Ok(n) = strip_long_suffix(value).parse::<i64>() {
            return Value::Long(n);
        }
    }
    if is_bracketed(value) {
        return parse_list(value);
    }
    if value.contains('.') {
        if let Ok(x) = value.parse::<f64>() {
            return Value::Double(x);
        }
    }
    if let Ok(n) = value.parse::<i32>() {
        return Value::Int(n.into());
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Long(n);
    }
    Value::Str(value.to_string())
}

/// Arguments of one operation in an operation script, e.g. `[1, "a"]`
pub fn parse_operation_args(args: &str) -> Vec<Value> {
    let args = args.trim();
    let inner = if is_bracketed(args) {
        &args[1..args.len() - 1]
    } else {
        args
    };
    if inner.trim().is_empty() {
        return Vec::new();
    }

    split_top_level(inner)
        .iter()
        .map(|part| parse_untyped(part))
        .collect()
}

/// Bracketed array of `component`; 2-D arrays recurse per row.
/// Input that is not bracketed yields an empty array.
fn parse_array(value: &str, component: &JavaType) -> ParseResult<Value> {
    if !is_bracketed(value) {
        return Ok(Value::Array(Vec::new()));
    }
    let content = value[1..value.len() - 1].trim();
    if content.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    let elements = match component {
        JavaType::Array(inner) => split_top_level(content)
            .iter()
            .map(|row| parse_array(row.trim(), inner))
            .collect::<ParseResult<Vec<_>>>()?,
        JavaType::String => split_quote_aware(content)
            .iter()
            .map(|part| Value::Str(unquote(part).to_string()))
            .collect(),
        JavaType::List(_) | JavaType::Class(_) => split_top_level(content)
            .iter()
            .map(|part| parse_value(part, Some(component)))
            .collect::<ParseResult<Vec<_>>>()?,
        scalar => content
            .split(',')
            .map(|part| parse_value(part, Some(scalar)))
            .collect::<ParseResult<Vec<_>>>()?,
    };

    Ok(Value::Array(elements))
}

/// Bracketed list whose element type is inferred from the first element:
/// nested bracket, quoted string, decimal, else integer. Elements that fail
/// to parse as the inferred numeric type become zero.
fn parse_list(value: &str) -> Value {
    if !is_bracketed(value) {
        return Value::List(Vec::new());
    }
    let content = value[1..value.len() - 1].trim();
    if content.is_empty() {
        return Value::List(Vec::new());
    }

    let parts: Vec<String> = split_top_level(content)
        .into_iter()
        .map(|p| p.trim().to_string())
        .collect();
    let first = parts.first().map(String::as_str).unwrap_or_default();

    let items = if is_bracketed(first) {
        parts.iter().map(|p| parse_list(p)).collect()
    } else if first.len() >= 2 && first.starts_with('"') && first.ends_with('"') {
        parts
            .iter()
            .map(|p| Value::Str(unquote(p).to_string()))
            .collect()
    } else if first.contains('.') {
        parts
            .iter()
            .map(|p| Value::Double(p.parse().unwrap_or(0.0)))
            .collect()
    } else {
        parts
            .iter()
            .map(|p| Value::Int(p.parse::<i32>().map(i64::from).unwrap_or(0)))
            .collect()
    };

    Value::List(items)
}

fn parse_number<T: std::str::FromStr>(value: &str) -> ParseResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ArgumentError::Number(value.trim().to_string()))
}

fn strip_long_suffix(value: &str) -> &str {
    value
        .strip_suffix('L')
        .or_else(|| value.strip_suffix('l'))
        .unwrap_or(value)
}
