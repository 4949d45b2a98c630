/// Runtime Values
///
/// **Responsibility:**
/// The neutral value model shared by argument parsing, output formatting
/// and the callable-unit boundary. Values carry just enough shape to be
/// rendered the way a JVM prints them (`Integer` vs `Long`, `float` vs
/// `double`, arrays vs lists).
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// int, short and byte
    Int(i64),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
    Array(Vec<Value>),
    List(Vec<Value>),
    /// Text rendered by the JVM itself: default object strings and returned
    /// floating-point values
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Elements of an array or list value
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Default string form, matching `String.valueOf` on the JVM:
/// strings are unquoted, nested arrays and lists render as `[a, b]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) | Value::Long(n) => write!(f, "{}", n),
            Value::Float(x) => f.write_str(&java_float_string(*x)),
            Value::Double(x) => f.write_str(&java_double_string(*x)),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) | Value::Text(s) => f.write_str(s),
            Value::Array(items) | Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// `Double.toString` rendering: plain decimal with at least one fractional
/// digit for magnitudes in [1e-3, 1e7), computerized scientific otherwise.
pub fn java_double_string(x: f64) -> String {
    if let Some(special) = special_float(x) {
        return special;
    }
    decimal_or_scientific(format!("{}", x), format!("{:e}", x), x.abs())
}

/// `Float.toString` rendering, using the shortest digits of the `f32` itself
pub fn java_float_string(x: f32) -> String {
    if let Some(special) = special_float(f64::from(x)) {
        return special;
    }
    decimal_or_scientific(format!("{}", x), format!("{:e}", x), f64::from(x).abs())
}

fn special_float(x: f64) -> Option<String> {
    if x.is_nan() {
        Some("NaN".to_string())
    } else if x.is_infinite() {
        Some(if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else if x == 0.0 {
        Some(if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string())
    } else {
        None
    }
}

fn decimal_or_scientific(plain: String, scientific: String, magnitude: f64) -> String {
    if (1e-3..1e7).contains(&magnitude) {
        if plain.contains('.') {
            plain
        } else {
            plain + ".0"
        }
    } else {
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{}E{}", mantissa, exponent)
        } else {
            format!("{}.0E{}", mantissa, exponent)
        }
    }
}
