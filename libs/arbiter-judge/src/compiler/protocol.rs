/// Harness Wire Protocol
///
/// **Plan encoding (stdin, one step per line):**
/// - `new <k> <erased types..> <values..>`
/// - `call <name> <k> <erased types..> <values..>`
/// - `race <increment> <read> <threads> <per_thread>`
///
/// **Replies (stdout):** `R <value>` per completed step, `E <k> (<name> <message>)*`
/// for a fault chain, then `END`.
///
/// **Value tokens:** `n`, `z1`/`z0`, `i` int, `j` long, `h` short, `b` byte,
/// `d` double, `f` float, `c<code point>`, `s<len>:<text>` string,
/// `t<len>:<text>` opaque object text, `l<n> <values..>` list,
/// `a<component> <n> <values..>` array. Lengths count UTF-16 units so text
/// needs no escaping.
use crate::error::Fault;
use crate::java_type::JavaType;
use crate::unit::{Constructor, Member, Plan, Step, TypeDescriptor};
use crate::value::Value;
use std::fmt::Write as _;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

pub fn encode_plan(plan: &Plan) -> String {
    let mut out = String::new();
    for step in &plan.steps {
        match step {
            Step::Construct { ctor, args } => {
                out.push_str("new");
                encode_call(&mut out, &ctor.erased, &ctor.params, args);
            }
            Step::Invoke { member, args } => {
                let _ = write!(out, "call {}", member.name);
                encode_call(&mut out, &member.erased, &member.params, args);
            }
            Step::Race {
                increment,
                read,
                threads,
                per_thread,
            } => {
                let _ = write!(
                    out,
                    "race {} {} {} {}",
                    increment.name, read.name, threads, per_thread
                );
            }
        }
        out.push('\n');
    }
    out
}

fn encode_call(out: &mut String, erased: &[String], params: &[JavaType], args: &[Value]) {
    let _ = write!(out, " {}", erased.len());
    for name in erased {
        out.push(' ');
        out.push_str(name);
    }
    for (idx, arg) in args.iter().enumerate() {
        out.push(' ');
        encode_value(out, arg, params.get(idx));
    }
}

/// Encode `value` for a parameter of type `ty`, converting numeric widths
/// the way the declaration needs. Shapes that do not fit the declared type
/// fall back to their natural encoding.
pub fn encode_value(out: &mut String, value: &Value, ty: Option<&JavaType>) {
    let Some(ty) = ty else {
        return encode_natural(out, value);
    };

    match (ty, value) {
        (_, Value::Null) => out.push('n'),
        (JavaType::Int, Value::Int(n) | Value::Long(n)) => {
            let _ = write!(out, "i{}", n);
        }
        (JavaType::Long, Value::Int(n) | Value::Long(n)) => {
            let _ = write!(out, "j{}", n);
        }
        (JavaType::Short, Value::Int(n) | Value::Long(n)) => {
            let _ = write!(out, "h{}", n);
        }
        (JavaType::Byte, Value::Int(n) | Value::Long(n)) => {
            let _ = write!(out, "b{}", n);
        }
        (JavaType::Double, Value::Int(n) | Value::Long(n)) => {
            let _ = write!(out, "d{}", n);
        }
        (JavaType::Double, Value::Double(x)) => {
            let _ = write!(out, "d{}", float_token(*x));
        }
        (JavaType::Double, Value::Float(x)) => {
            let _ = write!(out, "d{}", float_token(f64::from(*x)));
        }
        (JavaType::Float, Value::Int(n) | Value::Long(n)) => {
            let _ = write!(out, "f{}", n);
        }
        (JavaType::Float, Value::Float(x)) => {
            let _ = write!(out, "f{}", float_token(f64::from(*x)));
        }
        (JavaType::Float, Value::Double(x)) => {
            let _ = write!(out, "f{}", float_token(*x));
        }
        (JavaType::Char, Value::Str(s)) if s.chars().count() == 1 => {
            encode_natural(out, &Value::Char(s.chars().next().unwrap_or_default()))
        }
        (JavaType::String, Value::Char(c)) => sized(out, 's', &c.to_string()),
        (JavaType::Array(component), Value::Array(items) | Value::List(items)) => {
            let _ = write!(out, "a{} {}", component.java_name(), items.len());
            for item in items {
                out.push(' ');
                encode_value(out, item, Some(component.as_ref()));
            }
        }
        (JavaType::List(element), Value::List(items) | Value::Array(items)) => {
            let _ = write!(out, "l{}", items.len());
            for item in items {
                out.push(' ');
                encode_value(out, item, element.as_deref());
            }
        }
        _ => encode_natural(out, value),
    }
}

fn encode_natural(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push('n'),
        Value::Bool(b) => out.push_str(if *b { "z1" } else { "z0" }),
        Value::Int(n) if i32::try_from(*n).is_ok() => {
            let _ = write!(out, "i{}", n);
        }
        Value::Int(n) | Value::Long(n) => {
            let _ = write!(out, "j{}", n);
        }
        Value::Float(x) => {
            let _ = write!(out, "f{}", float_token(f64::from(*x)));
        }
        Value::Double(x) => {
            let _ = write!(out, "d{}", float_token(*x));
        }
        Value::Char(c) => {
            let _ = write!(out, "c{}", u32::from(*c));
        }
        Value::Str(s) | Value::Text(s) => sized(out, 's', s),
        Value::List(items) => {
            let _ = write!(out, "l{}", items.len());
            for item in items {
                out.push(' ');
                encode_natural(out, item);
            }
        }
        Value::Array(items) => {
            let _ = write!(out, "a{} {}", natural_component(items), items.len());
            for item in items {
                out.push(' ');
                encode_natural(out, item);
            }
        }
    }
}

/// Component type for an array whose declared type is unknown
fn natural_component(items: &[Value]) -> String {
    match items.iter().find(|v| !v.is_null()) {
        Some(Value::Int(_)) => "int".to_string(),
        Some(Value::Long(_)) => "long".to_string(),
        Some(Value::Double(_)) => "double".to_string(),
        Some(Value::Float(_)) => "float".to_string(),
        Some(Value::Bool(_)) => "boolean".to_string(),
        Some(Value::Char(_)) => "char".to_string(),
        Some(Value::Str(_)) | Some(Value::Text(_)) => "java.lang.String".to_string(),
        Some(Value::List(_)) => "java.util.List".to_string(),
        Some(Value::Array(inner)) => format!("{}[]", natural_component(inner)),
        Some(Value::Null) | None => "java.lang.Object".to_string(),
    }
}

/// Floating token accepted by `Double.parseDouble`
fn float_token(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        let sign = if x > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else {
        format!("{}", x)
    }
}

fn sized(out: &mut String, tag: char, text: &str) {
    let _ = write!(out, "{}{}:{}", tag, text.encode_utf16().count(), text);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Everything the harness reported for one run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    /// One value per completed step
    pub values: Vec<Value>,
    /// Outermost link first
    pub fault: Option<Vec<Fault>>,
    /// `END` was seen; absent when the runtime died mid-plan
    pub finished: bool,
}

pub fn decode_run(stdout: &str) -> Result<RunReport, String> {
    let mut cursor = Cursor::new(stdout);
    let mut report = RunReport::default();

    while !cursor.at_end() {
        match cursor.word()? {
            "R" => report.values.push(cursor.value()?),
            "E" => report.fault = Some(cursor.fault_chain()?),
            "END" => {
                report.finished = true;
                break;
            }
            other => return Err(format!("unexpected record '{}'", other)),
        }
    }
    Ok(report)
}

/// Parse `describe` output into a descriptor for `name`
pub fn decode_descriptor(name: &str, stdout: &str) -> Result<TypeDescriptor, String> {
    let mut descriptor = TypeDescriptor {
        name: name.to_string(),
        ..Default::default()
    };

    let mut offset = 0;
    for line in stdout.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["C", erased, generic] => {
                let erased = type_list(erased);
                let params = member_params(&erased, &type_list(generic));
                descriptor.constructors.push(Constructor { params, erased });
            }
            ["M", kind, member, returns, erased, generic] => {
                let erased = type_list(erased);
                let params = member_params(&erased, &type_list(generic));
                descriptor.methods.push(Member {
                    name: member.to_string(),
                    is_static: *kind == "static",
                    params,
                    erased,
                    returns: returns.to_string(),
                });
            }
            ["E", ..] => {
                let chain = Cursor::new(&stdout[start..]).skip_word().and_then(|mut c| c.fault_chain())?;
                let rendered: Vec<String> = chain.iter().map(|f| f.to_string()).collect();
                return Err(rendered.join(" <- "));
            }
            ["END"] => return Ok(descriptor),
            [] => {}
            _ => return Err(format!("unexpected describe line '{}'", line.trim_end())),
        }
    }
    Err("describe output ended without END".to_string())
}

fn type_list(field: &str) -> Vec<String> {
    if field == "-" {
        Vec::new()
    } else {
        field.split(';').map(str::to_string).collect()
    }
}

/// Judge-level parameter types: generic names when they line up with the
/// erased list, erased names otherwise, opaque classes as a last resort
fn member_params(erased: &[String], generic: &[String]) -> Vec<JavaType> {
    erased
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            generic
                .get(idx)
                .filter(|_| generic.len() == erased.len())
                .and_then(|g| JavaType::resolve(g))
                .or_else(|| JavaType::resolve(raw))
                .unwrap_or_else(|| JavaType::Class(raw.clone()))
        })
        .collect()
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos >= self.text.len()
    }

    fn skip_word(mut self) -> Result<Self, String> {
        self.word()?;
        Ok(self)
    }

    fn word(&mut self) -> Result<&'a str, String> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return Err("unexpected end of output".to_string());
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn number<T: std::str::FromStr>(&mut self) -> Result<T, String> {
        let word = self.word()?;
        word.parse()
            .map_err(|_| format!("invalid number '{}'", word))
    }

    /// Floating results keep the JVM's own `toString` digits
    fn floating<T: std::str::FromStr>(&mut self) -> Result<Value, String> {
        let word = self.word()?;
        word.parse::<T>()
            .map(|_| Value::Text(word.to_string()))
            .map_err(|_| format!("invalid number '{}'", word))
    }

    fn tag(&mut self) -> Result<char, String> {
        self.skip_ws();
        let c = self
            .rest()
            .chars()
            .next()
            .ok_or_else(|| "missing value".to_string())?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    /// `<len>:<text>` with `len` in UTF-16 units
    fn sized(&mut self) -> Result<String, String> {
        let rest = self.rest();
        let colon = rest.find(':').ok_or_else(|| "missing ':' in text".to_string())?;
        let units: usize = rest[..colon]
            .parse()
            .map_err(|_| format!("invalid text length '{}'", &rest[..colon]))?;
        let body = &rest[colon + 1..];

        let mut consumed = 0usize;
        let mut seen = 0usize;
        for c in body.chars() {
            if seen == units {
                break;
            }
            seen += c.len_utf16();
            consumed += c.len_utf8();
        }
        if seen != units {
            return Err("text shorter than its length prefix".to_string());
        }

        self.pos += colon + 1 + consumed;
        Ok(body[..consumed].to_string())
    }

    fn value(&mut self) -> Result<Value, String> {
        match self.tag()? {
            'n' => Ok(Value::Null),
            'z' => match self.tag()? {
                '1' => Ok(Value::Bool(true)),
                '0' => Ok(Value::Bool(false)),
                other => Err(format!("invalid boolean '{}'", other)),
            },
            'i' | 'h' | 'b' => self.number().map(Value::Int),
            'j' => self.number().map(Value::Long),
            'd' => self.floating::<f64>(),
            'f' => self.floating::<f32>(),
            'c' => {
                let code: u32 = self.number()?;
                Ok(Value::Char(
                    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
                ))
            }
            's' => self.sized().map(Value::Str),
            't' => self.sized().map(Value::Text),
            'l' => {
                let n: usize = self.number()?;
                (0..n).map(|_| self.value()).collect::<Result<Vec<_>, _>>().map(Value::List)
            }
            'a' => {
                let _component = self.word()?;
                let n: usize = self.number()?;
                (0..n).map(|_| self.value()).collect::<Result<Vec<_>, _>>().map(Value::Array)
            }
            other => Err(format!("unknown value tag '{}'", other)),
        }
    }

    fn fault_chain(&mut self) -> Result<Vec<Fault>, String> {
        let n: usize = self.number()?;
        (0..n)
            .map(|_| {
                let name = match self.value()? {
                    Value::Str(s) => s,
                    other => return Err(format!("invalid fault name {:?}", other)),
                };
                let message = match self.value()? {
                    Value::Str(s) => Some(s),
                    _ => None,
                };
                Ok(Fault { name, message })
            })
            .collect()
    }
}
