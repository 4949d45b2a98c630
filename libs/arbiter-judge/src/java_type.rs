/// Java Type Vocabulary
///
/// **Responsibility:**
/// The small closed set of parameter/return types the judge knows how to
/// parse arguments for and encode across the harness boundary. Boxed
/// wrappers collapse onto their primitive, `List`-like interfaces and
/// implementations collapse onto `List`, and any other fully qualified
/// `java.*` name is carried through as an opaque class.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    Int,
    Long,
    Double,
    Float,
    Boolean,
    Char,
    Byte,
    Short,
    String,
    Array(Box<JavaType>),
    /// Element type when the declaration is parameterised
    List(Option<Box<JavaType>>),
    /// Fully qualified class name without type arguments
    Class(std::string::String),
}

impl JavaType {
    /// Resolve a source-level or reflected type name.
    ///
    /// Returns `None` for names outside the vocabulary (type variables,
    /// unqualified user classes, unknown interfaces).
    pub fn resolve(name: &str) -> Option<JavaType> {
        let name: std::string::String = name.chars().filter(|c| !c.is_whitespace()).collect();
        if name.is_empty() {
            return None;
        }

        if let Some(inner) = name.strip_suffix("[]").or_else(|| name.strip_suffix("...")) {
            return JavaType::resolve(inner).map(|t| JavaType::Array(Box::new(t)));
        }

        let (base, type_arg) = match (name.find('<'), name.rfind('>')) {
            (Some(open), Some(close)) if close > open => (&name[..open], Some(&name[open + 1..close])),
            _ => (name.as_str(), None),
        };

        let primitive = match base {
            "int" | "Integer" | "java.lang.Integer" => Some(JavaType::Int),
            "long" | "Long" | "java.lang.Long" => Some(JavaType::Long),
            "double" | "Double" | "java.lang.Double" => Some(JavaType::Double),
            "float" | "Float" | "java.lang.Float" => Some(JavaType::Float),
            "boolean" | "Boolean" | "java.lang.Boolean" => Some(JavaType::Boolean),
            "char" | "Character" | "java.lang.Character" => Some(JavaType::Char),
            "byte" | "Byte" | "java.lang.Byte" => Some(JavaType::Byte),
            "short" | "Short" | "java.lang.Short" => Some(JavaType::Short),
            "String" | "java.lang.String" => Some(JavaType::String),
            "Object" => Some(JavaType::Class("java.lang.Object".to_string())),
            _ => None,
        };
        if primitive.is_some() {
            return primitive;
        }

        match base {
            "List" | "ArrayList" | "LinkedList" | "java.util.List" | "java.util.ArrayList"
            | "java.util.LinkedList" => Some(JavaType::List(
                type_arg.and_then(JavaType::resolve).map(Box::new),
            )),
            _ if base.starts_with("java.") => Some(JavaType::Class(base.to_string())),
            _ => None,
        }
    }

    /// Binary name as the harness resolves it (`int`, `java.lang.String`,
    /// `int[]` for nested arrays)
    pub fn java_name(&self) -> std::string::String {
        match self {
            JavaType::Int => "int".into(),
            JavaType::Long => "long".into(),
            JavaType::Double => "double".into(),
            JavaType::Float => "float".into(),
            JavaType::Boolean => "boolean".into(),
            JavaType::Char => "char".into(),
            JavaType::Byte => "byte".into(),
            JavaType::Short => "short".into(),
            JavaType::String => "java.lang.String".into(),
            JavaType::Array(inner) => format!("{}[]", inner.java_name()),
            JavaType::List(_) => "java.util.List".into(),
            JavaType::Class(name) => name.clone(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, JavaType::Array(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, JavaType::List(_))
    }
}
