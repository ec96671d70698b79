/// Runtime values. Booleans are the integers `0` and `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    /// Result of a `print` statement. The wrapped value is absent when the
    /// printed expression evaluated to nothing.
    PrintValue(Option<Box<Value>>),
}

impl Value {
    pub fn from_bool(b: bool) -> Self {
        Value::Integer(i64::from(b))
    }

    pub fn print(value: Option<Value>) -> Self {
        Value::PrintValue(value.map(Box::new))
    }

    /// Canonical textual form; `None` for a print of nothing.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Integer(n) => Some(n.to_string()),
            Value::PrintValue(inner) => inner.as_ref().and_then(|value| value.render()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::PrintValue(_) => None,
        }
    }
}

/// Only a value rendering exactly as `"1"` is true; `0`, any other integer, a
/// print of nothing and a missing value are all false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    matches!(value.and_then(Value::render).as_deref(), Some("1"))
}
