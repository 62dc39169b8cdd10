use std::borrow::Cow;

/// Node of an invoice tree.
///
/// Scalars carry their own type so the encoder can render them; lists and
/// maps keep insertion order, which is also the order tags are emitted in.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Decimal(f64),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Text form of a scalar, `None` for lists and maps.
    ///
    /// Decimals use the shortest round-trip form and always keep a
    /// fractional part (`100.0`, `0.0165`).
    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(value) => Some(Cow::Borrowed(value.as_str())),
            Value::Int(value) => Some(Cow::Owned(value.to_string())),
            Value::Decimal(value) => Some(Cow::Owned(format!("{value:?}"))),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Numeric view of a scalar. Text is parsed, so trees read back from
    /// XML answer too.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Decimal(value) => Some(*value),
            Value::Text(value) => value.trim().parse().ok(),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Lookup a map entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Follow a dotted path of map keys, e.g. `totais.totalGeral`.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |current, key| current.get(key))
    }

    /// Nesting depth; scalars are depth zero.
    pub fn depth(&self) -> usize {
        match self {
            Value::List(values) => 1 + values.iter().map(Value::depth).max().unwrap_or(0),
            Value::Map(map) => 1 + map.values().map(Value::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Structural equality that ignores scalar types and contents.
    ///
    /// An empty list or map matches a scalar, since all three encode to an
    /// empty element.
    pub fn same_shape(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(left), Value::List(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|(l, r)| l.same_shape(r))
            }
            (Value::Map(left), Value::Map(right)) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right.iter())
                        .all(|((lk, lv), (rk, rv))| lk == rk && lv.same_shape(rv))
            }
            (left, right) => left.is_leaf() && right.is_leaf(),
        }
    }

    fn is_leaf(&self) -> bool {
        match self {
            Value::List(values) => values.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => true,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

/// Insertion-ordered key/value map.
///
/// Keys are not deduplicated: the XML reader keeps repeated tags as
/// separate entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_text_keeps_fraction() {
        assert_eq!(Value::Decimal(100.0).scalar_text().as_deref(), Some("100.0"));
        assert_eq!(Value::Decimal(40.5).scalar_text().as_deref(), Some("40.5"));
        assert_eq!(Value::Decimal(0.0165).scalar_text().as_deref(), Some("0.0165"));
        assert_eq!(Value::Int(1).scalar_text().as_deref(), Some("1"));
        assert!(Value::List(Vec::new()).scalar_text().is_none());
    }

    #[test]
    fn pointer_follows_map_keys() {
        let value = Value::from(
            Map::new().with("totais", Map::new().with("totalGeral", 10.5)),
        );
        assert_eq!(
            value.pointer("totais.totalGeral").and_then(Value::as_f64),
            Some(10.5)
        );
        assert!(value.pointer("totais.missing").is_none());
    }

    #[test]
    fn depth_counts_containers() {
        let value = Value::from(
            Map::new()
                .with("tipo", "fatura_telecom")
                .with("itens", vec![Value::from(Map::new().with("total", 1.0))]),
        );
        assert_eq!(value.depth(), 3);
        assert_eq!(Value::from("x").depth(), 0);
    }

    #[test]
    fn shape_ignores_scalar_types() {
        let typed = Value::from(Map::new().with("a", 1_i64).with("b", vec![Value::from(2.5)]));
        let text = Value::from(Map::new().with("a", "1").with("b", vec![Value::from("2.5")]));
        assert!(typed.same_shape(&text));

        let renamed = Value::from(Map::new().with("a", "1").with("c", vec![Value::from("2.5")]));
        assert!(!typed.same_shape(&renamed));
    }
}
