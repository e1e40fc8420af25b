use crate::value::Value;
use crate::BuildError;
use im::HashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The filled-in field map a builder produces at finalize.
///
/// Backed by a persistent map, so cloning a record (and snapshotting a builder's store into one)
/// is constant time.
///
/// # Examples
///
/// ```rust
/// use fieldwise::{record, Value};
/// let r = record! { "email" => "a@b.com", "id" => 1 };
/// assert_eq!(r.get("id"), Some(&Value::Integer(1)));
/// assert_eq!(r.keys(), vec!["email", "id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Stores `value` under `field`, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.fields
    }

    pub fn to_json(&self) -> serde_json::Value {
        Value::Map(self.fields.clone()).to_json()
    }

    /// Deserializes the record into a typed Rust value.
    ///
    /// Absent optional fields deserialize as `None` when the target uses `Option`.
    ///
    /// # Errors
    /// Returns `BuildError::Conversion` when the record's shape does not match `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fieldwise::record;
    /// #[derive(serde::Deserialize)]
    /// struct User { email: String, id: u64, age: Option<u32> }
    /// let user: User = record! { "email" => "a@b.com", "id" => 1 }.deserialize().unwrap();
    /// assert_eq!(user.id, 1);
    /// assert_eq!(user.age, None);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, BuildError> {
        serde_json::from_value(self.to_json())
            .map_err(|e| BuildError::conversion(std::any::type_name::<T>(), e))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(fields: HashMap<String, Value>) -> Self {
        Self { fields }
    }
}

/// Builds a [`Record`] from `name => value` pairs.
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert($field, $value);
        )+
        record
    }};
}
