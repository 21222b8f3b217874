//! Base implementation of records exchanged between environments and the training stack.
use super::Device;
use crate::error::GymLikeError;
use ndarray::ArrayD;
use std::collections::{
    hash_map::{IntoIter, Iter, Keys},
    HashMap,
};

/// Represents possible types of values that can be stored in a [`Record`].
///
/// # Variants
///
/// * `Scalar(f32)` - A single-precision scalar, e.g., reward with the default width
/// * `Double(f64)` - A double-precision scalar
/// * `Bool(bool)` - A flag, e.g., `done`
/// * `Int(i64)` - An integer, e.g., a discrete action
/// * `Array(ArrayD<f32>)` - An n-dimensional array with its shape
/// * `String(String)` - A text value
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single-precision scalar.
    Scalar(f32),

    /// A double-precision scalar.
    Double(f64),

    /// A boolean flag.
    Bool(bool),

    /// An integer.
    Int(i64),

    /// An n-dimensional array.
    Array(ArrayD<f32>),

    /// A text value.
    String(String),
}

impl RecordValue {
    /// Returns the name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordValue::Scalar(_) => "Scalar",
            RecordValue::Double(_) => "Double",
            RecordValue::Bool(_) => "Bool",
            RecordValue::Int(_) => "Int",
            RecordValue::Array(_) => "Array",
            RecordValue::String(_) => "String",
        }
    }

    /// Converts numerical values into an array.
    ///
    /// Scalars become zero-dimensional arrays. Returns `None` for strings.
    pub fn to_array(&self) -> Option<ArrayD<f32>> {
        let scalar = |v: f32| ArrayD::from_elem(ndarray::IxDyn(&[]), v);
        match self {
            RecordValue::Scalar(v) => Some(scalar(*v)),
            RecordValue::Double(v) => Some(scalar(*v as f32)),
            RecordValue::Bool(v) => Some(scalar(if *v { 1.0 } else { 0.0 })),
            RecordValue::Int(v) => Some(scalar(*v as f32)),
            RecordValue::Array(v) => Some(v.clone()),
            RecordValue::String(_) => None,
        }
    }
}

/// A key-addressable container of named tensor-like fields.
///
/// Besides the fields, a record carries a batch size and a [`Device`]. Both are
/// descriptors owned by the surrounding training stack; the record only keeps them
/// so that records produced by an environment match the records it consumed.
///
/// # Examples
///
/// ```rust
/// use gymlike_core::record::{Record, RecordValue};
///
/// let mut record = Record::empty();
/// record.insert("reward", RecordValue::Scalar(0.5));
/// record.insert("done", RecordValue::Bool(false));
///
/// assert_eq!(record.get_scalar("reward").unwrap(), 0.5);
/// assert!(!record.get_bool("done").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: HashMap<String, RecordValue>,
    batch_size: Vec<usize>,
    device: Device,
}

impl Default for Record {
    fn default() -> Self {
        Self::empty()
    }
}

impl Record {
    /// Creates an empty record with an empty batch size on CPU.
    pub fn empty() -> Self {
        Self::new(vec![], Device::Cpu)
    }

    /// Creates an empty record with the given batch size and device.
    pub fn new(batch_size: Vec<usize>, device: Device) -> Self {
        Self {
            fields: HashMap::new(),
            batch_size,
            device,
        }
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        let mut record = Self::empty();
        for (k, v) in s.iter() {
            record.insert(k.clone(), v.clone());
        }
        record
    }

    /// Batch size of the record.
    pub fn batch_size(&self) -> &[usize] {
        &self.batch_size
    }

    /// Device of the record.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.fields.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.fields.insert(k.into(), v);
    }

    /// Same as [`Record::insert`].
    pub fn set(&mut self, k: impl Into<String>, v: RecordValue) {
        self.insert(k, v)
    }

    /// Removes a key from the record, returning its value.
    pub fn remove(&mut self, k: &str) -> Option<RecordValue> {
        self.fields.remove(k)
    }

    /// Returns `true` if the record has the given key.
    pub fn contains_key(&self, k: &str) -> bool {
        self.fields.contains_key(k)
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.fields.iter()
    }

    /// Returns an iterator that consumes the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.fields.into_iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.fields.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// Values of `record` overwrite those of `self` on duplicated keys.
    /// The batch size and device of `self` are kept.
    pub fn merge(mut self, record: Record) -> Self {
        self.fields.extend(record.fields);
        self
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn get_or_key_error(&self, k: &str) -> Result<&RecordValue, GymLikeError> {
        self.fields
            .get(k)
            .ok_or_else(|| GymLikeError::RecordKey(k.to_string()))
    }

    fn type_error(k: &str, expected: &str) -> GymLikeError {
        GymLikeError::RecordValueType {
            key: k.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Gets a single-precision scalar from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not a `Scalar`.
    pub fn get_scalar(&self, k: &str) -> Result<f32, GymLikeError> {
        match self.get_or_key_error(k)? {
            RecordValue::Scalar(v) => Ok(*v),
            _ => Err(Self::type_error(k, "Scalar")),
        }
    }

    /// Gets a double-precision scalar from the record.
    ///
    /// `Scalar` values are widened.
    pub fn get_double(&self, k: &str) -> Result<f64, GymLikeError> {
        match self.get_or_key_error(k)? {
            RecordValue::Double(v) => Ok(*v),
            RecordValue::Scalar(v) => Ok(*v as f64),
            _ => Err(Self::type_error(k, "Double")),
        }
    }

    /// Gets a flag from the record.
    pub fn get_bool(&self, k: &str) -> Result<bool, GymLikeError> {
        match self.get_or_key_error(k)? {
            RecordValue::Bool(v) => Ok(*v),
            _ => Err(Self::type_error(k, "Bool")),
        }
    }

    /// Gets an n-dimensional array from the record.
    ///
    /// Numerical scalars are returned as zero-dimensional arrays.
    pub fn get_array(&self, k: &str) -> Result<ArrayD<f32>, GymLikeError> {
        self.get_or_key_error(k)?
            .to_array()
            .ok_or_else(|| Self::type_error(k, "Array"))
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, GymLikeError> {
        match self.get_or_key_error(k)? {
            RecordValue::String(s) => Ok(s.clone()),
            _ => Err(Self::type_error(k, "String")),
        }
    }
}
