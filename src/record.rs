//! Immutable decoded or constructed bitfield instances.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{errors::RecordError, schema::Schema, value::Value};

/// One value per schema field, in declaration order.
///
/// Records are only created through [crate::bitfield::BitField] operations or
/// [Record::with], and every one of them has passed validation.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        Record { schema, values }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn schema_arc(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Field values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Declared label of an enum field's current value.
    ///
    /// `None` if the field is not an enum or holds a pattern with no declared variant.
    pub fn label(&self, name: &str) -> Option<&str> {
        let index = self.schema.index_of(name)?;
        self.schema.fields()[index].label(&self.values[index])
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(&self.values)
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    /// Returns a copy with `name` set to `value`. The copy is validated like any new record.
    pub fn with(&self, name: &str, value: impl Into<Value>) -> Result<Record, RecordError> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| RecordError::UnknownField(name.to_string()))?;

        let mut values = self.values.clone();
        values[index] = self.schema.coerce(index, value.into())?;
        self.schema.validate_values(&values)?;

        Ok(Record::new(Arc::clone(&self.schema), values))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
            && (Arc::ptr_eq(&self.schema, &other.schema) || self.schema.same_layout(&other.schema))
    }
}

impl Eq for Record {}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, value) in self.schema.fields().iter().zip(&self.values) {
            write!(f, "{} = {}", field.name, value)?;
            if let Some(label) = field.label(value) {
                write!(f, " ({label})")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
