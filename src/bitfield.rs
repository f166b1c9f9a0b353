//! The record generator bound to one [Schema].
//!
//! A [BitField] is built once per schema and reused for every record. It is cheap
//! to clone and can be shared between threads.
//!
//! ```
//! use bitrecord::bitfield::BitField;
//! use bitrecord::bits::RawBits;
//! use bitrecord::field::{EnumSpec, Field};
//!
//! let header = BitField::compile(&[
//!     Field::uint("id", 16).with_default(0u16),
//!     Field::bool("flag"),
//!     Field::padding("pad", 3),
//!     Field::enumeration("code", EnumSpec::new(4).variant("OK", 0).variant("RETRY", 1)),
//! ])
//! .unwrap();
//!
//! let record = header.from_data([("flag", true.into()), ("code", 1u8.into())]).unwrap();
//! let raw = header.encode(&record).unwrap();
//! assert_eq!(raw.to_u64(), Some(0x0000_81));
//!
//! let decoded = header.decode(&raw).unwrap();
//! assert_eq!(decoded.label("code"), Some("RETRY"));
//! ```

use std::sync::Arc;

use crate::{
    bits::RawBits,
    errors::{CompileError, RecordError},
    field::Field,
    record::Record,
    schema::Schema,
    value::Value,
};

/// Builds, decodes, encodes, validates and formats records of one schema.
#[derive(Debug, Clone)]
pub struct BitField {
    schema: Arc<Schema>,
}

impl BitField {
    pub fn new(schema: Schema) -> Self {
        BitField {
            schema: Arc::new(schema),
        }
    }

    /// Compiles `fields` and wraps the schema.
    pub fn compile(fields: &[Field]) -> Result<Self, CompileError> {
        Schema::compile(fields).map(Self::new)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Width of the packed value.
    pub fn total_bits(&self) -> usize {
        self.schema.total_bits()
    }

    /// Builds a record from `(name, value)` entries.
    ///
    /// Omitted fields take their default. Values are converted to the field's native
    /// kind and must fit its width. The finished record is validated before it is
    /// returned.
    pub fn from_data<I, K>(&self, data: I) -> Result<Record, RecordError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; self.schema.len()];

        for (name, value) in data {
            let name = name.as_ref();
            let index = self
                .schema
                .index_of(name)
                .ok_or_else(|| RecordError::UnknownField(name.to_string()))?;

            if slots[index].is_some() {
                return Err(RecordError::DuplicateField(name.to_string()));
            }

            slots[index] = Some(self.schema.coerce(index, value)?);
        }

        let values = self
            .schema
            .fields()
            .iter()
            .zip(slots)
            .map(|(field, slot)| {
                slot.or(field.default)
                    .ok_or_else(|| RecordError::MissingField(field.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.schema.validate_values(&values)?;

        Ok(Record::new(Arc::clone(&self.schema), values))
    }

    /// Builds a record from defaults only.
    pub fn defaults(&self) -> Result<Record, RecordError> {
        self.from_data(std::iter::empty::<(&str, Value)>())
    }

    /// Splits `raw` into field values and validates them.
    pub fn decode(&self, raw: &RawBits) -> Result<Record, RecordError> {
        self.check_width(raw.width())?;

        tracing::trace!(bits = raw.width(), "decoding record");

        let values = self
            .schema
            .fields()
            .iter()
            .map(|field| field.extract(raw))
            .collect::<Result<Vec<_>, _>>()?;

        self.schema.validate_values(&values)?;

        Ok(Record::new(Arc::clone(&self.schema), values))
    }

    /// Validates `record` and concatenates its field values, first field in the highest bits.
    pub fn encode(&self, record: &Record) -> Result<RawBits, RecordError> {
        self.validate(record)?;

        tracing::trace!(bits = self.schema.total_bits(), "encoding record");

        let mut raw = RawBits::zero(self.schema.total_bits());
        for (field, value) in self.schema.fields().iter().zip(record.values()) {
            field.insert(&mut raw, value)?;
        }

        Ok(raw)
    }

    /// Runs field validators in declaration order; the first failure is returned.
    pub fn validate(&self, record: &Record) -> Result<(), RecordError> {
        if !Arc::ptr_eq(&self.schema, record.schema_arc()) && !self.schema.same_layout(record.schema()) {
            return Err(RecordError::SchemaMismatch);
        }

        self.schema.validate_values(record.values())
    }

    /// Multi-line `name = value` listing in declaration order. For debugging only.
    pub fn format(&self, record: &Record) -> String {
        record.to_string()
    }

    fn check_width(&self, found: usize) -> Result<(), RecordError> {
        if found != self.schema.total_bits() {
            return Err(RecordError::WidthMismatch {
                expected: self.schema.total_bits(),
                found,
            });
        }

        Ok(())
    }
}
