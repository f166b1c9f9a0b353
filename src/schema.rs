//! Schema: compiled, ordered set of fields with a fixed bit layout.
//!
//! Fields are declared most significant first. The first field occupies the highest
//! bits of the packed value and every following field sits directly below the previous
//! one, with no gaps.

use std::collections::HashMap;

use crate::{
    compiled::{CoerceError, CompiledField},
    errors::{CompileError, RecordError},
    field::Field,
    value::Value,
};

/// A compiled schema: list of [CompiledField]s and total bit length. Use [Schema::compile]
/// to build from [Field]s, then wrap it in a [crate::bitfield::BitField].
#[derive(Debug, Clone)]
pub struct Schema {
    total_bits: usize,
    fields: Vec<CompiledField>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Compiles a slice of [Field]s into a schema. Fails if the slice is empty or any
    /// field is invalid, including defaults rejected by their own validator.
    pub fn compile(fields: &[Field]) -> Result<Self, CompileError> {
        if fields.is_empty() {
            return Err(CompileError::EmptySchema);
        }

        let mut compiled_fields: Vec<CompiledField> = Vec::with_capacity(fields.len());
        let mut index = HashMap::with_capacity(fields.len());

        for field in fields {
            let compiled_field: CompiledField = field.try_into()?;

            if index
                .insert(compiled_field.name.clone(), compiled_fields.len())
                .is_some()
            {
                return Err(CompileError::DuplicateFieldName(compiled_field.name));
            }

            compiled_fields.push(compiled_field);
        }

        let total_bits: usize = compiled_fields.iter().map(|f| f.width).sum();

        let mut remaining = total_bits;
        for field in &mut compiled_fields {
            remaining -= field.width;
            field.shift = remaining;
        }

        tracing::debug!(
            fields = compiled_fields.len(),
            total_bits,
            "compiled bitfield schema"
        );

        Ok(Self {
            total_bits,
            fields: compiled_fields,
            index,
        })
    }

    /// Sum of all field widths; the width of the packed value.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Compiled fields in declaration order.
    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; a compiled schema has at least one field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if both schemas declare the same fields with the same kinds and positions.
    pub fn same_layout(&self, other: &Schema) -> bool {
        self.total_bits == other.total_bits
            && self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| {
                a.name == b.name && a.width == b.width && a.shift == b.shift && a.kind == b.kind
            })
    }

    /// Converts a caller-supplied value for field `index` to the field's native kind.
    pub(crate) fn coerce(&self, index: usize, value: Value) -> Result<Value, RecordError> {
        let field = &self.fields[index];

        field.coerce(value).map_err(|e| match e {
            CoerceError::TypeMismatch => RecordError::TypeMismatch {
                field: field.name.clone(),
                expected: field.value_kind(),
            },
            CoerceError::OutOfRange => RecordError::OutOfRange {
                field: field.name.clone(),
                width: field.width,
            },
        })
    }

    /// Runs every field validator in declaration order and stops at the first failure.
    pub(crate) fn validate_values(&self, values: &[Value]) -> Result<(), RecordError> {
        for (field, value) in self.fields.iter().zip(values) {
            field.check(value).map_err(|error| RecordError::Invalid {
                field: field.name.clone(),
                error,
            })?;
        }

        Ok(())
    }
}
