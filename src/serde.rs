//! JSON‑deserializable schema description.
//!
//! These types describe the *shape* of a bitfield. They are intended to be built
//! from JSON (for example a register map shipped with your application) and then
//! compiled into a [crate::schema::Schema]. Custom validators cannot be expressed
//! here; integer bounds and the error names reported by bounds and padding can.
//!
//! ```
//! use bitrecord::serde::SchemaDef;
//!
//! let json = r#"{
//!     "fields": [
//!         { "name": "version", "kind": { "type": "Int", "width": 4, "max": 2 } },
//!         { "name": "urgent", "kind": { "type": "Bool" }, "default": false },
//!         { "name": "reserved", "kind": { "type": "Padding", "width": 3 } }
//!     ]
//! }"#;
//!
//! let def: SchemaDef = serde_json::from_str(json).unwrap();
//! let schema = def.compile().unwrap();
//! assert_eq!(schema.total_bits(), 8);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    errors::{CompileError, ValidationError},
    field::{EnumSpec, Field, FieldKind, IntSpec, PaddingSpec},
    schema::Schema,
    value::Value,
};

/// Top‑level schema definition consisting of a list of fields, most significant first.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    pub fields: Vec<FieldDef>,
}

impl SchemaDef {
    /// Converts every field and compiles the result.
    pub fn compile(self) -> Result<Schema, CompileError> {
        let fields: Vec<Field> = self.fields.into_iter().map(Into::into).collect();
        Schema::compile(&fields)
    }
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Field name; used for lookups and in formatted output.
    pub name: String,
    /// Field type and its options.
    pub kind: FieldKindDef,
    /// Value used when the field is omitted from `from_data`.
    #[serde(default)]
    pub default: Option<Value>,
}

/// Kind of field in the schema.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldKindDef {
    /// One‑bit boolean.
    Bool,
    /// Integer with optional inclusive bounds.
    ///
    /// Bounds are limited to the `i64` range in this form.
    Int {
        width: usize,
        #[serde(default)]
        signed: bool,
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
        /// Error reported below `min`.
        #[serde(default)]
        min_error: Option<String>,
        /// Error reported above `max`.
        #[serde(default)]
        max_error: Option<String>,
    },
    /// Enumeration with declared variants.
    Enum {
        width: usize,
        variants: Vec<VariantDef>,
    },
    /// Reserved bits.
    Padding {
        width: usize,
        #[serde(default)]
        value: u64,
        #[serde(default = "default_exact")]
        exact: bool,
        /// Error reported when exact padding bits differ from `value`.
        #[serde(default)]
        error: Option<String>,
    },
}

/// A single enumeration label.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VariantDef {
    pub label: String,
    pub value: u64,
}

fn default_exact() -> bool {
    true
}

/// Maps an error name to the built-in variant it spells, or a custom error.
fn error_named(name: String) -> ValidationError {
    match name.as_str() {
        "InvalidFieldValue" => ValidationError::InvalidFieldValue,
        "ValueBelowMinimum" => ValidationError::ValueBelowMinimum,
        "ValueAboveMaximum" => ValidationError::ValueAboveMaximum,
        _ => ValidationError::custom(name),
    }
}

impl From<FieldDef> for Field {
    fn from(value: FieldDef) -> Self {
        Field {
            name: value.name,
            kind: value.kind.into(),
            default: value.default,
            validator: None,
        }
    }
}

impl From<FieldKindDef> for FieldKind {
    fn from(value: FieldKindDef) -> Self {
        match value {
            FieldKindDef::Bool => FieldKind::Bool,
            FieldKindDef::Int {
                width,
                signed,
                min,
                max,
                min_error,
                max_error,
            } => {
                let mut spec = if signed {
                    IntSpec::signed(width)
                } else {
                    IntSpec::unsigned(width)
                };
                spec.min = min.map(i128::from);
                spec.max = max.map(i128::from);
                if let Some(name) = min_error {
                    spec = spec.min_error(error_named(name));
                }
                if let Some(name) = max_error {
                    spec = spec.max_error(error_named(name));
                }
                FieldKind::Int(spec)
            }
            FieldKindDef::Enum { width, variants } => FieldKind::Enum(EnumSpec {
                width,
                variants: variants.into_iter().map(|v| (v.label, v.value)).collect(),
            }),
            FieldKindDef::Padding {
                width,
                value,
                exact,
                error,
            } => {
                let mut spec = PaddingSpec::new(width).value(value).exact(exact);
                if let Some(name) = error {
                    spec = spec.error(error_named(name));
                }
                FieldKind::Padding(spec)
            }
        }
    }
}
