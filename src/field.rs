//! Definition of logical fields used to build a [crate::schema::Schema].
//!
//! Fields are declared most significant first. A declaration is only a description:
//! nothing is checked until [crate::schema::Schema::compile].

use crate::{
    errors::ValidationError,
    validator::Validator,
    value::{Value, ValueKind},
};

/// A single named field in a schema.
#[derive(Debug, Clone)]
pub struct Field {
    /// Name used for lookups and in the formatted output.
    pub name: String,
    /// Field type and its kind-specific options.
    pub kind: FieldKind,
    /// Value used by `from_data` when the field is omitted.
    pub default: Option<Value>,
    /// Explicit validator. Takes precedence over anything derived from the kind.
    pub validator: Option<FieldValidator>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        Field {
            name: name.into(),
            kind: kind.into(),
            default: None,
            validator: None,
        }
    }

    /// One-bit boolean field.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    /// Unsigned integer field without bounds.
    pub fn uint(name: impl Into<String>, width: usize) -> Self {
        Self::new(name, IntSpec::unsigned(width))
    }

    /// Signed (two's complement) integer field without bounds.
    pub fn sint(name: impl Into<String>, width: usize) -> Self {
        Self::new(name, IntSpec::signed(width))
    }

    pub fn enumeration(name: impl Into<String>, spec: EnumSpec) -> Self {
        Self::new(name, spec)
    }

    /// Zero-valued padding that must stay zero.
    pub fn padding(name: impl Into<String>, width: usize) -> Self {
        Self::new(name, PaddingSpec::new(width))
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_validator(mut self, validator: impl Into<FieldValidator>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    /// Width of the field in bits.
    pub fn width(&self) -> usize {
        self.kind.width()
    }
}

/// Field type.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Single bit; nonzero decodes as `true`.
    Bool,
    Int(IntSpec),
    Enum(EnumSpec),
    Padding(PaddingSpec),
}

impl FieldKind {
    pub fn width(&self) -> usize {
        match self {
            FieldKind::Bool => 1,
            FieldKind::Int(spec) => spec.width,
            FieldKind::Enum(spec) => spec.width,
            FieldKind::Padding(spec) => spec.width,
        }
    }

    /// Kind of value stored by fields of this type.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FieldKind::Bool => ValueKind::Bool,
            FieldKind::Int(spec) if spec.signed => ValueKind::Signed,
            _ => ValueKind::Unsigned,
        }
    }
}

impl From<IntSpec> for FieldKind {
    fn from(value: IntSpec) -> Self {
        FieldKind::Int(value)
    }
}

impl From<EnumSpec> for FieldKind {
    fn from(value: EnumSpec) -> Self {
        FieldKind::Enum(value)
    }
}

impl From<PaddingSpec> for FieldKind {
    fn from(value: PaddingSpec) -> Self {
        FieldKind::Padding(value)
    }
}

/// Integer field options.
///
/// Bounds are only used when the field has no explicit validator: both bounds give a
/// [crate::validator::Range], one bound gives a [crate::validator::Min] or
/// [crate::validator::Max].
#[derive(Debug, Clone)]
pub struct IntSpec {
    pub width: usize,
    pub signed: bool,
    pub min: Option<i128>,
    pub max: Option<i128>,
    pub min_error: ValidationError,
    pub max_error: ValidationError,
}

impl IntSpec {
    pub fn unsigned(width: usize) -> Self {
        IntSpec {
            width,
            signed: false,
            min: None,
            max: None,
            min_error: ValidationError::ValueBelowMinimum,
            max_error: ValidationError::ValueAboveMaximum,
        }
    }

    pub fn signed(width: usize) -> Self {
        IntSpec {
            signed: true,
            ..Self::unsigned(width)
        }
    }

    pub fn min(mut self, bound: impl Into<i128>) -> Self {
        self.min = Some(bound.into());
        self
    }

    pub fn max(mut self, bound: impl Into<i128>) -> Self {
        self.max = Some(bound.into());
        self
    }

    pub fn min_error(mut self, error: ValidationError) -> Self {
        self.min_error = error;
        self
    }

    pub fn max_error(mut self, error: ValidationError) -> Self {
        self.max_error = error;
        self
    }
}

/// Enumeration field: an underlying width and its declared `(label, value)` variants.
///
/// Decoding never checks that a bit pattern is one of the declared variants. Use
/// [EnumSpec::label] (or [crate::record::Record::label]) before treating a decoded
/// value as a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    pub width: usize,
    pub variants: Vec<(String, u64)>,
}

impl EnumSpec {
    pub fn new(width: usize) -> Self {
        EnumSpec {
            width,
            variants: Vec::new(),
        }
    }

    pub fn variant(mut self, label: impl Into<String>, value: u64) -> Self {
        self.variants.push((label.into(), value));
        self
    }

    /// Label declared for `value`, if any.
    pub fn label(&self, value: u64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(label, _)| label.as_str())
    }

    /// Value declared for `label`, if any.
    pub fn value_of(&self, label: &str) -> Option<u64> {
        self.variants
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }
}

/// Padding field options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddingSpec {
    pub width: usize,
    /// Pad value, also the field's default.
    pub value: u64,
    /// If true, the field must always equal `value`.
    pub exact: bool,
    /// Error returned when an exact padding field holds another value.
    pub error: ValidationError,
}

impl PaddingSpec {
    pub fn new(width: usize) -> Self {
        PaddingSpec {
            width,
            value: 0,
            exact: true,
            error: ValidationError::InvalidFieldValue,
        }
    }

    pub fn value(mut self, value: u64) -> Self {
        self.value = value;
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn error(mut self, error: ValidationError) -> Self {
        self.error = error;
        self
    }
}

/// A validator tagged with the value type it checks.
#[derive(Debug, Clone)]
pub enum FieldValidator {
    Bool(Validator<bool>),
    Signed(Validator<i64>),
    Unsigned(Validator<u64>),
}

impl FieldValidator {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FieldValidator::Bool(_) => ValueKind::Bool,
            FieldValidator::Signed(_) => ValueKind::Signed,
            FieldValidator::Unsigned(_) => ValueKind::Unsigned,
        }
    }

    /// Runs the validator. Values of another kind never pass.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match (self, value) {
            (FieldValidator::Bool(v), Value::Bool(b)) => v.validate(b),
            (FieldValidator::Signed(v), Value::I64(x)) => v.validate(x),
            (FieldValidator::Unsigned(v), Value::U64(x)) => v.validate(x),
            _ => Err(ValidationError::InvalidFieldValue),
        }
    }
}

impl From<Validator<bool>> for FieldValidator {
    fn from(value: Validator<bool>) -> Self {
        FieldValidator::Bool(value)
    }
}

impl From<Validator<i64>> for FieldValidator {
    fn from(value: Validator<i64>) -> Self {
        FieldValidator::Signed(value)
    }
}

impl From<Validator<u64>> for FieldValidator {
    fn from(value: Validator<u64>) -> Self {
        FieldValidator::Unsigned(value)
    }
}
