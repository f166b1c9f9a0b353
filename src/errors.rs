//! Error types for schema compilation, validation and bit access.

use std::borrow::Cow;

use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced when compiling [crate::field::Field]s into a [crate::schema::Schema].
///
/// These are definition-time failures: a schema that compiles never produces them later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The field list is empty.
    #[error("schema has no fields")]
    EmptySchema,
    /// Field name is empty or whitespace only.
    #[error("invalid field name `{0}`")]
    InvalidFieldName(String),
    /// Two fields share a name.
    #[error("duplicate field name `{0}`")]
    DuplicateFieldName(String),
    /// Field width is 0 or greater than 64 bits.
    #[error("field `{field}` has invalid width {width}")]
    InvalidFieldSize { field: String, width: usize },
    /// Enumeration declares no variants.
    #[error("enum field `{0}` declares no variants")]
    EmptyEnum(String),
    /// Enumeration variant value does not fit the underlying width.
    #[error("enum field `{field}`: variant `{variant}` does not fit the field width")]
    InvalidEnumVariant { field: String, variant: String },
    /// Enumeration declares the same label twice.
    #[error("enum field `{field}`: duplicate variant `{variant}`")]
    DuplicateEnumVariant { field: String, variant: String },
    /// Validator value type does not match the field's value type.
    #[error("field `{field}` takes {expected} values but its validator checks {found} values")]
    ValidatorTypeMismatch {
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },
    /// A min or max bound is not representable in the field's value type.
    #[error("field `{0}` has a bound outside its value type")]
    InvalidBound(String),
    /// Default value has the wrong kind for the field.
    #[error("field `{field}` takes {expected} defaults")]
    DefaultTypeMismatch { field: String, expected: ValueKind },
    /// Default value does not fit the field width.
    #[error("default for field `{field}` does not fit in {width} bits")]
    DefaultOutOfRange { field: String, width: usize },
    /// Default value is rejected by the field's own validator.
    #[error("default for field `{field}` fails validation: {error}")]
    InvalidDefault {
        field: String,
        error: ValidationError,
    },
    /// Padding value does not fit the padding width.
    #[error("padding value for field `{field}` does not fit in {width} bits")]
    PaddingOutOfRange { field: String, width: usize },
    /// A padding field was given a default different from its pad value.
    #[error("padding field `{0}` has a default different from its pad value")]
    PaddingDefaultMismatch(String),
}

/// The named error returned by a [crate::validator::Validator] that rejects a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value differs from the required one (default for `Exact` and padding).
    #[error("invalid field value")]
    InvalidFieldValue,
    /// Value is below the configured minimum.
    #[error("value below minimum")]
    ValueBelowMinimum,
    /// Value is above the configured maximum.
    #[error("value above maximum")]
    ValueAboveMaximum,
    /// User-named error.
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl ValidationError {
    /// Creates a user-named error.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        ValidationError::Custom(name.into())
    }
}

/// Errors produced when building, decoding, encoding or validating a [crate::record::Record].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A field's validator rejected its value. Only the first failing field is reported.
    #[error("field `{field}`: {error}")]
    Invalid {
        field: String,
        error: ValidationError,
    },
    /// No value was supplied for a field without a default.
    #[error("missing value for field `{0}`")]
    MissingField(String),
    /// A value was supplied for a name the schema does not declare.
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// The same field was supplied twice.
    #[error("duplicate value for field `{0}`")]
    DuplicateField(String),
    /// Supplied value has the wrong kind for the field.
    #[error("field `{field}` takes {expected} values")]
    TypeMismatch { field: String, expected: ValueKind },
    /// Supplied value is not representable in the field width.
    #[error("value for field `{field}` does not fit in {width} bits")]
    OutOfRange { field: String, width: usize },
    /// Raw value width differs from the schema's total width.
    #[error("expected a {expected}-bit value, got {found} bits")]
    WidthMismatch { expected: usize, found: usize },
    /// Record was produced by a schema with a different layout.
    #[error("record does not match this schema")]
    SchemaMismatch,
    /// Low-level bit access failed.
    #[error(transparent)]
    Bits(#[from] BitsError),
}

impl RecordError {
    /// Returns the validator error if this is a validation failure.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            RecordError::Invalid { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Errors produced by [crate::bits::RawBits] reads, writes and constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitsError {
    /// Requested bit range is beyond the buffer width.
    #[error("bit range out of bounds")]
    OutOfBounds,
    /// More than 64 bits were requested in a single access.
    #[error("more than 64 bits requested")]
    TooManyBitsRead,
    /// Value has bits set above the target width.
    #[error("value does not fit in {width} bits")]
    ValueTooWide { width: usize },
    /// Hex literal contains a non-hex character.
    #[error("invalid hex digit `{0}`")]
    InvalidDigit(char),
    /// Hex literal has no digits.
    #[error("empty literal")]
    EmptyLiteral,
}
