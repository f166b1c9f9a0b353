use crate::{
    bits::{self, RawBits, fits_signed, fits_unsigned, sign_extend},
    errors::{BitsError, CompileError, ValidationError},
    field::{EnumSpec, Field, FieldKind, FieldValidator, IntSpec, PaddingSpec},
    validator::{Bound, Exact, Max, Min, Range, Validator},
    value::{Value, ValueKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledFieldKind {
    Bool,
    Int { signed: bool },
    Enum(EnumSpec),
    Padding { value: u64 },
}

/// A validated field with its resolved default, validator and position.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    pub kind: CompiledFieldKind,
    pub width: usize,
    /// Bit offset of the field's least significant bit in the packed value.
    pub shift: usize,
    pub default: Option<Value>,
    pub validator: Option<FieldValidator>,
}

/// Why a value could not be stored in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoerceError {
    TypeMismatch,
    OutOfRange,
}

impl TryFrom<&Field> for CompiledField {
    type Error = CompileError;

    fn try_from(value: &Field) -> Result<Self, Self::Error> {
        if value.name.trim().is_empty() {
            return Err(CompileError::InvalidFieldName(value.name.clone()));
        }

        let width = value.kind.width();
        if width == 0 || width > 64 {
            return Err(CompileError::InvalidFieldSize {
                field: value.name.clone(),
                width,
            });
        }

        let kind = match &value.kind {
            FieldKind::Bool => CompiledFieldKind::Bool,
            FieldKind::Int(spec) => CompiledFieldKind::Int {
                signed: spec.signed,
            },
            FieldKind::Enum(spec) => {
                check_enum(&value.name, spec)?;
                CompiledFieldKind::Enum(spec.clone())
            }
            FieldKind::Padding(spec) => {
                if !fits_unsigned(spec.value, width) {
                    return Err(CompileError::PaddingOutOfRange {
                        field: value.name.clone(),
                        width,
                    });
                }
                CompiledFieldKind::Padding { value: spec.value }
            }
        };

        let expected = value.kind.value_kind();
        let validator = match &value.validator {
            Some(explicit) => {
                if explicit.value_kind() != expected {
                    return Err(CompileError::ValidatorTypeMismatch {
                        field: value.name.clone(),
                        expected,
                        found: explicit.value_kind(),
                    });
                }
                Some(explicit.clone())
            }
            None => derive_validator(&value.name, &value.kind)?,
        };

        let mut compiled = CompiledField {
            name: value.name.clone(),
            kind,
            width,
            shift: 0,
            default: None,
            validator,
        };

        compiled.default = compiled.resolve_default(value)?;

        Ok(compiled)
    }
}

impl CompiledField {
    /// Kind of value this field stores.
    pub fn value_kind(&self) -> ValueKind {
        match self.kind {
            CompiledFieldKind::Bool => ValueKind::Bool,
            CompiledFieldKind::Int { signed: true } => ValueKind::Signed,
            _ => ValueKind::Unsigned,
        }
    }

    /// Runs the field's validator, if it has one.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator.check(value),
            None => Ok(()),
        }
    }

    /// Label of the enum variant stored in `value`, if this is an enum field.
    pub fn label(&self, value: &Value) -> Option<&str> {
        match (&self.kind, value) {
            (CompiledFieldKind::Enum(spec), Value::U64(v)) => spec.label(*v),
            _ => None,
        }
    }

    /// Converts `value` to this field's native kind, checking that it fits the width.
    pub(crate) fn coerce(&self, value: Value) -> Result<Value, CoerceError> {
        match self.value_kind() {
            ValueKind::Bool => match value {
                Value::Bool(_) => Ok(value),
                _ => Err(CoerceError::TypeMismatch),
            },
            ValueKind::Signed => {
                let v = match value {
                    Value::I64(v) => v,
                    Value::U64(v) => i64::try_from(v).map_err(|_| CoerceError::OutOfRange)?,
                    Value::Bool(_) => return Err(CoerceError::TypeMismatch),
                };

                if !fits_signed(v, self.width) {
                    return Err(CoerceError::OutOfRange);
                }

                Ok(Value::I64(v))
            }
            ValueKind::Unsigned => {
                let v = match value {
                    Value::U64(v) => v,
                    Value::I64(v) => u64::try_from(v).map_err(|_| CoerceError::OutOfRange)?,
                    Value::Bool(_) => return Err(CoerceError::TypeMismatch),
                };

                if !fits_unsigned(v, self.width) {
                    return Err(CoerceError::OutOfRange);
                }

                Ok(Value::U64(v))
            }
        }
    }

    /// Reads this field's bits out of `raw`.
    pub fn extract(&self, raw: &RawBits) -> Result<Value, BitsError> {
        let bits = raw.read_bits_at(self.shift, self.width)?;

        Ok(match self.kind {
            CompiledFieldKind::Bool => Value::Bool(bits != 0),
            CompiledFieldKind::Int { signed: true } => Value::I64(sign_extend(bits, self.width)),
            _ => Value::U64(bits),
        })
    }

    /// Writes `value` into this field's bits of `raw`.
    pub fn insert(&self, raw: &mut RawBits, value: &Value) -> Result<(), BitsError> {
        let bits = match *value {
            Value::Bool(b) => b as u64,
            Value::I64(v) => v as u64 & bits::mask(self.width),
            Value::U64(v) => v,
        };

        raw.write_bits_at(self.shift, self.width, bits)
    }

    fn resolve_default(&self, field: &Field) -> Result<Option<Value>, CompileError> {
        let default = if let CompiledFieldKind::Padding { value } = self.kind {
            if field.default.is_some_and(|d| d.as_u64() != Some(value)) {
                return Err(CompileError::PaddingDefaultMismatch(field.name.clone()));
            }

            Value::U64(value)
        } else {
            let Some(default) = field.default else {
                return Ok(None);
            };

            self.coerce(default).map_err(|e| match e {
                CoerceError::TypeMismatch => CompileError::DefaultTypeMismatch {
                    field: field.name.clone(),
                    expected: self.value_kind(),
                },
                CoerceError::OutOfRange => CompileError::DefaultOutOfRange {
                    field: field.name.clone(),
                    width: self.width,
                },
            })?
        };

        self.check(&default)
            .map_err(|error| CompileError::InvalidDefault {
                field: field.name.clone(),
                error,
            })?;

        Ok(Some(default))
    }
}

/// Validator implied by the field kind when no explicit one is given.
fn derive_validator(name: &str, kind: &FieldKind) -> Result<Option<FieldValidator>, CompileError> {
    match kind {
        FieldKind::Int(spec) if spec.signed => {
            Ok(derive_bounds::<i64>(name, spec)?.map(FieldValidator::Signed))
        }
        FieldKind::Int(spec) => Ok(derive_bounds::<u64>(name, spec)?.map(FieldValidator::Unsigned)),
        FieldKind::Padding(PaddingSpec {
            value,
            exact: true,
            error,
            ..
        }) => Ok(Some(FieldValidator::Unsigned(Validator::new(
            Exact::new(*value).with_error(error.clone()),
        )))),
        FieldKind::Bool | FieldKind::Enum(_) | FieldKind::Padding(_) => Ok(None),
    }
}

fn derive_bounds<T>(name: &str, spec: &IntSpec) -> Result<Option<Validator<T>>, CompileError>
where
    T: Bound + TryFrom<i128>,
{
    let convert = |bound: Option<i128>| {
        bound
            .map(T::try_from)
            .transpose()
            .map_err(|_| CompileError::InvalidBound(name.to_string()))
    };

    let min = convert(spec.min)?;
    let max = convert(spec.max)?;

    Ok(match (min, max) {
        (Some(min), Some(max)) => Some(
            Range::new(min, max)
                .with_errors(spec.min_error.clone(), spec.max_error.clone())
                .into(),
        ),
        (Some(min), None) => Some(Min::new(min).with_error(spec.min_error.clone()).into()),
        (None, Some(max)) => Some(Max::new(max).with_error(spec.max_error.clone()).into()),
        (None, None) => None,
    })
}

fn check_enum(name: &str, spec: &EnumSpec) -> Result<(), CompileError> {
    if spec.variants.is_empty() {
        return Err(CompileError::EmptyEnum(name.to_string()));
    }

    for (i, (label, value)) in spec.variants.iter().enumerate() {
        if label.trim().is_empty() || !fits_unsigned(*value, spec.width) {
            return Err(CompileError::InvalidEnumVariant {
                field: name.to_string(),
                variant: label.clone(),
            });
        }

        if spec.variants[..i].iter().any(|(l, _)| l == label) {
            return Err(CompileError::DuplicateEnumVariant {
                field: name.to_string(),
                variant: label.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        field::{EnumSpec, Field, IntSpec, PaddingSpec},
        validator::Validator,
    };

    use super::*;

    #[test]
    fn test_extract_insert_signed() {
        let mut field = CompiledField::try_from(&Field::sint("temp", 5)).unwrap();
        field.shift = 3;

        let mut raw = RawBits::zero(8);
        field.insert(&mut raw, &Value::I64(-2)).unwrap();
        assert_eq!(raw.to_u64(), Some(0b11110_000));
        assert_eq!(field.extract(&raw).unwrap(), Value::I64(-2));
    }

    #[test]
    fn test_extract_bool() {
        let field = CompiledField::try_from(&Field::bool("flag")).unwrap();
        let raw = RawBits::from_u64(1, 1).unwrap();
        assert_eq!(field.extract(&raw).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_coerce() {
        let signed = CompiledField::try_from(&Field::sint("s", 4)).unwrap();
        assert_eq!(signed.coerce(Value::U64(7)), Ok(Value::I64(7)));
        assert_eq!(signed.coerce(Value::I64(-8)), Ok(Value::I64(-8)));
        assert_eq!(signed.coerce(Value::I64(8)), Err(CoerceError::OutOfRange));
        assert_eq!(signed.coerce(Value::Bool(true)), Err(CoerceError::TypeMismatch));

        let unsigned = CompiledField::try_from(&Field::uint("u", 4)).unwrap();
        assert_eq!(unsigned.coerce(Value::I64(15)), Ok(Value::U64(15)));
        assert_eq!(unsigned.coerce(Value::I64(-1)), Err(CoerceError::OutOfRange));
        assert_eq!(unsigned.coerce(Value::U64(16)), Err(CoerceError::OutOfRange));

        let flag = CompiledField::try_from(&Field::bool("b")).unwrap();
        assert_eq!(flag.coerce(Value::U64(1)), Err(CoerceError::TypeMismatch));
    }

    #[test]
    fn test_invalid_field_size() {
        let err = CompiledField::try_from(&Field::uint("wide", 65)).unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidFieldSize {
                field: "wide".to_string(),
                width: 65
            }
        );

        assert!(CompiledField::try_from(&Field::padding("none", 0)).is_err());
    }

    #[test]
    fn test_invalid_field_name() {
        assert_eq!(
            CompiledField::try_from(&Field::bool("  ")).unwrap_err(),
            CompileError::InvalidFieldName("  ".to_string())
        );
    }

    #[test]
    fn test_derived_range() {
        let field = Field::new("ttl", IntSpec::unsigned(8).min(1).max(200));
        let compiled = CompiledField::try_from(&field).unwrap();

        assert_eq!(compiled.check(&Value::U64(1)), Ok(()));
        assert_eq!(compiled.check(&Value::U64(0)), Err(ValidationError::ValueBelowMinimum));
        assert_eq!(compiled.check(&Value::U64(201)), Err(ValidationError::ValueAboveMaximum));
    }

    #[test]
    fn test_derived_min_and_max_only() {
        let min_only = Field::new(
            "a",
            IntSpec::signed(8).min(-4).min_error(ValidationError::custom("Cold")),
        );
        let compiled = CompiledField::try_from(&min_only).unwrap();
        assert_eq!(compiled.check(&Value::I64(-5)), Err(ValidationError::custom("Cold")));
        assert_eq!(compiled.check(&Value::I64(127)), Ok(()));

        let max_only = Field::new("b", IntSpec::unsigned(8).max(9));
        let compiled = CompiledField::try_from(&max_only).unwrap();
        assert_eq!(compiled.check(&Value::U64(0)), Ok(()));
        assert_eq!(compiled.check(&Value::U64(10)), Err(ValidationError::ValueAboveMaximum));

        let unbounded = CompiledField::try_from(&Field::uint("c", 8)).unwrap();
        assert!(unbounded.validator.is_none());
    }

    #[test]
    fn test_explicit_validator_overrides_bounds() {
        let field = Field::new("n", IntSpec::unsigned(8).min(100).max(110))
            .with_validator(Validator::exact(5u64));
        let compiled = CompiledField::try_from(&field).unwrap();

        assert_eq!(compiled.check(&Value::U64(5)), Ok(()));
        assert_eq!(compiled.check(&Value::U64(105)), Err(ValidationError::InvalidFieldValue));
    }

    #[test]
    fn test_validator_type_mismatch() {
        let field = Field::bool("flag").with_validator(Validator::min(1u64));
        assert_eq!(
            CompiledField::try_from(&field).unwrap_err(),
            CompileError::ValidatorTypeMismatch {
                field: "flag".to_string(),
                expected: ValueKind::Bool,
                found: ValueKind::Unsigned,
            }
        );
    }

    #[test]
    fn test_invalid_bound() {
        let field = Field::new("u", IntSpec::unsigned(8).min(-1));
        assert_eq!(
            CompiledField::try_from(&field).unwrap_err(),
            CompileError::InvalidBound("u".to_string())
        );
    }

    #[test]
    fn test_default_must_pass_validator() {
        let field = Field::new("port", IntSpec::unsigned(16).min(1024)).with_default(80u16);
        assert_eq!(
            CompiledField::try_from(&field).unwrap_err(),
            CompileError::InvalidDefault {
                field: "port".to_string(),
                error: ValidationError::ValueBelowMinimum,
            }
        );

        let field = Field::new("port", IntSpec::unsigned(16).min(1024)).with_default(8080u16);
        let compiled = CompiledField::try_from(&field).unwrap();
        assert_eq!(compiled.default, Some(Value::U64(8080)));
    }

    #[test]
    fn test_default_type_and_range() {
        let field = Field::bool("flag").with_default(1u8);
        assert_eq!(
            CompiledField::try_from(&field).unwrap_err(),
            CompileError::DefaultTypeMismatch {
                field: "flag".to_string(),
                expected: ValueKind::Bool,
            }
        );

        let field = Field::uint("nibble", 4).with_default(16u8);
        assert_eq!(
            CompiledField::try_from(&field).unwrap_err(),
            CompileError::DefaultOutOfRange {
                field: "nibble".to_string(),
                width: 4,
            }
        );
    }

    #[test]
    fn test_padding() {
        let exact = CompiledField::try_from(&Field::padding("z", 3)).unwrap();
        assert_eq!(exact.default, Some(Value::U64(0)));
        assert_eq!(exact.check(&Value::U64(1)), Err(ValidationError::InvalidFieldValue));

        let loose = CompiledField::try_from(&Field::new("z", PaddingSpec::new(3).value(5).exact(false))).unwrap();
        assert_eq!(loose.default, Some(Value::U64(5)));
        assert_eq!(loose.check(&Value::U64(2)), Ok(()));

        let custom = Field::new("z", PaddingSpec::new(2).error(ValidationError::custom("Reserved")));
        let custom = CompiledField::try_from(&custom).unwrap();
        assert_eq!(custom.check(&Value::U64(3)), Err(ValidationError::custom("Reserved")));
    }

    #[test]
    fn test_padding_errors() {
        assert_eq!(
            CompiledField::try_from(&Field::new("z", PaddingSpec::new(2).value(4))).unwrap_err(),
            CompileError::PaddingOutOfRange {
                field: "z".to_string(),
                width: 2,
            }
        );

        let field = Field::padding("z", 2).with_default(1u8);
        assert_eq!(
            CompiledField::try_from(&field).unwrap_err(),
            CompileError::PaddingDefaultMismatch("z".to_string())
        );
    }

    #[test]
    fn test_enum_descriptor() {
        let empty = Field::enumeration("op", EnumSpec::new(4));
        assert_eq!(
            CompiledField::try_from(&empty).unwrap_err(),
            CompileError::EmptyEnum("op".to_string())
        );

        let wide = Field::enumeration("op", EnumSpec::new(2).variant("A", 0).variant("B", 4));
        assert_eq!(
            CompiledField::try_from(&wide).unwrap_err(),
            CompileError::InvalidEnumVariant {
                field: "op".to_string(),
                variant: "B".to_string(),
            }
        );

        let dup = Field::enumeration("op", EnumSpec::new(2).variant("A", 0).variant("A", 1));
        assert_eq!(
            CompiledField::try_from(&dup).unwrap_err(),
            CompileError::DuplicateEnumVariant {
                field: "op".to_string(),
                variant: "A".to_string(),
            }
        );
    }

    #[test]
    fn test_enum_has_no_validator() {
        let field = Field::enumeration("op", EnumSpec::new(4).variant("QUERY", 0));
        let compiled = CompiledField::try_from(&field).unwrap();

        assert!(compiled.validator.is_none());
        assert_eq!(compiled.check(&Value::U64(9)), Ok(()));
        assert_eq!(compiled.label(&Value::U64(0)), Some("QUERY"));
        assert_eq!(compiled.label(&Value::U64(9)), None);
    }
}
