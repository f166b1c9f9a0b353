//! # bitrecord
//!
//! Schema-driven, bit-packed records with per-field validation.
//!
//! Declare the fields of a fixed-width record (protocol header, register map, ...)
//! most significant first, compile them into a [schema::Schema], and use a
//! [bitfield::BitField] to decode, encode, validate and format records. The packed
//! form is a [bits::RawBits]: an unsigned integer of exactly the schema's total width.
//! Converting it to or from bytes is left to the caller.
//!
//! Every field may carry a [validator::Validator]. Integer bounds derive one
//! automatically, exact padding always has one, and an explicit validator replaces
//! anything derived. Defaults are checked against their validator when the schema
//! is compiled.
//!
//! ## Example
//!
//! ```
//! use bitrecord::bitfield::BitField;
//! use bitrecord::bits::RawBits;
//! use bitrecord::errors::{RecordError, ValidationError};
//! use bitrecord::field::{Field, IntSpec};
//! use bitrecord::value::Value;
//!
//! let register = BitField::compile(&[
//!     Field::bool("enable").with_default(false),
//!     Field::padding("reserved", 3),
//!     Field::new("divider", IntSpec::unsigned(4).min(1)),
//! ])
//! .unwrap();
//!
//! let record = register.from_data([("divider", Value::U64(5))]).unwrap();
//! assert_eq!(register.encode(&record).unwrap().to_u64(), Some(0x05));
//!
//! let err = register.decode(&RawBits::from_u64(8, 0x80).unwrap()).unwrap_err();
//! assert_eq!(
//!     err,
//!     RecordError::Invalid {
//!         field: "divider".to_string(),
//!         error: ValidationError::ValueBelowMinimum,
//!     }
//! );
//! ```

pub mod bitfield;
pub mod bits;
pub mod compiled;
pub mod errors;
pub mod field;
pub mod record;
pub mod schema;
pub mod validator;
pub mod value;

#[cfg(feature = "serde")]
pub mod serde;

pub use bitfield::BitField;
pub use record::Record;
pub use schema::Schema;
