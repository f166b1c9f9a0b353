//! Fixed-width unsigned integer used as the packed form of a record.
//!
//! Bits are addressed from the least significant end: bit 0 is the lowest bit of the
//! first word. Words are stored least significant first and bits above the width are
//! always zero.

use std::fmt;

use crate::errors::BitsError;

/// An unsigned integer of exactly `width` bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawBits {
    width: usize,
    words: Vec<u64>,
}

impl RawBits {
    /// Creates an all-zero value of `width` bits.
    pub fn zero(width: usize) -> Self {
        RawBits {
            width,
            words: vec![0; width.div_ceil(64)],
        }
    }

    pub fn from_u64(width: usize, value: u64) -> Result<Self, BitsError> {
        Self::from_u128(width, value as u128)
    }

    /// Creates a `width`-bit value. Fails if `value` has bits set at or above `width`.
    pub fn from_u128(width: usize, value: u128) -> Result<Self, BitsError> {
        if width < 128 && value >> width != 0 {
            return Err(BitsError::ValueTooWide { width });
        }

        let mut bits = Self::zero(width);
        if let Some(low) = bits.words.get_mut(0) {
            *low = value as u64;
        }
        if let Some(high) = bits.words.get_mut(1) {
            *high = (value >> 64) as u64;
        }

        Ok(bits)
    }

    /// Creates a `width`-bit value from words given least significant first.
    ///
    /// Missing words are zero; extra words must be zero.
    pub fn from_words(width: usize, words: &[u64]) -> Result<Self, BitsError> {
        let mut bits = Self::zero(width);

        for (i, &word) in words.iter().enumerate() {
            let pos = i * 64;
            if pos >= width {
                if word != 0 {
                    return Err(BitsError::ValueTooWide { width });
                }
                continue;
            }

            let len = (width - pos).min(64);
            bits.write_bits_at(pos, len, word)
                .map_err(|_| BitsError::ValueTooWide { width })?;
        }

        Ok(bits)
    }

    /// Parses a hex literal (optional `0x` prefix, `_` separators allowed).
    pub fn from_hex(width: usize, literal: &str) -> Result<Self, BitsError> {
        let digits = literal
            .strip_prefix("0x")
            .or_else(|| literal.strip_prefix("0X"))
            .unwrap_or(literal);

        let mut bits = Self::zero(width);
        let mut seen = false;

        for (i, c) in digits.chars().rev().filter(|c| *c != '_').enumerate() {
            seen = true;
            let nibble = c.to_digit(16).ok_or(BitsError::InvalidDigit(c))? as u64;
            if nibble == 0 {
                continue;
            }

            let pos = i * 4;
            if pos >= width {
                return Err(BitsError::ValueTooWide { width });
            }

            let len = (width - pos).min(4);
            bits.write_bits_at(pos, len, nibble)
                .map_err(|_| BitsError::ValueTooWide { width })?;
        }

        if !seen {
            return Err(BitsError::EmptyLiteral);
        }

        Ok(bits)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Backing words, least significant first.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Returns the value as `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.words.iter().skip(1).any(|w| *w != 0) {
            return None;
        }

        Some(self.words.first().copied().unwrap_or(0))
    }

    /// Returns the value as `u128` if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.words.iter().skip(2).any(|w| *w != 0) {
            return None;
        }

        let low = self.words.first().copied().unwrap_or(0) as u128;
        let high = self.words.get(1).copied().unwrap_or(0) as u128;

        Some((high << 64) | low)
    }

    /// Reads `n` bits (max 64) whose lowest bit is at `bit_pos`.
    pub fn read_bits_at(&self, bit_pos: usize, n: usize) -> Result<u64, BitsError> {
        self.check_range(bit_pos, n)?;
        if n == 0 {
            return Ok(0);
        }

        let index = bit_pos / 64;
        let shift = bit_pos % 64;

        let mut value = self.words[index] >> shift;
        if shift + n > 64 {
            value |= self.words[index + 1] << (64 - shift);
        }

        Ok(value & mask(n))
    }

    /// Overwrites `n` bits (max 64) whose lowest bit is at `bit_pos` with `value`.
    pub fn write_bits_at(&mut self, bit_pos: usize, n: usize, value: u64) -> Result<(), BitsError> {
        self.check_range(bit_pos, n)?;
        if value & !mask(n) != 0 {
            return Err(BitsError::ValueTooWide { width: n });
        }
        if n == 0 {
            return Ok(());
        }

        let index = bit_pos / 64;
        let shift = bit_pos % 64;
        let m = mask(n);

        self.words[index] = (self.words[index] & !(m << shift)) | (value << shift);
        if shift + n > 64 {
            let spill = 64 - shift;
            self.words[index + 1] = (self.words[index + 1] & !(m >> spill)) | (value >> spill);
        }

        Ok(())
    }

    fn check_range(&self, bit_pos: usize, n: usize) -> Result<(), BitsError> {
        if n > 64 {
            return Err(BitsError::TooManyBitsRead);
        }

        if bit_pos.checked_add(n).map_or(true, |end| end > self.width) {
            return Err(BitsError::OutOfBounds);
        }

        Ok(())
    }

    fn fmt_radix(&self, f: &mut fmt::Formatter<'_>, bits_per_digit: usize, upper: bool, prefix: &str) -> fmt::Result {
        let digits_total = self.width.div_ceil(bits_per_digit);
        let mut out = String::with_capacity(digits_total);

        for d in (0..digits_total).rev() {
            let pos = d * bits_per_digit;
            let len = (self.width - pos).min(bits_per_digit);
            let digit = self.read_bits_at(pos, len).map_err(|_| fmt::Error)?;
            if out.is_empty() && digit == 0 {
                continue;
            }

            let c = char::from_digit(digit as u32, 1u32 << bits_per_digit).ok_or(fmt::Error)?;
            out.push(if upper { c.to_ascii_uppercase() } else { c });
        }

        if out.is_empty() {
            out.push('0');
        }

        f.pad_integral(true, prefix, &out)
    }
}

impl fmt::LowerHex for RawBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_radix(f, 4, false, "0x")
    }
}

impl fmt::UpperHex for RawBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_radix(f, 4, true, "0x")
    }
}

impl fmt::Binary for RawBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_radix(f, 1, false, "0b")
    }
}

/// Mask with the low `n` bits set.
pub fn mask(n: usize) -> u64 {
    if n >= 64 { u64::MAX } else { (1u64 << n) - 1 }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
///
/// Zero bits extend to `0`; 64 or more leave `value` unchanged.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    if bits == 0 {
        return 0;
    }
    if bits >= 64 {
        return value as i64;
    }

    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Returns true if `value` is representable as a `bits`-wide two's complement integer.
pub fn fits_signed(value: i64, bits: usize) -> bool {
    if bits == 0 {
        return value == 0;
    }
    if bits >= 64 {
        return true;
    }

    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;

    (min..=max).contains(&value)
}

/// Returns true if `value` is representable in `bits` unsigned bits.
pub fn fits_unsigned(value: u64, bits: usize) -> bool {
    value & !mask(bits) == 0
}
