//! Parsing for human-readable byte sizes such as `512M` or `2GiB`.

use thiserror::Error;

/// Errors raised by [`parse_byte_size`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ByteSizeError {
    /// No digits preceded the unit suffix.
    #[error("`{input}` does not start with a whole number of bytes")]
    MissingNumber {
        /// Raw value supplied by the user.
        input: String,
    },
    /// The suffix is not one of `K`, `M`, `G`, `T` (optionally with `B` or `iB`).
    #[error("`{suffix}` is not a recognised size suffix")]
    UnknownSuffix {
        /// Unrecognised suffix.
        suffix: String,
    },
    /// The value does not fit in 64 bits.
    #[error("`{input}` exceeds the largest representable size")]
    Overflow {
        /// Raw value supplied by the user.
        input: String,
    },
}

/// Parses a byte count with an optional binary unit suffix.
///
/// Suffixes are case-insensitive and use powers of 1024: `K`, `KB` and `KiB`
/// all mean kibibytes.
///
/// # Errors
/// Returns [`ByteSizeError`] when the number is missing, the suffix is
/// unknown, or the result overflows `u64`.
///
/// # Examples
/// ```
/// use caplink_cli::cli::parse_byte_size;
///
/// assert_eq!(parse_byte_size("4096"), Ok(4096));
/// assert_eq!(parse_byte_size("64MiB"), Ok(64 * 1024 * 1024));
/// assert!(parse_byte_size("1.5G").is_err());
/// ```
pub fn parse_byte_size(input: &str) -> Result<u64, ByteSizeError> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(ByteSizeError::MissingNumber {
            input: input.to_owned(),
        });
    }
    let shift = suffix_shift(suffix)?;
    let overflow = || ByteSizeError::Overflow {
        input: input.to_owned(),
    };
    let value = digits.parse::<u64>().map_err(|_| overflow())?;
    value
        .checked_mul(1_u64 << shift)
        .ok_or_else(overflow)
}

fn suffix_shift(suffix: &str) -> Result<u32, ByteSizeError> {
    match suffix.to_ascii_lowercase().as_str() {
        "" | "b" => Ok(0),
        "k" | "kb" | "kib" => Ok(10),
        "m" | "mb" | "mib" => Ok(20),
        "g" | "gb" | "gib" => Ok(30),
        "t" | "tb" | "tib" => Ok(40),
        _ => Err(ByteSizeError::UnknownSuffix {
            suffix: suffix.to_owned(),
        }),
    }
}
