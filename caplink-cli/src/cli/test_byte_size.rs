//! Tests for `parse_byte_size` and the `--memory-limit-bytes` flag.

use super::commands::build_caplink;
use super::test_helpers::{command_for, text_source};
use super::{ByteSizeError, parse_byte_size};

use rstest::rstest;

#[rstest]
#[case::plain_bytes("1024", 1024)]
#[case::zero("0", 0)]
#[case::bytes_suffix("512B", 512)]
#[case::padded(" 2k ", 2 * 1024)]
#[case::suffix_k_lower("100k", 100 * 1024)]
#[case::suffix_kb("100KB", 100 * 1024)]
#[case::suffix_kib("100KiB", 100 * 1024)]
#[case::suffix_m_upper("512M", 512 * 1024 * 1024)]
#[case::suffix_mib("512MiB", 512 * 1024 * 1024)]
#[case::suffix_g_lower("2g", 2 * 1024 * 1024 * 1024)]
#[case::suffix_gb("2GB", 2 * 1024 * 1024 * 1024)]
#[case::suffix_tib("1TiB", 1024_u64 * 1024 * 1024 * 1024)]
fn parse_byte_size_accepts_valid_input(#[case] input: &str, #[case] expected: u64) {
    assert_eq!(parse_byte_size(input), Ok(expected));
}

#[rstest]
#[case::empty("")]
#[case::only_suffix("M")]
#[case::negative("-100")]
fn parse_byte_size_requires_a_number(#[case] input: &str) {
    assert!(matches!(
        parse_byte_size(input),
        Err(ByteSizeError::MissingNumber { .. })
    ));
}

#[rstest]
#[case::unknown_suffix("100X", "X")]
#[case::decimal("1.5G", ".5G")]
#[case::petabytes("1P", "P")]
fn parse_byte_size_rejects_unknown_suffixes(#[case] input: &str, #[case] suffix: &str) {
    assert_eq!(
        parse_byte_size(input),
        Err(ByteSizeError::UnknownSuffix {
            suffix: suffix.to_owned()
        })
    );
}

#[rstest]
#[case::scaled("18446744073709551615T")]
#[case::too_many_digits("99999999999999999999999")]
fn parse_byte_size_rejects_overflow(#[case] input: &str) {
    assert!(matches!(
        parse_byte_size(input),
        Err(ByteSizeError::Overflow { .. })
    ));
}

#[rstest]
fn memory_limit_reaches_the_engine() {
    let mut command = command_for(text_source("unused.xyz".into()));
    command.memory_limit_bytes = Some(4096);
    let caplink = build_caplink(&command).expect("configuration must be valid");
    assert_eq!(caplink.memory_limit(), Some(4096));
}
