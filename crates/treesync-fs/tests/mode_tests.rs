//! Mode grammar: exactly four digits, each in 0-7

use rstest::rstest;
use treesync_fs::{Error, Mode};

#[rstest]
#[case("0755", 0o755)]
#[case("0644", 0o644)]
#[case("0000", 0)]
#[case("7777", 0o7777)]
#[case("2750", 0o2750)]
fn accepts_four_octal_digits(#[case] input: &str, #[case] bits: u32) {
    let mode = Mode::parse(input).unwrap();
    assert_eq!(mode.bits(), bits);
    assert_eq!(mode.to_string(), input);
}

#[rstest]
#[case("755")]
#[case("075a")]
#[case("07555")]
#[case("0855")]
#[case("")]
#[case(" 755")]
#[case("0o755")]
#[case("-755")]
fn rejects_everything_else(#[case] input: &str) {
    let err = Mode::parse(input).unwrap_err();
    assert!(
        matches!(err, Error::InvalidMode { ref value, .. } if value == input),
        "unexpected error for {:?}: {}",
        input,
        err
    );
}

#[test]
fn from_str_matches_parse() {
    let parsed: Mode = "0600".parse().unwrap();
    assert_eq!(parsed, Mode::parse("0600").unwrap());
}
