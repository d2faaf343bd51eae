//! Low-level `nom` combinators shared by the Gerber and Excellon parsers.
//!
//! These are kept close to the teacher's original tokenizers (unsigned/positive/signed
//! numbers, names, fields) and generalised with coordinate-group extraction used by
//! both `D01`/`D02`/`D03` operations and Excellon `X…Y…` pairs.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{anychar, char, digit0, digit1, one_of},
    combinator::{map, map_res, opt, recognize, verify},
    multi::{many0, many1, many_m_n},
    sequence::{pair, preceded, terminated},
    IResult,
};

/// Parse a string into an i32.
fn into_i32(x: &str) -> i32 {
    x.parse().expect("digit1 guarantees a parseable integer")
}

/// Parse a non-negative integer to an i32.
pub fn unsigned_integer(input: &str) -> IResult<&str, i32> {
    map(digit1, into_i32)(input)
}

/// Parse a positive integer to an i32, tolerating leading zeros.
pub fn positive_integer(input: &str) -> IResult<&str, i32> {
    map(preceded(many0(char('0')), digit1), into_i32)(input)
}

/// Parse a signed integer to an i32.
pub fn integer(input: &str) -> IResult<&str, i32> {
    map(recognize(pair(opt(one_of("+-")), digit1)), into_i32)(input)
}

fn into_f64(x: &str) -> f64 {
    x.parse().expect("digit1/char('.') guarantees a parseable float")
}

/// Parse a positive decimal to an f64.
pub fn unsigned_decimal(input: &str) -> IResult<&str, f64> {
    map(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        into_f64,
    )(input)
}

/// Parse a signed decimal to an f64.
pub fn decimal(input: &str) -> IResult<&str, f64> {
    map(pair(opt(one_of("+-")), unsigned_decimal), |(sign, val)| {
        if sign == Some('-') {
            -val
        } else {
            val
        }
    })(input)
}

/// Parse the first character of a macro/aperture name fragment (excludes `.`).
fn name_fragment_first(input: &str) -> IResult<&str, char> {
    verify(anychar, |&c| c.is_alphabetic() || c == '_' || c == '$')(input)
}

/// Parse a non-first character of a name fragment (includes `.`).
fn name_fragment_rest(input: &str) -> IResult<&str, char> {
    verify(anychar, |&c| {
        c.is_alphanumeric() || c == '.' || c == '_' || c == '$'
    })(input)
}

/// Parse a macro or aperture template name: `[A-Za-z_$][A-Za-z0-9_$.]*`.
pub fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(name_fragment_first, many0(name_fragment_rest)))(input)
}

/// Extract every `[A-Z]([+-]?\d+)` group from an operation payload, mirroring
/// the `/[A-Z]([+-]?\d+)/g` regex in §4.2 of the specification.
pub fn coordinate_groups(input: &str) -> IResult<&str, Vec<(char, i32)>> {
    many1(pair(
        verify(anychar, |c: &char| c.is_ascii_uppercase()),
        integer,
    ))(input)
}

/// Parse `X<real>Y<real>`, mirroring the Excellon `X([+\-\d.]+)Y([+\-\d.]+)` regex.
pub fn xy_pair(input: &str) -> IResult<&str, (f64, f64)> {
    let (input, _) = char('X')(input)?;
    let (input, x) = decimal(input)?;
    let (input, _) = char('Y')(input)?;
    let (input, y) = decimal(input)?;
    Ok((input, (x, y)))
}

/// Parse an aperture D-code identifier (`D` followed by a positive integer `>= 10`).
pub fn aperture_d_code(input: &str) -> IResult<&str, i32> {
    map_res(preceded(char('D'), positive_integer), |id| {
        if id >= 10 {
            Ok(id)
        } else {
            Err("aperture identifiers must be >= 10")
        }
    })(input)
}

/// Parse exactly `count` decimal-digit characters into a `u32`.
pub fn fixed_digits(count: usize) -> impl Fn(&str) -> IResult<&str, u32> {
    move |input| {
        map(
            recognize(many_m_n(count, count, one_of("0123456789"))),
            |s: &str| s.parse().unwrap(),
        )(input)
    }
}

/// Match a literal tag, useful to keep call sites terse across both formats.
pub fn lit<'a>(value: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    tag(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(unsigned_integer("0"), Ok(("", 0)));
        assert_eq!(unsigned_integer("123"), Ok(("", 123)));
        assert!(unsigned_integer("+123").is_err());

        assert!(positive_integer("0").is_err());
        assert_eq!(positive_integer("0123"), Ok(("", 123)));

        assert_eq!(integer("0"), Ok(("", 0)));
        assert_eq!(integer("+123"), Ok(("", 123)));
        assert_eq!(integer("-123"), Ok(("", -123)));
    }

    #[test]
    fn test_decimals() {
        assert_eq!(decimal("0"), Ok(("", 0.)));
        assert_eq!(decimal(".1"), Ok(("", 0.1)));
        assert_eq!(decimal("-1.0"), Ok(("", -1.)));
        assert!(decimal(".").is_err());
    }

    #[test]
    fn test_name() {
        assert_eq!(name("ROUNDRECT,2X1"), Ok((",2X1", "ROUNDRECT")));
        assert_eq!(name("_foo.bar*"), Ok(("*", "_foo.bar")));
    }

    #[test]
    fn test_coordinate_groups() {
        assert_eq!(
            coordinate_groups("X1000000Y2000000"),
            Ok(("", vec![('X', 1000000), ('Y', 2000000)]))
        );
        assert_eq!(
            coordinate_groups("X2000000Y0I1000000J0"),
            Ok(("", vec![('X', 2000000), ('Y', 0), ('I', 1000000), ('J', 0)]))
        );
    }

    #[test]
    fn test_xy_pair() {
        assert_eq!(xy_pair("X100Y200"), Ok(("", (100.0, 200.0))));
        assert_eq!(xy_pair("X1.5Y-2.25"), Ok(("", (1.5, -2.25))));
    }

    #[test]
    fn test_aperture_d_code() {
        assert_eq!(aperture_d_code("D10"), Ok(("", 10)));
        assert!(aperture_d_code("D3").is_err());
    }
}
