//! Coordinates and the fixed-point scaling rules set by the Gerber `FS` directive.

/// A real-valued point in layer units (mm or inch).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The `FS` coordinate format: integer- and decimal-digit counts per axis.
///
/// Determines the scalar `10^(-decimals)` applied to every integer coordinate
/// on input, and its inverse on output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFormat {
    pub integer_digits: (u32, u32),
    pub decimal_digits: (u32, u32),
}

impl CoordinateFormat {
    pub fn new(integer_digits: (u32, u32), decimal_digits: (u32, u32)) -> Self {
        Self {
            integer_digits,
            decimal_digits,
        }
    }

    /// `(10^-decx, 10^-decy)`, the scalars applied to raw integer coordinates.
    pub fn scalars(&self) -> (f64, f64) {
        (
            10f64.powi(-(self.decimal_digits.0 as i32)),
            10f64.powi(-(self.decimal_digits.1 as i32)),
        )
    }

    /// Convert a raw fixed-point integer coordinate pair into a real-valued [`Point`].
    pub fn decode(&self, x: i32, y: i32) -> Point {
        let (sx, sy) = self.scalars();
        Point::new(x as f64 * sx, y as f64 * sy)
    }

    /// Convert a real-valued axis coordinate back into its fixed-point integer form.
    ///
    /// Returns `None` if the integer part would overflow the configured integer-digit
    /// count for that axis (§7 `Overflow`).
    pub fn encode_axis(&self, value: f64, axis_integer_digits: u32, axis_decimal_digits: u32) -> Option<i64> {
        let scale = 10f64.powi(axis_decimal_digits as i32);
        let encoded = (value * scale).round() as i64;
        let limit = 10i64.pow(axis_integer_digits) * 10i64.pow(axis_decimal_digits);
        if encoded.unsigned_abs() as i64 >= limit {
            None
        } else {
            Some(encoded)
        }
    }

    pub fn encode_x(&self, value: f64) -> Option<i64> {
        self.encode_axis(value, self.integer_digits.0, self.decimal_digits.0)
    }

    pub fn encode_y(&self, value: f64) -> Option<i64> {
        self.encode_axis(value, self.integer_digits.1, self.decimal_digits.1)
    }
}

impl Default for CoordinateFormat {
    /// The document-builder default: 4 integer / 6 decimal digits on both axes.
    fn default() -> Self {
        Self::new((4, 4), (6, 6))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_round_trip() {
        for (int_digits, dec_digits) in [(2u32, 6u32), (3, 4), (4, 6)] {
            let fmt = CoordinateFormat::new((int_digits, int_digits), (dec_digits, dec_digits));
            for raw in [0i32, 1, 42, -7, 1_000_000] {
                let point = fmt.decode(raw, 0);
                let back = fmt.encode_x(point.x).unwrap();
                assert_eq!(back, raw as i64, "round trip failed for {raw} at {dec_digits} decimals");
            }
        }
    }

    #[test]
    fn test_overflow() {
        let fmt = CoordinateFormat::new((2, 2), (6, 6));
        assert!(fmt.encode_x(200.0).is_none());
        assert!(fmt.encode_x(42.5).is_some());
    }
}
