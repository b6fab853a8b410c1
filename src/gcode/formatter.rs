use super::settings::NumberFormat;

/// Formats a numeric word value for G-code output.
///
/// * `decimal_places`: number of digits after the decimal point.
/// * `strip_trailing_zeros`: remove trailing zeros in the fractional part
///   (and the decimal point itself if no fractional digits remain).
/// * `suppress_leading_zero`: for values whose absolute value is less than 1,
///   omit the leading `0` (e.g. `0.5` → `.5`, `-0.5` → `-.5`).
///
/// A value that rounds to zero is never written with a sign.
pub fn format_coord(
    value: f64,
    decimal_places: u32,
    strip_trailing_zeros: bool,
    suppress_leading_zero: bool,
) -> String {
    let mut s = format!("{:.prec$}", value, prec = decimal_places as usize);

    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s.remove(0);
    }

    if strip_trailing_zeros && s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    suppress(s, suppress_leading_zero)
}

/// Formats `value` according to one settings category.
///
/// Without `decimal_places` the shortest text that parses back to the same
/// `f64` is written.
pub fn format_number(value: f64, fmt: &NumberFormat) -> String {
    match fmt.decimal_places {
        Some(places) => format_coord(
            value,
            places,
            !fmt.trailing_zeros,
            fmt.leading_zero_suppression,
        ),
        None => suppress(format_plain(value), fmt.leading_zero_suppression),
    }
}

/// Plain rendering for integer-like parameters (fan speed, dwell, temperatures,
/// tool numbers): `255.0` → `255`, `0.5` → `0.5`.
pub fn format_plain(value: f64) -> String {
    if value == 0.0 {
        // drops the sign of -0.0
        return "0".to_string();
    }
    format!("{}", value)
}

fn suppress(s: String, suppress_leading_zero: bool) -> String {
    if !suppress_leading_zero {
        return s;
    }
    if s.starts_with("0.") {
        s[1..].to_string()
    } else if s.starts_with("-0.") {
        format!("-{}", &s[2..])
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // format_coord: basic formatting
    // -------------------------------------------------------------------------

    #[test]
    fn format_coord_positive_integer_value() {
        assert_eq!(format_coord(5.0, 4, false, false), "5.0000");
    }

    #[test]
    fn format_coord_negative_value() {
        assert_eq!(format_coord(-12.5, 4, false, false), "-12.5000");
    }

    #[test]
    fn format_coord_zero_decimal_places_rounds() {
        assert_eq!(format_coord(599.6, 0, false, false), "600");
    }

    #[test]
    fn format_coord_negative_zero_loses_sign() {
        assert_eq!(format_coord(-0.00001, 4, false, false), "0.0000");
        assert_eq!(format_coord(-0.2, 0, false, false), "0");
    }

    // -------------------------------------------------------------------------
    // format_coord: flags
    // -------------------------------------------------------------------------

    #[test]
    fn strip_trailing_zeros_removes_zeros() {
        assert_eq!(format_coord(1.5, 4, true, false), "1.5");
        assert_eq!(format_coord(3.0, 4, true, false), "3");
    }

    #[test]
    fn suppress_leading_zero_fractions() {
        assert_eq!(format_coord(0.5, 3, false, true), ".500");
        assert_eq!(format_coord(-0.5, 3, false, true), "-.500");
        assert_eq!(format_coord(1.5, 3, false, true), "1.500");
    }

    #[test]
    fn strip_and_suppress_combined() {
        assert_eq!(format_coord(0.5, 3, true, true), ".5");
        assert_eq!(format_coord(0.0, 3, true, true), "0");
    }

    // -------------------------------------------------------------------------
    // format_number
    // -------------------------------------------------------------------------

    #[test]
    fn fixed_places_from_number_format() {
        let fmt = NumberFormat::fixed(4);
        assert_eq!(format_number(1.0, &fmt), "1.0000");
    }

    #[test]
    fn unrounded_number_format_writes_shortest_round_trip() {
        let fmt = NumberFormat::unrounded();
        assert_eq!(format_number(600.0, &fmt), "600");
        assert_eq!(format_number(0.1 + 0.2, &fmt), "0.30000000000000004");
    }

    #[test]
    fn unrounded_with_leading_zero_suppression() {
        let fmt = NumberFormat {
            leading_zero_suppression: true,
            ..NumberFormat::unrounded()
        };
        assert_eq!(format_number(0.25, &fmt), ".25");
    }

    // -------------------------------------------------------------------------
    // format_plain
    // -------------------------------------------------------------------------

    #[test]
    fn plain_drops_integral_fraction() {
        assert_eq!(format_plain(255.0), "255");
        assert_eq!(format_plain(1.5), "1.5");
        assert_eq!(format_plain(-0.0), "0");
    }
}
