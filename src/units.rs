//! Coordinate modes, unit systems and the small conversions between the
//! per-second speeds callers supply and the per-minute speeds G-code carries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How move operands are interpreted (`G90` / `G91`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateMode {
    /// Operands overwrite the matching coordinate of the current position.
    #[default]
    Absolute,
    /// Operands are added to the current position.
    Relative,
}

/// Distance units in effect (`G21` / `G20`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Millimeters,
    Inches,
}

impl UnitSystem {
    /// Short label used for axis captions (`"mm"` / `"in"`).
    pub fn label(self) -> &'static str {
        match self {
            UnitSystem::Millimeters => "mm",
            UnitSystem::Inches => "in",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extruder distance mode (`M82` / `M83`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrusionMode {
    #[default]
    Absolute,
    Relative,
}

pub const MM_PER_INCH: f64 = 25.4;

/// Distance per second → distance per minute.
pub fn per_second_to_per_minute(v: f64) -> f64 {
    v * 60.0
}

/// Distance per minute → distance per second.
pub fn per_minute_to_per_second(v: f64) -> f64 {
    v / 60.0
}

pub fn inches_to_mm(v: f64) -> f64 {
    v * MM_PER_INCH
}

pub fn mm_to_inches(v: f64) -> f64 {
    v / MM_PER_INCH
}

pub fn seconds_to_minutes(t: f64) -> f64 {
    t / 60.0
}

pub fn minutes_to_seconds(t: f64) -> f64 {
    t * 60.0
}

/// Calendar spans in minutes, largest first.
const SPANS: [(f64, &str, &str); 5] = [
    (525_600.0, "year", "years"),
    (10_080.0, "week", "weeks"),
    (1_440.0, "day", "days"),
    (60.0, "hour", "hours"),
    (1.0, "min", "min"),
];

/// Renders a duration given in minutes as human-readable text, e.g.
/// `"1 day 2 hours 3 min 4.5 sec"`.
///
/// * Durations under a minute render as seconds only (`"42.0 sec"`).
/// * Durations under an hour render as `"<m> min <s> sec"`.
/// * Longer durations list every non-zero span from years down to minutes;
///   the trailing seconds are omitted when they do not exceed
///   `seconds_tolerance`. The tolerance also fixes the precision of the
///   seconds (`0.1` → one decimal place); past two decimal places
///   scientific notation is used.
/// * A non-finite duration renders as `"unknown"`.
pub fn format_duration(minutes: f64, seconds_tolerance: f64) -> String {
    if !minutes.is_finite() {
        return "unknown".to_string();
    }
    let minutes = minutes.max(0.0);

    if minutes < 1.0 {
        return format!("{:.1} sec", minutes_to_seconds(minutes));
    }
    if minutes < 60.0 {
        return format!(
            "{} min {:.1} sec",
            minutes.floor() as u64,
            minutes_to_seconds(minutes.fract())
        );
    }

    let mut remaining = minutes;
    let mut parts = Vec::new();
    for (span, singular, plural) in SPANS {
        let count = (remaining / span).floor();
        if count >= 1.0 {
            let unit = if count >= 2.0 { plural } else { singular };
            parts.push(format!("{} {}", count as u64, unit));
            remaining -= count * span;
        }
    }

    let seconds = minutes_to_seconds(remaining);
    if seconds > seconds_tolerance {
        let decimals = if seconds_tolerance > 0.0 {
            (seconds_tolerance.log10().abs().round() as usize).min(9)
        } else {
            1
        };
        if decimals <= 2 {
            parts.push(format!("{:.*} sec", decimals, seconds));
        } else {
            parts.push(format!("{:.*e} sec", decimals, seconds));
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Conversions
    // -------------------------------------------------------------------------

    #[test]
    fn speed_conversion_is_times_sixty() {
        assert_eq!(per_second_to_per_minute(10.0), 600.0);
        assert_eq!(per_minute_to_per_second(600.0), 10.0);
    }

    #[test]
    fn length_conversion_uses_25_4() {
        assert_eq!(inches_to_mm(2.0), 50.8);
        assert!((mm_to_inches(50.8) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn time_conversion() {
        assert_eq!(seconds_to_minutes(90.0), 1.5);
        assert_eq!(minutes_to_seconds(1.5), 90.0);
    }

    #[test]
    fn defaults_are_absolute_millimeters() {
        assert_eq!(CoordinateMode::default(), CoordinateMode::Absolute);
        assert_eq!(UnitSystem::default(), UnitSystem::Millimeters);
        assert_eq!(ExtrusionMode::default(), ExtrusionMode::Absolute);
    }

    #[test]
    fn unit_labels() {
        assert_eq!(UnitSystem::Millimeters.to_string(), "mm");
        assert_eq!(UnitSystem::Inches.label(), "in");
    }

    // -------------------------------------------------------------------------
    // format_duration
    // -------------------------------------------------------------------------

    #[test]
    fn sub_minute_renders_seconds() {
        assert_eq!(format_duration(0.5, 0.1), "30.0 sec");
    }

    #[test]
    fn sub_hour_renders_minutes_and_seconds() {
        assert_eq!(format_duration(12.25, 0.1), "12 min 15.0 sec");
    }

    #[test]
    fn hours_and_minutes_with_seconds() {
        assert_eq!(format_duration(61.5, 0.1), "1 hour 1 min 30.0 sec");
    }

    #[test]
    fn plural_spans_without_seconds() {
        assert_eq!(format_duration(1_440.0 + 120.0, 0.1), "1 day 2 hours");
    }

    #[test]
    fn seconds_below_tolerance_are_omitted() {
        // 0.05 sec of remainder, tolerance 0.1
        let minutes = 120.0 + 0.05 / 60.0;
        assert_eq!(format_duration(minutes, 0.1), "2 hours");
    }

    #[test]
    fn tight_tolerance_switches_to_scientific_notation() {
        let text = format_duration(60.0 + 0.5, 0.001);
        assert_eq!(text, "1 hour 3.000e1 sec");
    }

    #[test]
    fn infinite_duration_is_unknown() {
        assert_eq!(format_duration(f64::INFINITY, 0.1), "unknown");
    }
}
