//! Number-formatting profiles.
//!
//! A [`Settings`] value maps each [`FormatCategory`] to a [`NumberFormat`].
//! Profiles are TOML documents; two are built in (`standard`, `precise`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::formatter::format_number;
use crate::error::GcodeError;

const STANDARD_TOML: &str = include_str!("../../profiles/standard.toml");
const PRECISE_TOML: &str = include_str!("../../profiles/precise.toml");

/// Ids accepted by [`Settings::builtin`].
pub const BUILTIN_PROFILES: [&str; 2] = ["standard", "precise"];

const MAX_DECIMAL_PLACES: u32 = 12;

/// The closed set of numeric word categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatCategory {
    /// X/Y/Z words.
    Position,
    /// F words, in distance per minute.
    Speed,
    /// E words.
    Extrusion,
}

impl FormatCategory {
    pub const ALL: [FormatCategory; 3] = [
        FormatCategory::Position,
        FormatCategory::Speed,
        FormatCategory::Extrusion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatCategory::Position => "position",
            FormatCategory::Speed => "speed",
            FormatCategory::Extrusion => "extrusion",
        }
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatCategory {
    type Err = GcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "position" => Ok(FormatCategory::Position),
            "speed" => Ok(FormatCategory::Speed),
            "extrusion" => Ok(FormatCategory::Extrusion),
            other => Err(GcodeError::UnknownFormatCategory(other.to_string())),
        }
    }
}

/// One numeric-to-string rule (`[format.<category>]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NumberFormat {
    /// Fixed number of fractional digits; `None` writes the value unrounded.
    #[serde(default)]
    pub decimal_places: Option<u32>,
    #[serde(default = "default_true")]
    pub trailing_zeros: bool,
    #[serde(default)]
    pub leading_zero_suppression: bool,
}

fn default_true() -> bool {
    true
}

impl NumberFormat {
    pub fn fixed(decimal_places: u32) -> Self {
        NumberFormat {
            decimal_places: Some(decimal_places),
            trailing_zeros: true,
            leading_zero_suppression: false,
        }
    }

    pub fn unrounded() -> Self {
        NumberFormat {
            decimal_places: None,
            trailing_zeros: true,
            leading_zero_suppression: false,
        }
    }
}

/// `[meta]`: identity and display information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MetaConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `[format]`: one rule per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FormatConfig {
    pub position: NumberFormat,
    pub speed: NumberFormat,
    pub extrusion: NumberFormat,
}

/// Immutable formatting profile shared by one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    pub meta: MetaConfig,
    pub format: FormatConfig,
}

impl Settings {
    /// 4 places for position/extrusion, whole-number feed rates.
    pub fn standard() -> Self {
        Settings {
            meta: MetaConfig {
                id: "standard".to_string(),
                name: "Standard".to_string(),
                description:
                    "4 decimal places for position and extrusion, whole-number feed rates"
                        .to_string(),
            },
            format: FormatConfig {
                position: NumberFormat::fixed(4),
                speed: NumberFormat::fixed(0),
                extrusion: NumberFormat::fixed(4),
            },
        }
    }

    /// 6 places for position/extrusion, unrounded feed rates.
    pub fn precise() -> Self {
        Settings {
            meta: MetaConfig {
                id: "precise".to_string(),
                name: "Precise".to_string(),
                description: "6 decimal places for position and extrusion, unrounded feed rates"
                    .to_string(),
            },
            format: FormatConfig {
                position: NumberFormat::fixed(6),
                speed: NumberFormat::unrounded(),
                extrusion: NumberFormat::fixed(6),
            },
        }
    }

    /// Loads one of the profiles shipped in `profiles/`.
    pub fn builtin(id: &str) -> Result<Self, GcodeError> {
        let source = match id {
            "standard" => STANDARD_TOML,
            "precise" => PRECISE_TOML,
            other => {
                return Err(GcodeError::Config(format!(
                    "unknown built-in profile '{other}' (expected one of: {})",
                    BUILTIN_PROFILES.join(", ")
                )))
            }
        };
        parse(source)
    }

    pub fn rule(&self, category: FormatCategory) -> &NumberFormat {
        match category {
            FormatCategory::Position => &self.format.position,
            FormatCategory::Speed => &self.format.speed,
            FormatCategory::Extrusion => &self.format.extrusion,
        }
    }

    pub fn format(&self, category: FormatCategory, value: f64) -> String {
        format_number(value, self.rule(category))
    }

    /// String-keyed lookup; unknown names fail with
    /// [`GcodeError::UnknownFormatCategory`].
    pub fn format_named(&self, category: &str, value: f64) -> Result<String, GcodeError> {
        let category: FormatCategory = category.parse()?;
        Ok(self.format(category, value))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::standard()
    }
}

/// Parse a TOML string into [`Settings`], running validation.
pub fn parse(toml_str: &str) -> Result<Settings, GcodeError> {
    let settings: Settings =
        toml::from_str(toml_str).map_err(|e| GcodeError::Config(e.to_string()))?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), GcodeError> {
    for category in FormatCategory::ALL {
        let rule = settings.rule(category);
        match rule.decimal_places {
            Some(places) if places > MAX_DECIMAL_PLACES => {
                return Err(GcodeError::Config(format!(
                    "format.{category}.decimal_places must be at most {MAX_DECIMAL_PLACES}, got {places}"
                )));
            }
            None if !rule.trailing_zeros => {
                return Err(GcodeError::Config(format!(
                    "format.{category}.trailing_zeros = false requires decimal_places"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
