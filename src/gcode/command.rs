//! The closed command table shared by the encoder and the decoder.
//!
//! [`Mnemonic`] names every supported G/M code and the parameter letters it
//! accepts. [`Command`] is a fully-typed invocation; the decoder produces
//! them from text and [`Document::execute`](super::Document::execute)
//! dispatches them with a single `match`, so decoded text and direct calls
//! mutate the document identically.

use std::fmt;
use std::str::FromStr;

use crate::error::GcodeError;
use crate::motion::{Axes, Coordinates};

/// Supported G/M codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// Rapid move.
    G0,
    /// Linear move.
    G1,
    /// Dwell.
    G4,
    /// Retract.
    G10,
    /// Unretract.
    G11,
    /// Inch units.
    G20,
    /// Millimeter units.
    G21,
    /// Home.
    G28,
    /// Absolute positioning.
    G90,
    /// Relative positioning.
    G91,
    /// Set logical position.
    G92,
    /// Manual printing mask off.
    M30,
    /// Absolute extrusion.
    M82,
    /// Relative extrusion.
    M83,
    /// Stop idle hold.
    M84,
    /// Stop extrusion.
    M103,
    /// Set hotend temperature.
    M104,
    /// Fan on.
    M106,
    /// Fan off.
    M107,
    /// Wait for bed temperature.
    M190,
    /// Unprime.
    M721,
    /// Error report interval.
    M734,
    /// First layer thickness.
    M756,
    /// New layer.
    M790,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 24] = [
        Mnemonic::G0,
        Mnemonic::G1,
        Mnemonic::G4,
        Mnemonic::G10,
        Mnemonic::G11,
        Mnemonic::G20,
        Mnemonic::G21,
        Mnemonic::G28,
        Mnemonic::G90,
        Mnemonic::G91,
        Mnemonic::G92,
        Mnemonic::M30,
        Mnemonic::M82,
        Mnemonic::M83,
        Mnemonic::M84,
        Mnemonic::M103,
        Mnemonic::M104,
        Mnemonic::M106,
        Mnemonic::M107,
        Mnemonic::M190,
        Mnemonic::M721,
        Mnemonic::M734,
        Mnemonic::M756,
        Mnemonic::M790,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Mnemonic::G0 => "G0",
            Mnemonic::G1 => "G1",
            Mnemonic::G4 => "G4",
            Mnemonic::G10 => "G10",
            Mnemonic::G11 => "G11",
            Mnemonic::G20 => "G20",
            Mnemonic::G21 => "G21",
            Mnemonic::G28 => "G28",
            Mnemonic::G90 => "G90",
            Mnemonic::G91 => "G91",
            Mnemonic::G92 => "G92",
            Mnemonic::M30 => "M30",
            Mnemonic::M82 => "M82",
            Mnemonic::M83 => "M83",
            Mnemonic::M84 => "M84",
            Mnemonic::M103 => "M103",
            Mnemonic::M104 => "M104",
            Mnemonic::M106 => "M106",
            Mnemonic::M107 => "M107",
            Mnemonic::M190 => "M190",
            Mnemonic::M721 => "M721",
            Mnemonic::M734 => "M734",
            Mnemonic::M756 => "M756",
            Mnemonic::M790 => "M790",
        }
    }

    /// Parameter letters accepted after this mnemonic, in emission order.
    pub fn parameters(self) -> &'static [char] {
        match self {
            Mnemonic::G0 | Mnemonic::G1 => &['X', 'Y', 'Z', 'F', 'E', 'S'],
            Mnemonic::G4 => &['S', 'P'],
            Mnemonic::G10 | Mnemonic::G11 => &['S'],
            Mnemonic::G28 => &['X', 'Y', 'Z'],
            Mnemonic::G92 => &['X', 'Y', 'Z', 'E'],
            Mnemonic::M104 => &['T', 'S'],
            Mnemonic::M106 => &['S', 'P', 'I', 'F', 'L', 'B', 'H', 'R', 'T'],
            Mnemonic::M190 => &['S', 'R'],
            Mnemonic::M734 | Mnemonic::M756 => &['S'],
            _ => &[],
        }
    }

    pub fn accepts(self, letter: char) -> bool {
        self.parameters().contains(&letter)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Mnemonic {
    type Err = GcodeError;

    /// Case-insensitive; leading zeros in the number are ignored (`g01` → `G1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || GcodeError::UnknownCommand(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(unknown)?.to_ascii_uppercase();
        let number: u32 = chars.as_str().parse().map_err(|_| unknown())?;
        Mnemonic::ALL
            .into_iter()
            .find(|m| {
                m.code().starts_with(letter) && m.code()[1..].parse::<u32>().ok() == Some(number)
            })
            .ok_or_else(unknown)
    }
}

/// Arguments of `G0`/`G1`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveArgs {
    pub coordinates: Coordinates,
    /// Distance per second; written as distance per minute.
    pub speed: Option<f64>,
    pub extrude: Option<f64>,
    /// Endstop check mode (`S` word).
    pub check_endstop: Option<u8>,
}

impl MoveArgs {
    pub fn to(coordinates: impl Into<Coordinates>) -> Self {
        MoveArgs {
            coordinates: coordinates.into(),
            speed: None,
            extrude: None,
            check_endstop: None,
        }
    }

    pub fn speed(mut self, per_second: f64) -> Self {
        self.speed = Some(per_second);
        self
    }

    pub fn extrude(mut self, amount: f64) -> Self {
        self.extrude = Some(amount);
        self
    }

    pub fn check_endstop(mut self, mode: u8) -> Self {
        self.check_endstop = Some(mode);
        self
    }
}

impl Default for MoveArgs {
    fn default() -> Self {
        MoveArgs::to(Coordinates::none())
    }
}

/// Arguments of `G4`. Seconds win when both are given.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DwellArgs {
    pub seconds: Option<f64>,
    pub milliseconds: Option<f64>,
}

impl DwellArgs {
    pub fn seconds(seconds: f64) -> Self {
        DwellArgs {
            seconds: Some(seconds),
            milliseconds: None,
        }
    }

    pub fn milliseconds(milliseconds: f64) -> Self {
        DwellArgs {
            seconds: None,
            milliseconds: Some(milliseconds),
        }
    }
}

/// `S` word of `G10`/`G11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetractLength {
    Long,
    Short,
}

impl RetractLength {
    pub fn code(self) -> u8 {
        match self {
            RetractLength::Long => 0,
            RetractLength::Short => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RetractLength::Long),
            1 => Some(RetractLength::Short),
            _ => None,
        }
    }
}

/// Arguments of `G28`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HomeArgs {
    /// Axes to home; none selected homes all three.
    pub axes: Axes,
    /// Raise Z in relative mode before homing.
    pub safe: bool,
    /// Z raise for a safe home; defaults to 10 mm or 0.4 in.
    pub raise: Option<f64>,
}

/// Arguments of `G92`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetPositionArgs {
    pub axes: Axes,
    pub extrude: Option<f64>,
}

/// Arguments of `M104`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HotendArgs {
    pub tool: Option<u32>,
    pub temperature: Option<f64>,
}

/// Arguments of `M106`, one field per optional word.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FanArgs {
    /// `S`
    pub speed: Option<f64>,
    /// `P`
    pub fan: Option<u32>,
    /// `I`
    pub invert: Option<bool>,
    /// `F`, PWM frequency.
    pub frequency: Option<f64>,
    /// `L`
    pub min_speed: Option<f64>,
    /// `B`
    pub blip_time: Option<f64>,
    /// `H`
    pub heaters: Option<u32>,
    /// `R`
    pub restore_speed: Option<f64>,
    /// `T`
    pub trigger_temperature: Option<f64>,
}

/// Arguments of `M190`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BedTemperatureArgs {
    /// `S`, wait only while heating.
    pub minimum: Option<f64>,
    /// `R`, wait while heating or cooling.
    pub accurate: Option<f64>,
}

/// One typed command, as produced by the decoder or built by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RapidMove(MoveArgs),
    LinearMove(MoveArgs),
    /// Axis words only, no mnemonic (modal move).
    SimpleMove(Coordinates),
    Dwell(DwellArgs),
    Retract(Option<RetractLength>),
    Unretract(Option<RetractLength>),
    UseInches,
    UseMillimeters,
    Home(HomeArgs),
    AbsoluteMode,
    RelativeMode,
    SetPosition(SetPositionArgs),
    ManualMaskOff,
    AbsoluteExtrusion,
    RelativeExtrusion,
    StopIdleHold,
    StopExtrusion,
    SetHotend(HotendArgs),
    Fan(FanArgs),
    FanOff,
    WaitForBedTemperature(BedTemperatureArgs),
    Unprime,
    ErrorReportInterval(Option<f64>),
    FirstLayerThickness(Option<f64>),
    NewLayer,
    Comment(String),
    Blank,
}

impl Command {
    /// The mnemonic written for this command; `None` for modal moves,
    /// comments and blank lines.
    pub fn mnemonic(&self) -> Option<Mnemonic> {
        let m = match self {
            Command::RapidMove(_) => Mnemonic::G0,
            Command::LinearMove(_) => Mnemonic::G1,
            Command::Dwell(_) => Mnemonic::G4,
            Command::Retract(_) => Mnemonic::G10,
            Command::Unretract(_) => Mnemonic::G11,
            Command::UseInches => Mnemonic::G20,
            Command::UseMillimeters => Mnemonic::G21,
            Command::Home(_) => Mnemonic::G28,
            Command::AbsoluteMode => Mnemonic::G90,
            Command::RelativeMode => Mnemonic::G91,
            Command::SetPosition(_) => Mnemonic::G92,
            Command::ManualMaskOff => Mnemonic::M30,
            Command::AbsoluteExtrusion => Mnemonic::M82,
            Command::RelativeExtrusion => Mnemonic::M83,
            Command::StopIdleHold => Mnemonic::M84,
            Command::StopExtrusion => Mnemonic::M103,
            Command::SetHotend(_) => Mnemonic::M104,
            Command::Fan(_) => Mnemonic::M106,
            Command::FanOff => Mnemonic::M107,
            Command::WaitForBedTemperature(_) => Mnemonic::M190,
            Command::Unprime => Mnemonic::M721,
            Command::ErrorReportInterval(_) => Mnemonic::M734,
            Command::FirstLayerThickness(_) => Mnemonic::M756,
            Command::NewLayer => Mnemonic::M790,
            Command::SimpleMove(_) | Command::Comment(_) | Command::Blank => return None,
        };
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mnemonic_parses_from_its_code() {
        for m in Mnemonic::ALL {
            assert_eq!(m.code().parse::<Mnemonic>(), Ok(m));
        }
    }

    #[test]
    fn mnemonic_parse_is_case_insensitive_and_ignores_leading_zeros() {
        assert_eq!("g1".parse::<Mnemonic>(), Ok(Mnemonic::G1));
        assert_eq!("G01".parse::<Mnemonic>(), Ok(Mnemonic::G1));
        assert_eq!("m0106".parse::<Mnemonic>(), Ok(Mnemonic::M106));
    }

    #[test]
    fn unknown_mnemonics_are_rejected() {
        for code in ["G2", "M999", "G", "GX", "T1", ""] {
            assert_eq!(
                code.parse::<Mnemonic>(),
                Err(GcodeError::UnknownCommand(code.to_string())),
                "{code}"
            );
        }
    }

    #[test]
    fn feed_letter_is_accepted_only_where_meaningful() {
        assert!(Mnemonic::G1.accepts('F'));
        assert!(Mnemonic::M106.accepts('F'));
        assert!(!Mnemonic::G28.accepts('F'));
        assert!(!Mnemonic::G90.accepts('X'));
    }

    #[test]
    fn command_mnemonics_cover_the_table() {
        let commands = [
            Command::RapidMove(MoveArgs::default()),
            Command::LinearMove(MoveArgs::default()),
            Command::Dwell(DwellArgs::seconds(1.0)),
            Command::Retract(None),
            Command::Unretract(None),
            Command::UseInches,
            Command::UseMillimeters,
            Command::Home(HomeArgs::default()),
            Command::AbsoluteMode,
            Command::RelativeMode,
            Command::SetPosition(SetPositionArgs::default()),
            Command::ManualMaskOff,
            Command::AbsoluteExtrusion,
            Command::RelativeExtrusion,
            Command::StopIdleHold,
            Command::StopExtrusion,
            Command::SetHotend(HotendArgs::default()),
            Command::Fan(FanArgs::default()),
            Command::FanOff,
            Command::WaitForBedTemperature(BedTemperatureArgs::default()),
            Command::Unprime,
            Command::ErrorReportInterval(None),
            Command::FirstLayerThickness(None),
            Command::NewLayer,
        ];
        let mnemonics: Vec<_> = commands.iter().filter_map(Command::mnemonic).collect();
        assert_eq!(mnemonics, Mnemonic::ALL.to_vec());
        assert_eq!(Command::Blank.mnemonic(), None);
    }

    #[test]
    fn retract_length_codes() {
        assert_eq!(RetractLength::from_code(1), Some(RetractLength::Short));
        assert_eq!(RetractLength::Long.code(), 0);
        assert_eq!(RetractLength::from_code(2), None);
    }

    #[test]
    fn move_args_builder() {
        let args = MoveArgs::to(Coordinates::point(1.0, 2.0, 3.0))
            .speed(10.0)
            .extrude(0.5)
            .check_endstop(1);
        assert_eq!(args.speed, Some(10.0));
        assert_eq!(args.extrude, Some(0.5));
        assert_eq!(args.check_endstop, Some(1));
    }
}
