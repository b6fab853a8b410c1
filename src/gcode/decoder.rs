//! Rebuilds a [`Document`] from G-code text.
//!
//! Each line is parsed on its own into a typed [`Command`] and replayed
//! through [`Document::execute`]. A line that fails to parse or execute is
//! skipped and recorded as a [`Diagnostic`]; decoding carries on with the
//! next line.

use std::io::BufRead;

use serde::Serialize;

use crate::error::GcodeError;
use crate::motion::{Axes, Coordinates};
use crate::units::per_minute_to_per_second;

use super::command::{
    BedTemperatureArgs, Command, DwellArgs, FanArgs, HomeArgs, HotendArgs, Mnemonic, MoveArgs,
    RetractLength, SetPositionArgs,
};
use super::encoder::Document;
use super::settings::Settings;

/// Command name reported for errors on axis-only lines.
const MODAL_MOVE: &str = "modal move";

/// A line that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// 1-based.
    pub line_number: usize,
    pub line: String,
    pub error: GcodeError,
}

/// Result of a decode: the best-effort document plus every skipped line.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

impl Decoded {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// A parsed line: the command and its trailing comment.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub command: Command,
    pub comment: Option<String>,
}

/// Incremental decoder; feed it lines in order.
#[derive(Debug)]
pub struct Decoder {
    document: Document,
    diagnostics: Vec<Diagnostic>,
    line_number: usize,
}

impl Decoder {
    pub fn new(settings: Settings) -> Self {
        Decoder {
            document: Document::new(false, settings),
            diagnostics: Vec::new(),
            line_number: 0,
        }
    }

    /// Parses and applies one line. Failures become diagnostics.
    pub fn feed(&mut self, line: &str) {
        self.line_number += 1;
        let result = parse_line(line).and_then(|parsed| {
            self.document
                .execute(&parsed.command, parsed.comment.as_deref())
        });
        if let Err(error) = result {
            self.skip(line, error);
        }
    }

    /// Counts a line that could not be read as text and records it as
    /// skipped, keeping a lossy copy of its bytes.
    pub fn feed_bytes(&mut self, bytes: &[u8]) {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.feed(line),
            Err(e) => {
                self.line_number += 1;
                let error = GcodeError::InvalidEncoding(e.to_string());
                self.skip(&String::from_utf8_lossy(bytes), error);
            }
        }
    }

    fn skip(&mut self, line: &str, error: GcodeError) {
        tracing::warn!(line_number = self.line_number, %error, "skipping line");
        self.diagnostics.push(Diagnostic {
            line_number: self.line_number,
            line: line.to_string(),
            error,
        });
    }

    pub fn finish(self) -> Decoded {
        tracing::info!(
            lines = self.line_number,
            applied = self.document.line_count(),
            skipped = self.diagnostics.len(),
            "decode finished"
        );
        Decoded {
            document: self.document,
            diagnostics: self.diagnostics,
        }
    }
}

/// Decodes any sequence of lines (without their line endings).
pub fn decode_lines<I, S>(lines: I, settings: Settings) -> Decoded
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoder = Decoder::new(settings);
    for line in lines {
        decoder.feed(line.as_ref());
    }
    decoder.finish()
}

pub fn decode_str(text: &str, settings: Settings) -> Decoded {
    decode_lines(text.lines(), settings)
}

/// Decodes from a reader. Only a failing reader is an error; malformed
/// lines, including ones that are not UTF-8, end up in
/// [`Decoded::diagnostics`].
pub fn decode_reader<R: BufRead>(
    mut reader: R,
    settings: Settings,
) -> Result<Decoded, GcodeError> {
    let mut decoder = Decoder::new(settings);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        decoder.feed_bytes(strip_line_ending(&buf));
    }
    Ok(decoder.finish())
}

fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// Parses one line of text into a command and comment.
pub fn parse_line(text: &str) -> Result<ParsedLine, GcodeError> {
    let (code, comment) = split_comment(text.trim());

    if code.is_empty() {
        let command = match comment {
            Some(text) => Command::Comment(text.to_string()),
            None => Command::Blank,
        };
        return Ok(ParsedLine {
            command,
            comment: None,
        });
    }

    let mut tokens = code.split_whitespace();
    let head = tokens.next().unwrap_or_default();
    let command = match head.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('G') | Some('M') => {
            let mnemonic: Mnemonic = head.parse()?;
            let words = Words::parse(mnemonic.code(), tokens, |c| mnemonic.accepts(c))?;
            build_command(mnemonic, &words)?
        }
        Some('X') | Some('Y') | Some('Z') => {
            let words = Words::parse(MODAL_MOVE, code.split_whitespace(), |c| {
                matches!(c, 'X' | 'Y' | 'Z')
            })?;
            Command::SimpleMove(Coordinates::Scalar(words.axes()))
        }
        _ => return Err(GcodeError::UnknownCommand(head.to_string())),
    };

    Ok(ParsedLine {
        command,
        comment: comment.map(str::to_string),
    })
}

/// Splits at the first `;` not preceded by a backslash. Both halves are
/// trimmed; an empty comment is `None`.
fn split_comment(text: &str) -> (&str, Option<&str>) {
    let bytes = text.as_bytes();
    let split = bytes
        .iter()
        .enumerate()
        .position(|(i, &b)| b == b';' && (i == 0 || bytes[i - 1] != b'\\'));
    match split {
        Some(i) => {
            let comment = text[i + 1..].trim();
            (text[..i].trim(), (!comment.is_empty()).then_some(comment))
        }
        None => (text, None),
    }
}

/// Parameter words of one line, keyed by upper-case letter.
struct Words {
    command: String,
    values: Vec<(char, f64, String)>,
}

impl Words {
    fn parse<'a>(
        command: &str,
        tokens: impl Iterator<Item = &'a str>,
        accepts: impl Fn(char) -> bool,
    ) -> Result<Self, GcodeError> {
        let mut values = Vec::new();
        for token in tokens {
            let mut chars = token.chars();
            let letter = chars
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_default();
            if !accepts(letter) {
                return Err(GcodeError::UnknownParameter {
                    token: token.to_string(),
                    command: command.to_string(),
                });
            }
            let value: f64 = chars
                .as_str()
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| GcodeError::InvalidParameterValue {
                    token: token.to_string(),
                    command: command.to_string(),
                })?;
            values.push((letter, value, token.to_string()));
        }
        Ok(Words {
            command: command.to_string(),
            values,
        })
    }

    /// Last occurrence wins.
    fn get(&self, letter: char) -> Option<f64> {
        self.values
            .iter()
            .rev()
            .find(|(l, _, _)| *l == letter)
            .map(|(_, v, _)| *v)
    }

    /// A word that must be a non-negative integer.
    fn integer(&self, letter: char) -> Result<Option<u32>, GcodeError> {
        let Some((_, value, token)) = self.values.iter().rev().find(|(l, _, _)| *l == letter)
        else {
            return Ok(None);
        };
        if value.fract() != 0.0 || *value < 0.0 || *value > u32::MAX as f64 {
            return Err(self.invalid(token));
        }
        Ok(Some(*value as u32))
    }

    fn flag(&self, letter: char) -> Result<Option<bool>, GcodeError> {
        match self.integer(letter)? {
            None => Ok(None),
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            Some(_) => Err(self.invalid_letter(letter)),
        }
    }

    fn retract_length(&self) -> Result<Option<RetractLength>, GcodeError> {
        match self.integer('S')? {
            None => Ok(None),
            Some(code) => u8::try_from(code)
                .ok()
                .and_then(RetractLength::from_code)
                .map(Some)
                .ok_or_else(|| self.invalid_letter('S')),
        }
    }

    fn axes(&self) -> Axes {
        Axes::new(self.get('X'), self.get('Y'), self.get('Z'))
    }

    fn invalid(&self, token: &str) -> GcodeError {
        GcodeError::InvalidParameterValue {
            token: token.to_string(),
            command: self.command.clone(),
        }
    }

    fn invalid_letter(&self, letter: char) -> GcodeError {
        let token = self
            .values
            .iter()
            .rev()
            .find(|(l, _, _)| *l == letter)
            .map(|(_, _, t)| t.as_str())
            .unwrap_or_default();
        self.invalid(token)
    }
}

fn build_command(mnemonic: Mnemonic, words: &Words) -> Result<Command, GcodeError> {
    let command = match mnemonic {
        Mnemonic::G0 | Mnemonic::G1 => {
            let check_endstop = match words.integer('S')? {
                Some(mode) => Some(u8::try_from(mode).map_err(|_| words.invalid_letter('S'))?),
                None => None,
            };
            let args = MoveArgs {
                coordinates: Coordinates::Scalar(words.axes()),
                speed: words.get('F').map(per_minute_to_per_second),
                extrude: words.get('E'),
                check_endstop,
            };
            if mnemonic == Mnemonic::G0 {
                Command::RapidMove(args)
            } else {
                Command::LinearMove(args)
            }
        }
        Mnemonic::G4 => Command::Dwell(DwellArgs {
            seconds: words.get('S'),
            milliseconds: words.get('P'),
        }),
        Mnemonic::G10 => Command::Retract(words.retract_length()?),
        Mnemonic::G11 => Command::Unretract(words.retract_length()?),
        Mnemonic::G20 => Command::UseInches,
        Mnemonic::G21 => Command::UseMillimeters,
        Mnemonic::G28 => Command::Home(HomeArgs {
            axes: words.axes(),
            ..HomeArgs::default()
        }),
        Mnemonic::G90 => Command::AbsoluteMode,
        Mnemonic::G91 => Command::RelativeMode,
        Mnemonic::G92 => Command::SetPosition(SetPositionArgs {
            axes: words.axes(),
            extrude: words.get('E'),
        }),
        Mnemonic::M30 => Command::ManualMaskOff,
        Mnemonic::M82 => Command::AbsoluteExtrusion,
        Mnemonic::M83 => Command::RelativeExtrusion,
        Mnemonic::M84 => Command::StopIdleHold,
        Mnemonic::M103 => Command::StopExtrusion,
        Mnemonic::M104 => Command::SetHotend(HotendArgs {
            tool: words.integer('T')?,
            temperature: words.get('S'),
        }),
        Mnemonic::M106 => Command::Fan(FanArgs {
            speed: words.get('S'),
            fan: words.integer('P')?,
            invert: words.flag('I')?,
            frequency: words.get('F'),
            min_speed: words.get('L'),
            blip_time: words.get('B'),
            heaters: words.integer('H')?,
            restore_speed: words.get('R'),
            trigger_temperature: words.get('T'),
        }),
        Mnemonic::M107 => Command::FanOff,
        Mnemonic::M190 => Command::WaitForBedTemperature(BedTemperatureArgs {
            minimum: words.get('S'),
            accurate: words.get('R'),
        }),
        Mnemonic::M721 => Command::Unprime,
        Mnemonic::M734 => Command::ErrorReportInterval(words.get('S')),
        Mnemonic::M756 => Command::FirstLayerThickness(words.get('S')),
        Mnemonic::M790 => Command::NewLayer,
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Position;
    use crate::units::{CoordinateMode, UnitSystem};

    fn parsed(text: &str) -> Command {
        parse_line(text).expect("parse").command
    }

    // -------------------------------------------------------------------------
    // parse_line
    // -------------------------------------------------------------------------

    #[test]
    fn empty_and_whitespace_lines_are_blank() {
        assert_eq!(parsed(""), Command::Blank);
        assert_eq!(parsed("   \t"), Command::Blank);
    }

    #[test]
    fn comment_only_line() {
        let line = parse_line("; hello world ").unwrap();
        assert_eq!(line.command, Command::Comment("hello world".to_string()));
        assert_eq!(line.comment, None);
    }

    #[test]
    fn move_with_comment() {
        let line = parse_line("G1 X1.0000 Y2.5 F600 E0.1 ; first move").unwrap();
        assert_eq!(
            line.command,
            Command::LinearMove(MoveArgs {
                coordinates: Coordinates::scalar(Some(1.0), Some(2.5), None),
                speed: Some(10.0),
                extrude: Some(0.1),
                check_endstop: None,
            })
        );
        assert_eq!(line.comment.as_deref(), Some("first move"));
    }

    #[test]
    fn comment_splits_at_first_unescaped_semicolon() {
        let line = parse_line("G90 ; a;b").unwrap();
        assert_eq!(line.comment.as_deref(), Some("a;b"));
        assert_eq!(split_comment(r"X1 \; not a comment"), (r"X1 \; not a comment", None));
    }

    #[test]
    fn lower_case_and_padded_mnemonics() {
        assert_eq!(parsed("g91"), Command::RelativeMode);
        assert_eq!(parsed("G01 x1"), parsed("G1 X1"));
    }

    #[test]
    fn fan_frequency_is_not_rescaled() {
        match parsed("M106 S255 F500 I1") {
            Command::Fan(args) => {
                assert_eq!(args.frequency, Some(500.0));
                assert_eq!(args.invert, Some(true));
            }
            other => panic!("expected fan, got {other:?}"),
        }
    }

    #[test]
    fn modal_axis_line_is_simple_move() {
        assert_eq!(
            parsed("X1.0000 Z2.0000"),
            Command::SimpleMove(Coordinates::scalar(Some(1.0), None, Some(2.0)))
        );
    }

    #[test]
    fn unknown_parameter_names_token_and_command() {
        assert_eq!(
            parse_line("G1 X1 Q5"),
            Err(GcodeError::UnknownParameter {
                token: "Q5".to_string(),
                command: "G1".to_string()
            })
        );
        assert!(matches!(
            parse_line("G90 X1"),
            Err(GcodeError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn bad_values_are_rejected() {
        for text in ["G1 Xabc", "G1 X", "G10 S2", "M104 T1.5", "M106 I3", "G1 Xinf"] {
            assert!(
                matches!(parse_line(text), Err(GcodeError::InvalidParameterValue { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn unknown_mnemonic_and_stray_text() {
        assert_eq!(
            parse_line("G2 X1"),
            Err(GcodeError::UnknownCommand("G2".to_string()))
        );
        assert_eq!(
            parse_line("hello"),
            Err(GcodeError::UnknownCommand("hello".to_string()))
        );
    }

    #[test]
    fn dwell_without_time_parses_but_fails_on_execute() {
        let decoded = decode_str("G4\nG90", Settings::default());
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].error, GcodeError::MissingDwellTime);
        assert_eq!(decoded.document.line_count(), 1);
    }

    // -------------------------------------------------------------------------
    // decode
    // -------------------------------------------------------------------------

    #[test]
    fn decode_rebuilds_state() {
        let text = "G21\nG91\nG1 X1.0000 F600\nG1 X1.0000\n; done\n";
        let decoded = decode_str(text, Settings::default());
        assert!(decoded.is_clean());
        let doc = decoded.document;
        assert_eq!(doc.current_position(), Position::new(2.0, 0.0, 0.0));
        assert_eq!(doc.coordinate_mode(), CoordinateMode::Relative);
        assert_eq!(doc.unit_system(), UnitSystem::Millimeters);
        assert_eq!(doc.feed_rate(), 600.0);
        assert_eq!(doc.line_count(), 5);
    }

    #[test]
    fn diagnostics_are_one_based_and_keep_the_line() {
        let decoded = decode_str("G90\nG1 Q1\nG91", Settings::default());
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].line_number, 2);
        assert_eq!(decoded.diagnostics[0].line, "G1 Q1");
        assert_eq!(decoded.document.coordinate_mode(), CoordinateMode::Relative);
    }

    #[test]
    fn decode_reader_surfaces_io_errors() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk gone"))
            }
        }
        let result = decode_reader(std::io::BufReader::new(Broken), Settings::default());
        assert_eq!(result.unwrap_err(), GcodeError::Io("disk gone".to_string()));
    }

    #[test]
    fn decode_reader_reads_lines() {
        let input = std::io::Cursor::new("G20\nG1 X1 F60\n");
        let decoded = decode_reader(input, Settings::default()).unwrap();
        assert_eq!(decoded.document.unit_system(), UnitSystem::Inches);
        assert_eq!(decoded.document.history().len(), 1);
    }

    #[test]
    fn decode_reader_skips_lines_that_are_not_utf8() {
        let input = std::io::Cursor::new(&b"G90\r\n; bed 60\xB0C\nG91\nG1 X1 F600"[..]);
        let decoded = decode_reader(input, Settings::default()).unwrap();

        assert_eq!(decoded.diagnostics.len(), 1);
        let diagnostic = &decoded.diagnostics[0];
        assert_eq!(diagnostic.line_number, 2);
        assert_eq!(diagnostic.line, "; bed 60\u{FFFD}C");
        assert!(matches!(diagnostic.error, GcodeError::InvalidEncoding(_)));

        let doc = decoded.document;
        assert_eq!(doc.coordinate_mode(), CoordinateMode::Relative);
        assert_eq!(doc.current_position(), Position::new(1.0, 0.0, 0.0));
        assert_eq!(doc.line_count(), 3);
    }

    #[test]
    fn diagnostic_serializes() {
        let decoded = decode_str("M999", Settings::default());
        let value = serde_json::to_value(&decoded.diagnostics[0]).expect("serialize");
        assert_eq!(value["lineNumber"], 1);
        assert_eq!(value["error"]["kind"], "UnknownCommand");
    }
}
