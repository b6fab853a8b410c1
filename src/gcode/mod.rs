//! G-code text: formatting profiles, line assembly, the command table, and
//! the encoder/decoder pair built on them.

pub mod command;
pub mod decoder;
pub mod encoder;
pub mod formatter;
pub mod line;
pub mod settings;

pub use command::{
    BedTemperatureArgs, Command, DwellArgs, FanArgs, HomeArgs, HotendArgs, Mnemonic, MoveArgs,
    RetractLength, SetPositionArgs,
};
pub use decoder::{
    decode_lines, decode_reader, decode_str, parse_line, Decoded, Decoder, Diagnostic, ParsedLine,
};
pub use encoder::Document;
pub use line::Line;
pub use settings::{FormatCategory, NumberFormat, Settings};
