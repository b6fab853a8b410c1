//! gcody: encode printer-head motion into G-code and decode it back.
//!
//! A [`Document`] turns typed operations (moves, dwells, mode changes, fan
//! and temperature control) into formatted G-code lines while tracking the
//! position, modes, feed rate and print time they imply. The decoder
//! ([`decode_str`], [`decode_reader`]) replays text through the same
//! command table, so a decoded document ends in the same state as the one
//! that produced the text.
//!
//! ```
//! use gcody::{decode_str, Coordinates, Document, MoveArgs, Settings};
//!
//! let mut doc = Document::new(false, Settings::standard());
//! doc.relative_mode(None);
//! doc.linear_move(&MoveArgs::to(Coordinates::point(1.0, 0.0, 0.0)).speed(10.0), None);
//!
//! let decoded = decode_str(&doc.render(), Settings::standard());
//! assert!(decoded.is_clean());
//! assert_eq!(decoded.document.current_position(), doc.current_position());
//! ```

pub mod buffer;
pub mod error;
pub mod gcode;
pub mod logging;
pub mod motion;
pub mod units;

pub use buffer::GrowableBuffer;
pub use error::{GcodeError, MotionWarning};
pub use gcode::{
    decode_lines, decode_reader, decode_str, BedTemperatureArgs, Command, Decoded, Diagnostic,
    Document, DwellArgs, FanArgs, FormatCategory, HomeArgs, HotendArgs, Mnemonic, MoveArgs,
    RetractLength, SetPositionArgs, Settings,
};
pub use motion::{Axes, Coordinates, MotionSnapshot, MotionState, Position};
pub use units::{CoordinateMode, ExtrusionMode, UnitSystem};
