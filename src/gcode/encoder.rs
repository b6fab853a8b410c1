//! The G-code document: emits lines and keeps the motion state in step.

use crate::buffer::GrowableBuffer;
use crate::error::{GcodeError, MotionWarning};
use crate::motion::{Axes, Coordinates, MotionSnapshot, MotionState, Position};
use crate::units::{
    format_duration, seconds_to_minutes, CoordinateMode, ExtrusionMode, UnitSystem,
};

use super::command::{
    BedTemperatureArgs, Command, DwellArgs, FanArgs, HomeArgs, HotendArgs, Mnemonic, MoveArgs,
    RetractLength, SetPositionArgs,
};
use super::formatter::format_plain;
use super::line::Line;
use super::settings::{FormatCategory, Settings};

const CREDITS: [&str; 2] = [
    concat!(
        "This is GCODE generated with gcody version ",
        env!("CARGO_PKG_VERSION")
    ),
    "Written by Ryan Zambrotta",
];

/// Safe-home Z raise when none is given.
const SAFE_RAISE_MM: f64 = 10.0;
const SAFE_RAISE_IN: f64 = 0.4;

/// Tolerance passed to [`format_duration`] by [`Document::elapsed_time_text`].
const ELAPSED_SECONDS_TOLERANCE: f64 = 0.1;

/// Bookkeeping a written line implies.
#[derive(Debug, Clone, Copy)]
enum Motion {
    Move(Axes),
    /// Minutes.
    Dwell(f64),
    Home(Axes),
}

/// One toolpath's worth of G-code plus the motion state it implies.
///
/// Every operation validates its arguments, builds one or more [`Line`]s,
/// hands motion bookkeeping to [`MotionState`] and appends the finished
/// text. Operations that cannot fail return `()`.
#[derive(Debug, Clone)]
pub struct Document {
    settings: Settings,
    debug_mode: bool,
    state: MotionState,
    output: Vec<String>,
    warnings: Vec<MotionWarning>,
}

impl Default for Document {
    fn default() -> Self {
        Document::new(false, Settings::default())
    }
}

impl Document {
    /// With `debug_mode` every finished line is logged at `info` on target
    /// `gcody::debug` instead of being kept, and motion is not recorded.
    pub fn new(debug_mode: bool, settings: Settings) -> Self {
        Document {
            settings,
            debug_mode,
            state: MotionState::new(),
            output: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn current_position(&self) -> Position {
        self.state.current_position()
    }

    pub fn previous_position(&self) -> Position {
        self.state.previous_position()
    }

    pub fn history(&self) -> &GrowableBuffer<Position> {
        self.state.history()
    }

    pub fn timestamps(&self) -> &GrowableBuffer<f64> {
        self.state.timestamps()
    }

    /// Minutes.
    pub fn elapsed_time(&self) -> f64 {
        self.state.elapsed_time()
    }

    pub fn elapsed_time_text(&self) -> String {
        format_duration(self.state.elapsed_time(), ELAPSED_SECONDS_TOLERANCE)
    }

    pub fn line_count(&self) -> usize {
        self.state.line_count()
    }

    /// Distance per minute.
    pub fn feed_rate(&self) -> f64 {
        self.state.feed_rate()
    }

    pub fn coordinate_mode(&self) -> CoordinateMode {
        self.state.coordinate_mode()
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.state.unit_system()
    }

    pub fn extrusion_mode(&self) -> ExtrusionMode {
        self.state.extrusion_mode()
    }

    pub fn warnings(&self) -> &[MotionWarning] {
        &self.warnings
    }

    /// Finished lines in emission order.
    pub fn lines(&self) -> &[String] {
        &self.output
    }

    /// The whole program text.
    pub fn render(&self) -> String {
        self.output.concat()
    }

    pub fn snapshot(&self) -> MotionSnapshot {
        self.state.snapshot()
    }

    // ── Dispatch ────────────────────────────────────────────────────────────

    /// Runs one typed command. This is the path decoded text takes; the
    /// named operations below are the same code reached directly.
    pub fn execute(&mut self, command: &Command, comment: Option<&str>) -> Result<(), GcodeError> {
        match command {
            Command::RapidMove(args) => self.rapid_move(args, comment),
            Command::LinearMove(args) => self.linear_move(args, comment),
            Command::SimpleMove(coordinates) => self.simple_move(coordinates, comment),
            Command::Dwell(args) => return self.dwell(*args, comment),
            Command::Retract(length) => self.retract(*length, comment),
            Command::Unretract(length) => self.unretract(*length, comment),
            Command::UseInches => self.use_inches(comment),
            Command::UseMillimeters => self.use_millimeters(comment),
            Command::Home(args) => self.go_home(*args, comment),
            Command::AbsoluteMode => self.absolute_mode(comment),
            Command::RelativeMode => self.relative_mode(comment),
            Command::SetPosition(args) => self.set_position(*args, comment),
            Command::ManualMaskOff => self.manual_mask_off(comment),
            Command::AbsoluteExtrusion => self.absolute_extrusion(comment),
            Command::RelativeExtrusion => self.relative_extrusion(comment),
            Command::StopIdleHold => self.stop_idle_hold(comment),
            Command::StopExtrusion => self.stop_extrusion(comment),
            Command::SetHotend(args) => self.set_hotend(*args, comment),
            Command::Fan(args) => self.fan(*args, comment),
            Command::FanOff => self.fan_off(comment),
            Command::WaitForBedTemperature(args) => self.wait_for_bed_temperature(*args, comment),
            Command::Unprime => self.unprime(comment),
            Command::ErrorReportInterval(seconds) => self.error_report_interval(*seconds, comment),
            Command::FirstLayerThickness(thickness) => {
                self.first_layer_thickness(*thickness, comment)
            }
            Command::NewLayer => self.new_layer(comment),
            Command::Comment(text) => self.comment(text),
            Command::Blank => self.blank(1),
        }
        Ok(())
    }

    // ── Motion ──────────────────────────────────────────────────────────────

    /// `G1`. A batch writes one line per row; a scalar with no axes writes
    /// only the speed/extrusion words and records no motion.
    pub fn linear_move(&mut self, args: &MoveArgs, comment: Option<&str>) {
        self.write_moves(Some(Mnemonic::G1), args, comment);
    }

    /// `G0`, same operands as [`linear_move`](Self::linear_move).
    pub fn rapid_move(&mut self, args: &MoveArgs, comment: Option<&str>) {
        self.write_moves(Some(Mnemonic::G0), args, comment);
    }

    /// Modal move: axis words only, relying on the previous motion mnemonic.
    /// Rows with no axis are not written.
    pub fn simple_move(&mut self, coordinates: &Coordinates, comment: Option<&str>) {
        self.write_moves(None, &MoveArgs::to(coordinates.clone()), comment);
    }

    /// `G4`. Records a stationary history entry lasting the dwell time.
    pub fn dwell(&mut self, args: DwellArgs, comment: Option<&str>) -> Result<(), GcodeError> {
        let (letter, value, minutes) = match (args.seconds, args.milliseconds) {
            (Some(s), _) => ('S', s, seconds_to_minutes(s)),
            (None, Some(ms)) => ('P', ms, seconds_to_minutes(ms / 1000.0)),
            (None, None) => return Err(GcodeError::MissingDwellTime),
        };
        if !value.is_finite() || value < 0.0 {
            return Err(GcodeError::InvalidParameterValue {
                token: format!("{letter}{value}"),
                command: Mnemonic::G4.code().to_string(),
            });
        }

        let mut line = Line::new(Mnemonic::G4.code(), comment);
        line.append_word(letter, &format_plain(value));
        self.write(line, Some(Motion::Dwell(minutes)));
        Ok(())
    }

    /// `G28`. Homed axes go to zero regardless of the coordinate mode.
    ///
    /// A safe home is written as separate lines: `G91` (when absolute), a
    /// `G1 Z` raise, the plain `G28`, then `G90` again.
    pub fn go_home(&mut self, args: HomeArgs, comment: Option<&str>) {
        if args.safe {
            let was_absolute = self.coordinate_mode() == CoordinateMode::Absolute;
            if was_absolute {
                self.relative_mode(None);
            }
            let raise = args
                .raise
                .filter(|z| z.is_finite() && *z > 0.0)
                .unwrap_or(match self.unit_system() {
                    UnitSystem::Millimeters => SAFE_RAISE_MM,
                    UnitSystem::Inches => SAFE_RAISE_IN,
                });
            self.write_move(
                Some(Mnemonic::G1),
                Axes::new(None, None, Some(raise)),
                &MoveArgs::default(),
                None,
            );
            self.go_home(
                HomeArgs {
                    safe: false,
                    ..args
                },
                comment,
            );
            if was_absolute {
                self.absolute_mode(None);
            }
            return;
        }

        let mut line = Line::new(Mnemonic::G28.code(), comment);
        self.append_axes(&mut line, args.axes);
        self.write(line, Some(Motion::Home(args.axes)));
    }

    // ── Modes ───────────────────────────────────────────────────────────────

    /// `G20`
    pub fn use_inches(&mut self, comment: Option<&str>) {
        self.state.set_unit_system(UnitSystem::Inches);
        self.write_plain(Command::UseInches, comment);
    }

    /// `G21`
    pub fn use_millimeters(&mut self, comment: Option<&str>) {
        self.state.set_unit_system(UnitSystem::Millimeters);
        self.write_plain(Command::UseMillimeters, comment);
    }

    /// `G90`
    pub fn absolute_mode(&mut self, comment: Option<&str>) {
        self.state.set_coordinate_mode(CoordinateMode::Absolute);
        self.write_plain(Command::AbsoluteMode, comment);
    }

    /// `G91`
    pub fn relative_mode(&mut self, comment: Option<&str>) {
        self.state.set_coordinate_mode(CoordinateMode::Relative);
        self.write_plain(Command::RelativeMode, comment);
    }

    /// `M82`
    pub fn absolute_extrusion(&mut self, comment: Option<&str>) {
        self.state.set_extrusion_mode(ExtrusionMode::Absolute);
        self.write_plain(Command::AbsoluteExtrusion, comment);
    }

    /// `M83`
    pub fn relative_extrusion(&mut self, comment: Option<&str>) {
        self.state.set_extrusion_mode(ExtrusionMode::Relative);
        self.write_plain(Command::RelativeExtrusion, comment);
    }

    /// `G92`. Only the words are written; the tracked position is unchanged.
    pub fn set_position(&mut self, args: SetPositionArgs, comment: Option<&str>) {
        let mut line = Line::new(Mnemonic::G92.code(), comment);
        self.append_axes(&mut line, args.axes);
        if let Some(e) = args.extrude {
            line.append_word('E', &self.settings.format(FormatCategory::Extrusion, e));
        }
        self.write(line, None);
    }

    // ── Machine control ─────────────────────────────────────────────────────

    /// `G10`
    pub fn retract(&mut self, length: Option<RetractLength>, comment: Option<&str>) {
        self.write_retract(Mnemonic::G10, length, comment);
    }

    /// `G11`
    pub fn unretract(&mut self, length: Option<RetractLength>, comment: Option<&str>) {
        self.write_retract(Mnemonic::G11, length, comment);
    }

    /// `M30`
    pub fn manual_mask_off(&mut self, comment: Option<&str>) {
        self.write_plain(Command::ManualMaskOff, comment);
    }

    /// `M84`
    pub fn stop_idle_hold(&mut self, comment: Option<&str>) {
        self.write_plain(Command::StopIdleHold, comment);
    }

    /// `M103`
    pub fn stop_extrusion(&mut self, comment: Option<&str>) {
        self.write_plain(Command::StopExtrusion, comment);
    }

    /// `M104`
    pub fn set_hotend(&mut self, args: HotendArgs, comment: Option<&str>) {
        let mut line = Line::new(Mnemonic::M104.code(), comment);
        if let Some(t) = args.tool {
            line.append_word('T', &t.to_string());
        }
        append_plain(&mut line, 'S', args.temperature);
        self.write(line, None);
    }

    /// `M106`. Only the supplied words are written, in `S P I F L B H R T` order.
    pub fn fan(&mut self, args: FanArgs, comment: Option<&str>) {
        let mut line = Line::new(Mnemonic::M106.code(), comment);
        append_plain(&mut line, 'S', args.speed);
        if let Some(p) = args.fan {
            line.append_word('P', &p.to_string());
        }
        if let Some(invert) = args.invert {
            line.append_word('I', if invert { "1" } else { "0" });
        }
        append_plain(&mut line, 'F', args.frequency);
        append_plain(&mut line, 'L', args.min_speed);
        append_plain(&mut line, 'B', args.blip_time);
        if let Some(h) = args.heaters {
            line.append_word('H', &h.to_string());
        }
        append_plain(&mut line, 'R', args.restore_speed);
        append_plain(&mut line, 'T', args.trigger_temperature);
        self.write(line, None);
    }

    /// `M107`
    pub fn fan_off(&mut self, comment: Option<&str>) {
        self.write_plain(Command::FanOff, comment);
    }

    /// `M190`
    pub fn wait_for_bed_temperature(&mut self, args: BedTemperatureArgs, comment: Option<&str>) {
        let mut line = Line::new(Mnemonic::M190.code(), comment);
        append_plain(&mut line, 'S', args.minimum);
        append_plain(&mut line, 'R', args.accurate);
        self.write(line, None);
    }

    /// `M721`
    pub fn unprime(&mut self, comment: Option<&str>) {
        self.write_plain(Command::Unprime, comment);
    }

    /// `M734`, interval in seconds.
    pub fn error_report_interval(&mut self, seconds: Option<f64>, comment: Option<&str>) {
        let mut line = Line::new(Mnemonic::M734.code(), comment);
        append_plain(&mut line, 'S', seconds);
        self.write(line, None);
    }

    /// `M756`, thickness in the active unit system.
    pub fn first_layer_thickness(&mut self, thickness: Option<f64>, comment: Option<&str>) {
        let mut line = Line::new(Mnemonic::M756.code(), comment);
        append_plain(&mut line, 'S', thickness);
        self.write(line, None);
    }

    /// `M790`
    pub fn new_layer(&mut self, comment: Option<&str>) {
        self.write_plain(Command::NewLayer, comment);
    }

    // ── Text ────────────────────────────────────────────────────────────────

    /// Writes a comment-only line. Surrounding whitespace is trimmed, as the
    /// decoder does.
    pub fn comment(&mut self, text: &str) {
        self.write(Line::comment(text), None);
    }

    pub fn blank(&mut self, count: usize) {
        for _ in 0..count {
            self.write(Line::blank(), None);
        }
    }

    /// Writes the generator credits as two comment lines.
    pub fn credits(&mut self) {
        for text in CREDITS {
            self.comment(text);
        }
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Writes a command that takes no parameters.
    fn write_plain(&mut self, command: Command, comment: Option<&str>) {
        let code = command.mnemonic().map_or("", Mnemonic::code);
        self.write(Line::new(code, comment), None);
    }

    fn write_retract(
        &mut self,
        mnemonic: Mnemonic,
        length: Option<RetractLength>,
        comment: Option<&str>,
    ) {
        let mut line = Line::new(mnemonic.code(), comment);
        if let Some(length) = length {
            line.append_word('S', &length.code().to_string());
        }
        self.write(line, None);
    }

    fn write_moves(&mut self, mnemonic: Option<Mnemonic>, args: &MoveArgs, comment: Option<&str>) {
        for axes in args.coordinates.rows() {
            self.write_move(mnemonic, axes, args, comment);
        }
    }

    fn write_move(
        &mut self,
        mnemonic: Option<Mnemonic>,
        axes: Axes,
        args: &MoveArgs,
        comment: Option<&str>,
    ) {
        if mnemonic.is_none() && axes.is_empty() {
            tracing::debug!("skipping modal move without axes");
            return;
        }

        let mut line = Line::new(mnemonic.map_or("", Mnemonic::code), comment);
        self.append_axes(&mut line, axes);
        if let Some(speed) = args.speed {
            let per_minute = self.state.set_feed_rate(speed);
            line.append_word('F', &self.settings.format(FormatCategory::Speed, per_minute));
        }
        if let Some(e) = args.extrude {
            line.append_word('E', &self.settings.format(FormatCategory::Extrusion, e));
        }
        if let Some(mode) = args.check_endstop {
            line.append_word('S', &mode.to_string());
        }

        let motion = (!axes.is_empty()).then_some(Motion::Move(axes));
        self.write(line, motion);
    }

    fn append_axes(&self, line: &mut Line, axes: Axes) {
        for (letter, value) in axes.words() {
            if let Some(v) = value {
                line.append_word(letter, &self.settings.format(FormatCategory::Position, v));
            }
        }
    }

    /// Counts and stores (or logs) one finished line and applies its motion.
    fn write(&mut self, line: Line, motion: Option<Motion>) {
        self.state.count_line();
        let text = line.finish();

        if self.debug_mode {
            tracing::info!(target: "gcody::debug", line = self.state.line_count(), "{}", text.trim_end());
            return;
        }

        let warning = match motion {
            Some(Motion::Move(axes)) => self.state.apply_motion(axes, None),
            Some(Motion::Dwell(minutes)) => self.state.apply_dwell(minutes),
            Some(Motion::Home(axes)) => self.state.apply_home(axes),
            None => None,
        };
        self.warnings.extend(warning);
        self.output.push(text);
    }
}

fn append_plain(line: &mut Line, letter: char, value: Option<f64>) {
    if let Some(v) = value {
        line.append_word(letter, &format_plain(v));
    }
}
