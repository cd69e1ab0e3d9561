//! Waveform tracing of the hardware ports.
//!
//! The [`WaveformRecorder`] trait abstracts waveform output. [`VcdRecorder`]
//! implements the IEEE 1364 Value Change Dump (VCD) format, producing text
//! files that can be viewed in GTKWave, Surfer, or other waveform viewers.
//! Signals are identified by their index into [`PORTS`](crate::port::PORTS).

use std::io::{self, Write};

/// Trait for recording bench waveforms.
pub trait WaveformRecorder {
    /// Registers a signal under the given index.
    fn register_signal(&mut self, index: usize, name: &str, width: u32) -> io::Result<()>;

    /// Opens a new scope (hierarchy level) in the waveform.
    fn begin_scope(&mut self, name: &str) -> io::Result<()>;

    /// Closes the current scope.
    fn end_scope(&mut self) -> io::Result<()>;

    /// Records a value change at the given bench time.
    fn record_change(&mut self, time: u64, index: usize, value: u64) -> io::Result<()>;

    /// Finalizes the waveform output (flush, write trailer, etc.).
    fn finalize(&mut self) -> io::Result<()>;
}

/// VCD (Value Change Dump) format recorder following IEEE 1364.
///
/// Signal identifiers use printable ASCII characters starting from `!` (0x21).
pub struct VcdRecorder<W: Write> {
    writer: W,
    id_map: Vec<(usize, String, u32)>, // (index, id_code, width)
    header_written: bool,
    current_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a new VCD recorder writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            id_map: Vec::new(),
            header_written: false,
            current_time: None,
        }
    }

    /// Consumes the recorder and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.header_written = true;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  ladder scoreboard")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1ns")?;
        writeln!(self.writer, "$end")
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: usize) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            result.push((b'!' + (idx % 94) as u8) as char);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    /// Formats `value` truncated to its declared `width`.
    fn format_value(value: u64, width: u32) -> String {
        let value = if width < 64 {
            value & ((1u64 << width) - 1)
        } else {
            value
        };
        if width == 1 {
            if value == 1 { "1" } else { "0" }.into()
        } else {
            format!("b{value:b}")
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn register_signal(&mut self, index: usize, name: &str, width: u32) -> io::Result<()> {
        let id_code = Self::make_id_code(self.id_map.len());
        writeln!(self.writer, "$var wire {width} {id_code} {name} $end")?;
        self.id_map.push((index, id_code, width));
        Ok(())
    }

    fn begin_scope(&mut self, name: &str) -> io::Result<()> {
        self.write_header()?;
        writeln!(self.writer, "$scope module {name} $end")
    }

    fn end_scope(&mut self) -> io::Result<()> {
        writeln!(self.writer, "$upscope $end")
    }

    fn record_change(&mut self, time: u64, index: usize, value: u64) -> io::Result<()> {
        self.write_header()?;

        if self.current_time != Some(time) {
            if self.current_time.is_none() {
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "$dumpvars")?;
            }
            writeln!(self.writer, "#{time}")?;
            self.current_time = Some(time);
        }

        let (_, id_code, width) = self
            .id_map
            .iter()
            .find(|(i, _, _)| *i == index)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unregistered VCD signal {index}"),
                )
            })?;

        let val_str = Self::format_value(value, *width);
        if *width == 1 {
            writeln!(self.writer, "{val_str}{id_code}")
        } else {
            writeln!(self.writer, "{val_str} {id_code}")
        }
    }

    fn finalize(&mut self) -> io::Result<()> {
        if self.current_time.is_none() {
            self.write_header()?;
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.flush()
    }
}
