// Line-oriented ammeter on a serial tty.
// Port settings (baud, raw mode) are applied outside the program, e.g. with stty.

use super::Ammeter;
use crate::error::AmmeterError;
use crate::models::Sample;
use std::fs::File;
use std::io::{BufRead, BufReader};

pub struct SerialAmmeter<R> {
    port: String,
    reader: R,
    line: Vec<u8>,
}

impl SerialAmmeter<BufReader<File>> {
    pub fn open(port: &str) -> Result<Self, AmmeterError> {
        let file = File::open(port).map_err(|source| AmmeterError::Open {
            port: port.to_string(),
            source,
        })?;
        Ok(Self::from_reader(port, BufReader::new(file)))
    }
}

impl<R: BufRead> SerialAmmeter<R> {
    pub fn from_reader(port: &str, reader: R) -> Self {
        Self {
            port: port.to_string(),
            reader,
            line: Vec::new(),
        }
    }
}

impl<R: BufRead + Send> Ammeter for SerialAmmeter<R> {
    fn read_sample(&mut self) -> Result<Option<Sample>, AmmeterError> {
        self.line.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.line)
            .map_err(|source| AmmeterError::Io {
                port: self.port.clone(),
                source,
            })?;
        if n == 0 {
            return Err(AmmeterError::Closed {
                port: self.port.clone(),
            });
        }
        // Line noise or a baud mismatch shows up as bytes that are not UTF-8.
        let Ok(line) = std::str::from_utf8(&self.line) else {
            tracing::trace!(bytes = n, "ignoring undecodable ammeter line");
            return Ok(None);
        };
        let sample = parse_sample_line(line);
        if sample.is_none() && !line.trim().is_empty() {
            tracing::trace!(line = line.trim(), "ignoring ammeter line");
        }
        Ok(sample)
    }
}

/// Parses `current=<mA> voltage=<V> time=<ms>` tokens separated by whitespace
/// or commas. Unknown keys are ignored; a line missing any of the three, or
/// carrying a non-finite reading, is no data.
pub fn parse_sample_line(line: &str) -> Option<Sample> {
    let mut current = None;
    let mut voltage = None;
    let mut device_time = None;
    for token in line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key {
            "current" => current = parse_finite(value),
            "voltage" => voltage = parse_finite(value),
            "time" => device_time = value.parse::<i64>().ok(),
            _ => {}
        }
    }
    Some(Sample {
        current: current?,
        voltage: voltage?,
        device_time: device_time?,
    })
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
