use std::io::{self, Error, ErrorKind};

/// Shortest run of identical bytes that the encoder emits as a run group.
const MIN_RUN_LENGTH: usize = 3;

/// Longest literal group either flavour can express.
const MAX_LITERAL_LENGTH: usize = 128;

/// The two dialects of the control-byte run-length scheme.
///
/// Both interpret a control byte as either "copy the next N bytes" or
/// "repeat the next byte N times"; they only differ in how N is stored for
/// runs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RunLength {
    /// Classic PackBits, as used by Icon Archiver version 1 payloads.  A
    /// negative (signed) control byte `c` repeats the next byte `-c + 1`
    /// times; a non-negative one copies `c + 1` literal bytes.
    PackBits,
    /// The ICNS variant used for 24-bit color channels.  A control byte
    /// below 128 copies `c + 1` literal bytes; otherwise the next byte is
    /// repeated `c - 125` times.
    Icns,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Group {
    Literal(usize),
    Run(usize),
}

impl RunLength {
    /// Returns the longest run this flavour's encoder will emit as a
    /// single group.
    pub fn max_run_length(self) -> usize {
        match self {
            RunLength::PackBits => 128,
            RunLength::Icns => 130,
        }
    }

    fn parse_control(self, control: u8) -> Group {
        match self {
            RunLength::PackBits => {
                let signed = control as i8;
                if signed < 0 {
                    Group::Run((1 - i16::from(signed)) as usize)
                } else {
                    Group::Literal(signed as usize + 1)
                }
            }
            RunLength::Icns => {
                if control < 128 {
                    Group::Literal(control as usize + 1)
                } else {
                    Group::Run(control as usize - 125)
                }
            }
        }
    }

    fn run_control(self, length: usize) -> u8 {
        debug_assert!(length >= MIN_RUN_LENGTH &&
                      length <= self.max_run_length());
        match self {
            RunLength::PackBits => (1 - length as i16) as i8 as u8,
            RunLength::Icns => (length + 125) as u8,
        }
    }

    /// Decodes `input` until exactly `output_length` bytes have been
    /// produced, and returns them along with the number of input bytes
    /// consumed.  Input left over after that point is ignored.
    pub fn decode(self,
                  input: &[u8],
                  output_length: usize)
                  -> io::Result<(Vec<u8>, usize)> {
        let mut output = Vec::with_capacity(output_length);
        let mut position = 0;
        while output.len() < output_length {
            let control = *input.get(position).ok_or_else(rle_error)?;
            position += 1;
            match self.parse_control(control) {
                Group::Literal(count) => {
                    if output.len() + count > output_length {
                        return Err(overrun_error(output_length));
                    }
                    let bytes = input.get(position..position + count)
                        .ok_or_else(rle_error)?;
                    output.extend_from_slice(bytes);
                    position += count;
                }
                Group::Run(count) => {
                    if output.len() + count > output_length {
                        return Err(overrun_error(output_length));
                    }
                    let value = *input.get(position).ok_or_else(rle_error)?;
                    position += 1;
                    output.resize(output.len() + count, value);
                }
            }
        }
        Ok((output, position))
    }

    /// Encodes all of `input`.
    pub fn encode(self, input: &[u8]) -> Vec<u8> {
        let mut output = Vec::new();
        self.encode_strided(input, 0, 1, &mut output);
        output
    }

    /// Encodes every `stride`-th byte of `input`, starting at `base`, and
    /// appends the result to `output`.  Returns the number of bytes
    /// appended.
    pub fn encode_strided(self,
                          input: &[u8],
                          base: usize,
                          stride: usize,
                          output: &mut Vec<u8>)
                          -> usize {
        let samples: Vec<u8> =
            input.iter().skip(base).step_by(stride).cloned().collect();
        let start_length = output.len();
        let max_run = self.max_run_length();
        let mut position = 0;
        while position < samples.len() {
            let run = run_length_at(&samples, position, max_run);
            if run >= MIN_RUN_LENGTH {
                output.push(self.run_control(run));
                output.push(samples[position]);
                position += run;
                continue;
            }
            let literal_start = position;
            while position < samples.len() &&
                  position - literal_start < MAX_LITERAL_LENGTH &&
                  run_length_at(&samples, position, MIN_RUN_LENGTH) <
                  MIN_RUN_LENGTH {
                position += 1;
            }
            output.push((position - literal_start - 1) as u8);
            output.extend_from_slice(&samples[literal_start..position]);
        }
        output.len() - start_length
    }
}

/// Counts identical bytes starting at `position`, up to `limit`.
fn run_length_at(samples: &[u8], position: usize, limit: usize) -> usize {
    let value = samples[position];
    samples[position..]
        .iter()
        .take(limit)
        .take_while(|&&byte| byte == value)
        .count()
}

fn rle_error() -> Error {
    Error::new(ErrorKind::InvalidData, "truncated RLE-compressed data")
}

fn overrun_error(output_length: usize) -> Error {
    let msg = format!("RLE-compressed data overruns the expected {} bytes",
                      output_length);
    Error::new(ErrorKind::InvalidData, msg)
}
