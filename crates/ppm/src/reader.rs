use std::fs::File;
use std::io::Read;
use std::path::Path;

use scan::{is_space, ScanError, TokenScanner};

use crate::format::{
    exceeds_pixel_budget, PpmHeader, IO_BUFFER_BYTES, MAGIC, MAX_CHANNEL_VALUE, MAX_DIMENSION,
    MAX_VALUE_CEILING,
};
use crate::PpmError;

/// One color pixel, read and immediately consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Unweighted mean of the three channels, truncating toward zero.
    ///
    /// Truncation (not rounding) is deliberate and kept for bit-for-bit
    /// output compatibility.
    pub fn gray(self) -> u8 {
        ((u16::from(self.r) + u16::from(self.g) + u16::from(self.b)) / 3) as u8
    }
}

/// Streaming P3 reader: header first, then one pixel per call.
///
/// The reader never buffers more than the scanner's read-ahead; pixel data
/// is consumed in a single forward pass.
pub struct PpmReader<R: Read> {
    scanner: TokenScanner<R>,
}

impl PpmReader<File> {
    /// Opens `path` with a large stream buffer.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<PpmReader<File>, PpmError> {
        let file = File::open(path)?;
        Ok(PpmReader {
            scanner: TokenScanner::with_capacity(IO_BUFFER_BYTES, file),
        })
    }
}

/// Maps scanner failures during header parsing: premature end of input
/// becomes [`PpmError::HeaderEof`], everything else is an I/O error.
fn header_err(err: ScanError) -> PpmError {
    match err {
        ScanError::Io(e) => PpmError::Io(e),
        _ => PpmError::HeaderEof,
    }
}

impl<R: Read> PpmReader<R> {
    pub fn from_reader(reader: R) -> Self {
        PpmReader {
            scanner: TokenScanner::from_reader(reader),
        }
    }

    /// Parses and validates the header, consuming the stream up to and
    /// including the max-value field.
    ///
    /// # Validation
    ///
    /// - Magic must be exactly `P3`.
    /// - Width and height must be in `1..=100_000`.
    /// - `width * height` must not exceed the pixel budget.
    /// - Max value must be exactly 255.
    ///
    /// # Errors
    ///
    /// Each failing field gets its own [`PpmError`] variant so diagnostics
    /// name the field, not just the byte offset.
    pub fn read_header(&mut self) -> Result<PpmHeader, PpmError> {
        // Skip leading whitespace with comment runs interleaved; a comment
        // is legal even before the magic.
        loop {
            let byte = self
                .scanner
                .next_byte()
                .map_err(header_err)?
                .ok_or(PpmError::HeaderEof)?;
            let byte = if byte == b'#' {
                self.scanner.skip_comment_run(byte).map_err(header_err)?
            } else {
                byte
            };
            if !is_space(byte) {
                self.scanner.push_back(byte);
                break;
            }
        }

        let mut magic = [0u8; 2];
        for slot in &mut magic {
            *slot = self
                .scanner
                .next_byte()
                .map_err(header_err)?
                .ok_or(PpmError::BadMagic)?;
        }
        if magic != MAGIC {
            return Err(PpmError::BadMagic);
        }

        let width = self
            .scanner
            .read_uint(MAX_DIMENSION)
            .map_err(PpmError::DimensionRead)?;
        let height = self
            .scanner
            .read_uint(MAX_DIMENSION)
            .map_err(PpmError::DimensionRead)?;
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(PpmError::InvalidDimensions { width, height });
        }
        if exceeds_pixel_budget(width, height) {
            return Err(PpmError::ImageTooLarge { width, height });
        }

        let max_value = self
            .scanner
            .read_uint(MAX_VALUE_CEILING)
            .map_err(PpmError::MaxValueRead)?;
        if max_value != MAX_CHANNEL_VALUE {
            return Err(PpmError::UnsupportedMaxValue(max_value));
        }

        Ok(PpmHeader {
            width: width as u32,
            height: height as u32,
            max_value: max_value as u16,
        })
    }

    /// Reads the next pixel's three channel samples.
    ///
    /// `row` and `col` are only used to label failures; the reader itself
    /// is a flat forward stream with no positional state.
    pub fn read_pixel(&mut self, row: u32, col: u32) -> Result<Rgb, PpmError> {
        let wrap = |e: ScanError| PpmError::Pixel {
            row,
            col,
            source: Box::new(e),
        };
        let r = self.scanner.read_uint(MAX_CHANNEL_VALUE).map_err(wrap)?;
        let g = self.scanner.read_uint(MAX_CHANNEL_VALUE).map_err(wrap)?;
        let b = self.scanner.read_uint(MAX_CHANNEL_VALUE).map_err(wrap)?;

        // read_uint already bounds each channel at 255; the checked
        // narrowing keeps that invariant enforced at the cast site.
        let narrow = |v: u64| u8::try_from(v).map_err(|_| PpmError::PixelRange { row, col });
        Ok(Rgb {
            r: narrow(r)?,
            g: narrow(g)?,
            b: narrow(b)?,
        })
    }
}
