//! P3 format constants, header type, and header serialization.

use std::io::{Result as IoResult, Write};

/// Magic bytes identifying the plain (ASCII) PPM encoding.
pub const MAGIC: [u8; 2] = *b"P3";

/// Largest accepted width or height.
pub const MAX_DIMENSION: u64 = 100_000;

/// Largest legal channel sample; the only color depth this layer supports.
pub const MAX_CHANNEL_VALUE: u64 = 255;

/// Theoretical ceiling the format allows for the max-value field. Values
/// up to here parse cleanly so the depth check can report them precisely.
pub const MAX_VALUE_CEILING: u64 = 65_535;

/// Stream buffer size for both the input and output side, large enough to
/// amortize syscall overhead on multi-megabyte images.
pub const IO_BUFFER_BYTES: usize = 256 * 1024;

/// Returns `true` if a `width` x `height` image exceeds the pixel budget.
///
/// The budget (a tenth of `MAX_DIMENSION` squared) is a resource
/// exhaustion guard, not a format rule: both dimensions can be legal while
/// their product is still unreasonable to process.
pub fn exceeds_pixel_budget(width: u64, height: u64) -> bool {
    width * height > MAX_DIMENSION * MAX_DIMENSION / 10
}

/// Validated, immutable P3 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpmHeader {
    pub width: u32,
    pub height: u32,
    /// Declared channel maximum; always 255 once validated.
    pub max_value: u16,
}

impl PpmHeader {
    /// Total number of pixels in the image.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Writes the three-line header (`P3`, dimensions, max value) to `w`.
pub fn write_header<W: Write>(w: &mut W, header: &PpmHeader) -> IoResult<()> {
    write!(
        w,
        "P3\n{} {}\n{}\n",
        header.width, header.height, header.max_value
    )
}
