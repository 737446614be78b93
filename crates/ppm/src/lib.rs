//! # PPM — plain (P3) Portable Pixmap format layer
//!
//! Streaming reader and writer for the ASCII-encoded PPM color image
//! format. Both sides are strictly single-pass: the reader yields one
//! pixel at a time, the writer stages one row at a time. The whole image
//! is never held in memory.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ HEADER (three logical fields)                 │
//! │                                               │
//! │ magic "P3"                                    │
//! │ width height        (decimal, 1..=100000)     │
//! │ max_value           (decimal, must be 255)    │
//! ├───────────────────────────────────────────────┤
//! │ PIXEL DATA (width * height triplets)          │
//! │                                               │
//! │ r g b  r g b  ...   one image row             │
//! │ ... repeated for each row ...                 │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! All fields are ASCII decimal separated by whitespace. A `#` starts a
//! comment running to end of line and is legal anywhere whitespace is:
//! between header fields and between pixel values alike.

use std::io;

use scan::ScanError;
use thiserror::Error;

mod format;
mod reader;
mod writer;

pub use format::{write_header, PpmHeader, IO_BUFFER_BYTES, MAGIC, MAX_CHANNEL_VALUE, MAX_DIMENSION};
pub use reader::{PpmReader, Rgb};
pub use writer::PpmWriter;

#[derive(Debug, Error)]
pub enum PpmError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected end of file in header")]
    HeaderEof,
    #[error("unsupported magic number (expected P3)")]
    BadMagic,
    #[error("failed to read image dimensions: {0}")]
    DimensionRead(#[source] ScanError),
    #[error("invalid image dimensions ({width}x{height})")]
    InvalidDimensions { width: u64, height: u64 },
    #[error("image too large ({width}x{height} pixels)")]
    ImageTooLarge { width: u64, height: u64 },
    #[error("failed to read maximum color value: {0}")]
    MaxValueRead(#[source] ScanError),
    #[error("maximum color value must be 255 (got {0})")]
    UnsupportedMaxValue(u64),
    #[error("failed to read pixel data at row {row}, col {col}: {source}")]
    Pixel {
        row: u32,
        col: u32,
        #[source]
        source: Box<ScanError>,
    },
    #[error("pixel value out of range at row {row}, col {col}")]
    PixelRange { row: u32, col: u32 },
}
