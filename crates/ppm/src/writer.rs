use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::format::{write_header, PpmHeader, IO_BUFFER_BYTES};
use crate::PpmError;

/// Decimal text for every sample value in `0..=255`, precomputed once so
/// the hot loop appends bytes instead of formatting integers.
struct DigitTable {
    bytes: [[u8; 3]; 256],
    lens: [u8; 256],
}

impl DigitTable {
    fn new() -> Self {
        let mut bytes = [[0u8; 3]; 256];
        let mut lens = [0u8; 256];
        for v in 0..256 {
            let text = format!("{v}");
            lens[v] = text.len() as u8;
            bytes[v][..text.len()].copy_from_slice(text.as_bytes());
        }
        Self { bytes, lens }
    }

    fn get(&self, value: u8) -> &[u8] {
        let v = value as usize;
        &self.bytes[v][..self.lens[v] as usize]
    }
}

/// Worst-case size of one formatted row: per pixel three 3-digit samples
/// plus three separators, plus the trailing newline and slack.
fn row_capacity(width: u32) -> usize {
    width as usize * (3 * 3 + 3) + 2
}

/// Streaming P3 writer for grayscale output.
///
/// Writes the header up front, then stages one row at a time in a
/// reusable buffer: [`push_gray`](PpmWriter::push_gray) per pixel,
/// [`end_row`](PpmWriter::end_row) to flush the row in a single write.
/// The buffer is cleared, never reallocated, between rows.
pub struct PpmWriter<W: Write> {
    out: W,
    digits: DigitTable,
    row: Vec<u8>,
    /// Pixels staged in the current row, for separator placement.
    col: u32,
}

impl PpmWriter<BufWriter<File>> {
    /// Creates `path`, attaches a large stream buffer, and writes the
    /// header. Pixel data must follow via `push_gray`/`end_row`.
    pub fn create<P: AsRef<Path>>(
        path: P,
        header: &PpmHeader,
    ) -> Result<PpmWriter<BufWriter<File>>, PpmError> {
        let file = File::create(path)?;
        let out = BufWriter::with_capacity(IO_BUFFER_BYTES, file);
        PpmWriter::from_writer(out, header)
    }

    /// Flushes buffered output and releases the file, surfacing any
    /// close-time error instead of letting drop swallow it.
    pub fn close(self) -> Result<(), PpmError> {
        let out = self.into_inner()?;
        let file = out.into_inner().map_err(|e| PpmError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(())
    }
}

impl<W: Write> PpmWriter<W> {
    /// Wraps an arbitrary writer, emitting the header immediately.
    pub fn from_writer(mut out: W, header: &PpmHeader) -> Result<PpmWriter<W>, PpmError> {
        write_header(&mut out, header)?;
        Ok(PpmWriter {
            out,
            digits: DigitTable::new(),
            row: Vec::with_capacity(row_capacity(header.width)),
            col: 0,
        })
    }

    /// Appends one grayscale pixel to the staged row as the triplet
    /// `gray gray gray` — the format stays three-channel even though the
    /// image is monochrome. Infallible: only touches the row buffer.
    pub fn push_gray(&mut self, gray: u8) {
        if self.col > 0 {
            self.row.push(b' ');
        }
        let text = self.digits.get(gray);
        self.row.extend_from_slice(text);
        self.row.push(b' ');
        self.row.extend_from_slice(text);
        self.row.push(b' ');
        self.row.extend_from_slice(text);
        self.col += 1;
    }

    /// Terminates the staged row with a newline, writes it out in one
    /// call, and resets the buffer for the next row.
    pub fn end_row(&mut self) -> Result<(), PpmError> {
        self.row.push(b'\n');
        self.out.write_all(&self.row)?;
        self.row.clear();
        self.col = 0;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W, PpmError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(width: u32, height: u32) -> PpmHeader {
        PpmHeader {
            width,
            height,
            max_value: 255,
        }
    }

    #[test]
    fn digit_table_matches_formatting() {
        let table = DigitTable::new();
        for v in [0u8, 1, 9, 10, 42, 99, 100, 101, 200, 254, 255] {
            assert_eq!(table.get(v), format!("{v}").as_bytes(), "value {v}");
        }
    }

    #[test]
    fn writes_header_on_construction() {
        let w = PpmWriter::from_writer(Vec::new(), &header(2, 1)).unwrap();
        let out = w.into_inner().unwrap();
        assert_eq!(out, b"P3\n2 1\n255\n");
    }

    #[test]
    fn rows_are_space_separated_triplets() {
        let mut w = PpmWriter::from_writer(Vec::new(), &header(2, 1)).unwrap();
        w.push_gray(85);
        w.push_gray(85);
        w.end_row().unwrap();
        let out = w.into_inner().unwrap();
        assert_eq!(out, b"P3\n2 1\n255\n85 85 85 85 85 85\n");
    }

    #[test]
    fn row_buffer_resets_between_rows() {
        let mut w = PpmWriter::from_writer(Vec::new(), &header(1, 3)).unwrap();
        for gray in [0u8, 128, 255] {
            w.push_gray(gray);
            w.end_row().unwrap();
        }
        let out = w.into_inner().unwrap();
        assert_eq!(out, b"P3\n1 3\n255\n0 0 0\n128 128 128\n255 255 255\n");
    }

    #[test]
    fn worst_case_row_fits_reserved_capacity() {
        let width = 7u32;
        let mut w = PpmWriter::from_writer(Vec::new(), &header(width, 1)).unwrap();
        let cap_before = w.row.capacity();
        for _ in 0..width {
            w.push_gray(255);
        }
        assert!(w.row.len() < cap_before);
        assert_eq!(w.row.capacity(), cap_before);
    }
}
