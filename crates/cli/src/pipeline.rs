/// Conversion pipeline tying the PPM reader and writer together.
use anyhow::{Context, Result};
use ppm::{PpmHeader, PpmReader, PpmWriter};
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Input and output locations for one conversion run.
///
/// The defaults mirror the classic fixed paths: read `im.ppm` from the
/// working directory, write `im-gray.ppm` next to it. Callers that need
/// other locations construct the config explicitly; there is no CLI or
/// environment plumbing behind this.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("im.ppm"),
            output: PathBuf::from("im-gray.ppm"),
        }
    }
}

/// Converts one P3 color image to a grayscale P3 image.
///
/// # Steps
///
/// 1. Open the input and parse/validate the header.
/// 2. Create the output and write the echoed header.
/// 3. For each row, for each pixel: read a triplet, average it, stage the
///    gray triplet; flush the row in one write.
/// 4. Close the output so flush errors surface.
///
/// # Errors
///
/// Every failure is terminal; nothing is retried. Once the output file
/// exists, any failure deletes it so callers never observe a truncated
/// result.
pub fn convert(config: &ConvertConfig) -> Result<()> {
    let mut reader = PpmReader::open(&config.input)
        .with_context(|| format!("cannot open input file {:?}", config.input))?;
    let header = reader
        .read_header()
        .with_context(|| format!("invalid header in {:?}", config.input))?;

    let writer = PpmWriter::create(&config.output, &header)
        .with_context(|| format!("cannot open output file {:?}", config.output))?;

    // From here on a partial output file exists on disk.
    if let Err(err) = transcode(&mut reader, writer, &header) {
        let _ = fs::remove_file(&config.output);
        return Err(err);
    }
    Ok(())
}

fn transcode(
    reader: &mut PpmReader<File>,
    mut writer: PpmWriter<BufWriter<File>>,
    header: &PpmHeader,
) -> Result<()> {
    for row in 0..header.height {
        for col in 0..header.width {
            let pixel = reader.read_pixel(row, col)?;
            writer.push_gray(pixel.gray());
        }
        writer
            .end_row()
            .with_context(|| format!("write failure at row {row}"))?;
    }
    writer.close().context("failed to close output file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    // ---------------------- Helpers ----------------------

    fn config(dir: &Path) -> ConvertConfig {
        ConvertConfig {
            input: dir.join("im.ppm"),
            output: dir.join("im-gray.ppm"),
        }
    }

    fn write_input(config: &ConvertConfig, contents: &str) {
        fs::write(&config.input, contents).unwrap();
    }

    // ---------------------- Success paths ----------------------

    #[test]
    fn converts_red_green_pair_to_85s() -> Result<()> {
        let dir = tempdir()?;
        let cfg = config(dir.path());
        write_input(&cfg, "P3\n2 1\n255\n255 0 0 0 255 0\n");

        convert(&cfg)?;

        let out = fs::read_to_string(&cfg.output)?;
        assert_eq!(out, "P3\n2 1\n255\n85 85 85 85 85 85\n");
        Ok(())
    }

    #[test]
    fn preserves_dimensions_and_depth() -> Result<()> {
        let dir = tempdir()?;
        let cfg = config(dir.path());
        // 4x3: twelve triplets with varied formatting
        write_input(
            &cfg,
            "P3\n4 3\n255\n\
             0 0 0  10 20 30  255 255 255  1 2 3\n\
             4 5 6  7 8 9  10 11 12  13 14 15\n\
             90 90 90  100 100 100  200 200 200  250 250 252\n",
        );

        convert(&cfg)?;

        let out = fs::read_to_string(&cfg.output)?;
        assert!(out.starts_with("P3\n4 3\n255\n"));
        assert_eq!(out.lines().count(), 6, "three header lines, three rows");
        Ok(())
    }

    #[test]
    fn tolerates_comments_in_header_and_pixels() -> Result<()> {
        let dir = tempdir()?;
        let cfg = config(dir.path());
        write_input(
            &cfg,
            "# comment before magic\nP3\n2 # width\n2 # height\n255 # depth\n\
             1 2 3 # first pixel\n4 5 6\n7 8 9 10 11 12\n",
        );

        convert(&cfg)?;
        assert!(cfg.output.exists());
        Ok(())
    }

    #[test]
    fn conversion_is_idempotent_on_grayscale_input() -> Result<()> {
        let dir = tempdir()?;
        let cfg = config(dir.path());
        write_input(&cfg, "P3\n2 2\n255\n0 10 20 30 40 50\n60 70 80 90 100 110\n");
        convert(&cfg)?;

        // run the output through a second conversion
        let second = ConvertConfig {
            input: cfg.output.clone(),
            output: dir.path().join("twice.ppm"),
        };
        convert(&second)?;

        let once = fs::read_to_string(&cfg.output)?;
        let twice = fs::read_to_string(&second.output)?;
        assert_eq!(once, twice);
        Ok(())
    }

    // ---------------------- Failure paths ----------------------

    #[test]
    fn missing_input_fails_without_creating_output() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());

        let err = convert(&cfg).unwrap_err();
        assert!(err.to_string().contains("cannot open input file"));
        assert!(!cfg.output.exists());
    }

    #[test]
    fn bad_header_fails_before_output_exists() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        write_input(&cfg, "P6\n2 1\n255\n");

        assert!(convert(&cfg).is_err());
        assert!(!cfg.output.exists());
    }

    #[test]
    fn truncated_input_deletes_partial_output() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        // header promises 2x2 but only one row of pixels is present
        write_input(&cfg, "P3\n2 2\n255\n1 2 3 4 5 6\n");

        assert!(convert(&cfg).is_err());
        assert!(!cfg.output.exists(), "partial output must be removed");
    }

    #[test]
    fn pixel_error_names_row_and_col() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        write_input(&cfg, "P3\n2 2\n255\n1 2 3 4 5 6\n7 8 9 oops 0 0\n");

        let err = convert(&cfg).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("row 1, col 1"), "got: {message}");
        assert!(!cfg.output.exists());
    }

    #[test]
    fn unsupported_depth_is_reported() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        write_input(&cfg, "P3\n2 1\n254\n1 2 3 4 5 6\n");

        let err = convert(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("must be 255"));
    }

    #[test]
    fn default_paths_are_the_documented_ones() {
        let cfg = ConvertConfig::default();
        assert_eq!(cfg.input, PathBuf::from("im.ppm"));
        assert_eq!(cfg.output, PathBuf::from("im-gray.ppm"));
    }
}
