use std::process::ExitCode;

mod pipeline;

use pipeline::ConvertConfig;

fn main() -> ExitCode {
    let config = ConvertConfig::default();
    match pipeline::convert(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
