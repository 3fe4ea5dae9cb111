//! Minify the stylesheet on stdin to stdout.
//!
//! Usage: `stylemin [COMPATIBILITY] [--restructure] < in.css > out.css`
//! where COMPATIBILITY is a profile string such as `ie8` or
//! `*,-properties.merging`.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use stylemin::{CompatibilityProfile, Config, Level2Options, minify};

fn main() -> ExitCode {
    let mut compatibility = CompatibilityProfile::default();
    let mut level2 = Level2Options::default();
    for arg in std::env::args().skip(1) {
        if arg == "--restructure" {
            level2.restructure_rules = true;
            continue;
        }
        match arg.parse() {
            Ok(profile) => compatibility = profile,
            Err(e) => {
                eprintln!("stylemin: {}", e);
                return ExitCode::from(2);
            }
        }
    }

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("stylemin: cannot read stdin: {}", e);
        return ExitCode::FAILURE;
    }
    let output = minify(&input, &Config::new(compatibility, level2));
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
        eprintln!("stylemin: cannot write stdout: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
