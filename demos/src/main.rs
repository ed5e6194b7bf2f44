//! Example programs driving the `qr-core`/`qr-png` API directly; not a
//! formal CLI, and not part of the library surface — a thin, unpolished
//! driver for manual testing.

use std::env;
use std::fs;
use std::process::ExitCode;

use qr_core::diagnostics::{CollectingDiagnostics, DiagLevel};
use qr_core::ec_level::ErrorCorrectionLevel;
use qr_core::encoder::{EncodeOptions, Encoder};
use qr_core::mask::Mask;
use qr_core::version::Version;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("encode") => run_encode(&args[2..]),
        Some("decode") => run_decode(&args[2..]),
        Some("fix") => run_fix(&args[2..]),
        _ => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  qr-demos encode <text> <out.png> [ecl=L|M|Q|H] [mask=0-7]");
    eprintln!("  qr-demos decode <in.png>");
    eprintln!("  qr-demos fix <in.png> <out.png>");
}

fn run_encode(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let text = args.first().ok_or("missing <text>")?;
    let out_path = args.get(1).ok_or("missing <out.png>")?;

    let mut ecl = ErrorCorrectionLevel::Medium;
    let mut mask = None;
    for flag in &args[2..] {
        if let Some(v) = flag.strip_prefix("ecl=") {
            ecl = match v {
                "L" => ErrorCorrectionLevel::Low,
                "M" => ErrorCorrectionLevel::Medium,
                "Q" => ErrorCorrectionLevel::Quartile,
                "H" => ErrorCorrectionLevel::High,
                other => return Err(format!("unknown ecl {other}").into()),
            };
        } else if let Some(v) = flag.strip_prefix("mask=") {
            mask = Some(Mask::new(v.parse()?));
        }
    }

    let diagnostics = CollectingDiagnostics::new();
    let encoder = Encoder::new(&diagnostics);
    let opts = EncodeOptions {
        ecl,
        mask,
        min_version: Version::MIN,
        max_version: Version::MAX,
        boost_ecl: true,
    };
    let qr = encoder.encode_bytes(text.as_bytes(), &opts)?;
    print_diagnostics(&diagnostics);
    println!("version {} ecl {:?} mask {:?} dimension {}", qr.version.value(), qr.ecl, qr.mask, qr.dimension());

    let png = qr_png::save_png(&qr)?;
    fs::write(out_path, png)?;
    Ok(())
}

fn run_decode(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let in_path = args.first().ok_or("missing <in.png>")?;
    let bytes = fs::read(in_path)?;
    let results = qr_png::decode_png(&bytes)?;
    if results.is_empty() {
        println!("no symbol found");
    }
    for data in &results {
        println!("{}", String::from_utf8_lossy(data));
    }
    Ok(())
}

fn run_fix(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let in_path = args.first().ok_or("missing <in.png>")?;
    let out_path = args.get(1).ok_or("missing <out.png>")?;
    let bytes = fs::read(in_path)?;
    let fixed = qr_png::fix(&bytes)?;
    fs::write(out_path, fixed)?;
    Ok(())
}

fn print_diagnostics(d: &CollectingDiagnostics) {
    for (level, message) in d.records() {
        if level >= DiagLevel::Debug {
            eprintln!("[{level:?}] {message}");
        }
    }
}
