/// Annotation render to class mask converter main entry point
mod converter;

use converter::MaskConverter;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input_dir> <output_dir>", args[0]);
        std::process::exit(1);
    }

    let converter = MaskConverter::new(&args[1], &args[2]);
    let summary = converter.convert()?;

    println!(
        "Generated {} masks ({} skipped)",
        summary.written.len(),
        summary.skipped.len()
    );
    Ok(())
}
