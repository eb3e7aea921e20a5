//! Index construction harness.
//!
//! Loads a vector dataset and its attribute file, builds the range-filtered
//! index, saves it plus the sorted-position mapping, and reports build time
//! and peak resource usage. Data loading is excluded from the timed section.
//!
//! ```text
//! build_index --data_path base.fvecs --attribute_path attrs.txt \
//!     --index_file index.rfg --M 16 --ef_construction 100
//! ```

use range_forge::dataset;
use range_forge::error::{RangeForgeError, Result};
use range_forge::metrics::ResourceMonitor;
use range_forge::RangeForgeBuilder;
use std::time::Instant;

struct Args {
    data_path: String,
    attribute_path: String,
    index_file: String,
    m: usize,
    ef_construction: usize,
    leaf_threshold: Option<usize>,
    threads: Option<usize>,
}

fn usage() -> ! {
    eprintln!(
        "usage: build_index --data_path <file> --attribute_path <file> \
         --index_file <file> --M <int> --ef_construction <int> \
         [--leaf_threshold <int>] [--threads <int>]"
    );
    std::process::exit(1);
}

/// Configuration errors abort before any file is touched.
fn validate_params(m: usize, ef_construction: usize) -> Result<()> {
    if m == 0 {
        return Err(RangeForgeError::invalid_parameter(
            "M must be a positive integer",
        ));
    }
    if ef_construction == 0 {
        return Err(RangeForgeError::invalid_parameter(
            "ef_construction must be a positive integer",
        ));
    }
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut data_path = None;
    let mut attribute_path = None;
    let mut index_file = None;
    let mut m = None;
    let mut ef_construction = None;
    let mut leaf_threshold = None;
    let mut threads = None;

    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let value = args.next().unwrap_or_else(|| usage());
        match flag.as_str() {
            "--data_path" => data_path = Some(value),
            "--attribute_path" => attribute_path = Some(value),
            "--index_file" => index_file = Some(value),
            "--M" => m = Some(parse_usize(&flag, &value)?),
            "--ef_construction" => ef_construction = Some(parse_usize(&flag, &value)?),
            "--leaf_threshold" => leaf_threshold = Some(parse_usize(&flag, &value)?),
            "--threads" => threads = Some(parse_usize(&flag, &value)?),
            _ => usage(),
        }
    }

    match (data_path, attribute_path, index_file, m, ef_construction) {
        (Some(data_path), Some(attribute_path), Some(index_file), Some(m), Some(ef_construction)) => {
            validate_params(m, ef_construction)?;
            Ok(Args {
                data_path,
                attribute_path,
                index_file,
                m,
                ef_construction,
                leaf_threshold,
                threads,
            })
        }
        _ => usage(),
    }
}

fn parse_usize(flag: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| RangeForgeError::invalid_parameter(format!("{flag} expects an integer, got {value:?}")))
}

fn run(args: Args) -> Result<()> {
    println!("Loading dataset from {}...", args.data_path);
    let vectors = dataset::read_vectors(&args.data_path)?;
    let attributes = dataset::read_attributes(&args.attribute_path)?;
    println!(
        "Loaded {} vectors ({} dims), {} attributes",
        vectors.len(),
        vectors.first().map_or(0, |v| v.dim()),
        attributes.len()
    );

    let mut builder = RangeForgeBuilder::new(args.m, args.ef_construction);
    if let Some(leaf_threshold) = args.leaf_threshold {
        builder = builder.leaf_threshold(leaf_threshold);
    }
    if let Some(threads) = args.threads {
        builder = builder.threads(threads);
    }

    let monitor = ResourceMonitor::start();
    let start = Instant::now();
    let index = builder.build(&vectors, &attributes)?;
    let build_time = start.elapsed();
    let report = monitor.finish();

    index.save(&args.index_file)?;
    dataset::write_mapping(format!("{}.mapping", args.data_path), index.mapping())?;

    println!("Index construction completed.");
    println!("Build time (s): {:.3}", build_time.as_secs_f64());
    println!("Peak thread count: {}", report.peak_threads);
    println!(
        "Peak memory (MB): {:.1}",
        report.peak_rss_kb as f64 / 1024.0
    );
    println!("Index written to {}", args.index_file);

    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_params() {
        assert!(matches!(
            validate_params(0, 100),
            Err(RangeForgeError::InvalidParameter(_))
        ));
        assert!(matches!(
            validate_params(16, 0),
            Err(RangeForgeError::InvalidParameter(_))
        ));
        assert!(validate_params(16, 100).is_ok());
    }
}
