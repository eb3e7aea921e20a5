//! Query execution harness.
//!
//! Loads a saved index, the dataset, queries with their attribute ranges,
//! and exact groundtruth, then runs every query single-threaded and reports
//! query time, QPS, recall, and peak resource usage. Loading is excluded
//! from the timed section.
//!
//! The vector store is rebuilt in sorted order using the `.mapping` file
//! written next to the dataset at build time.
//!
//! ```text
//! search_index --data_path base.fvecs --query_path query.fvecs \
//!     --query_ranges_file ranges.txt --groundtruth_file gt.ivecs \
//!     --index_file index.rfg --ef_search 50 --k 10
//! ```

use range_forge::dataset;
use range_forge::error::{RangeForgeError, Result};
use range_forge::metrics::{self, ResourceMonitor};
use range_forge::vector::VectorStore;
use range_forge::RangeForgeIndex;
use std::time::Instant;

struct Args {
    data_path: String,
    query_path: String,
    query_ranges_file: String,
    groundtruth_file: String,
    index_file: String,
    m: usize,
    ef_search: usize,
    k: usize,
}

fn usage() -> ! {
    eprintln!(
        "usage: search_index --data_path <file> --query_path <file> \
         --query_ranges_file <file> --groundtruth_file <file> \
         --index_file <file> --M <int> --ef_search <int> --k <int>"
    );
    std::process::exit(1);
}

/// Configuration errors abort before any file is touched.
fn validate_params(m: usize, ef_search: usize, k: usize) -> Result<()> {
    if m == 0 {
        return Err(RangeForgeError::invalid_parameter(
            "M must be a positive integer",
        ));
    }
    if ef_search == 0 {
        return Err(RangeForgeError::invalid_parameter(
            "ef_search must be a positive integer",
        ));
    }
    if k == 0 {
        return Err(RangeForgeError::invalid_parameter(
            "k must be a positive integer",
        ));
    }
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut data_path = None;
    let mut query_path = None;
    let mut query_ranges_file = None;
    let mut groundtruth_file = None;
    let mut index_file = None;
    let mut m = None;
    let mut ef_search = None;
    let mut k = None;

    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let value = args.next().unwrap_or_else(|| usage());
        match flag.as_str() {
            "--data_path" => data_path = Some(value),
            "--query_path" => query_path = Some(value),
            "--query_ranges_file" => query_ranges_file = Some(value),
            "--groundtruth_file" => groundtruth_file = Some(value),
            "--index_file" => index_file = Some(value),
            "--M" => m = Some(parse_usize(&flag, &value)?),
            "--ef_search" => ef_search = Some(parse_usize(&flag, &value)?),
            "--k" => k = Some(parse_usize(&flag, &value)?),
            _ => usage(),
        }
    }

    match (
        data_path,
        query_path,
        query_ranges_file,
        groundtruth_file,
        index_file,
        m,
        ef_search,
        k,
    ) {
        (
            Some(data_path),
            Some(query_path),
            Some(query_ranges_file),
            Some(groundtruth_file),
            Some(index_file),
            Some(m),
            Some(ef_search),
            Some(k),
        ) => {
            validate_params(m, ef_search, k)?;
            Ok(Args {
                data_path,
                query_path,
                query_ranges_file,
                groundtruth_file,
                index_file,
                m,
                ef_search,
                k,
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

/// Rebuild the vector store in sorted order: position i holds the vector
/// whose original id is mapping[i].
fn sorted_store(data_path: &str) -> Result<VectorStore> {
    let vectors = dataset::read_vectors(data_path)?;
    let mapping = dataset::read_mapping(format!("{data_path}.mapping"))?;
    if mapping.len() != vectors.len() {
        return Err(RangeForgeError::count_mismatch(
            "mapping entries",
            vectors.len(),
            mapping.len(),
        ));
    }

    let dim = vectors.first().map_or(0, |v| v.dim());
    let mut store = VectorStore::with_capacity(dim, vectors.len());
    for &original_id in &mapping {
        let vector = vectors.get(original_id as usize).ok_or_else(|| {
            RangeForgeError::invalid_format(format!("mapping id {original_id} out of bounds"))
        })?;
        store.push(&vector.data)?;
    }
    Ok(store)
}

fn run(args: Args) -> Result<()> {
    println!("Loading dataset and index...");
    let store = sorted_store(&args.data_path)?;
    let queries = dataset::read_vectors(&args.query_path)?;
    let ranges = dataset::read_ranges(&args.query_ranges_file)?;
    let groundtruth = dataset::read_groundtruth(&args.groundtruth_file)?;

    if ranges.len() != queries.len() {
        return Err(RangeForgeError::count_mismatch(
            "query ranges",
            queries.len(),
            ranges.len(),
        ));
    }
    if groundtruth.len() != queries.len() {
        return Err(RangeForgeError::count_mismatch(
            "groundtruth records",
            queries.len(),
            groundtruth.len(),
        ));
    }

    let mut index = RangeForgeIndex::open(&args.index_file, store)?;
    if args.m != index.m() {
        return Err(RangeForgeError::invalid_parameter(format!(
            "index was built with M={}, got --M {}",
            index.m(),
            args.m
        )));
    }
    index.set_ef_search(args.ef_search);
    println!(
        "Index: {} points, {} dims, M={}",
        index.len(),
        index.dim(),
        index.m()
    );
    println!("Running {} queries (k={})...", queries.len(), args.k);

    let monitor = ResourceMonitor::start();
    let start = Instant::now();

    let mut results: Vec<Vec<u64>> = Vec::with_capacity(queries.len());
    for (query, &(lo, hi)) in queries.iter().zip(&ranges) {
        let found = index.search(&query.data, lo, hi, args.k)?;
        results.push(found.into_iter().map(|r| r.id).collect());
    }

    let query_time = start.elapsed();
    let report = monitor.finish();

    let recall = metrics::recall(&results, &groundtruth, args.k);
    let qps = metrics::qps(queries.len(), query_time);

    println!("Query time (s): {:.3}", query_time.as_secs_f64());
    println!("Peak thread count: {}", report.peak_threads);
    println!("QPS: {qps:.1}");
    println!("Recall@{}: {recall:.4}", args.k);
    println!(
        "Peak memory (MB): {:.1}",
        report.peak_rss_kb as f64 / 1024.0
    );

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
