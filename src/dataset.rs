//! Dataset utilities for loading vectors, attributes, query ranges, and
//! groundtruth, plus synthetic data generation for tests and benchmarks.
//!
//! Two binary vector formats are supported:
//! - **fvecs** (length-prefixed): repeated `(i32 dim, f32[dim])` records.
//! - **bin** (dense): `i32 num_points, i32 dim`, then `num_points * dim`
//!   f32 values row-major with no per-record dimension.
//!
//! All multi-byte values are little-endian.

use crate::error::{RangeForgeError, Result};
use crate::vector::Vector;
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Read a length-prefixed fvecs file into raw vectors.
pub fn read_fvecs(path: impl AsRef<Path>) -> Result<Vec<Vec<f32>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut vectors = Vec::new();

    loop {
        // Read dimension (4 bytes, little-endian i32)
        let mut dim_buf = [0u8; 4];
        if reader.read_exact(&mut dim_buf).is_err() {
            break;
        }
        let dim = i32::from_le_bytes(dim_buf);
        if dim < 0 {
            return Err(RangeForgeError::invalid_format(format!(
                "negative fvecs record dimension: {dim}"
            )));
        }

        // Read vector data (dim * 4 bytes)
        let mut data_buf = vec![0u8; dim as usize * 4];
        reader.read_exact(&mut data_buf)?;

        let data: Vec<f32> = data_buf
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();

        vectors.push(data);
    }

    Ok(vectors)
}

/// Read a dense bin file (`i32 n, i32 dim`, then `n * dim` floats).
pub fn read_bin(path: impl AsRef<Path>) -> Result<Vec<Vec<f32>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;
    let n = i32::from_le_bytes(header[0..4].try_into().unwrap());
    let dim = i32::from_le_bytes(header[4..8].try_into().unwrap());
    if n < 0 || dim < 0 {
        return Err(RangeForgeError::invalid_format(format!(
            "negative bin header fields: n={n}, dim={dim}"
        )));
    }

    let mut vectors = Vec::with_capacity(n as usize);
    let mut row = vec![0u8; dim as usize * 4];
    for _ in 0..n {
        reader.read_exact(&mut row)?;
        let data: Vec<f32> = row
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();
        vectors.push(data);
    }

    Ok(vectors)
}

/// Write vectors in the dense bin format.
///
/// All vectors must share one dimension; the first vector defines it.
pub fn write_bin(path: impl AsRef<Path>, vectors: &[Vec<f32>]) -> Result<()> {
    let dim = vectors.first().map_or(0, |v| v.len());
    for v in vectors {
        if v.len() != dim {
            return Err(RangeForgeError::dimension_mismatch(dim, v.len()));
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&(vectors.len() as i32).to_le_bytes())?;
    writer.write_all(&(dim as i32).to_le_bytes())?;
    for v in vectors {
        for x in v {
            writer.write_all(&x.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read vectors from either supported format, chosen by file extension:
/// `.fvecs` is length-prefixed, anything else is treated as dense bin.
pub fn read_vectors(path: impl AsRef<Path>) -> Result<Vec<Vector>> {
    let path = path.as_ref();
    let raw = if path.extension().is_some_and(|e| e == "fvecs") {
        read_fvecs(path)?
    } else {
        read_bin(path)?
    };
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, data)| Vector::new(i as u64, data))
        .collect())
}

/// Read an attribute file: one integer per line, line i belongs to point i
/// in pre-sort order. Empty lines are skipped.
pub fn read_attributes(path: impl AsRef<Path>) -> Result<Vec<i64>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut attributes = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<i64>().map_err(|_| {
            RangeForgeError::invalid_format(format!("invalid attribute line: {trimmed:?}"))
        })?;
        attributes.push(value);
    }

    Ok(attributes)
}

/// Read a query-range file: one `"low-high"` integer pair per line,
/// aligned to query order. Bounds are inclusive attribute values and may be
/// negative; the separator is the `'-'` that follows the low bound's last
/// digit, so `"-5--2"` parses as (-5, -2).
pub fn read_ranges(path: impl AsRef<Path>) -> Result<Vec<(i64, i64)>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut ranges = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let bytes = trimmed.as_bytes();
        let sep = (1..bytes.len())
            .find(|&i| bytes[i] == b'-' && bytes[i - 1].is_ascii_digit())
            .ok_or_else(|| {
                RangeForgeError::invalid_format(format!("invalid range line: {trimmed:?}"))
            })?;
        let lo = trimmed[..sep].trim().parse::<i64>().map_err(|_| {
            RangeForgeError::invalid_format(format!("invalid range line: {trimmed:?}"))
        })?;
        let hi = trimmed[sep + 1..].trim().parse::<i64>().map_err(|_| {
            RangeForgeError::invalid_format(format!("invalid range line: {trimmed:?}"))
        })?;
        ranges.push((lo, hi));
    }

    Ok(ranges)
}

/// Read groundtruth in ivecs format: repeated `(i32 count, i32[count])`
/// records carrying neighbor ids in original (pre-sort) id space.
pub fn read_groundtruth(path: impl AsRef<Path>) -> Result<Vec<Vec<u64>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut records = Vec::new();

    loop {
        let mut count_buf = [0u8; 4];
        if reader.read_exact(&mut count_buf).is_err() {
            break;
        }
        let count = i32::from_le_bytes(count_buf);
        if count < 0 {
            return Err(RangeForgeError::invalid_format(format!(
                "negative ivecs record count: {count}"
            )));
        }

        let mut data_buf = vec![0u8; count as usize * 4];
        reader.read_exact(&mut data_buf)?;

        let ids: Vec<u64> = data_buf
            .chunks_exact(4)
            .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()) as u64)
            .collect();

        records.push(ids);
    }

    Ok(records)
}

/// Write the sorted-position → original-id mapping as a standalone binary
/// file: `i32 num_points` followed by `num_points` u64 values.
pub fn write_mapping(path: impl AsRef<Path>, mapping: &[u64]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&(mapping.len() as i32).to_le_bytes())?;
    for id in mapping {
        writer.write_all(&id.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a mapping file written by [`write_mapping`].
pub fn read_mapping(path: impl AsRef<Path>) -> Result<Vec<u64>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut count_buf = [0u8; 4];
    reader.read_exact(&mut count_buf)?;
    let n = i32::from_le_bytes(count_buf);
    if n < 0 {
        return Err(RangeForgeError::invalid_format(format!(
            "negative mapping count: {n}"
        )));
    }

    let mut mapping = Vec::with_capacity(n as usize);
    let mut id_buf = [0u8; 8];
    for _ in 0..n {
        reader.read_exact(&mut id_buf)?;
        mapping.push(u64::from_le_bytes(id_buf));
    }

    Ok(mapping)
}

/// A synthetic dataset of base vectors and query vectors for evaluation.
pub struct Dataset {
    pub vectors: Vec<Vector>,
    pub queries: Vec<Vector>,
}

impl Dataset {
    /// Generate a random synthetic dataset.
    ///
    /// Creates `n_vectors` random base vectors and `n_queries` random query
    /// vectors, all with the specified dimensionality.
    pub fn generate(n_vectors: usize, n_queries: usize, dim: usize) -> Self {
        let vectors: Vec<Vector> = (0..n_vectors)
            .map(|i| Vector::random(i as u64, dim))
            .collect();

        let queries: Vec<Vector> = (0..n_queries)
            .map(|i| Vector::random((n_vectors + i) as u64, dim))
            .collect();

        Self { vectors, queries }
    }
}

/// Generate `n` random attributes uniformly distributed in `[0, max]`.
pub fn random_attributes(n: usize, max: i64) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.gen_range(0..=max)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_generate_dataset() {
        let dataset = Dataset::generate(100, 10, 16);
        assert_eq!(dataset.vectors.len(), 100);
        assert_eq!(dataset.queries.len(), 10);
        assert_eq!(dataset.vectors[0].dim(), 16);
    }

    #[test]
    fn test_random_attributes_in_range() {
        let attrs = random_attributes(500, 99);
        assert_eq!(attrs.len(), 500);
        assert!(attrs.iter().all(|&a| (0..=99).contains(&a)));
    }

    #[test]
    fn test_bin_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");

        let vectors = vec![vec![1.0f32, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        write_bin(&path, &vectors).unwrap();
        let loaded = read_bin(&path).unwrap();
        assert_eq!(loaded, vectors);
    }

    #[test]
    fn test_fvecs_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.fvecs");

        let mut file = File::create(&path).unwrap();
        for vec in [[1.0f32, 2.0], [3.0, 4.0]] {
            file.write_all(&2i32.to_le_bytes()).unwrap();
            for x in vec {
                file.write_all(&x.to_le_bytes()).unwrap();
            }
        }
        drop(file);

        let loaded = read_fvecs(&path).unwrap();
        assert_eq!(loaded, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_attribute_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attrs.csv");
        std::fs::write(&path, "5\n-3\n\n42\n").unwrap();

        let attrs = read_attributes(&path).unwrap();
        assert_eq!(attrs, vec![5, -3, 42]);
    }

    #[test]
    fn test_attribute_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attrs.csv");
        std::fs::write(&path, "5\nnot_a_number\n").unwrap();

        assert!(matches!(
            read_attributes(&path),
            Err(RangeForgeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_range_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges.csv");
        std::fs::write(&path, "10-20\n0-99\n").unwrap();

        let ranges = read_ranges(&path).unwrap();
        assert_eq!(ranges, vec![(10, 20), (0, 99)]);
    }

    #[test]
    fn test_range_parsing_negative_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges.csv");
        std::fs::write(&path, "-5-10\n-9--2\n").unwrap();

        let ranges = read_ranges(&path).unwrap();
        assert_eq!(ranges, vec![(-5, 10), (-9, -2)]);
    }

    #[test]
    fn test_range_parsing_missing_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges.csv");
        std::fs::write(&path, "-42\n").unwrap();

        assert!(matches!(
            read_ranges(&path),
            Err(RangeForgeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_groundtruth_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gt.ivecs");

        let mut file = File::create(&path).unwrap();
        file.write_all(&3i32.to_le_bytes()).unwrap();
        for id in [7i32, 1, 9] {
            file.write_all(&id.to_le_bytes()).unwrap();
        }
        file.write_all(&1i32.to_le_bytes()).unwrap();
        file.write_all(&4i32.to_le_bytes()).unwrap();
        drop(file);

        let gt = read_groundtruth(&path).unwrap();
        assert_eq!(gt, vec![vec![7, 1, 9], vec![4]]);
    }

    #[test]
    fn test_mapping_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin.mapping");

        let mapping = vec![3u64, 0, 2, 1];
        write_mapping(&path, &mapping).unwrap();
        assert_eq!(read_mapping(&path).unwrap(), mapping);
    }
}
