/// Common test utilities for comparing binding outputs with Rust outputs
use std::error::Error;
use vector_delta::utilities::data_loader::{read_samples_from_csv, Samples};

pub const FIXTURE: &str = "src/data/counter_samples_10s.csv";

/// First second covered by the fixture, in microseconds.
pub const BASE: i64 = 1_700_000_000 * 1_000_000;

/// Test data holder that matches the structure used in Python/WASM tests
pub struct TestData {
    pub samples: Samples,
}

impl TestData {
    /// Load test data from the standard CSV file
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let samples = read_samples_from_csv(FIXTURE)?;
        Ok(TestData { samples })
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.samples.timestamp
    }

    pub fn values(&self) -> &[f64] {
        &self.samples.value
    }
}

/// Compare two optional sequences with a tolerance; absent entries must line up exactly.
pub fn assert_deltas_close(actual: &[Option<f64>], expected: &[Option<f64>], atol: f64, name: &str) {
    assert_eq!(actual.len(), expected.len(),
        "{}: Length mismatch: actual {} vs expected {}", name, actual.len(), expected.len());

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        match (a, e) {
            (None, None) => {}
            (Some(a), Some(e)) => {
                let diff = (a - e).abs();
                assert!(diff <= atol,
                    "{}: Value mismatch at index {}: actual {} vs expected {} (diff: {}, tol: {})",
                    name, i, a, e, diff, atol);
            }
            _ => panic!("{}: Presence mismatch at index {}: actual {:?} vs expected {:?}", name, i, a, e),
        }
    }
}
