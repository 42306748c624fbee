extern crate csv;

use csv::ReaderBuilder;
use std::error::Error;
use std::fs::File;

/// Time-stamped observations, most recent first.
///
/// `timestamp` holds integer clock ticks (microseconds for data coming from the
/// usual hosts) and `value` the observation at that instant. Both columns always
/// have the same length.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub timestamp: Vec<i64>,
    pub value: Vec<f64>,
}

impl Samples {
    pub fn new(timestamp: Vec<i64>, value: Vec<f64>) -> Self {
        Samples { timestamp, value }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    pub fn get_timestamp(&self) -> &[i64] {
        &self.timestamp
    }

    pub fn get_value(&self) -> &[f64] {
        &self.value
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<(i64, f64)> {
        match (self.timestamp.first(), self.value.first()) {
            (Some(&t), Some(&v)) => Some((t, v)),
            _ => None,
        }
    }
}

/// Reads a `timestamp,value` CSV with a header row. Rows are kept in file order,
/// so fixtures are expected to be stored most-recent-first.
pub fn read_samples_from_csv(file_path: &str) -> Result<Samples, Box<dyn Error>> {
    let file = File::open(file_path)?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut timestamp = Vec::new();
    let mut value = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if record.len() < 2 {
            return Err(format!("Malformed sample row: {:?}", record).into());
        }
        timestamp.push(record[0].trim().parse::<i64>()?);
        value.push(record[1].trim().parse::<f64>()?);
    }

    Ok(Samples::new(timestamp, value))
}
