use pyo3::prelude::*;

#[cfg(feature = "python")]
use crate::indicators::gapfill_delta::{gapfill_delta_batch_py, gapfill_delta_py};

#[pymodule]
fn vector_delta(m: &Bound<'_, PyModule>) -> PyResult<()> {
	// Register gapfill_delta functions with their user-facing names
	m.add_function(wrap_pyfunction!(gapfill_delta_py, m)?)?;
	m.add_function(wrap_pyfunction!(gapfill_delta_batch_py, m)?)?;

	Ok(())
}
