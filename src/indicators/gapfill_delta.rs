//! # Gap-filling Delta
//!
//! Net change of an irregularly sampled series over a sliding lookback window, evaluated at
//! evenly spaced bucket boundaries. For every boundary `B = end - k * step` strictly after
//! `start`, the delta is the most recent value at or before `B` minus the earliest value still
//! inside the window `(B - range, B]`. A window holding fewer than two samples yields `None`
//! instead of a number, so gaps in the data stay visible to the caller.
//!
//! Samples are supplied most recent first. Two cursors walk them once for the whole run, so a
//! call costs O(n + buckets). The result is a net change, not a rate; divide by the elapsed
//! time externally when a rate is wanted.
//!
//! ## Parameters
//! - **step**: Distance between bucket boundaries in timestamp ticks (default: 60 s in µs).
//! - **range**: Lookback window length in timestamp ticks (default: 300 s in µs).
//!
//! ## Errors
//! - **LengthMismatch**: gapfill_delta: timestamp and value columns differ in length.
//! - **AbsentValue** / **AbsentTimestamp**: gapfill_delta: an input entry is missing (`NaN`/`None`).
//! - **UnsortedTimestamps**: gapfill_delta: timestamps are not ordered most-recent-first.
//! - **InvalidStep** / **InvalidRange**: gapfill_delta: `step` or `range` is not positive.
//! - **BucketOverflow**: gapfill_delta: the bucket count cannot be represented or allocated.
//!
//! ## Returns
//! - **`Ok(GapfillDeltaOutput)`** with one `Option<f64>` per bucket boundary, most recent first.
//! - **`Err(GapfillDeltaError)`** otherwise; no partial result is produced.

use crate::utilities::data_loader::Samples;
use crate::utilities::helpers::{bucket_capacity, bucket_count, expand_axis_i64};
use log::{debug, log_enabled, trace, Level};
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::convert::AsRef;
use thiserror::Error;

pub const USECS_PER_SEC: i64 = 1_000_000;

const DEFAULT_STEP: i64 = 60 * USECS_PER_SEC;
const DEFAULT_RANGE: i64 = 300 * USECS_PER_SEC;

impl<'a> AsRef<[f64]> for GapfillDeltaInput<'a> {
    #[inline(always)]
    fn as_ref(&self) -> &[f64] {
        self.data.values()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum GapfillDeltaData<'a> {
    Samples(&'a Samples),
    Slices {
        timestamps: &'a [i64],
        values: &'a [f64],
    },
}

impl<'a> GapfillDeltaData<'a> {
    #[inline]
    pub fn timestamps(&self) -> &'a [i64] {
        match *self {
            GapfillDeltaData::Samples(samples) => &samples.timestamp,
            GapfillDeltaData::Slices { timestamps, .. } => timestamps,
        }
    }

    #[inline]
    pub fn values(&self) -> &'a [f64] {
        match *self {
            GapfillDeltaData::Samples(samples) => &samples.value,
            GapfillDeltaData::Slices { values, .. } => values,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GapfillDeltaOutput {
    pub values: Vec<Option<f64>>,
}

impl GapfillDeltaOutput {
    /// Number of buckets that produced a delta.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Dense encoding for hosts without a null: absent buckets become `NaN`.
    pub fn to_nan_filled(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapfillDeltaParams {
    pub step: Option<i64>,
    pub range: Option<i64>,
}

impl Default for GapfillDeltaParams {
    fn default() -> Self {
        Self {
            step: Some(DEFAULT_STEP),
            range: Some(DEFAULT_RANGE),
        }
    }
}

impl GapfillDeltaParams {
    /// Step and range given in seconds, for microsecond timestamps.
    pub fn from_secs(step_s: i64, range_s: i64) -> Result<Self, GapfillDeltaError> {
        let step = step_s
            .checked_mul(USECS_PER_SEC)
            .ok_or(GapfillDeltaError::InvalidStep { step: step_s })?;
        let range = range_s
            .checked_mul(USECS_PER_SEC)
            .ok_or(GapfillDeltaError::InvalidRange { range: range_s })?;
        Ok(Self {
            step: Some(step),
            range: Some(range),
        })
    }

    #[inline]
    pub fn resolved(&self) -> (i64, i64) {
        (
            self.step.unwrap_or(DEFAULT_STEP),
            self.range.unwrap_or(DEFAULT_RANGE),
        )
    }
}

#[derive(Debug, Clone)]
pub struct GapfillDeltaInput<'a> {
    pub data: GapfillDeltaData<'a>,
    pub start: i64,
    pub end: i64,
    pub params: GapfillDeltaParams,
}

impl<'a> GapfillDeltaInput<'a> {
    #[inline]
    pub fn from_samples(s: &'a Samples, start: i64, end: i64, p: GapfillDeltaParams) -> Self {
        Self {
            data: GapfillDeltaData::Samples(s),
            start,
            end,
            params: p,
        }
    }
    #[inline]
    pub fn from_slices(
        timestamps: &'a [i64],
        values: &'a [f64],
        start: i64,
        end: i64,
        p: GapfillDeltaParams,
    ) -> Self {
        Self {
            data: GapfillDeltaData::Slices { timestamps, values },
            start,
            end,
            params: p,
        }
    }
    #[inline]
    pub fn with_default_samples(s: &'a Samples, start: i64, end: i64) -> Self {
        Self::from_samples(s, start, end, GapfillDeltaParams::default())
    }
    #[inline]
    pub fn get_step(&self) -> i64 {
        self.params.step.unwrap_or(DEFAULT_STEP)
    }
    #[inline]
    pub fn get_range(&self) -> i64 {
        self.params.range.unwrap_or(DEFAULT_RANGE)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct GapfillDeltaBuilder {
    step: Option<i64>,
    range: Option<i64>,
}

impl GapfillDeltaBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }
    #[inline(always)]
    pub fn range(mut self, range: i64) -> Self {
        self.range = Some(range);
        self
    }
    #[inline(always)]
    pub fn apply(
        self,
        s: &Samples,
        start: i64,
        end: i64,
    ) -> Result<GapfillDeltaOutput, GapfillDeltaError> {
        let p = GapfillDeltaParams {
            step: self.step,
            range: self.range,
        };
        let i = GapfillDeltaInput::from_samples(s, start, end, p);
        gapfill_delta(&i)
    }
    #[inline(always)]
    pub fn apply_slices(
        self,
        timestamps: &[i64],
        values: &[f64],
        start: i64,
        end: i64,
    ) -> Result<GapfillDeltaOutput, GapfillDeltaError> {
        let p = GapfillDeltaParams {
            step: self.step,
            range: self.range,
        };
        let i = GapfillDeltaInput::from_slices(timestamps, values, start, end, p);
        gapfill_delta(&i)
    }
}

#[derive(Debug, Error)]
pub enum GapfillDeltaError {
    #[error("gapfill_delta: Empty parameter grid.")]
    EmptyGrid,
    #[error("gapfill_delta: Length mismatch: timestamps = {timestamps}, values = {values}")]
    LengthMismatch { timestamps: usize, values: usize },
    #[error("gapfill_delta: Absent value at index {index}")]
    AbsentValue { index: usize },
    #[error("gapfill_delta: Absent timestamp at index {index}")]
    AbsentTimestamp { index: usize },
    #[error("gapfill_delta: Timestamps not sorted most-recent-first at index {index}")]
    UnsortedTimestamps { index: usize },
    #[error("gapfill_delta: Invalid step: step = {step}")]
    InvalidStep { step: i64 },
    #[error("gapfill_delta: Invalid range: range = {range}")]
    InvalidRange { range: i64 },
    #[error("gapfill_delta: Too many buckets: start = {start}, end = {end}, step = {step}")]
    BucketOverflow { start: i64, end: i64, step: i64 },
    #[error("gapfill_delta: Output too small: needed = {needed}, got = {got}")]
    OutputTooSmall { needed: usize, got: usize },
    #[error("gapfill_delta: Series {index}: {source}")]
    Series {
        index: usize,
        #[source]
        source: Box<GapfillDeltaError>,
    },
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
impl From<GapfillDeltaError> for JsValue {
    fn from(err: GapfillDeltaError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl Samples {
    /// Decodes nullable host columns, rejecting any missing entry.
    ///
    /// `Some(NaN)` is rejected as [`GapfillDeltaError::AbsentValue`] along with `None`: the
    /// decoded columns feed the slice entry points, where `NaN` is the absent marker, so
    /// the failure is reported here with the host's index rather than later.
    pub fn try_from_optional(
        timestamp: &[Option<i64>],
        value: &[Option<f64>],
    ) -> Result<Self, GapfillDeltaError> {
        if timestamp.len() != value.len() {
            return Err(GapfillDeltaError::LengthMismatch {
                timestamps: timestamp.len(),
                values: value.len(),
            });
        }
        let timestamp = timestamp
            .iter()
            .enumerate()
            .map(|(index, t)| t.ok_or(GapfillDeltaError::AbsentTimestamp { index }))
            .collect::<Result<Vec<_>, _>>()?;
        let value = value
            .iter()
            .enumerate()
            .map(|(index, v)| match *v {
                Some(v) if !v.is_nan() => Ok(v),
                _ => Err(GapfillDeltaError::AbsentValue { index }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Samples::new(timestamp, value))
    }
}

#[inline]
fn validate_params(step: i64, range: i64) -> Result<(), GapfillDeltaError> {
    if step <= 0 {
        return Err(GapfillDeltaError::InvalidStep { step });
    }
    if range <= 0 {
        return Err(GapfillDeltaError::InvalidRange { range });
    }
    Ok(())
}

#[inline]
fn validate_samples(timestamps: &[i64], values: &[f64]) -> Result<(), GapfillDeltaError> {
    if timestamps.len() != values.len() {
        return Err(GapfillDeltaError::LengthMismatch {
            timestamps: timestamps.len(),
            values: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| v.is_nan()) {
        return Err(GapfillDeltaError::AbsentValue { index });
    }
    if let Some(i) = timestamps.windows(2).position(|w| w[1] > w[0]) {
        return Err(GapfillDeltaError::UnsortedTimestamps { index: i + 1 });
    }
    Ok(())
}

#[inline]
fn checked_bucket_count(start: i64, end: i64, step: i64) -> Result<usize, GapfillDeltaError> {
    bucket_count(start, end, step).ok_or(GapfillDeltaError::BucketOverflow { start, end, step })
}

#[inline]
pub fn gapfill_delta(input: &GapfillDeltaInput) -> Result<GapfillDeltaOutput, GapfillDeltaError> {
    let timestamps = input.data.timestamps();
    let values = input.data.values();
    let (start, end) = (input.start, input.end);
    let (step, range) = (input.get_step(), input.get_range());

    validate_params(step, range)?;
    validate_samples(timestamps, values)?;

    let overflow = GapfillDeltaError::BucketOverflow { start, end, step };
    let capacity = match bucket_capacity(start, end, step) {
        Some(c) => c,
        None => return Err(overflow),
    };
    let mut out = Vec::new();
    if out.try_reserve_exact(capacity).is_err() {
        return Err(overflow);
    }

    gapfill_delta_scalar(timestamps, values, start, end, step, range, &mut out);

    if log_enabled!(Level::Trace) {
        trace!(
            "gapfill_delta: {} samples, {} buckets, {} present",
            timestamps.len(),
            out.len(),
            out.iter().filter(|v| v.is_some()).count()
        );
    }

    Ok(GapfillDeltaOutput { values: out })
}

/// Writes one entry per bucket into `dst` and returns how many were written.
///
/// `dst` only needs room for the realized bucket count; entries past it are left untouched.
#[inline]
pub fn gapfill_delta_into_slice(
    dst: &mut [Option<f64>],
    input: &GapfillDeltaInput,
) -> Result<usize, GapfillDeltaError> {
    let timestamps = input.data.timestamps();
    let values: &[f64] = input.as_ref();
    let (start, end) = (input.start, input.end);
    let (step, range) = (input.get_step(), input.get_range());

    validate_params(step, range)?;
    validate_samples(timestamps, values)?;

    let needed = checked_bucket_count(start, end, step)?;
    if dst.len() < needed {
        return Err(GapfillDeltaError::OutputTooSmall {
            needed,
            got: dst.len(),
        });
    }

    Ok(scan_buckets(
        timestamps,
        values,
        start,
        end,
        step,
        range,
        |i, bucket| {
            if let Some(slot) = dst.get_mut(i) {
                *slot = bucket.delta;
            }
        },
    ))
}

/// Core scan over already validated inputs; appends one entry per bucket to `out`.
#[inline]
pub fn gapfill_delta_scalar(
    timestamps: &[i64],
    values: &[f64],
    start: i64,
    end: i64,
    step: i64,
    range: i64,
    out: &mut Vec<Option<f64>>,
) {
    scan_buckets(timestamps, values, start, end, step, range, |_, bucket| {
        out.push(bucket.delta)
    });
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(not(test), allow(dead_code))]
struct BucketScan {
    boundary: i64,
    cursor_end: usize,
    cursor_window_start: usize,
    delta: Option<f64>,
}

#[inline(always)]
fn scan_buckets<F>(
    timestamps: &[i64],
    values: &[f64],
    start: i64,
    end: i64,
    step: i64,
    range: i64,
    mut emit: F,
) -> usize
where
    F: FnMut(usize, BucketScan),
{
    let n = timestamps.len();
    let mut cursor_end = 0usize;
    let mut cursor_window_start = 0usize;
    let mut boundary = end;
    let mut emitted = 0usize;

    while boundary > start {
        while cursor_end < n && timestamps[cursor_end] > boundary {
            cursor_end += 1;
        }

        // None: the window reaches below every representable timestamp
        let window_start = boundary.checked_sub(range);
        if cursor_end > cursor_window_start {
            cursor_window_start = cursor_end;
        }
        while cursor_window_start < n
            && after_window_start(timestamps[cursor_window_start], window_start)
        {
            cursor_window_start += 1;
        }

        let delta = window_delta(
            timestamps,
            values,
            cursor_end,
            cursor_window_start,
            window_start,
        );
        emit(
            emitted,
            BucketScan {
                boundary,
                cursor_end,
                cursor_window_start,
                delta,
            },
        );
        emitted += 1;

        // every boundary below i64::MIN is also below start
        boundary = match boundary.checked_sub(step) {
            Some(next) => next,
            None => break,
        };
    }

    emitted
}

#[inline(always)]
fn after_window_start(t: i64, window_start: Option<i64>) -> bool {
    window_start.map_or(true, |ws| t > ws)
}

#[inline(always)]
fn window_delta(
    timestamps: &[i64],
    values: &[f64],
    last: usize,
    cutoff: usize,
    window_start: Option<i64>,
) -> Option<f64> {
    // no sample at or before the boundary
    if last >= timestamps.len() {
        return None;
    }
    if cutoff < last + 2 {
        return None;
    }
    let first = cutoff - 1;
    if !after_window_start(timestamps[first], window_start) {
        return None;
    }
    Some(values[last] - values[first])
}

// --- Batch grid/range support ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GapfillDeltaBatchRange {
    pub step: (i64, i64, i64),
    pub range: (i64, i64, i64),
}

impl Default for GapfillDeltaBatchRange {
    fn default() -> Self {
        Self {
            step: (DEFAULT_STEP, DEFAULT_STEP, 0),
            range: (DEFAULT_RANGE, DEFAULT_RANGE, 0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GapfillDeltaBatchBuilder {
    range: GapfillDeltaBatchRange,
    parallel: bool,
}

impl Default for GapfillDeltaBatchBuilder {
    fn default() -> Self {
        Self {
            range: GapfillDeltaBatchRange::default(),
            parallel: true,
        }
    }
}

impl GapfillDeltaBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    #[inline]
    pub fn step_range(mut self, start: i64, end: i64, step: i64) -> Self {
        self.range.step = (start, end, step);
        self
    }
    #[inline]
    pub fn step_static(mut self, s: i64) -> Self {
        self.range.step = (s, s, 0);
        self
    }
    #[inline]
    pub fn range_range(mut self, start: i64, end: i64, step: i64) -> Self {
        self.range.range = (start, end, step);
        self
    }
    #[inline]
    pub fn range_static(mut self, r: i64) -> Self {
        self.range.range = (r, r, 0);
        self
    }
    pub fn apply_slices(
        self,
        timestamps: &[i64],
        values: &[f64],
        start: i64,
        end: i64,
    ) -> Result<GapfillDeltaBatchOutput, GapfillDeltaError> {
        gapfill_delta_batch_inner(timestamps, values, start, end, &self.range, self.parallel)
    }
    pub fn apply_samples(
        self,
        s: &Samples,
        start: i64,
        end: i64,
    ) -> Result<GapfillDeltaBatchOutput, GapfillDeltaError> {
        self.apply_slices(&s.timestamp, &s.value, start, end)
    }
}

#[derive(Clone, Debug)]
pub struct GapfillDeltaBatchOutput {
    pub values: Vec<Option<f64>>,
    pub combos: Vec<GapfillDeltaParams>,
    pub lens: Vec<usize>,
    pub rows: usize,
    pub cols: usize,
}

impl GapfillDeltaBatchOutput {
    pub fn row_for_params(&self, p: &GapfillDeltaParams) -> Option<usize> {
        let wanted = p.resolved();
        self.combos.iter().position(|c| c.resolved() == wanted)
    }

    /// Realized row for `p`, without the padding that aligns shorter rows.
    pub fn values_for(&self, p: &GapfillDeltaParams) -> Option<&[Option<f64>]> {
        self.row_for_params(p).map(|row| {
            let start = row * self.cols;
            &self.values[start..start + self.lens[row]]
        })
    }
}

#[inline(always)]
fn expand_grid(r: &GapfillDeltaBatchRange) -> Vec<GapfillDeltaParams> {
    let steps = expand_axis_i64(r.step);
    let ranges = expand_axis_i64(r.range);
    let mut out = Vec::with_capacity(steps.len() * ranges.len());
    for &s in &steps {
        for &rg in &ranges {
            out.push(GapfillDeltaParams {
                step: Some(s),
                range: Some(rg),
            });
        }
    }
    out
}

#[inline(always)]
pub fn gapfill_delta_batch_slice(
    timestamps: &[i64],
    values: &[f64],
    start: i64,
    end: i64,
    sweep: &GapfillDeltaBatchRange,
) -> Result<GapfillDeltaBatchOutput, GapfillDeltaError> {
    gapfill_delta_batch_inner(timestamps, values, start, end, sweep, false)
}

#[inline(always)]
pub fn gapfill_delta_batch_par_slice(
    timestamps: &[i64],
    values: &[f64],
    start: i64,
    end: i64,
    sweep: &GapfillDeltaBatchRange,
) -> Result<GapfillDeltaBatchOutput, GapfillDeltaError> {
    gapfill_delta_batch_inner(timestamps, values, start, end, sweep, true)
}

fn alloc_absent_matrix(
    rows: usize,
    cols: usize,
    start: i64,
    end: i64,
    step: i64,
) -> Result<Vec<Option<f64>>, GapfillDeltaError> {
    let overflow = GapfillDeltaError::BucketOverflow { start, end, step };
    let total = match rows.checked_mul(cols) {
        Some(t) => t,
        None => return Err(overflow),
    };
    let mut values = Vec::new();
    if values.try_reserve_exact(total).is_err() {
        return Err(overflow);
    }
    values.resize(total, None);
    Ok(values)
}

fn gapfill_delta_batch_inner(
    timestamps: &[i64],
    values: &[f64],
    start: i64,
    end: i64,
    sweep: &GapfillDeltaBatchRange,
    parallel: bool,
) -> Result<GapfillDeltaBatchOutput, GapfillDeltaError> {
    let combos = expand_grid(sweep);
    if combos.is_empty() {
        return Err(GapfillDeltaError::EmptyGrid);
    }
    for c in &combos {
        let (step, range) = c.resolved();
        validate_params(step, range)?;
    }
    validate_samples(timestamps, values)?;

    let lens = combos
        .iter()
        .map(|c| checked_bucket_count(start, end, c.resolved().0))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = combos.len();
    let cols = lens.iter().copied().max().unwrap_or(0);
    let min_step = combos.iter().map(|c| c.resolved().0).min().unwrap_or(0);
    let mut out = alloc_absent_matrix(rows, cols, start, end, min_step)?;

    debug!(
        "gapfill_delta batch: {} rows x {} cols over {} samples (parallel = {})",
        rows,
        cols,
        timestamps.len(),
        parallel
    );

    let do_row = |row: usize, out_row: &mut [Option<f64>]| {
        let (step, range) = combos[row].resolved();
        scan_buckets(timestamps, values, start, end, step, range, |i, bucket| {
            out_row[i] = bucket.delta
        });
    };

    if cols > 0 {
        if parallel {
            #[cfg(not(target_arch = "wasm32"))]
            {
                out.par_chunks_mut(cols)
                    .enumerate()
                    .for_each(|(row, slice)| do_row(row, slice));
            }

            #[cfg(target_arch = "wasm32")]
            {
                for (row, slice) in out.chunks_mut(cols).enumerate() {
                    do_row(row, slice);
                }
            }
        } else {
            for (row, slice) in out.chunks_mut(cols).enumerate() {
                do_row(row, slice);
            }
        }
    }

    Ok(GapfillDeltaBatchOutput {
        values: out,
        combos,
        lens,
        rows,
        cols,
    })
}

// --- Many series, one parameter set ---

#[derive(Clone, Debug)]
pub struct GapfillDeltaManySeriesOutput {
    pub values: Vec<Option<f64>>,
    pub rows: usize,
    pub cols: usize,
}

impl GapfillDeltaManySeriesOutput {
    pub fn row(&self, index: usize) -> Option<&[Option<f64>]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.values[start..start + self.cols])
    }
}

/// Evaluates independent series that share bounds and parameters, one output row per series.
pub fn gapfill_delta_many_series(
    series: &[GapfillDeltaData],
    start: i64,
    end: i64,
    params: &GapfillDeltaParams,
    parallel: bool,
) -> Result<GapfillDeltaManySeriesOutput, GapfillDeltaError> {
    let (step, range) = params.resolved();
    validate_params(step, range)?;
    for (index, s) in series.iter().enumerate() {
        validate_samples(s.timestamps(), s.values()).map_err(|e| GapfillDeltaError::Series {
            index,
            source: Box::new(e),
        })?;
    }

    let rows = series.len();
    let cols = checked_bucket_count(start, end, step)?;
    let mut out = alloc_absent_matrix(rows, cols, start, end, step)?;

    debug!(
        "gapfill_delta many-series: {} series x {} buckets (parallel = {})",
        rows, cols, parallel
    );

    let do_row = |row: usize, out_row: &mut [Option<f64>]| {
        let s = &series[row];
        scan_buckets(
            s.timestamps(),
            s.values(),
            start,
            end,
            step,
            range,
            |i, bucket| out_row[i] = bucket.delta,
        );
    };

    if cols > 0 {
        if parallel {
            #[cfg(not(target_arch = "wasm32"))]
            {
                out.par_chunks_mut(cols)
                    .enumerate()
                    .for_each(|(row, slice)| do_row(row, slice));
            }

            #[cfg(target_arch = "wasm32")]
            {
                for (row, slice) in out.chunks_mut(cols).enumerate() {
                    do_row(row, slice);
                }
            }
        } else {
            for (row, slice) in out.chunks_mut(cols).enumerate() {
                do_row(row, slice);
            }
        }
    }

    Ok(GapfillDeltaManySeriesOutput {
        values: out,
        rows,
        cols,
    })
}

// ---- Tests ----


#[cfg(feature = "python")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};
#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyDict;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use wasm_bindgen::prelude::*;

#[cfg(feature = "python")]
#[pyfunction(name = "gapfill_delta")]
#[pyo3(signature = (timestamps, values, start, end, step, range))]
pub fn gapfill_delta_py<'py>(
    py: Python<'py>,
    timestamps: PyReadonlyArray1<'py, i64>,
    values: PyReadonlyArray1<'py, f64>,
    start: i64,
    end: i64,
    step: i64,
    range: i64,
) -> PyResult<Vec<Option<f64>>> {
    let ts = timestamps.as_slice()?;
    let vs = values.as_slice()?;

    let input = GapfillDeltaInput::from_slices(
        ts,
        vs,
        start,
        end,
        GapfillDeltaParams {
            step: Some(step),
            range: Some(range),
        },
    );

    py.allow_threads(|| gapfill_delta(&input).map(|o| o.values))
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

#[cfg(feature = "python")]
#[pyfunction(name = "gapfill_delta_batch")]
#[pyo3(signature = (timestamps, values, start, end, step_range, range_range, parallel=true))]
pub fn gapfill_delta_batch_py<'py>(
    py: Python<'py>,
    timestamps: PyReadonlyArray1<'py, i64>,
    values: PyReadonlyArray1<'py, f64>,
    start: i64,
    end: i64,
    step_range: (i64, i64, i64),
    range_range: (i64, i64, i64),
    parallel: bool,
) -> PyResult<Bound<'py, PyDict>> {
    let ts = timestamps.as_slice()?;
    let vs = values.as_slice()?;

    let sweep = GapfillDeltaBatchRange {
        step: step_range,
        range: range_range,
    };

    let output = py
        .allow_threads(|| gapfill_delta_batch_inner(ts, vs, start, end, &sweep, parallel))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let rows = output.rows;
    let cols = output.cols;
    let dense: Vec<f64> = output
        .values
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    let dict = PyDict::new(py);
    dict.set_item("values", dense.into_pyarray(py).reshape((rows, cols))?)?;
    dict.set_item(
        "steps",
        output
            .combos
            .iter()
            .map(|p| p.resolved().0)
            .collect::<Vec<_>>()
            .into_pyarray(py),
    )?;
    dict.set_item(
        "ranges",
        output
            .combos
            .iter()
            .map(|p| p.resolved().1)
            .collect::<Vec<_>>()
            .into_pyarray(py),
    )?;
    dict.set_item(
        "lens",
        output
            .lens
            .iter()
            .map(|&l| l as u64)
            .collect::<Vec<_>>()
            .into_pyarray(py),
    )?;

    Ok(dict)
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[wasm_bindgen]
pub fn gapfill_delta_js(
    timestamps: &[i64],
    values: &[f64],
    start: i64,
    end: i64,
    step: i64,
    range: i64,
) -> Result<Vec<f64>, JsValue> {
    let input = GapfillDeltaInput::from_slices(
        timestamps,
        values,
        start,
        end,
        GapfillDeltaParams {
            step: Some(step),
            range: Some(range),
        },
    );
    let output = gapfill_delta(&input)?;
    Ok(output.to_nan_filled())
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[derive(Serialize, Deserialize)]
pub struct GapfillDeltaBatchConfig {
    pub step_range: (i64, i64, i64),
    pub range_range: (i64, i64, i64),
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[derive(Serialize, Deserialize)]
pub struct GapfillDeltaBatchJsOutput {
    pub values: Vec<f64>,
    pub combos: Vec<GapfillDeltaParams>,
    pub lens: Vec<usize>,
    pub rows: usize,
    pub cols: usize,
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[wasm_bindgen(js_name = gapfill_delta_batch)]
pub fn gapfill_delta_batch_js(
    timestamps: &[i64],
    values: &[f64],
    start: i64,
    end: i64,
    config: JsValue,
) -> Result<JsValue, JsValue> {
    let config: GapfillDeltaBatchConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

    let sweep = GapfillDeltaBatchRange {
        step: config.step_range,
        range: config.range_range,
    };

    let output = gapfill_delta_batch_inner(timestamps, values, start, end, &sweep, false)?;

    let js_output = GapfillDeltaBatchJsOutput {
        values: output.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
        combos: output.combos,
        lens: output.lens,
        rows: output.rows,
        cols: output.cols,
    };

    serde_wasm_bindgen::to_value(&js_output)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
