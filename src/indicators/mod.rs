pub mod gapfill_delta;
pub use gapfill_delta::{
    gapfill_delta, gapfill_delta_batch_par_slice, gapfill_delta_batch_slice,
    gapfill_delta_into_slice, gapfill_delta_many_series, GapfillDeltaBatchBuilder,
    GapfillDeltaBatchOutput, GapfillDeltaBatchRange, GapfillDeltaBuilder, GapfillDeltaData,
    GapfillDeltaError, GapfillDeltaInput, GapfillDeltaManySeriesOutput, GapfillDeltaOutput,
    GapfillDeltaParams, USECS_PER_SEC,
};
