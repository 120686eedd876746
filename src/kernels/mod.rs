//! This module contains the pure, stateless sub-protocol codecs for the
//! variable-length records embedded in the flat buffers.
//!
//! - `time_series`: timestamped array records, both directions.
//! - `lookup_table`: 1-3 dimensional labeled tables, output direction only.

pub mod lookup_table;
pub mod time_series;
