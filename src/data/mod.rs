//! data — input loading and date alignment.
//!
//! - [`loader`]: semicolon CSV parsing with decimal-comma handling and
//!   missing-cell reporting.
//! - [`series`]: the validated [`TimeSeries`] container.
//! - [`align`]: daily upsampling of monthly inflation and the inner join
//!   into an [`AlignedPanel`].

pub mod align;
pub mod errors;
pub mod loader;
pub mod series;

// ---- Re-exports ----
pub use self::align::{AlignedPanel, Covariate, align_sources, interpolate_daily};
pub use self::errors::{DataError, DataResult};
pub use self::loader::{
    ColumnSpec, MissingCellReport, RawSources, SourceColumns, SourcePaths, load_sources,
};
pub use self::series::TimeSeries;
