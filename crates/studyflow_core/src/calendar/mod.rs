//! Calendar grid builder.
//!
//! Buckets occurrences onto a fixed 6x7 month grid starting on the Monday
//! on or before the first of the month. "Today" is always injected.

pub mod grid;

pub use grid::{
    build_month_grid, month_start, shift_month, CalendarDay, GridOptions, MonthGrid, GRID_DAYS,
};
