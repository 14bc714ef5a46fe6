use crate::schedule::Occurrence;
use chrono::{Datelike, Days, Months, NaiveDate};
use log::debug;
use serde::Serialize;

/// Cells in one month grid (6 weeks).
pub const GRID_DAYS: usize = 42;

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub events: Vec<Occurrence>,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

/// Caller-controlled highlights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridOptions {
    pub today: Option<NaiveDate>,
    pub selected: Option<NaiveDate>,
}

/// 42 consecutive days covering the reference month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    month: NaiveDate,
    days: Vec<CalendarDay>,
}

impl MonthGrid {
    /// First day of the reference month.
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    /// Rows of seven days, Monday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.days.chunks(7)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|day| day.date == date)
    }

    /// Resolves a clicked event to the module the editor should open.
    pub fn module_for_event(&self, occurrence_id: &str) -> Option<&str> {
        self.days
            .iter()
            .flat_map(|day| day.events.iter())
            .find(|event| event.id() == occurrence_id)
            .map(Occurrence::module)
    }

    pub fn event_count(&self) -> usize {
        self.days.iter().map(|day| day.events.len()).sum()
    }
}

/// First day of `date`'s month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Moves `date` by `months` (negative goes back), clamping the day.
pub fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let delta = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    }
}

/// Projects `occurrences` onto the grid of `reference`'s month.
///
/// Returns `None` only when the grid would leave chrono's date range.
pub fn build_month_grid(
    reference: NaiveDate,
    occurrences: &[Occurrence],
    options: GridOptions,
) -> Option<MonthGrid> {
    let month = month_start(reference);
    let lead = u64::from(month.weekday().num_days_from_monday());
    let grid_start = month.checked_sub_days(Days::new(lead))?;

    let mut days = Vec::with_capacity(GRID_DAYS);
    for offset in 0..GRID_DAYS as u64 {
        let date = grid_start.checked_add_days(Days::new(offset))?;
        days.push(CalendarDay {
            date,
            events: occurrences
                .iter()
                .filter(|occurrence| occurrence.date() == date)
                .cloned()
                .collect(),
            is_current_month: date.year() == month.year() && date.month() == month.month(),
            is_today: options.today == Some(date),
            is_selected: options.selected == Some(date),
        });
    }

    let grid = MonthGrid { month, days };
    debug!(
        "event=calendar_grid module=calendar status=ok month={} events={}",
        month.format("%Y-%m"),
        grid.event_count()
    );
    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::{build_month_grid, month_start, shift_month, GridOptions};
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_starting_on_monday_has_no_lead_days() {
        // 2024-04-01 is a Monday.
        let grid = build_month_grid(date(2024, 4, 17), &[], GridOptions::default()).unwrap();
        assert_eq!(grid.days()[0].date, date(2024, 4, 1));
        assert_eq!(grid.days()[0].date.weekday(), Weekday::Mon);
        assert_eq!(grid.month(), date(2024, 4, 1));
    }

    #[test]
    fn shift_month_clamps_and_goes_backwards() {
        assert_eq!(shift_month(date(2025, 1, 31), 1), Some(date(2025, 2, 28)));
        assert_eq!(shift_month(date(2025, 1, 15), -2), Some(date(2024, 11, 15)));
        assert_eq!(month_start(date(2025, 5, 20)), date(2025, 5, 1));
    }
}
