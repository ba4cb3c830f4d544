//! Fiscal calendar computation: year ranges, rollover, period generation.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fiscal::error::FiscalError;
use crate::fiscal::types::PeriodGranularity;

/// A period to be created, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpec {
    /// Ordinal within the fiscal year (1-based).
    pub number: i16,
    /// Display name (e.g. "June 2024", "Q2 2024", "FY2024").
    pub name: String,
    /// First day (inclusive).
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
}

/// Parses a fiscal-year-start setting ("MM-DD") into month and day.
///
/// February 29 is rejected so the start is valid in every year.
///
/// # Errors
///
/// Returns `FiscalError::InvalidFiscalYearStart` for anything that is not a
/// valid month/day pair.
pub fn parse_fiscal_year_start(s: &str) -> Result<(u32, u32), FiscalError> {
    let invalid = || FiscalError::InvalidFiscalYearStart(s.to_string());

    let (month_s, day_s) = s.split_once('-').ok_or_else(invalid)?;
    let month: u32 = month_s.parse().map_err(|_| invalid())?;
    let day: u32 = day_s.parse().map_err(|_| invalid())?;

    // Validate against a non-leap year so 02-29 cannot slip through.
    if NaiveDate::from_ymd_opt(2023, month, day).is_none() {
        return Err(invalid());
    }

    Ok((month, day))
}

/// Computes the fiscal year range containing `today` for an organization
/// whose fiscal year starts on `start_month`/`start_day`.
#[must_use]
pub fn fiscal_year_range(start_month: u32, start_day: u32, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let this_year = ymd(today.year(), start_month, start_day);
    let start = if this_year <= today {
        this_year
    } else {
        ymd(today.year() - 1, start_month, start_day)
    };
    let end = ymd(start.year() + 1, start_month, start_day) - Duration::days(1);
    (start, end)
}

/// Computes the date range of the fiscal year following one that ends on
/// `end_date`: the next day through one year later.
#[must_use]
pub fn next_year_range(end_date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = end_date + Duration::days(1);
    let end = start
        .checked_add_months(Months::new(12))
        .map_or(NaiveDate::MAX, |d| d - Duration::days(1));
    (start, end)
}

/// Generates period specs covering `[start_date, end_date]` at the given
/// granularity. Periods tile the range without gaps or overlaps; the final
/// period is truncated to the year end.
#[must_use]
pub fn generate_periods(
    granularity: PeriodGranularity,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<PeriodSpec> {
    match granularity {
        PeriodGranularity::Monthly => chunked_periods(start_date, end_date, 1, |start, _number| {
            format!("{} {}", month_name(start.month()), start.year())
        }),
        PeriodGranularity::Quarterly => chunked_periods(start_date, end_date, 3, |start, number| {
            format!("Q{number} {}", start.year())
        }),
        PeriodGranularity::Yearly => vec![PeriodSpec {
            number: 1,
            name: format!("FY{}", start_date.year()),
            start_date,
            end_date,
        }],
    }
}

/// Tiles the range with periods of `months_per_period` calendar months,
/// aligned to month boundaries after the first period.
fn chunked_periods(
    start_date: NaiveDate,
    end_date: NaiveDate,
    months_per_period: u32,
    name: impl Fn(NaiveDate, i16) -> String,
) -> Vec<PeriodSpec> {
    let mut periods = Vec::new();
    let mut current = start_date;
    let mut number: i16 = 1;

    while current <= end_date {
        let last_month = current
            .checked_add_months(Months::new(months_per_period - 1))
            .unwrap_or(current);
        let chunk_end = last_day_of_month(last_month.year(), last_month.month());
        let period_end = chunk_end.min(end_date);

        periods.push(PeriodSpec {
            number,
            name: name(current, number),
            start_date: current,
            end_date: period_end,
        });

        current = period_end + Duration::days(1);
        number += 1;
    }

    periods
}

/// Returns the last day of a month.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or_else(|| ymd(year, month, 28))
}

/// Returns the English month name.
fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| last_day_of_month(year, month.clamp(1, 12)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("01-01", (1, 1))]
    #[case("04-01", (4, 1))]
    #[case("12-31", (12, 31))]
    fn test_parse_fiscal_year_start(#[case] input: &str, #[case] expected: (u32, u32)) {
        assert_eq!(parse_fiscal_year_start(input).unwrap(), expected);
    }

    #[rstest]
    #[case("13-01")]
    #[case("02-30")]
    #[case("02-29")] // leap-only day
    #[case("0101")]
    #[case("jan-01")]
    fn test_parse_fiscal_year_start_rejects(#[case] input: &str) {
        assert!(parse_fiscal_year_start(input).is_err());
    }

    #[test]
    fn test_fiscal_year_range_calendar_year() {
        let (start, end) = fiscal_year_range(1, 1, date(2024, 6, 15));
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 12, 31));
    }

    #[test]
    fn test_fiscal_year_range_april_start() {
        // Before April 1 the current fiscal year started the previous year.
        let (start, end) = fiscal_year_range(4, 1, date(2024, 2, 15));
        assert_eq!(start, date(2023, 4, 1));
        assert_eq!(end, date(2024, 3, 31));

        let (start, end) = fiscal_year_range(4, 1, date(2024, 7, 15));
        assert_eq!(start, date(2024, 4, 1));
        assert_eq!(end, date(2025, 3, 31));
    }

    #[test]
    fn test_next_year_range() {
        let (start, end) = next_year_range(date(2024, 12, 31));
        assert_eq!(start, date(2025, 1, 1));
        assert_eq!(end, date(2025, 12, 31));

        let (start, end) = next_year_range(date(2025, 3, 31));
        assert_eq!(start, date(2025, 4, 1));
        assert_eq!(end, date(2026, 3, 31));
    }

    #[test]
    fn test_generate_monthly_periods_full_year() {
        let periods =
            generate_periods(PeriodGranularity::Monthly, date(2024, 1, 1), date(2024, 12, 31));

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].name, "January 2024");
        assert_eq!(periods[0].number, 1);
        assert_eq!(periods[0].start_date, date(2024, 1, 1));
        assert_eq!(periods[0].end_date, date(2024, 1, 31));

        // Leap year February.
        assert_eq!(periods[1].end_date, date(2024, 2, 29));

        assert_eq!(periods[11].name, "December 2024");
        assert_eq!(periods[11].end_date, date(2024, 12, 31));
    }

    #[test]
    fn test_generate_monthly_periods_offset_year() {
        let periods =
            generate_periods(PeriodGranularity::Monthly, date(2024, 4, 1), date(2025, 3, 31));

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].name, "April 2024");
        assert_eq!(periods[11].name, "March 2025");
    }

    #[test]
    fn test_generate_quarterly_periods() {
        let periods =
            generate_periods(PeriodGranularity::Quarterly, date(2024, 1, 1), date(2024, 12, 31));

        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].name, "Q1 2024");
        assert_eq!(periods[0].start_date, date(2024, 1, 1));
        assert_eq!(periods[0].end_date, date(2024, 3, 31));
        assert_eq!(periods[3].name, "Q4 2024");
        assert_eq!(periods[3].end_date, date(2024, 12, 31));
    }

    #[test]
    fn test_generate_yearly_period() {
        let periods =
            generate_periods(PeriodGranularity::Yearly, date(2024, 1, 1), date(2024, 12, 31));

        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].name, "FY2024");
        assert_eq!(periods[0].start_date, date(2024, 1, 1));
        assert_eq!(periods[0].end_date, date(2024, 12, 31));
    }

    #[test]
    fn test_periods_tile_without_gaps() {
        for granularity in [
            PeriodGranularity::Monthly,
            PeriodGranularity::Quarterly,
            PeriodGranularity::Yearly,
        ] {
            let start = date(2024, 4, 1);
            let end = date(2025, 3, 31);
            let periods = generate_periods(granularity, start, end);

            assert_eq!(periods.first().unwrap().start_date, start);
            assert_eq!(periods.last().unwrap().end_date, end);
            for pair in periods.windows(2) {
                assert_eq!(pair[0].end_date + Duration::days(1), pair[1].start_date);
            }
        }
    }

    #[rstest]
    #[case(2024, 2, 29)] // leap year
    #[case(2023, 2, 28)]
    #[case(2024, 4, 30)]
    #[case(2024, 12, 31)]
    fn test_last_day_of_month(#[case] year: i32, #[case] month: u32, #[case] day: u32) {
        assert_eq!(last_day_of_month(year, month), date(year, month, day));
    }
}
