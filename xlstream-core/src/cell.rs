//! Cell values and their serialized forms.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// `NaiveDate::num_days_from_ce()` of 1899-12-30, day zero of the xlsx serial
/// date system. Serial 1 is 1899-12-31 and the Unix epoch lands on 25569.
/// Dates before 1900-03-01 come out one day off because the format inherits
/// the fictitious 1900-02-29; consumers expect the quirk, so it is kept.
const SERIAL_DAY_ZERO: i64 = 693_594;

/// Days since 1899-12-30.
pub fn date_to_serial(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - SERIAL_DAY_ZERO
}

/// Days since 1899-12-30, with the time of day as the fractional part.
/// Sub-second precision is not preserved.
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let days = date_to_serial(dt.date()) as f64;
    days + f64::from(dt.time().num_seconds_from_midnight()) / 86_400.0
}

/// A value writable into a sheet cell.
///
/// `SheetWriter::add_cell` accepts anything `Into<CellValue>`, so callers
/// normally pass `&str`, numbers, bools or chrono dates directly.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    /// Text, written as an inline string.
    String(String),
    /// Floating point number; numeric is the format's untyped default.
    Number(f64),
    /// Integer, written without a decimal point.
    Int(i64),
    /// Boolean, written as 1/0 with the boolean type marker.
    Bool(bool),
    /// Calendar date, written as a day serial.
    Date(NaiveDate),
    /// Date and time, written as a fractional day serial.
    DateTime(NaiveDateTime),
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(i64::from(v))
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Int(i64::from(v))
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::DateTime(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_epoch_pins() {
        assert_eq!(date_to_serial(ymd(1899, 12, 31)), 1);
        assert_eq!(date_to_serial(ymd(1900, 1, 1)), 2);
        // the first day after the fictitious 1900-02-29 matches Excel exactly
        assert_eq!(date_to_serial(ymd(1900, 3, 1)), 61);
        // Unix epoch
        assert_eq!(date_to_serial(ymd(1970, 1, 1)), 25_569);
    }

    #[test]
    fn test_serial_roundtrip() {
        // re-interpreting epoch + serial days reproduces the original date
        let epoch = ymd(1899, 12, 30);
        for date in [ymd(1923, 7, 14), ymd(2024, 1, 31), ymd(2100, 12, 31)] {
            let serial = date_to_serial(date);
            assert_eq!(epoch + chrono::Days::new(serial as u64), date);
        }
    }

    #[test]
    fn test_datetime_serial_fraction() {
        let noon = NaiveDateTime::new(
            ymd(2024, 1, 31),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        let serial = datetime_to_serial(noon);
        assert_eq!(serial, date_to_serial(ymd(2024, 1, 31)) as f64 + 0.5);
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(CellValue::from("x"), CellValue::String("x".to_string()));
        assert_eq!(CellValue::from(123), CellValue::Int(123));
        assert_eq!(CellValue::from(1.5), CellValue::Number(1.5));
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
    }
}
