use chrono::NaiveDateTime;
use csv::StringRecord;
use thiserror::Error;

/// Columns every input file must carry, in no particular order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Id", "District", "Datetime", "Weight"];

/// Canonical datetime layout; also the layout written back out.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SHORT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A row is kept exactly as read: raw strings in header order. Only the
/// `Datetime` field is ever interpreted, and only when a filter needs it.
pub(crate) type Row = StringRecord;

/// Parses `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD HH:MM` (seconds default to 00).
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, SHORT_DATETIME_FORMAT))
        .ok()
}

/// Positions of the columns the filters look at. Building one is how the
/// header gets validated: it fails if any required column is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Columns {
    pub district: usize,
    pub datetime: usize,
}

impl Columns {
    pub fn locate(header: &StringRecord) -> Result<Self, Error> {
        let position = |name: &str| header.iter().position(|column| column == name);
        if REQUIRED_COLUMNS.iter().any(|name| position(name).is_none()) {
            return Err(Error::Schema);
        }
        Ok(Self {
            district: position("District").ok_or(Error::Schema)?,
            datetime: position("Datetime").ok_or(Error::Schema)?,
        })
    }
}

/// The whole input file held in memory. Filtering never mutates a `Dataset`,
/// it builds a new one sharing the same header.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Dataset {
    pub header: StringRecord,
    pub columns: Columns,
    pub rows: Vec<Row>,
}

/// Line of the input file a row was read from, 0 if unknown.
pub(crate) fn line_of(row: &Row) -> u64 {
    row.position().map_or(0, |pos| pos.line())
}

/// Everything that can end a run. Each one is terminal: nothing is retried
/// and no output is written once one of these is raised.
#[derive(Error, Debug)]
pub enum Error {
    #[error("File '{0}' not found")]
    FileNotFound(String),
    #[error("CSV does not have required columns")]
    Schema,
    #[error("Invalid datetime '{value}' on line {line}, expected YYYY-MM-DD HH:MM[:SS]")]
    DatetimeParse { line: u64, value: String },
    #[error("Cannot write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
}

/// Six readings across four districts, 08:30 to 12:45 on 2023-10-01.
#[cfg(test)]
pub(crate) const SAMPLE_CSV: &[u8] = b"\
Id,District,Datetime,Weight
1,North,2023-10-01 08:30,15.4
2,East,2023-10-01 09:45,12.2
3,West,2023-10-01 10:15,18.7
4,South,2023-10-01 11:00,22.5
5,North,2023-10-01 11:30,16.3
6,East,2023-10-01 12:45,10.0
";

#[cfg(test)]
mod tests {
    use super::{parse_datetime, Columns, Error};
    use chrono::NaiveDate;
    use csv::StringRecord;

    #[test]
    fn parse_datetime_with_and_without_seconds() {
        let expected = NaiveDate::from_ymd_opt(2023, 10, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2023-10-01 08:30"), Some(expected));
        assert_eq!(parse_datetime("2023-10-01 08:30:00"), Some(expected));
        assert_eq!(
            parse_datetime("2023-10-01 08:30:15"),
            expected.date().and_hms_opt(8, 30, 15)
        );
    }

    #[test]
    fn parse_datetime_rejects_garbage() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_datetime("2023-10-01"), None);
        assert_eq!(parse_datetime("2023-02-30 10:00"), None);
        assert_eq!(parse_datetime("2023-10-01 25:00"), None);
    }

    #[test]
    fn locate_columns_in_any_order() {
        let header = StringRecord::from(vec!["Weight", "Datetime", "Id", "Extra", "District"]);
        let columns = Columns::locate(&header).unwrap();
        assert_eq!(columns.district, 4);
        assert_eq!(columns.datetime, 1);
    }

    #[test]
    fn locate_columns_missing_one() {
        let header = StringRecord::from(vec!["Id", "District", "Datetime"]);
        assert!(matches!(Columns::locate(&header), Err(Error::Schema)));
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let header = StringRecord::from(vec!["id", "district", "datetime", "weight"]);
        assert!(matches!(Columns::locate(&header), Err(Error::Schema)));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::FileNotFound("nonexistent.csv".into()).to_string(),
            "File 'nonexistent.csv' not found"
        );
        assert_eq!(
            Error::Schema.to_string(),
            "CSV does not have required columns"
        );
    }
}
