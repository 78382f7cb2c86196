use crate::data::{line_of, parse_datetime, Columns, Dataset, Error, Row};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// What a row has to satisfy to be kept. Every `None` lifts the constraint on
/// that dimension; both datetime bounds are inclusive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct FilterCriteria {
    pub district: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.district.is_none() && !self.has_datetime_range()
    }

    pub fn has_datetime_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    fn in_range(&self, datetime: NaiveDateTime) -> bool {
        self.from.map_or(true, |from| from <= datetime) && self.to.map_or(true, |to| datetime <= to)
    }

    /// District first, then datetime. A row's `Datetime` is only parsed when
    /// a range is active and the row already passed the district check, so a
    /// bad datetime in a row that is excluded anyway never fails the run.
    pub fn matches(&self, columns: Columns, row: &Row) -> Result<bool, Error> {
        if let Some(district) = &self.district {
            if row.get(columns.district) != Some(district.as_str()) {
                return Ok(false);
            }
        }
        if !self.has_datetime_range() {
            return Ok(true);
        }
        let value = row.get(columns.datetime).unwrap_or_default();
        let datetime = parse_datetime(value).ok_or_else(|| Error::DatetimeParse {
            line: line_of(row),
            value: value.to_owned(),
        })?;
        Ok(self.in_range(datetime))
    }
}

impl Dataset {
    /// Builds the subset of rows matching `criteria`, in their original
    /// order. Any unparseable datetime met along the way aborts the whole
    /// filter: there is no best-effort result.
    pub fn filter(&self, criteria: &FilterCriteria) -> Result<Dataset, Error> {
        if criteria.is_empty() {
            debug!("No filter given, copying every row");
            return Ok(self.clone());
        }
        if let (Some(from), Some(to)) = (criteria.from, criteria.to) {
            if from > to {
                warn!(%from, %to, "Datetime range is empty, no row can match");
            }
        }
        let mut rows = Vec::new();
        for row in &self.rows {
            if criteria.matches(self.columns, row)? {
                rows.push(row.clone());
            }
        }
        debug!(kept = rows.len(), total = self.rows.len(), "Rows filtered");
        Ok(Dataset {
            header: self.header.clone(),
            columns: self.columns,
            rows,
        })
    }
}
