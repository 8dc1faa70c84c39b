use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::date::parse_swapped_date;
use crate::core::primitives::parse_numeric_str;
use crate::error::{ChartError, ChartResult};

/// Typed field value of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
    Category(String),
}

impl Value {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Category(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Text(text) | Self::Category(text) => f.write_str(text),
        }
    }
}

/// Ordered field map for one datum.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_number)
    }

    #[must_use]
    pub fn date(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_date)
    }

    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Returns the numeric value or a `MissingField` error.
    pub fn require_number(&self, field: &str) -> ChartResult<f64> {
        self.number(field).ok_or_else(|| ChartError::MissingField {
            field: field.to_owned(),
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Converts a JSON object: numbers become `Number`, strings `Text`,
    /// booleans `Category`; nulls and nested values are skipped.
    pub fn from_json_object(value: &serde_json::Value) -> ChartResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ChartError::InvalidData("record must be a JSON object".to_owned()))?;
        let mut record = Self::new();
        for (name, field) in object {
            let converted = match field {
                serde_json::Value::Number(number) => number.as_f64().map(Value::Number),
                serde_json::Value::String(text) => Some(Value::Text(text.clone())),
                serde_json::Value::Bool(flag) => Some(Value::Category(flag.to_string())),
                _ => None,
            };
            if let Some(converted) = converted {
                record.insert(name.clone(), converted);
            }
        }
        Ok(record)
    }

    /// Coerces a text field holding a numeric string into `Number`.
    ///
    /// Empty or non-numeric text removes the field so the record is later
    /// filtered as incomplete.
    pub fn coerce_number(&mut self, field: &str) {
        let parsed = match self.fields.get(field) {
            Some(Value::Text(text)) => parse_numeric_str(text, field).ok(),
            Some(Value::Number(value)) if value.is_finite() => Some(*value),
            _ => None,
        };
        match parsed {
            Some(value) => {
                self.fields.insert(field.to_owned(), Value::Number(value));
            }
            None => {
                self.fields.shift_remove(field);
            }
        }
    }

    /// Parses a `day/month/year` text field into `Date`.
    pub fn coerce_swapped_date(&mut self, field: &str) -> ChartResult<()> {
        let Some(Value::Text(text)) = self.fields.get(field) else {
            return match self.fields.get(field) {
                Some(Value::Date(_)) => Ok(()),
                _ => Err(ChartError::MissingField {
                    field: field.to_owned(),
                }),
            };
        };
        let date = parse_swapped_date(text)?;
        self.fields.insert(field.to_owned(), Value::Date(date));
        Ok(())
    }

    /// Turns a text field into a `Category`.
    pub fn coerce_category(&mut self, field: &str) {
        if let Some(Value::Text(text)) = self.fields.get(field) {
            let category = Value::Category(text.clone());
            self.fields.insert(field.to_owned(), category);
        }
    }
}

/// Identity of a record for keyed reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKey {
    Field(String),
    Index(usize),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(key) => f.write_str(key),
            Self::Index(index) => write!(f, "#{index}"),
        }
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::Field(value.to_owned())
    }
}

/// Ordered records plus the optional field that identifies them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
    key_field: Option<String>,
}

impl Dataset {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            key_field: None,
        }
    }

    #[must_use]
    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    /// Builds a dataset from a JSON array of objects.
    pub fn from_json_value(value: &serde_json::Value) -> ChartResult<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| ChartError::InvalidData("dataset must be a JSON array".to_owned()))?;
        let records = items
            .iter()
            .map(Record::from_json_object)
            .collect::<ChartResult<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    #[must_use]
    pub fn key_field(&self) -> Option<&str> {
        self.key_field.as_deref()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Key of the record at `index`: the key field's display value when
    /// present, otherwise the positional index.
    #[must_use]
    pub fn key_of(&self, index: usize) -> RecordKey {
        self.key_field
            .as_deref()
            .and_then(|field| self.records.get(index)?.get(field))
            .map_or(RecordKey::Index(index), |value| {
                RecordKey::Field(value.to_string())
            })
    }

    #[must_use]
    pub fn keys(&self) -> Vec<RecordKey> {
        (0..self.records.len()).map(|index| self.key_of(index)).collect()
    }

    /// Records paired with their keys, in dataset order.
    pub fn keyed(&self) -> impl Iterator<Item = (RecordKey, &Record)> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (self.key_of(index), record))
    }

    pub fn numbers<'a>(&'a self, field: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.records.iter().filter_map(move |record| record.number(field))
    }

    pub fn dates<'a>(&'a self, field: &'a str) -> impl Iterator<Item = DateTime<Utc>> + 'a {
        self.records.iter().filter_map(move |record| record.date(field))
    }

    /// Drops records lacking any of `fields` as a finite number or a date.
    pub fn retain_complete(&mut self, fields: &[&str]) -> usize {
        let before = self.records.len();
        self.records.retain(|record| {
            fields.iter().all(|field| {
                record.number(field).is_some() || record.date(field).is_some()
            })
        });
        let dropped = before - self.records.len();
        if dropped > 0 {
            warn!(dropped, kept = self.records.len(), ?fields, "dropped incomplete records");
        }
        dropped
    }

    /// Keeps only records matching `predicate`, returning a new dataset that
    /// shares the key field.
    #[must_use]
    pub fn filtered(&self, mut predicate: impl FnMut(&Record) -> bool) -> Self {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        debug!(before = self.records.len(), after = records.len(), "filtered dataset");
        Self {
            records,
            key_field: self.key_field.clone(),
        }
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// `(min, max)` of a numeric field, ignoring records without it.
#[must_use]
pub fn extent(dataset: &Dataset, field: &str) -> Option<(f64, f64)> {
    dataset.numbers(field).fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

#[must_use]
pub fn max(dataset: &Dataset, field: &str) -> Option<f64> {
    extent(dataset, field).map(|(_, max)| max)
}

#[must_use]
pub fn date_extent(dataset: &Dataset, field: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    dataset.dates(field).fold(None, |acc, date| match acc {
        None => Some((date, date)),
        Some((min, max)) => Some((min.min(date), max.max(date))),
    })
}
