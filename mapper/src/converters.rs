//! Standard converters for timestamps, dates and identifiers.
//!
//! DTOs commonly carry these values as text: timestamps in RFC 3339,
//! dates as `YYYY-MM-DD` and UUIDs in hyphenated form. Register the whole
//! set with [`ConfigurationStore::add_standard_converters`].

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::adapters::TypeConverter;
use crate::context::MappingContext;
use crate::error::Result;
use crate::store::ConfigurationStore;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `DateTime<Utc>` to RFC 3339 text
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeToRfc3339;

impl TypeConverter<DateTime<Utc>, String> for DateTimeToRfc3339 {
    fn convert(&self, source: DateTime<Utc>, _context: &MappingContext) -> anyhow::Result<String> {
        Ok(source.to_rfc3339())
    }
}

/// RFC 3339 text to `DateTime<Utc>`, normalizing the offset to UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc3339ToDateTime;

impl TypeConverter<String, DateTime<Utc>> for Rfc3339ToDateTime {
    fn convert(&self, source: String, _context: &MappingContext) -> anyhow::Result<DateTime<Utc>> {
        let parsed = DateTime::parse_from_rfc3339(&source)
            .with_context(|| format!("Failed to parse timestamp `{}`", source))?;
        Ok(parsed.with_timezone(&Utc))
    }
}

/// `NaiveDate` to text in a configurable format
#[derive(Debug, Clone)]
pub struct NaiveDateToString {
    format: String,
}

impl NaiveDateToString {
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for NaiveDateToString {
    fn default() -> Self {
        Self::with_format(DATE_FORMAT)
    }
}

impl TypeConverter<NaiveDate, String> for NaiveDateToString {
    fn convert(&self, source: NaiveDate, _context: &MappingContext) -> anyhow::Result<String> {
        Ok(source.format(&self.format).to_string())
    }
}

/// Text in a configurable format to `NaiveDate`
#[derive(Debug, Clone)]
pub struct StringToNaiveDate {
    format: String,
}

impl StringToNaiveDate {
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for StringToNaiveDate {
    fn default() -> Self {
        Self::with_format(DATE_FORMAT)
    }
}

impl TypeConverter<String, NaiveDate> for StringToNaiveDate {
    fn convert(&self, source: String, _context: &MappingContext) -> anyhow::Result<NaiveDate> {
        NaiveDate::parse_from_str(&source, &self.format).with_context(|| {
            format!("Failed to parse date `{}` with format `{}`", source, self.format)
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidToString;

impl TypeConverter<Uuid, String> for UuidToString {
    fn convert(&self, source: Uuid, _context: &MappingContext) -> anyhow::Result<String> {
        Ok(source.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringToUuid;

impl TypeConverter<String, Uuid> for StringToUuid {
    fn convert(&self, source: String, _context: &MappingContext) -> anyhow::Result<Uuid> {
        Uuid::parse_str(&source).with_context(|| format!("Failed to parse UUID `{}`", source))
    }
}

impl ConfigurationStore {
    /// Register converters between text and timestamps, dates and UUIDs.
    pub fn add_standard_converters(&mut self) -> Result<()> {
        self.add_converter::<DateTime<Utc>, String, _>(DateTimeToRfc3339)?;
        self.add_converter::<String, DateTime<Utc>, _>(Rfc3339ToDateTime)?;
        self.add_converter::<NaiveDate, String, _>(NaiveDateToString::default())?;
        self.add_converter::<String, NaiveDate, _>(StringToNaiveDate::default())?;
        self.add_converter::<Uuid, String, _>(UuidToString)?;
        self.add_converter::<String, Uuid, _>(StringToUuid)?;
        Ok(())
    }
}
