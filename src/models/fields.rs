//! Lenient deserializers for form-style JSON input.
//!
//! Browser forms send empty strings for untouched inputs and sometimes send
//! ids as strings. These helpers normalise that before validation runs:
//! blank text becomes `None`, `""`/`"0"`/`0` ids become "no list", and due
//! dates accept either `YYYY-MM-DD` or a full timestamp.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};
use validator::ValidationError;

/// Trims the value; blank or `null` becomes `None`.
pub fn blank_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Like [`blank_string_as_none`] but distinguishes "absent" (outer `None`,
/// via `#[serde(default)]`) from "cleared" (`Some(None)`).
pub fn nullable_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_string_as_none(deserializer).map(Some)
}

pub fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_due_date(value).map(Some).map_err(de::Error::custom),
    }
}

pub fn nullable_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_date_as_none(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdInput {
    Number(i64),
    Text(String),
}

/// Accepts `12`, `"12"`, and treats `0`, `""`, `"0"` and `null` as no id.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<IdInput>::deserialize(deserializer)? {
        None => None,
        Some(IdInput::Number(n)) => Some(n),
        Some(IdInput::Text(s)) if s.trim().is_empty() => None,
        Some(IdInput::Text(s)) => Some(
            s.trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid id: {}", s)))?,
        ),
    };
    Ok(id.filter(|&n| n != 0))
}

pub fn nullable_id<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_id(deserializer).map(Some)
}

/// Parses `YYYY-MM-DD`, ignoring any time part that follows it.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
}

/// Validator for required text fields: must contain something besides
/// whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("must not be empty".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "blank_string_as_none")]
        text: Option<String>,
        #[serde(default, deserialize_with = "blank_date_as_none")]
        date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "optional_id")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "nullable_id")]
        patch_id: Option<Option<i64>>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_blank_inputs_become_none() {
        let p = probe(r#"{"text": "   ", "date": "", "id": "0"}"#);
        assert_eq!(p.text, None);
        assert_eq!(p.date, None);
        assert_eq!(p.id, None);
        assert_eq!(p.patch_id, None);
    }

    #[test]
    fn test_values_are_trimmed_and_parsed() {
        let p = probe(r#"{"text": "  milk ", "date": "2025-03-09T10:00:00Z", "id": "7", "patch_id": null}"#);
        assert_eq!(p.text.as_deref(), Some("milk"));
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2025, 3, 9));
        assert_eq!(p.id, Some(7));
        assert_eq!(p.patch_id, Some(None));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"date": "tomorrow"}"#).is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x").is_ok());
        assert!(not_blank(" \t").is_err());
    }
}
