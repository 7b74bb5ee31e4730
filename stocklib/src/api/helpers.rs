use chrono::NaiveDate;

// The backend hands dates back as whatever pandas wrote into the CSV:
// "2024-01-15", "2024-01-15 00:00:00" or "2024-01-15T00:00:00+05:30".
// Only the calendar date is kept.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
}

pub fn deserialize_date_from_string<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    parse_date(&s).map_err(|e| serde::de::Error::custom(format!("Failed to parse date: {}", e)))
}

pub fn deserialize_dates_from_strings<'de, D>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let items: Vec<String> = serde::Deserialize::deserialize(deserializer)?;
    items
        .iter()
        .map(|s| parse_date(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| serde::de::Error::custom(format!("Failed to parse date: {}", e)))
}

// Volume arrives as an integer from the CSV path and as a float from the demo path
pub fn deserialize_f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: serde_json::Value = serde::Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
        serde_json::Value::Null => Ok(f64::NAN),
        other => Err(serde::de::Error::custom(format!("expected number, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamped_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15 00:00:00").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15T00:00:00+05:30").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_date("15/01/2024").is_err());
        assert!(parse_date("").is_err());
    }
}
