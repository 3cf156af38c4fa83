use chrono::{Datelike, NaiveDate};
use shared::domain::BillStatus;

const MONTHS_FR: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Formats a stored `YYYY-MM-DD` date for display, e.g. `4 Avr. 04`.
pub fn format_date(raw: &str) -> Result<String, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")?;
    let month = MONTHS_FR[date.month0() as usize];
    Ok(format!(
        "{} {}. {:02}",
        date.day(),
        month,
        date.year().rem_euclid(100)
    ))
}

/// Display date, or the raw value when it cannot be parsed.
pub fn display_date(raw: &str) -> String {
    format_date(raw).unwrap_or_else(|_| raw.to_string())
}

pub fn format_status(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "En attente",
        BillStatus::Accepted => "Accepté",
        BillStatus::Refused => "Refusé",
    }
}

/// Parses the leading integer of `raw` the way a form number field is read:
/// surrounding whitespace and trailing garbage are ignored, `"12px"` is 12.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    trimmed[..digits_start + digits_len].parse().ok()
}
