use crate::error::{Result, ScrapeError};

/// Parse counters as the site renders them: `1234`, `12k` or `12,3k`.
///
/// The digit after the comma is taken as hundreds, so `12,3k` is 12300 and
/// anything below hundreds is lost. `12,35k` becomes 15500. This matches how
/// the data has always been collected and is kept on purpose.
pub fn parse_habr_int(value: &str) -> Result<u64> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return parse_digits(value, value);
    }

    let scaled = value
        .strip_suffix('k')
        .ok_or_else(|| ScrapeError::parse(format!("unexpected counter {:?}", value)))?;

    let (thousands, hundreds) = match scaled.split_once(',') {
        Some((thousands, hundreds)) => (parse_digits(thousands, value)?, parse_digits(hundreds, value)?),
        None => (parse_digits(scaled, value)?, 0),
    };
    Ok(thousands * 1000 + hundreds * 100)
}

fn parse_digits(digits: &str, original: &str) -> Result<u64> {
    digits
        .parse::<u64>()
        .map_err(|e| ScrapeError::parse(format!("bad counter {:?}: {}", original, e)))
}
