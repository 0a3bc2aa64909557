/// Normalize a customer phone number to E.164 for the payment provider.
///
/// - 10-digit Indian mobile (starts 6-9): `+91` prefix
/// - `91` followed by such a number: `+` prefix
/// - anything written with a leading `+` and 10 to 15 digits: kept
///
/// Separators (spaces, dashes, brackets) are ignored. Returns `None` for
/// anything else.
pub fn format_phone_number(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    let is_indian_mobile =
        |number: &str| number.len() == 10 && matches!(number.as_bytes()[0], b'6'..=b'9');

    if is_indian_mobile(&digits) {
        return Some(format!("+91{digits}"));
    }
    if let Some(rest) = digits.strip_prefix("91")
        && is_indian_mobile(rest)
    {
        return Some(format!("+{digits}"));
    }
    if trimmed.starts_with('+') && (10..=15).contains(&digits.len()) {
        return Some(format!("+{digits}"));
    }
    None
}
