use crate::api::WHATSAPP_USER_SUFFIX;
use crate::error::{Error, Result};

/// Turn a phone-number-ish input into a user jid.
///
/// Non-digits are stripped, a local `08` prefix becomes `628`, and the
/// WhatsApp user suffix is appended. Already-normalized jids come back as-is.
pub fn normalize_jid(input: &str) -> Result<String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(Error::Validation(format!("'{}' contains no phone number", input)));
    }

    let number = match digits.strip_prefix("08") {
        Some(rest) => format!("628{}", rest),
        None => digits,
    };

    Ok(format!("{}{}", number, WHATSAPP_USER_SUFFIX))
}
