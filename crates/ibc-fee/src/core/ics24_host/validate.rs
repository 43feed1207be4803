use super::error::ValidationError as Error;
use crate::prelude::*;

const ALLOWED_SPECIAL_CHARS: &str = "._+-#[]<>";

/// Checks an identifier against the ICS 24 rules: between `min` and `max` characters, no
/// path separator, only alphanumeric characters and `._+-#[]<>`.
pub fn validate_identifier(id: &str, min: usize, max: usize) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::empty());
    }

    if id.contains('/') {
        return Err(Error::contain_separator(id.to_string()));
    }

    if !(min..=max).contains(&id.len()) {
        return Err(Error::invalid_length(id.to_string(), id.len(), min, max));
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(c))
    {
        return Err(Error::invalid_character(id.to_string()));
    }

    Ok(())
}

pub fn validate_connection_identifier(id: &str) -> Result<(), Error> {
    validate_identifier(id, 10, 64)
}

pub fn validate_port_identifier(id: &str) -> Result<(), Error> {
    validate_identifier(id, 2, 128)
}

pub fn validate_channel_identifier(id: &str) -> Result<(), Error> {
    validate_identifier(id, 8, 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_bounds() {
        assert!(validate_port_identifier("p").is_err());
        assert!(validate_port_identifier(&"p".repeat(129)).is_err());
        assert!(validate_channel_identifier("channel").is_err());
        assert!(validate_channel_identifier("channel-0").is_ok());
    }

    #[test]
    fn forbidden_characters() {
        assert_eq!(
            validate_identifier("id/1", 1, 10),
            Err(Error::contain_separator("id/1".to_string()))
        );
        assert!(validate_identifier("channel@01", 1, 10).is_err());
        assert!(validate_identifier("", 0, 10).is_err());
    }
}
