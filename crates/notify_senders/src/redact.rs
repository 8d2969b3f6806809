//! Token scrubbing for outbound error text.

const MASK: &str = "*****";

/// Replace every occurrence of `token` in `message` with a fixed mask.
///
/// Called on rendered errors before they reach a log record so a provider
/// credential can never leak through failure text.
pub fn mask_token(message: &str, token: &str) -> String {
    if token.is_empty() {
        return message.to_string();
    }
    message.replace(token, MASK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_every_occurrence() {
        let masked = mask_token("401: super-secret bad (super-secret)", "super-secret");
        assert_eq!(masked, "401: ***** bad (*****)");
        assert!(!masked.contains("super-secret"));
    }

    #[test]
    fn empty_token_leaves_message_alone() {
        assert_eq!(mask_token("no credentials here", ""), "no credentials here");
    }

    #[test]
    fn token_absent_is_a_no_op() {
        assert_eq!(mask_token("plain failure", "super-secret"), "plain failure");
    }
}
