//! Parsing of the URL fragment appended to password-recovery links.
//!
//! The provider redirects to `/reset-password#access_token=..&refresh_token=..&type=recovery`.
//! Fragments never reach the server on their own, so the page forwards
//! `location.hash` verbatim and it is decoded here.

use url::form_urlencoded;

use crate::domain::RecoveryTokens;

/// Extracts the token pair from a fragment, with or without the leading `#`.
///
/// Returns `None` when no non-empty `access_token` is present. A missing
/// `refresh_token` becomes an empty string.
pub fn parse_recovery_fragment(fragment: &str) -> Option<RecoveryTokens> {
    let fragment = fragment.trim();
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

    let mut access_token = None;
    let mut refresh_token = None;
    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" if access_token.is_none() => access_token = Some(value.into_owned()),
            "refresh_token" if refresh_token.is_none() => refresh_token = Some(value.into_owned()),
            _ => {}
        }
    }

    let access_token = access_token.filter(|t| !t.is_empty())?;
    Some(RecoveryTokens {
        access_token,
        refresh_token: refresh_token.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_tokens() {
        let tokens =
            parse_recovery_fragment("#access_token=X&refresh_token=Y&type=recovery").unwrap();
        assert_eq!(tokens.access_token, "X");
        assert_eq!(tokens.refresh_token, "Y");
    }

    #[test]
    fn refresh_token_defaults_to_empty() {
        let tokens = parse_recovery_fragment("access_token=abc.def").unwrap();
        assert_eq!(tokens.access_token, "abc.def");
        assert_eq!(tokens.refresh_token, "");
    }

    #[test]
    fn missing_or_empty_access_token_is_none() {
        assert_eq!(parse_recovery_fragment(""), None);
        assert_eq!(parse_recovery_fragment("#"), None);
        assert_eq!(parse_recovery_fragment("#refresh_token=Y"), None);
        assert_eq!(parse_recovery_fragment("#access_token=&refresh_token=Y"), None);
    }

    #[test]
    fn percent_escapes_are_decoded() {
        let tokens = parse_recovery_fragment("#access_token=a%2Bb%3D&refresh_token=c+d").unwrap();
        assert_eq!(tokens.access_token, "a+b=");
        assert_eq!(tokens.refresh_token, "c d");
    }

    #[test]
    fn truncated_escape_is_kept_literally() {
        let tokens = parse_recovery_fragment("#access_token=abc%4").unwrap();
        assert_eq!(tokens.access_token, "abc%4");
        let tokens = parse_recovery_fragment("access_token=%G1x&refresh_token=%").unwrap();
        assert_eq!(tokens.access_token, "%G1x");
        assert_eq!(tokens.refresh_token, "%");
    }

    #[test]
    fn multibyte_escapes_decode_as_utf8() {
        let tokens =
            parse_recovery_fragment("access_token=a%C3%A9&refresh_token=%E2%82%AC").unwrap();
        assert_eq!(tokens.access_token, "a\u{e9}");
        assert_eq!(tokens.refresh_token, "\u{20ac}");
    }

    #[test]
    fn first_occurrence_of_a_token_wins() {
        let tokens =
            parse_recovery_fragment("access_token=first&access_token=second&refresh_token=r")
                .unwrap();
        assert_eq!(tokens.access_token, "first");
    }
}
