//! Allow-list gate applied before any other processing.

/// Membership test against the configured id set.
///
/// Either the sender's user id or the chat id may match. A missing sender
/// (malformed update) denies. `None` means no allow-list is configured and
/// the bot is open. Denials are logged with both identifiers.
pub(crate) fn is_allowed(allowed: Option<&[i64]>, user_id: Option<i64>, chat_id: i64) -> bool {
    let Some(allowed) = allowed else {
        return true;
    };
    let Some(user_id) = user_id else {
        tracing::warn!(chat_id, "access denied: update without sender");
        return false;
    };

    if allowed.contains(&user_id) || allowed.contains(&chat_id) {
        return true;
    }

    tracing::warn!(user_id, chat_id, "access denied");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[i64] = &[586995184, -100123];

    #[test]
    fn allows_by_user_id() {
        assert!(is_allowed(Some(ALLOWED), Some(586995184), 42));
    }

    #[test]
    fn allows_by_chat_id() {
        assert!(is_allowed(Some(ALLOWED), Some(99), -100123));
    }

    #[test]
    fn denies_unknown_ids() {
        assert!(!is_allowed(Some(ALLOWED), Some(99), 42));
    }

    #[test]
    fn denies_missing_sender() {
        assert!(!is_allowed(Some(ALLOWED), None, 586995184));
    }

    #[test]
    fn no_allow_list_means_open() {
        assert!(is_allowed(None, Some(99), 42));
        assert!(is_allowed(None, None, 42));
    }
}
