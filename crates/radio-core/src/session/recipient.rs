use crate::constants::BROADCAST_RECIPIENT;

/// Normalized message destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Broadcast,
    User(String),
}

impl Recipient {
    /// Usernames match case-insensitively, so recipients are lowercased
    /// before transmission. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else if normalized == BROADCAST_RECIPIENT {
            Some(Recipient::Broadcast)
        } else {
            Some(Recipient::User(normalized))
        }
    }

    /// Value sent in the `sendto` form field
    pub fn as_wire(&self) -> &str {
        match self {
            Recipient::Broadcast => BROADCAST_RECIPIENT,
            Recipient::User(name) => name,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        matches!(self, Recipient::Broadcast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_is_case_insensitive() {
        assert_eq!(Recipient::parse("ALL"), Some(Recipient::Broadcast));
        assert_eq!(Recipient::parse(" All "), Some(Recipient::Broadcast));
        assert_eq!(Recipient::parse("all").unwrap().as_wire(), "all");
    }

    #[test]
    fn test_user_is_lowercased() {
        let recipient = Recipient::parse("Bob").unwrap();
        assert_eq!(recipient, Recipient::User("bob".to_string()));
        assert_eq!(recipient.as_wire(), "bob");
        assert!(!recipient.is_broadcast());
    }

    #[test]
    fn test_blank_recipient_is_rejected() {
        assert_eq!(Recipient::parse(""), None);
        assert_eq!(Recipient::parse("   "), None);
    }

    #[test]
    fn test_names_containing_all_are_users() {
        assert_eq!(
            Recipient::parse("Allison"),
            Some(Recipient::User("allison".to_string()))
        );
    }
}
