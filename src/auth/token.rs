//! The session token stored as JSON inside the encrypted auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

/// Reads and writes the token expiry as text with a fixed-width time of day.
///
/// The stock `time` serde format writes midnight with a single hour digit,
/// which it then refuses to parse, so a session issued at midnight would log
/// the user out.
mod expiry_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2025-03-01 00:00:00.0 +13:00:00"
    const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S: Serializer>(
        expires_at: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text = expires_at
            .format(EXPIRY_FORMAT)
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;

        OffsetDateTime::parse(&text, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Who a session belongs to and when it ends.
///
/// Issued on sign up and log in, pushed forward by the auth gateway while the
/// user stays active, and ignored once expired.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    /// The logged in user.
    pub user_id: UserID,

    /// The end of the session.
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the session has ended at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod token_tests {
    use time::{Duration, macros::datetime};

    use crate::auth::{UserID, token::Token};

    #[test]
    fn token_is_stored_with_fixed_width_expiry() {
        let token = Token {
            user_id: UserID::new(7),
            expires_at: datetime!(2025-03-01 09:05:00 +13:00),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert_eq!(
            json,
            r#"{"user_id":7,"expires_at":"2025-03-01 09:05:00.0 +13:00:00"}"#
        );
    }

    #[test]
    fn session_issued_at_midnight_survives_a_round_trip() {
        let token = Token {
            user_id: UserID::new(7),
            expires_at: datetime!(2025-03-01 00:00:00 UTC),
        };

        let json = serde_json::to_string(&token).unwrap();
        let read_back: Token = serde_json::from_str(&json).unwrap();

        assert_eq!(read_back, token);
    }

    #[test]
    fn tampered_expiry_is_rejected() {
        let json = r#"{"user_id":7,"expires_at":"next tuesday"}"#;

        assert!(serde_json::from_str::<Token>(json).is_err());
    }

    #[test]
    fn session_ends_at_its_expiry() {
        let expires_at = datetime!(2025-03-01 12:00:00 UTC);
        let token = Token {
            user_id: UserID::new(7),
            expires_at,
        };

        assert!(!token.is_expired(expires_at - Duration::milliseconds(1)));
        assert!(token.is_expired(expires_at));
        assert!(token.is_expired(expires_at + Duration::days(1)));
    }
}
