//! JSON codec between HTTP bodies and backend messages.
//!
//! # Responsibilities
//! - Decode a request body into any `serde` message, naming the failing field
//! - Encode a response message, omitting absent optional fields
//!
//! # Design Decisions
//! - Unknown fields are ignored so clients can send supersets
//! - Pure functions; no per-type code

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::http::error::DecodeError;

const MISSING_FIELD_PREFIX: &str = "missing field `";

/// Decode a JSON body into `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);

    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let parent = err.path().to_string();
        let message = strip_location(err.inner());

        // Syntax errors have no field to blame; their path segments read `?`.
        if err.inner().is_syntax() || err.inner().is_eof() || parent.contains('?') {
            return DecodeError {
                path: None,
                message,
            };
        }

        // serde reports a missing field at its parent; point at the field itself.
        let path = match missing_field(&message) {
            Some(field) if parent == "." => Some(field.to_string()),
            Some(field) => Some(format!("{}.{}", parent, field)),
            None if parent == "." => None,
            None => Some(parent),
        };

        DecodeError { path, message }
    })
}

/// Encode `value` as a JSON body.
pub fn encode<T: Serialize>(value: &T) -> Result<Bytes, serde_json::Error> {
    serde_json::to_vec(value).map(Bytes::from)
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix(MISSING_FIELD_PREFIX)?;
    rest.split('`').next()
}

/// serde_json appends "at line X column Y"; the position is noise for callers.
fn strip_location(err: &serde_json::Error) -> String {
    let rendered = err.to_string();
    if err.line() == 0 {
        return rendered;
    }
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    rendered
        .strip_suffix(&suffix)
        .map(str::to_string)
        .unwrap_or(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::messages::{
        contact_info, ContactInfo, ContactInfoMsg, LoginWithEmailMsg, PasswordChangeMsg,
        ProfileRequest, TokenInfos,
    };

    #[test]
    fn test_missing_required_field_is_named() {
        let err = decode::<LoginWithEmailMsg>(br#"{"email":"a@b.c"}"#).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("password"));
        assert_eq!(err.message, "missing field `password`");
    }

    #[test]
    fn test_nested_missing_field_path() {
        let err = decode::<ProfileRequest>(br#"{"profile":{"id":"p1"}}"#).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("profile.alias"));
    }

    #[test]
    fn test_wrong_type_points_at_field() {
        let err = decode::<LoginWithEmailMsg>(
            br#"{"email":"a@b.c","password":"x","as_participant":"yes"}"#,
        )
        .unwrap_err();
        assert_eq!(err.path.as_deref(), Some("as_participant"));
    }

    #[test]
    fn test_malformed_json_has_no_path() {
        let err = decode::<LoginWithEmailMsg>(b"{not json").unwrap_err();
        assert_eq!(err.path, None);
        assert_eq!(
            err.to_string(),
            "invalid request body: key must be a string"
        );
    }

    #[test]
    fn test_truncated_body_has_no_path() {
        let err = decode::<LoginWithEmailMsg>(br#"{"email":"a""#).unwrap_err();
        assert_eq!(err.path, None);
        assert!(err.message.starts_with("EOF"), "{}", err.message);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let msg: LoginWithEmailMsg = decode(
            br#"{"email":"a@b.c","password":"x","captcha":"ignored","nested":{"a":1}}"#,
        )
        .unwrap();
        assert_eq!(msg.email, "a@b.c");
        assert!(!msg.as_participant);
    }

    #[test]
    fn test_identity_never_read_from_body() {
        let msg: PasswordChangeMsg = decode(
            br#"{"token":{"id":"attacker","roles":["admin"]},"old_password":"a","new_password":"b"}"#,
        )
        .unwrap();
        assert!(msg.token.is_none());
    }

    #[test]
    fn test_absent_optionals_omitted() {
        let json = encode(&ProfileRequest::default()).unwrap();
        assert_eq!(&json[..], b"{}");

        let json = encode(&ContactInfo::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("phone").is_none());
        assert!(!json.windows(4).any(|w| w == b"null"));
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let original = ContactInfoMsg {
            token: Some(TokenInfos {
                id: "u1".into(),
                ..Default::default()
            }),
            contact_info: Some(ContactInfo {
                id: "c1".into(),
                address: Some(contact_info::Address::Email("a@b.c".into())),
                ..Default::default()
            }),
        };

        let decoded: ContactInfoMsg = decode(&encode(&original).unwrap()).unwrap();
        // Identity is output-only; everything else survives.
        assert!(decoded.token.is_none());
        assert_eq!(decoded.contact_info, original.contact_info);
    }
}
