//! Message schemas of the user-management RPC service.
//!
//! Every type here is both a protobuf message (`prost`) for the backend wire
//! and a `serde` type for the public JSON surface, so the same struct flows
//! from the decoded request body straight into the RPC call.
//!
//! # Field conventions
//! - Fields without `#[serde(default)]` are required in request bodies.
//! - Nested messages and oneofs are `Option`s and are omitted from JSON when
//!   absent.
//! - The identity field (`token: Option<TokenInfos>`) of protected requests is
//!   never read from the body; it is attached after validation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Validated token claims as returned by `ValidateJWT`.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct TokenInfos {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub instance_id: String,
    #[prost(int64, tag = "3")]
    #[serde(default)]
    pub issued_at: i64,
    #[prost(int64, tag = "4")]
    #[serde(default)]
    pub expires_at: i64,
    #[prost(bool, tag = "5")]
    #[serde(default)]
    pub account_confirmed: bool,
    #[prost(string, repeated, tag = "6")]
    #[serde(default)]
    pub roles: Vec<String>,
    #[prost(string, tag = "7")]
    #[serde(default)]
    pub session_id: String,
    #[prost(string, tag = "8")]
    #[serde(default)]
    pub profile_id: String,
    #[prost(string, repeated, tag = "9")]
    #[serde(default)]
    pub other_profile_ids: Vec<String>,
    #[prost(map = "string, string", tag = "10")]
    #[serde(default)]
    pub payload: HashMap<String, String>,
}

/// Input of `ValidateJWT`.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct JwtRequest {
    #[prost(string, tag = "1")]
    pub token: String,
}

/// Requests that carry the caller's validated identity.
pub trait CarriesIdentity {
    fn attach_identity(&mut self, identity: TokenInfos);
}

macro_rules! carries_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CarriesIdentity for $ty {
                fn attach_identity(&mut self, identity: TokenInfos) {
                    self.token = Some(identity);
                }
            }
        )*
    };
}

carries_identity!(
    SwitchProfileRequest,
    PasswordChangeMsg,
    EmailChangeMsg,
    LanguageChangeMsg,
    UserReference,
    ProfileRequest,
    ContactPreferencesMsg,
    ContactInfoMsg,
    CreateUserReq,
    FindNonParticipantUsersMsg,
    RoleMsg,
    RevokeRefreshTokensReq,
    ResendContactVerificationReq,
);

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Generic acknowledgement returned by mutating calls.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[prost(int32, tag = "1")]
    #[serde(default)]
    pub status: i32,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub msg: String,
    #[prost(string, tag = "3")]
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Profile {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub id: String,
    #[prost(string, tag = "2")]
    pub alias: String,
    #[prost(bool, tag = "3")]
    #[serde(default)]
    pub consent_confirmed_at_set: bool,
    #[prost(string, tag = "4")]
    #[serde(default)]
    pub avatar_id: String,
    #[prost(bool, tag = "5")]
    #[serde(default)]
    pub main_profile: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ContactPreferences {
    #[prost(bool, tag = "1")]
    #[serde(default)]
    pub subscribed_to_newsletter: bool,
    #[prost(string, repeated, tag = "2")]
    #[serde(default)]
    pub send_newsletter_to: Vec<String>,
    #[prost(bool, tag = "3")]
    #[serde(default)]
    pub subscribed_to_weekly: bool,
    #[prost(int32, tag = "4")]
    #[serde(default)]
    pub receive_weekly_message_day_of_week: i32,
}

/// An email address or phone number attached to an account.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ContactInfo {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub id: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub r#type: String,
    #[prost(int64, tag = "3")]
    #[serde(default)]
    pub confirmed_at: i64,
    #[prost(int64, tag = "4")]
    #[serde(default)]
    pub confirmation_link_sent_at: i64,
    #[prost(oneof = "contact_info::Address", tags = "5, 6")]
    #[serde(flatten)]
    pub address: Option<contact_info::Address>,
}

pub mod contact_info {
    use serde::{Deserialize, Serialize};

    /// Exactly one of `email` or `phone` appears on the wire.
    #[derive(Clone, PartialEq, prost::Oneof, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Address {
        #[prost(string, tag = "5")]
        Email(String),
        #[prost(string, tag = "6")]
        Phone(String),
    }
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Account {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub r#type: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub account_id: String,
    #[prost(int64, tag = "3")]
    #[serde(default)]
    pub account_confirmed_at: i64,
    #[prost(string, tag = "4")]
    #[serde(default)]
    pub preferred_language: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct User {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[prost(string, repeated, tag = "3")]
    #[serde(default)]
    pub roles: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[prost(message, optional, tag = "5")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_preferences: Option<ContactPreferences>,
    #[prost(message, repeated, tag = "6")]
    #[serde(default)]
    pub contact_infos: Vec<ContactInfo>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct UserListMsg {
    #[prost(message, repeated, tag = "1")]
    #[serde(default)]
    pub items: Vec<User>,
    #[prost(int64, tag = "2")]
    #[serde(default)]
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct LoginWithEmailMsg {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
    #[prost(string, tag = "3")]
    #[serde(default)]
    pub instance_id: String,
    #[prost(bool, tag = "4")]
    #[serde(default)]
    pub as_participant: bool,
    #[prost(string, tag = "5")]
    #[serde(default)]
    pub verification_code: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct SignupWithEmailMsg {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
    #[prost(string, tag = "3")]
    #[serde(default)]
    pub instance_id: String,
    #[prost(string, tag = "4")]
    #[serde(default)]
    pub preferred_language: String,
    #[prost(bool, tag = "5")]
    #[serde(default)]
    pub wants_newsletter: bool,
}

/// Token envelope returned by login, signup, renewal and profile switch.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct TokenResponse {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub access_token: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub refresh_token: String,
    #[prost(int32, tag = "3")]
    #[serde(default)]
    pub expires_in: i32,
    #[prost(message, repeated, tag = "4")]
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[prost(string, tag = "5")]
    #[serde(default)]
    pub selected_profile_id: String,
    #[prost(string, tag = "6")]
    #[serde(default)]
    pub preferred_language: String,
    #[prost(bool, tag = "7")]
    #[serde(default)]
    pub account_confirmed: bool,
    #[prost(bool, tag = "8")]
    #[serde(default)]
    pub second_factor_needed: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct SendVerificationCodeReq {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub instance_id: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct AutoValidateReq {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub instance_id: String,
    #[prost(string, tag = "2")]
    pub temp_token: String,
    #[prost(string, tag = "3")]
    #[serde(default)]
    pub access_token: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct AutoValidateResponse {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub account_id: String,
    #[prost(bool, tag = "2")]
    #[serde(default)]
    pub is_same_user: bool,
    #[prost(string, tag = "3")]
    #[serde(default)]
    pub verification_code: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct SwitchProfileRequest {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    pub profile_id: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct RefreshJwtRequest {
    /// Filled from the caller's bearer header, never from the body.
    #[prost(string, tag = "1")]
    #[serde(skip)]
    pub access_token: String,
    #[prost(string, tag = "2")]
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Account management
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct PasswordChangeMsg {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    pub old_password: String,
    #[prost(string, tag = "3")]
    pub new_password: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct EmailChangeMsg {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    pub new_email: String,
    #[prost(string, tag = "3")]
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct LanguageChangeMsg {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    pub language_code: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct UserReference {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    pub user_id: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ProfileRequest {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(message, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ContactPreferencesMsg {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(message, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_preferences: Option<ContactPreferences>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ContactInfoMsg {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(message, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ResendContactVerificationReq {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub r#type: String,
    #[prost(string, tag = "3")]
    pub address: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct RevokeRefreshTokensReq {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
}

// ---------------------------------------------------------------------------
// Management
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct CreateUserReq {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    pub account_id: String,
    #[prost(string, repeated, tag = "3")]
    #[serde(default)]
    pub roles: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    #[serde(default)]
    pub initial_profiles: Vec<Profile>,
    #[prost(string, tag = "5")]
    #[serde(default)]
    pub preferred_language: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct FindNonParticipantUsersMsg {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct RoleMsg {
    #[prost(message, optional, tag = "1")]
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfos>,
    #[prost(string, tag = "2")]
    pub account_id: String,
    #[prost(string, tag = "3")]
    pub role: String,
}

// ---------------------------------------------------------------------------
// Password reset & temporary tokens
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct InitiateResetPasswordMsg {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub instance_id: String,
    #[prost(string, tag = "2")]
    pub account_id: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetInfosForResetPasswordMsg {
    /// Reset token from the password-reset email, not a bearer token.
    #[prost(string, tag = "1")]
    pub token: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct UserInfosForResetPassword {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub account_id: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub instance_id: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ResetPasswordMsg {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(string, tag = "2")]
    pub new_password: String,
}

/// A single-purpose token delivered by email (verification, unsubscribe).
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct TempToken {
    #[prost(string, tag = "1")]
    pub token: String,
}
