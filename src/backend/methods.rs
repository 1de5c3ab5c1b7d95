//! Typed descriptors of the backend's unary RPC methods.
//!
//! An [`Rpc<Req, Resp>`] ties a gRPC method path to its request and response
//! message types, so a route binding can only be built with the message types
//! the method actually accepts and returns.

use std::fmt;
use std::marker::PhantomData;

use crate::backend::messages::*;

/// Fully qualified name of the user-management gRPC service.
pub const SERVICE_NAME: &str = "user_management_api.UserManagementApi";

/// A unary method of the user-management service.
pub struct Rpc<Req, Resp> {
    name: &'static str,
    path: &'static str,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> Rpc<Req, Resp> {
    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            _types: PhantomData,
        }
    }

    /// Short method name, used in logs and metric labels.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// gRPC request path (`/<service>/<method>`).
    pub fn path(&self) -> &'static str {
        self.path
    }
}

impl<Req, Resp> Clone for Rpc<Req, Resp> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Req, Resp> Copy for Rpc<Req, Resp> {}

impl<Req, Resp> fmt::Debug for Rpc<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rpc").field(&self.path).finish()
    }
}

macro_rules! rpc {
    ($name:literal) => {
        Rpc::new(
            $name,
            concat!("/user_management_api.UserManagementApi/", $name),
        )
    };
}

// Token handling
pub const VALIDATE_JWT: Rpc<JwtRequest, TokenInfos> = rpc!("ValidateJWT");
pub const RENEW_JWT: Rpc<RefreshJwtRequest, TokenResponse> = rpc!("RenewJWT");
pub const REVOKE_ALL_REFRESH_TOKENS: Rpc<RevokeRefreshTokensReq, ServiceStatus> =
    rpc!("RevokeAllRefreshTokens");

// Login & signup
pub const LOGIN_WITH_EMAIL: Rpc<LoginWithEmailMsg, TokenResponse> = rpc!("LoginWithEmail");
pub const SIGNUP_WITH_EMAIL: Rpc<SignupWithEmailMsg, TokenResponse> = rpc!("SignupWithEmail");
pub const SEND_VERIFICATION_CODE: Rpc<SendVerificationCodeReq, ServiceStatus> =
    rpc!("SendVerificationCode");
pub const AUTO_VALIDATE_TEMP_TOKEN: Rpc<AutoValidateReq, AutoValidateResponse> =
    rpc!("AutoValidateTempToken");
pub const SWITCH_PROFILE: Rpc<SwitchProfileRequest, TokenResponse> = rpc!("SwitchProfile");

// Account
pub const CHANGE_PASSWORD: Rpc<PasswordChangeMsg, ServiceStatus> = rpc!("ChangePassword");
pub const CHANGE_ACCOUNT_ID_EMAIL: Rpc<EmailChangeMsg, User> = rpc!("ChangeAccountIDEmail");
pub const CHANGE_PREFERRED_LANGUAGE: Rpc<LanguageChangeMsg, User> =
    rpc!("ChangePreferredLanguage");
pub const GET_USER: Rpc<UserReference, User> = rpc!("GetUser");
pub const DELETE_ACCOUNT: Rpc<UserReference, ServiceStatus> = rpc!("DeleteAccount");

// Profiles & contact
pub const SAVE_PROFILE: Rpc<ProfileRequest, User> = rpc!("SaveProfile");
pub const REMOVE_PROFILE: Rpc<ProfileRequest, User> = rpc!("RemoveProfile");
pub const UPDATE_CONTACT_PREFERENCES: Rpc<ContactPreferencesMsg, User> =
    rpc!("UpdateContactPreferences");
pub const ADD_EMAIL: Rpc<ContactInfoMsg, User> = rpc!("AddEmail");
pub const REMOVE_EMAIL: Rpc<ContactInfoMsg, User> = rpc!("RemoveEmail");
pub const RESEND_CONTACT_VERIFICATION: Rpc<ResendContactVerificationReq, ServiceStatus> =
    rpc!("ResendContactVerification");
pub const VERIFY_CONTACT: Rpc<TempToken, User> = rpc!("VerifyContact");
pub const USE_UNSUBSCRIBE_TOKEN: Rpc<TempToken, ServiceStatus> = rpc!("UseUnsubscribeToken");

// Management
pub const CREATE_USER: Rpc<CreateUserReq, User> = rpc!("CreateUser");
pub const FIND_NON_PARTICIPANT_USERS: Rpc<FindNonParticipantUsersMsg, UserListMsg> =
    rpc!("FindNonParticipantUsers");
pub const ADD_ROLE_FOR_USER: Rpc<RoleMsg, User> = rpc!("AddRoleForUser");
pub const REMOVE_ROLE_FOR_USER: Rpc<RoleMsg, User> = rpc!("RemoveRoleForUser");

// Password reset
pub const INITIATE_PASSWORD_RESET: Rpc<InitiateResetPasswordMsg, ServiceStatus> =
    rpc!("InitiatePasswordReset");
pub const GET_INFOS_FOR_PASSWORD_RESET: Rpc<GetInfosForResetPasswordMsg, UserInfosForResetPassword> =
    rpc!("GetInfosForPasswordReset");
pub const RESET_PASSWORD: Rpc<ResetPasswordMsg, ServiceStatus> = rpc!("ResetPassword");
