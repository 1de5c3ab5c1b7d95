//! Declarative description of one route's translation to a backend call.

use std::collections::HashMap;

use axum::http::StatusCode;

use crate::backend::messages::{CarriesIdentity, TokenInfos};
use crate::backend::Rpc;

/// Request data outside the body, for bindings built from scalars.
#[derive(Debug, Default, Clone)]
pub struct Inbound {
    pub query: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
}

impl Inbound {
    /// A query parameter, or `""` when absent.
    pub fn query_or_empty(&self, key: &str) -> String {
        self.query.get(key).cloned().unwrap_or_default()
    }

    pub fn path_param(&self, key: &str) -> String {
        self.path_params.get(key).cloned().unwrap_or_default()
    }
}

/// Where a binding's request message comes from.
pub enum Source<Req> {
    /// Decoded from the JSON body.
    Body,
    /// The default (empty) message.
    Empty,
    /// Built from query or path scalars.
    Parts(fn(&Inbound) -> Req),
}

pub struct Binding<Req, Resp> {
    pub(crate) rpc: Rpc<Req, Resp>,
    pub(crate) success: StatusCode,
    pub(crate) source: Source<Req>,
    pub(crate) identity: Option<fn(&mut Req, TokenInfos)>,
    pub(crate) raw_token: Option<fn(&mut Req, String)>,
    pub(crate) fixup: Option<fn(&mut Req)>,
}

impl<Req, Resp> Binding<Req, Resp> {
    /// Decode the body, call `rpc`, answer `200`.
    pub fn new(rpc: Rpc<Req, Resp>) -> Self {
        Self {
            rpc,
            success: StatusCode::OK,
            source: Source::Body,
            identity: None,
            raw_token: None,
            fixup: None,
        }
    }

    /// Answer `201 Created` on success.
    pub fn created(mut self) -> Self {
        self.success = StatusCode::CREATED;
        self
    }

    /// Ignore the body and send the default message.
    pub fn without_body(mut self) -> Self {
        self.source = Source::Empty;
        self
    }

    pub fn from_parts(mut self, build: fn(&Inbound) -> Req) -> Self {
        self.source = Source::Parts(build);
        self
    }

    /// Forward the extracted, unvalidated token.
    pub fn with_raw_token(mut self, attach: fn(&mut Req, String)) -> Self {
        self.raw_token = Some(attach);
        self
    }

    /// Adjust the message after it is built and before identity is attached.
    pub fn map_request(mut self, fixup: fn(&mut Req)) -> Self {
        self.fixup = Some(fixup);
        self
    }

    pub fn success_status(&self) -> StatusCode {
        self.success
    }

    pub fn requires_identity(&self) -> bool {
        self.identity.is_some()
    }
}

impl<Req: CarriesIdentity, Resp> Binding<Req, Resp> {
    /// Attach the validated identity to the message's identity field.
    pub fn with_identity(mut self) -> Self {
        self.identity = Some(Req::attach_identity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::methods::{CHANGE_PASSWORD, CREATE_USER, USE_UNSUBSCRIBE_TOKEN};
    use crate::backend::messages::TempToken;

    #[test]
    fn test_defaults() {
        let binding = Binding::new(CHANGE_PASSWORD);
        assert_eq!(binding.success_status(), StatusCode::OK);
        assert!(!binding.requires_identity());
        assert!(matches!(binding.source, Source::Body));
    }

    #[test]
    fn test_builders() {
        let binding = Binding::new(CREATE_USER).created().with_identity();
        assert_eq!(binding.success_status(), StatusCode::CREATED);
        assert!(binding.requires_identity());
    }

    #[test]
    fn test_missing_query_scalar_is_empty() {
        let binding = Binding::new(USE_UNSUBSCRIBE_TOKEN).from_parts(|inbound| TempToken {
            token: inbound.query_or_empty("token"),
        });
        let Source::Parts(build) = binding.source else {
            panic!("expected parts source");
        };
        assert_eq!(build(&Inbound::default()).token, "");
    }
}
