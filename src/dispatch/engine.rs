//! Generic execution of a [`Binding`] and its axum handler adapters.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
};
use prost::Message;
use serde::{de::DeserializeOwned, Serialize};

use crate::dispatch::binding::{Binding, Inbound, Source};
use crate::http::codec;
use crate::http::context::RequestContext;
use crate::http::error::GatewayError;
use crate::http::server::AppState;

/// Run one request through `binding`: build the message, attach what the
/// token stages produced, make exactly one backend call, render the result.
pub async fn execute<Req, Resp>(
    binding: &Binding<Req, Resp>,
    state: &AppState,
    ctx: &RequestContext,
    inbound: &Inbound,
    body: &[u8],
) -> Result<Response, GatewayError>
where
    Req: Message + Default + DeserializeOwned,
    Resp: Message + Default + Serialize,
{
    let mut message = match &binding.source {
        Source::Body => codec::decode::<Req>(body)?,
        Source::Empty => Req::default(),
        Source::Parts(build) => build(inbound),
    };

    if let Some(fixup) = binding.fixup {
        fixup(&mut message);
    }

    if let Some(attach) = binding.raw_token {
        let raw = ctx
            .token
            .raw()
            .ok_or_else(|| GatewayError::Unauthenticated("token missing".into()))?;
        attach(&mut message, raw.expose().to_string());
    }

    if let Some(attach) = binding.identity {
        let identity = ctx
            .token
            .identity()
            .cloned()
            .ok_or_else(|| GatewayError::Unauthenticated("token not validated".into()))?;
        attach(&mut message, identity);
    }

    tracing::debug!(
        request_id = %ctx.request_id,
        rpc = binding.rpc.name(),
        "Dispatching to backend"
    );

    let (request, deadline) = ctx.outbound(message, state.call_timeout);
    let response = state.client.call_until(binding.rpc, request, deadline).await?;

    let json = codec::encode(&response)
        .map_err(|e| GatewayError::Internal(format!("failed to encode response: {}", e)))?;

    Ok((binding.success, [(CONTENT_TYPE, "application/json")], json).into_response())
}

/// `POST` route served by `binding`.
pub fn post_binding<Req, Resp>(binding: Binding<Req, Resp>) -> MethodRouter<AppState>
where
    Req: Message + Default + DeserializeOwned + 'static,
    Resp: Message + Default + Serialize + 'static,
{
    route(MethodFilter::POST, binding)
}

/// `GET` route served by `binding`.
pub fn get_binding<Req, Resp>(binding: Binding<Req, Resp>) -> MethodRouter<AppState>
where
    Req: Message + Default + DeserializeOwned + 'static,
    Resp: Message + Default + Serialize + 'static,
{
    route(MethodFilter::GET, binding)
}

/// `GET` route whose template has path parameters (`/user/{id}`).
pub fn get_binding_with_path<Req, Resp>(binding: Binding<Req, Resp>) -> MethodRouter<AppState>
where
    Req: Message + Default + DeserializeOwned + 'static,
    Resp: Message + Default + Serialize + 'static,
{
    let binding = Arc::new(binding);
    on(
        MethodFilter::GET,
        move |State(state): State<AppState>,
              ctx: RequestContext,
              query: Result<Query<HashMap<String, String>>, QueryRejection>,
              path_params: Result<Path<HashMap<String, String>>, PathRejection>,
              body: Result<Bytes, BytesRejection>| async move {
            let inbound = Inbound {
                query: query?.0,
                path_params: path_params?.0,
            };
            execute(&binding, &state, &ctx, &inbound, &body?).await
        },
    )
}

fn route<Req, Resp>(filter: MethodFilter, binding: Binding<Req, Resp>) -> MethodRouter<AppState>
where
    Req: Message + Default + DeserializeOwned + 'static,
    Resp: Message + Default + Serialize + 'static,
{
    let binding = Arc::new(binding);
    on(
        filter,
        move |State(state): State<AppState>,
              ctx: RequestContext,
              query: Result<Query<HashMap<String, String>>, QueryRejection>,
              body: Result<Bytes, BytesRejection>| async move {
            let inbound = Inbound {
                query: query?.0,
                path_params: HashMap::new(),
            };
            execute(&binding, &state, &ctx, &inbound, &body?).await
        },
    )
}
