// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request and response messages.

use crate::payload::Payload;
use crate::types::{AppId, MethodAddr, RequestId};

/// Direction of a message on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Client-to-service method call.
    Request,
    /// Service-to-client reply, correlated to a request.
    Response,
}

/// A routed message: method address, correlation id, source endpoint and an
/// opaque payload.
///
/// Requests are built with [`Message::request`]; the bus assigns the
/// [`RequestId`] when the message is sent, unless the caller pre-assigned
/// one from `Application::next_request_id` via [`Message::with_id`].
/// Responses are built from the request they answer with
/// [`Message::response`], which copies the address and correlation context.
#[derive(Debug, Clone)]
pub struct Message {
    pub kind: MessageKind,
    pub addr: MethodAddr,
    /// Correlation id. Zero on a request until `Application::send` assigns
    /// one; on a response, the id of the request being answered.
    pub id: RequestId,
    /// Application that sent this message (assigned by the bus).
    pub source: AppId,
    pub payload: Payload,
}

impl Message {
    /// Build a request for the given method, with an empty payload.
    pub fn request(addr: MethodAddr) -> Self {
        Self {
            kind: MessageKind::Request,
            addr,
            id: RequestId::zero(),
            source: 0,
            payload: Payload::empty(),
        }
    }

    /// Build a response to `request`, carrying its address and correlation
    /// id so the bus can route it back to the requester.
    pub fn response(request: &Message) -> Self {
        Self {
            kind: MessageKind::Response,
            addr: request.addr,
            id: request.id,
            source: 0,
            payload: Payload::empty(),
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Attach a pre-allocated correlation id to a request.
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = id;
        self
    }

    pub fn is_request(&self) -> bool {
        self.kind == MessageKind::Request
    }

    pub fn is_response(&self) -> bool {
        self.kind == MessageKind::Response
    }
}
