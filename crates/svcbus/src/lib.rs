// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # svcbus - In-process service bus
//!
//! A small service-oriented message bus: applications offer services under a
//! `(service, instance)` pair, other applications request them, and method
//! calls are routed as request/response messages addressed by
//! `(service, instance, method)`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use svcbus::{Bus, Message, MethodAddr, Payload};
//!
//! fn main() -> svcbus::BusResult<()> {
//!     let bus = Bus::new();
//!
//!     let server = bus.create_application("server");
//!     let addr = MethodAddr::new(0x1234, 0x0001, 0x0001);
//!     server.register_message_handler(addr, |app, request| {
//!         let response = Message::response(request).with_payload(Payload::from(b"ok".to_vec()));
//!         let _ = app.send(response);
//!     });
//!     server.offer_service(addr.key());
//!     server.start();
//!
//!     let client = bus.create_application("client");
//!     client.request_service(addr.key());
//!     client.start();
//!     client.send(Message::request(addr))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        Application                           |
//! |  message handlers | availability handlers | dispatch thread  |
//! +--------------------------------------------------------------+
//! |                           Bus                                |
//! |      offer table | watcher table | per-app event queues      |
//! +--------------------------------------------------------------+
//! ```
//!
//! Each application owns exactly one dispatch thread consuming its event
//! queue in FIFO order. A handler that blocks therefore delays every other
//! handler of the same application - callers that need isolation must move
//! the work onto their own threads.
//!
//! Scope: routing, correlation and availability signalling only. There is no
//! network transport and no discovery protocol behind this bus; the API seam
//! is shaped so one could be slotted in without touching callers.

mod app;
mod bus;
mod error;
mod message;
mod payload;
mod types;

pub use app::Application;
pub use bus::Bus;
pub use error::{BusError, BusResult};
pub use message::{Message, MessageKind};
pub use payload::Payload;
pub use types::{AppId, InstanceId, MethodAddr, MethodId, RequestId, ServiceId, ServiceKey, SessionId};
