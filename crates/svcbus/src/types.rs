// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Routing identifiers.
//!
//! The bus addresses handlers with the classic three-part scheme: a 16-bit
//! service id, a 16-bit instance id and a 16-bit method id. Applications and
//! request sessions carry their own ids for response routing and correlation.

use std::fmt;

/// Identifies a logical service (e.g. "memory info provider").
pub type ServiceId = u16;

/// Identifies one instance of a service.
pub type InstanceId = u16;

/// Identifies a method within a service instance.
pub type MethodId = u16;

/// Identifies an application endpoint on the bus.
pub type AppId = u16;

/// Per-application request counter, unique within one application run.
pub type SessionId = u32;

/// The granularity at which services are offered, requested and reported
/// available: one `(service, instance)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub service: ServiceId,
    pub instance: InstanceId,
}

impl ServiceKey {
    pub const fn new(service: ServiceId, instance: InstanceId) -> Self {
        Self { service, instance }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:04x}.{:04x}]", self.service, self.instance)
    }
}

/// The granularity at which messages are dispatched: one
/// `(service, instance, method)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodAddr {
    pub service: ServiceId,
    pub instance: InstanceId,
    pub method: MethodId,
}

impl MethodAddr {
    pub const fn new(service: ServiceId, instance: InstanceId, method: MethodId) -> Self {
        Self {
            service,
            instance,
            method,
        }
    }

    /// The service key this method belongs to.
    pub const fn key(&self) -> ServiceKey {
        ServiceKey::new(self.service, self.instance)
    }
}

impl fmt::Display for MethodAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:04x}.{:04x}.{:04x}]",
            self.service, self.instance, self.method
        )
    }
}

/// Correlation id attached to every request and echoed on its response.
///
/// Combines the requesting application's id with a session counter, so a
/// response can be routed back to its requester and matched to the exact
/// call that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestId {
    /// Application that issued the request.
    pub app: AppId,
    /// Session counter assigned by the issuing application.
    pub session: SessionId,
}

impl RequestId {
    pub const fn new(app: AppId, session: SessionId) -> Self {
        Self { app, session }
    }

    /// The null id carried by a request before the bus assigns one.
    pub const fn zero() -> Self {
        Self { app: 0, session: 0 }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:08x}", self.app, self.session)
    }
}
