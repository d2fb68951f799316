// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The bus core: offer table, watcher table and per-application event
//! queues.
//!
//! Routing is intentionally dumb. A request goes to whichever application
//! currently offers the `(service, instance)` it names; a response goes back
//! to the application recorded in its correlation id. Requests for a service
//! nobody offers are dropped with a log line - the bus never notifies the
//! sender, mirroring the fire-and-forget contract of the client API.

use crate::app::Application;
use crate::error::{BusError, BusResult};
use crate::message::Message;
use crate::types::{AppId, ServiceKey};
use crossbeam::channel::{unbounded, Receiver, Sender};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

/// Event delivered to an application's dispatch thread.
pub(crate) enum Event {
    /// A routed request or response.
    Deliver(Message),
    /// Availability transition of a watched service.
    Availability { key: ServiceKey, available: bool },
    /// Stop the dispatch loop.
    Shutdown,
}

/// Per-application entry in the bus routing table.
pub(crate) struct Endpoint {
    pub name: Arc<str>,
    pub tx: Sender<Event>,
}

pub(crate) struct BusInner {
    /// Next application id. Starts at 1; id 0 is reserved for the null
    /// correlation id.
    next_app: AtomicU16,
    pub(crate) endpoints: DashMap<AppId, Endpoint>,
    /// Who currently offers each service key.
    pub(crate) offers: DashMap<ServiceKey, AppId>,
    /// Who asked to be told about availability of each service key.
    pub(crate) watchers: DashMap<ServiceKey, Vec<AppId>>,
}

/// Handle to an in-process service bus.
///
/// Cheap to clone; all clones share the same routing state. Applications
/// created from the same bus can reach each other.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_app: AtomicU16::new(1),
                endpoints: DashMap::new(),
                offers: DashMap::new(),
                watchers: DashMap::new(),
            }),
        }
    }

    /// Create an application endpoint on this bus.
    ///
    /// The application is registered immediately but dispatches nothing
    /// until [`Application::start`] is called.
    pub fn create_application(&self, name: &str) -> Application {
        let id = self.inner.next_app.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded();
        self.inner.endpoints.insert(
            id,
            Endpoint {
                name: Arc::from(name),
                tx: tx.clone(),
            },
        );
        log::info!("bus: application '{}' registered (id {:04x})", name, id);
        Application::new(id, name, self.inner.clone(), tx, rx)
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusInner {
    /// Queue a request at the application offering its service key.
    pub(crate) fn route_request(&self, msg: Message) {
        let key = msg.addr.key();
        let Some(provider) = self.offers.get(&key).map(|e| *e.value()) else {
            log::debug!("bus: no provider for {}, dropping request {}", key, msg.id);
            return;
        };
        if let Some(endpoint) = self.endpoints.get(&provider) {
            if endpoint.tx.send(Event::Deliver(msg)).is_err() {
                log::warn!("bus: provider queue for {} is closed", key);
            }
        }
    }

    /// Queue a response at the application named in its correlation id.
    pub(crate) fn route_response(&self, msg: Message) -> BusResult<()> {
        let Some(endpoint) = self.endpoints.get(&msg.id.app) else {
            // Requester left the bus between request and response.
            log::warn!("bus: requester {:04x} is gone, dropping response", msg.id.app);
            return Ok(());
        };
        let name = endpoint.name.clone();
        endpoint
            .tx
            .send(Event::Deliver(msg))
            .map_err(|_| BusError::QueueClosed(name.to_string()))
    }

    /// Tell every watcher of `key` about an availability transition.
    pub(crate) fn notify_watchers(&self, key: ServiceKey, available: bool) {
        let Some(watchers) = self.watchers.get(&key).map(|w| w.value().clone()) else {
            return;
        };
        for app in watchers {
            if let Some(endpoint) = self.endpoints.get(&app) {
                let _ = endpoint.tx.send(Event::Availability { key, available });
            }
        }
    }

    /// Remove an application from all routing tables, withdrawing its
    /// offers so watchers see the services go unreachable.
    pub(crate) fn remove_application(&self, id: AppId) {
        let withdrawn: Vec<ServiceKey> = self
            .offers
            .iter()
            .filter(|e| *e.value() == id)
            .map(|e| *e.key())
            .collect();
        for key in withdrawn {
            self.offers.remove(&key);
            self.notify_watchers(key, false);
        }
        for mut entry in self.watchers.iter_mut() {
            entry.value_mut().retain(|w| *w != id);
        }
        if let Some((_, endpoint)) = self.endpoints.remove(&id) {
            log::info!("bus: application '{}' removed (id {:04x})", endpoint.name, id);
        }
    }
}

pub(crate) type EventReceiver = Receiver<Event>;
