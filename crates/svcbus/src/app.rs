// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application endpoint: handler registration, offering/requesting services
//! and the single dispatch thread.

use crate::bus::{BusInner, Event, EventReceiver};
use crate::error::{BusError, BusResult};
use crate::message::{Message, MessageKind};
use crate::types::{AppId, InstanceId, MethodAddr, RequestId, ServiceId, ServiceKey};
use crossbeam::channel::Sender;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Callback invoked for each message addressed to a registered method.
///
/// Runs on the application's dispatch thread. The application handle is
/// passed in so handlers can send responses without capturing one.
pub type MessageHandler = Arc<dyn Fn(&Application, &Message) + Send + Sync>;

/// Callback invoked when a watched service toggles between reachable and
/// unreachable.
pub type AvailabilityHandler = Arc<dyn Fn(ServiceId, InstanceId, bool) + Send + Sync>;

struct AppInner {
    id: AppId,
    name: Arc<str>,
    bus: Arc<BusInner>,

    msg_handlers: DashMap<MethodAddr, MessageHandler>,
    avail_handlers: DashMap<ServiceKey, AvailabilityHandler>,

    /// Session counter for correlation ids.
    sessions: AtomicU32,

    tx: Sender<Event>,
    /// Taken by the dispatch thread on start.
    rx: Mutex<Option<EventReceiver>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
}

/// One endpoint on the bus. Cheap to clone; clones share all state.
///
/// An application dispatches all of its events - routed messages and
/// availability transitions - on one thread, started by [`start`] and
/// stopped by [`stop`]. Handlers registered for a method address receive
/// both requests (on the offering side) and responses (on the requesting
/// side) for that address.
///
/// A handler that blocks delays everything else queued for the same
/// application; there is no per-handler isolation.
///
/// [`start`]: Application::start
/// [`stop`]: Application::stop
#[derive(Clone)]
pub struct Application {
    inner: Arc<AppInner>,
}

impl Application {
    pub(crate) fn new(
        id: AppId,
        name: &str,
        bus: Arc<BusInner>,
        tx: Sender<Event>,
        rx: EventReceiver,
    ) -> Self {
        Self {
            inner: Arc::new(AppInner {
                id,
                name: Arc::from(name),
                bus,
                msg_handlers: DashMap::new(),
                avail_handlers: DashMap::new(),
                sessions: AtomicU32::new(0),
                tx,
                rx: Mutex::new(Some(rx)),
                worker: Mutex::new(None),
                running: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> AppId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Register a handler for messages addressed to `addr`.
    ///
    /// Registration is allowed before or after `start`; a later
    /// registration for the same address replaces the earlier one.
    pub fn register_message_handler<F>(&self, addr: MethodAddr, handler: F)
    where
        F: Fn(&Application, &Message) + Send + Sync + 'static,
    {
        self.inner.msg_handlers.insert(addr, Arc::new(handler));
    }

    /// Register a handler for availability transitions of `key`.
    pub fn register_availability_handler<F>(&self, key: ServiceKey, handler: F)
    where
        F: Fn(ServiceId, InstanceId, bool) + Send + Sync + 'static,
    {
        self.inner.avail_handlers.insert(key, Arc::new(handler));
    }

    /// Offer a service key on the bus. Watchers are told it became
    /// reachable. Re-offering an already-owned key is a no-op.
    pub fn offer_service(&self, key: ServiceKey) {
        match self.inner.bus.offers.insert(key, self.inner.id) {
            Some(prev) if prev == self.inner.id => return,
            Some(prev) => {
                log::warn!(
                    "{}: taking over offer of {} from application {:04x}",
                    self.inner.name,
                    key,
                    prev
                );
            }
            None => log::info!("{}: offering {}", self.inner.name, key),
        }
        self.inner.bus.notify_watchers(key, true);
    }

    /// Withdraw an offer. Watchers are told the service became
    /// unreachable. Ignored if this application does not own the offer.
    pub fn stop_offer_service(&self, key: ServiceKey) {
        let owned = self
            .inner
            .bus
            .offers
            .remove_if(&key, |_, owner| *owner == self.inner.id);
        if owned.is_some() {
            log::info!("{}: withdrew offer of {}", self.inner.name, key);
            self.inner.bus.notify_watchers(key, false);
        }
    }

    /// Subscribe to availability of a service key. If the service is
    /// already offered, the availability handler fires once with `true`
    /// (on the dispatch thread, like any other transition).
    pub fn request_service(&self, key: ServiceKey) {
        let mut watchers = self.inner.bus.watchers.entry(key).or_default();
        if !watchers.contains(&self.inner.id) {
            watchers.push(self.inner.id);
        }
        drop(watchers);

        if self.inner.bus.offers.contains_key(&key) {
            let _ = self.inner.tx.send(Event::Availability {
                key,
                available: true,
            });
        }
    }

    /// Current availability of a service key.
    pub fn is_available(&self, key: ServiceKey) -> bool {
        self.inner.bus.offers.contains_key(&key)
    }

    /// Allocate the correlation id the next request will carry.
    ///
    /// Lets a caller record the id (e.g. in an in-flight table) before the
    /// request is routed; a response can otherwise arrive on the dispatch
    /// thread before [`send`] has even returned. Attach the id with
    /// [`Message::with_id`].
    ///
    /// [`send`]: Application::send
    pub fn next_request_id(&self) -> RequestId {
        let session = self.inner.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        RequestId::new(self.inner.id, session)
    }

    /// Send a message.
    ///
    /// A request without a correlation id gets a fresh one; either way the
    /// id is returned and the message is queued at whichever application
    /// offers the addressed service, or silently dropped (with a debug
    /// log) when nobody does. For a response, the correlation id routes it
    /// back to the requester.
    pub fn send(&self, mut msg: Message) -> BusResult<RequestId> {
        if !self.inner.running.load(Ordering::Relaxed) {
            return Err(BusError::NotRunning(self.inner.name.to_string()));
        }

        msg.source = self.inner.id;
        match msg.kind {
            MessageKind::Request => {
                if msg.id.is_zero() {
                    msg.id = self.next_request_id();
                } else if msg.id.app != self.inner.id {
                    return Err(BusError::InvalidMessage(format!(
                        "request id {} was not allocated by this application",
                        msg.id
                    )));
                }
                let id = msg.id;
                self.inner.bus.route_request(msg);
                Ok(id)
            }
            MessageKind::Response => {
                if msg.id.is_zero() {
                    return Err(BusError::InvalidMessage(
                        "response without correlation id".to_string(),
                    ));
                }
                let id = msg.id;
                self.inner.bus.route_response(msg)?;
                Ok(id)
            }
        }
    }

    /// Start the dispatch thread. Idempotent.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(rx) = self.inner.rx.lock().take() else {
            // start after stop: the queue is gone for good
            self.inner.running.store(false, Ordering::SeqCst);
            log::error!("{}: cannot restart a stopped application", self.inner.name);
            return;
        };

        let app = self.clone();
        let handle = std::thread::Builder::new()
            .name(format!("svcbus-{}", self.inner.name))
            .spawn(move || app.dispatch_loop(&rx))
            .ok();
        if handle.is_none() {
            log::error!("{}: failed to spawn dispatch thread", self.inner.name);
            self.inner.running.store(false, Ordering::SeqCst);
            return;
        }
        *self.inner.worker.lock() = handle;
        log::info!("{}: dispatch started", self.inner.name);
    }

    /// Stop the dispatch thread, withdraw all offers and leave the bus.
    ///
    /// Must not be called from inside a handler of this application.
    pub fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.inner.tx.send(Event::Shutdown);
        if let Some(handle) = self.inner.worker.lock().take() {
            let _ = handle.join();
        }
        self.inner.bus.remove_application(self.inner.id);
        log::info!("{}: stopped", self.inner.name);
    }

    fn dispatch_loop(&self, rx: &EventReceiver) {
        while let Ok(event) = rx.recv() {
            match event {
                Event::Shutdown => break,
                Event::Deliver(msg) => {
                    // Clone the handler out of the map so a blocking
                    // handler does not pin the shard lock.
                    let handler = self
                        .inner
                        .msg_handlers
                        .get(&msg.addr)
                        .map(|h| h.value().clone());
                    match handler {
                        Some(handler) => handler(self, &msg),
                        None => log::debug!(
                            "{}: no message handler for {}, discarding",
                            self.inner.name,
                            msg.addr
                        ),
                    }
                }
                Event::Availability { key, available } => {
                    let handler = self
                        .inner
                        .avail_handlers
                        .get(&key)
                        .map(|h| h.value().clone());
                    if let Some(handler) = handler {
                        handler(key.service, key.instance, available);
                    }
                }
            }
        }
    }
}
