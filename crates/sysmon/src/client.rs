// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The interactive client: a typed command channel, one dispatcher thread
//! issuing fire-and-forget requests, and response handlers that print
//! whatever arrives.

use crate::ids;
use crate::wire::{CpuReport, MemReport};
use crossbeam::channel::{unbounded, Sender};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use svcbus::{Application, Bus, Message, MethodAddr, RequestId};

/// Commands accepted by the client dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request the memory-info method.
    Memory,
    /// Request the CPU-usage method.
    Cpu,
    /// Stop the dispatcher.
    Quit,
}

/// Destination for decoded reports.
///
/// The console sink prints; tests install their own sink to observe the
/// exact values the client decoded.
pub trait ReportSink: Send + Sync + 'static {
    fn memory(&self, report: &MemReport);
    fn cpu(&self, report: &CpuReport);
}

/// Default sink: print to stdout.
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn memory(&self, report: &MemReport) {
        println!("received memory information:");
        println!("  total RAM: {} KB", report.total_kb);
        println!("  free RAM:  {} KB", report.free_kb);
    }

    fn cpu(&self, report: &CpuReport) {
        println!("received CPU information:");
        println!("  CPU usage of server: {}%", report.percent);
    }
}

/// Client endpoint for the two monitoring services.
///
/// All commands flow through one typed channel into one dispatcher thread;
/// each command becomes a fire-and-forget request carrying a fresh
/// correlation id. Nothing waits: responses arrive asynchronously on the
/// application's dispatch thread, are matched against the in-flight set,
/// decoded with a strict size check and handed to the sink. Duplicate
/// in-flight requests to the same method are allowed.
///
/// Availability of the two services is logged, never used to gate sending.
pub struct MonitorClient {
    app: Application,
    cmd_tx: Sender<Command>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    pending: Arc<DashMap<RequestId, Instant>>,
    responses_received: Arc<AtomicU64>,
}

impl MonitorClient {
    /// Start a client printing to stdout.
    pub fn new(bus: &Bus) -> Self {
        Self::with_sink(bus, Arc::new(ConsoleSink))
    }

    /// Start a client with an explicit report sink.
    pub fn with_sink(bus: &Bus, sink: Arc<dyn ReportSink>) -> Self {
        let app = bus.create_application("sysmon-client");
        let pending: Arc<DashMap<RequestId, Instant>> = Arc::new(DashMap::new());
        let responses_received = Arc::new(AtomicU64::new(0));

        app.register_availability_handler(ids::MEM_SERVICE, |service, instance, available| {
            log::info!(
                "memory usage service [{:04x}.{:04x}] is {}",
                service,
                instance,
                if available { "available" } else { "NOT available" }
            );
        });
        app.register_availability_handler(ids::CPU_SERVICE, |service, instance, available| {
            log::info!(
                "CPU usage service [{:04x}.{:04x}] is {}",
                service,
                instance,
                if available { "available" } else { "NOT available" }
            );
        });

        let in_flight = pending.clone();
        let mem_sink = sink.clone();
        let received = responses_received.clone();
        app.register_message_handler(ids::MEM_METHOD, move |_, response| {
            if in_flight.remove(&response.id).is_none() {
                log::warn!(
                    "memory response {} matches no in-flight request",
                    response.id
                );
            }
            match MemReport::decode(&response.payload) {
                Ok(report) => {
                    received.fetch_add(1, Ordering::Relaxed);
                    mem_sink.memory(&report);
                }
                Err(e) => log::error!("discarding memory response: {}", e),
            }
        });

        let in_flight = pending.clone();
        let cpu_sink = sink;
        let received = responses_received.clone();
        app.register_message_handler(ids::CPU_METHOD, move |_, response| {
            if in_flight.remove(&response.id).is_none() {
                log::warn!("CPU response {} matches no in-flight request", response.id);
            }
            match CpuReport::decode(&response.payload) {
                Ok(report) => {
                    received.fetch_add(1, Ordering::Relaxed);
                    cpu_sink.cpu(&report);
                }
                Err(e) => log::error!("discarding CPU response: {}", e),
            }
        });

        app.request_service(ids::MEM_SERVICE);
        app.request_service(ids::CPU_SERVICE);
        app.start();

        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        let dispatch_app = app.clone();
        let in_flight = pending.clone();
        let dispatcher = std::thread::Builder::new()
            .name("sysmon-client-cmd".to_string())
            .spawn(move || {
                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Memory => {
                            Self::send_request(&dispatch_app, &in_flight, ids::MEM_METHOD);
                        }
                        Command::Cpu => {
                            // Availability is logged only; the request goes
                            // out either way.
                            if dispatch_app.is_available(ids::CPU_SERVICE) {
                                log::info!("CPU service is available, requesting");
                            }
                            Self::send_request(&dispatch_app, &in_flight, ids::CPU_METHOD);
                        }
                        Command::Quit => break,
                    }
                }
            })
            .ok();
        if dispatcher.is_none() {
            log::error!("failed to spawn client command dispatcher");
        }

        Self {
            app,
            cmd_tx,
            dispatcher: Mutex::new(dispatcher),
            pending,
            responses_received,
        }
    }

    fn send_request(
        app: &Application,
        pending: &DashMap<RequestId, Instant>,
        addr: MethodAddr,
    ) {
        // Track the request before it is routed; the response runs on the
        // application's dispatch thread and can beat send() returning.
        let id = app.next_request_id();
        pending.insert(id, Instant::now());
        match app.send(Message::request(addr).with_id(id)) {
            Ok(_) => log::debug!("sent request {} to {}", id, addr),
            Err(e) => {
                pending.remove(&id);
                log::error!("failed to send request to {}: {}", addr, e);
            }
        }
    }

    /// Queue a command for the dispatcher.
    pub fn submit(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!("dispatcher is gone, dropping {:?}", cmd);
        }
    }

    /// Console menu loop. Returns when the user quits or stdin closes.
    pub fn run_console(&self) {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            println!();
            println!("Enter your choice:");
            println!("1. Request memory info");
            println!("2. Request CPU info");
            println!("3. Quit");

            let line = match lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    log::error!("stdin read failed: {}", e);
                    break;
                }
                None => break,
            };

            match line.trim() {
                "1" => self.submit(Command::Memory),
                "2" => self.submit(Command::Cpu),
                "3" => break,
                other => log::error!("invalid choice '{}', enter 1, 2 or 3", other),
            }
        }
    }

    /// Number of requests sent and not yet answered.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Number of well-formed responses decoded so far.
    pub fn responses_received(&self) -> u64 {
        self.responses_received.load(Ordering::Relaxed)
    }

    /// Stop the dispatcher and leave the bus. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(Command::Quit);
        if let Some(handle) = self.dispatcher.lock().take() {
            let _ = handle.join();
        }
        self.app.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use svcbus::Payload;

    /// Sink forwarding decoded reports to a test channel.
    struct ChannelSink {
        mem: mpsc::Sender<MemReport>,
        cpu: mpsc::Sender<CpuReport>,
    }

    impl ReportSink for ChannelSink {
        fn memory(&self, report: &MemReport) {
            self.mem.send(*report).unwrap();
        }

        fn cpu(&self, report: &CpuReport) {
            self.cpu.send(*report).unwrap();
        }
    }

    fn channel_sink() -> (
        Arc<ChannelSink>,
        mpsc::Receiver<MemReport>,
        mpsc::Receiver<CpuReport>,
    ) {
        let (mem_tx, mem_rx) = mpsc::channel();
        let (cpu_tx, cpu_rx) = mpsc::channel();
        (
            Arc::new(ChannelSink {
                mem: mem_tx,
                cpu: cpu_tx,
            }),
            mem_rx,
            cpu_rx,
        )
    }

    /// A fake provider answering the memory method with a fixed payload.
    fn fake_mem_provider(bus: &Bus, payload: Vec<u8>) -> Application {
        let provider = bus.create_application("fake-provider");
        provider.register_message_handler(ids::MEM_METHOD, move |app, request| {
            let response =
                Message::response(request).with_payload(Payload::from(payload.clone()));
            app.send(response).unwrap();
        });
        provider.offer_service(ids::MEM_SERVICE);
        provider.start();
        provider
    }

    #[test]
    fn memory_command_round_trips_to_the_sink() {
        let bus = Bus::new();
        let provider = fake_mem_provider(
            &bus,
            MemReport {
                total_kb: 16384,
                free_kb: 8192,
            }
            .encode()
            .into_bytes(),
        );

        let (sink, mem_rx, _cpu_rx) = channel_sink();
        let client = MonitorClient::with_sink(&bus, sink);
        client.submit(Command::Memory);

        let report = mem_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(report.total_kb, 16384);
        assert_eq!(report.free_kb, 8192);
        assert_eq!(client.responses_received(), 1);
        assert_eq!(client.pending_requests(), 0);

        client.shutdown();
        provider.stop();
    }

    #[test]
    fn rapid_requests_leave_no_stale_pending_entries() {
        let bus = Bus::new();
        let provider = fake_mem_provider(
            &bus,
            MemReport {
                total_kb: 1,
                free_kb: 1,
            }
            .encode()
            .into_bytes(),
        );

        let (sink, mem_rx, _cpu_rx) = channel_sink();
        let client = MonitorClient::with_sink(&bus, sink);

        // An instantly-answering provider means each response races the
        // bookkeeping of its own send. Every request is recorded in-flight
        // before it is routed, so every response must find its entry.
        const ROUNDS: usize = 64;
        for _ in 0..ROUNDS {
            client.submit(Command::Memory);
        }
        for _ in 0..ROUNDS {
            mem_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }

        assert_eq!(client.responses_received(), ROUNDS as u64);
        assert_eq!(client.pending_requests(), 0);

        client.shutdown();
        provider.stop();
    }

    #[test]
    fn undersized_response_is_discarded_without_interpretation() {
        let bus = Bus::new();
        let provider = fake_mem_provider(&bus, vec![1, 2, 3]);

        let (sink, mem_rx, _cpu_rx) = channel_sink();
        let client = MonitorClient::with_sink(&bus, sink);
        client.submit(Command::Memory);

        // The sink never sees the malformed payload.
        assert!(mem_rx.recv_timeout(Duration::from_millis(300)).is_err());
        assert_eq!(client.responses_received(), 0);

        client.shutdown();
        provider.stop();
    }

    #[test]
    fn requests_go_out_even_when_nothing_is_available() {
        let bus = Bus::new();
        let (sink, mem_rx, _cpu_rx) = channel_sink();
        let client = MonitorClient::with_sink(&bus, sink);

        // No provider offers anything; the send still happens and the
        // request simply stays pending forever.
        client.submit(Command::Memory);
        assert!(mem_rx.recv_timeout(Duration::from_millis(300)).is_err());
        assert_eq!(client.pending_requests(), 1);

        client.shutdown();
    }

    #[test]
    fn quit_stops_the_dispatcher() {
        let bus = Bus::new();
        let (sink, _mem_rx, _cpu_rx) = channel_sink();
        let client = MonitorClient::with_sink(&bus, sink);

        client.shutdown();
        // Further submits are dropped, not panicking.
        client.submit(Command::Memory);
        client.shutdown();
    }
}
