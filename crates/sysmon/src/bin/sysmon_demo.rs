// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! sysmon-demo - run the monitoring service and the interactive client
//! together on one bus.
//!
//! The bus is in-process, so both endpoints live in this binary: the
//! service offers the memory and CPU methods, the client drives them from
//! a console menu. `RUST_LOG=info` shows availability transitions and
//! request handling.

use std::sync::Arc;
use sysmon::{MonitorClient, MonitorService};

fn main() {
    env_logger::init();

    let bus = svcbus::Bus::new();
    let service = Arc::new(MonitorService::with_defaults(&bus));
    let client = Arc::new(MonitorClient::new(&bus));

    {
        let client = client.clone();
        let service = service.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            client.shutdown();
            service.stop();
            std::process::exit(0);
        }) {
            log::warn!("could not install Ctrl-C handler: {}", e);
        }
    }

    println!("sysmon demo - service and client share one in-process bus");
    client.run_console();

    client.shutdown();
    service.stop();
}
