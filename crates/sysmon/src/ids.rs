// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed service addresses.
//!
//! Both endpoints compile these in; there is no negotiation. The memory and
//! CPU methods live under distinct `(service, instance)` pairs, so their
//! availability toggles independently.

use svcbus::{InstanceId, MethodAddr, MethodId, ServiceId, ServiceKey};

pub const MEM_SERVICE_ID: ServiceId = 0x1111;
pub const MEM_INSTANCE_ID: InstanceId = 0x2222;
pub const MEM_METHOD_ID: MethodId = 0x0001;

pub const CPU_SERVICE_ID: ServiceId = 0x3333;
pub const CPU_INSTANCE_ID: InstanceId = 0x4444;
pub const CPU_METHOD_ID: MethodId = 0x0002;

/// Address of the memory-info method.
pub const MEM_METHOD: MethodAddr = MethodAddr::new(MEM_SERVICE_ID, MEM_INSTANCE_ID, MEM_METHOD_ID);

/// Address of the CPU-usage method.
pub const CPU_METHOD: MethodAddr = MethodAddr::new(CPU_SERVICE_ID, CPU_INSTANCE_ID, CPU_METHOD_ID);

/// Availability key of the memory-info service.
pub const MEM_SERVICE: ServiceKey = MEM_METHOD.key();

/// Availability key of the CPU-usage service.
pub const CPU_SERVICE: ServiceKey = CPU_METHOD.key();
