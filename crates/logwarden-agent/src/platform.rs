//! Host facts for registration and stats frames

use logwarden_core::PlatformInfo;
use sysinfo::System;

/// Snapshot the host facts reported in the register frame.
pub fn platform_info() -> PlatformInfo {
    let mut system = System::new();
    system.refresh_memory();
    PlatformInfo {
        hostname: hostname(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        runtime_version: env!("CARGO_PKG_VERSION").to_string(),
        memory: system.total_memory(),
    }
}

pub fn hostname() -> String {
    System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Resident memory of this process in bytes, for stats frames.
pub fn process_memory() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut system = System::new();
    if !system.refresh_process(pid) {
        return 0;
    }
    system.process(pid).map(|process| process.memory()).unwrap_or(0)
}
