//! Host Description
//!
//! A one-line summary of the machine the sweep ran on, embedded in plot
//! headers so archived results stay interpretable. Linux-specific detail
//! (CPU model, memory) degrades gracefully elsewhere.

use std::thread;

/// Number of logical CPUs; the fan-out bound for the convert phase.
pub fn logical_cpus() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Human-readable host summary, e.g.
/// `linux, 6.8.0, x86_64, 16 x AMD Ryzen 9 5950X, 64 GiB RAM`.
pub fn describe_host() -> String {
    [
        std::env::consts::OS.to_string(),
        os_release(),
        std::env::consts::ARCH.to_string(),
        cpu_description(),
        ram_description(),
    ]
    .join(", ")
}

fn os_release() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(release) = std::fs::read_to_string("/proc/sys/kernel/osrelease") {
            return release.trim().to_string();
        }
    }
    "unknown".to_string()
}

/// Deduplicated CPU inventory: `count x model` per distinct model name.
fn cpu_description() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let mut models: Vec<(String, usize)> = Vec::new();
            for line in cpuinfo.lines().filter(|l| l.starts_with("model name")) {
                let model = line
                    .split(':')
                    .nth(1)
                    .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                match models.iter_mut().find(|(m, _)| *m == model) {
                    Some((_, count)) => *count += 1,
                    None => models.push((model, 1)),
                }
            }
            if !models.is_empty() {
                return models
                    .into_iter()
                    .map(|(model, count)| format!("{count} x {model}"))
                    .collect::<Vec<_>>()
                    .join(", ");
            }
        }
    }
    format!("{} logical cpus", logical_cpus())
}

fn ram_description() -> String {
    #[cfg(target_os = "linux")]
    {
        let total_kb = std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|meminfo| {
                meminfo
                    .lines()
                    .find(|l| l.starts_with("MemTotal"))
                    .and_then(|l| l.split_whitespace().nth(1).and_then(|v| v.parse::<u64>().ok()))
            });
        if let Some(kb) = total_kb {
            return format!("{:.0} GiB RAM", kb as f64 / 1024.0 / 1024.0);
        }
    }
    "unknown RAM".to_string()
}
