//! Resource usage of a live child process.

/// Resident set size in bytes, read from `/proc/<pid>/status`.
#[cfg(target_os = "linux")]
pub(crate) fn memory_bytes(pid: u32) -> Option<u64> {
    let status = std::fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn memory_bytes(_pid: u32) -> Option<u64> {
    None
}
