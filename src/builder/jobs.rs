//! Parallel job estimate for the external build tool.
//!
//! Each compiler job is assumed to need up to [`MEMORY_PER_JOB_MB`] of
//! physical memory, so the CPU-derived job count is capped by what the
//! machine can hold.

use sysinfo::System;

/// Memory budget of a single compiler job.
pub const MEMORY_PER_JOB_MB: u64 = 400;

/// CPU term used when the CPU count is unknown.
pub const FALLBACK_JOBS: usize = 2;

/// `max(1, min(cpus + 1, memory_mb / MEMORY_PER_JOB_MB))`.
///
/// An unknown memory size drops the memory term; an unknown CPU count uses
/// [`FALLBACK_JOBS`] as the CPU term.
pub fn estimate_jobs(cpus: Option<usize>, memory_mb: Option<u64>) -> usize {
    let cpu_term = cpus.map(|c| c + 1).unwrap_or(FALLBACK_JOBS);

    let jobs = match memory_mb {
        Some(mb) => {
            let memory_term = usize::try_from(mb / MEMORY_PER_JOB_MB).unwrap_or(usize::MAX);
            cpu_term.min(memory_term)
        }
        None => cpu_term,
    };

    jobs.max(1)
}

/// Estimate for the machine we are running on.
pub fn host_jobs() -> usize {
    let cpus = std::thread::available_parallelism().ok().map(|n| n.get());
    let memory_mb = physical_memory_mb();

    let jobs = estimate_jobs(cpus, memory_mb);
    tracing::debug!(
        "Job estimate: cpus={:?} memory_mb={:?} -> {}",
        cpus,
        memory_mb,
        jobs
    );
    jobs
}

/// Total physical memory in MiB, if the platform reports it.
fn physical_memory_mb() -> Option<u64> {
    let mut sys = System::new();
    sys.refresh_memory();
    match sys.total_memory() {
        0 => None,
        bytes => Some(bytes / (1024 * 1024)),
    }
}
