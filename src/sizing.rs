//! Shard-count selection.
//!
//! More shards mean less lock contention but more fixed overhead, so the
//! count is derived from the host's parallelism once at construction:
//! `2 × logical CPUs`, clamped into `[4, 256]`, then rounded up to a power
//! of two so the hash reduction stays mask-friendly.

/// Smallest shard count worth having for key distribution.
const MIN_SHARDS: usize = 4;

/// Cap on per-shard fixed overhead.
const MAX_SHARDS: usize = 256;

/// Picks the shard count for this host.
pub(crate) fn optimal_shard_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1);
    shard_count_for(cpus)
}

/// Shard count for a given logical CPU count.
pub(crate) fn shard_count_for(cpus: usize) -> usize {
    (cpus * 2).clamp(MIN_SHARDS, MAX_SHARDS).next_power_of_two()
}
