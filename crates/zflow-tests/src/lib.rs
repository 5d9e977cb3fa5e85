//! Deterministic fixtures shared by the integration tests and benches.

mod faulty;

pub use faulty::{Faults, FaultyEngine};

/// The end-to-end text: `"the quick brown fox"` repeated 1000 times.
#[must_use]
pub fn fox_text() -> Vec<u8> {
    b"the quick brown fox".repeat(1000)
}

/// One JSON-like log record. Records share field names and most of their
/// layout, which is what makes a trained dictionary pay off.
#[must_use]
pub fn log_record(i: usize) -> Vec<u8> {
    let levels = ["INFO", "WARN", "DEBUG", "ERROR"];
    let services = ["auth", "billing", "search", "gateway", "scheduler"];
    let record = format!(
        concat!(
            "{{\"timestamp\":\"2024-03-{:02}T{:02}:{:02}:{:02}Z\",",
            "\"level\":\"{}\",\"service\":\"{}\",\"request_id\":\"req-{:08x}\",",
            "\"user\":{{\"id\":{},\"region\":\"eu-west-{}\",\"plan\":\"standard\"}},",
            "\"http\":{{\"method\":\"GET\",\"path\":\"/api/v2/{}/items/{}\",",
            "\"status\":{},\"latency_ms\":{}}},",
            "\"message\":\"request completed for {} with {} items in cache\"}}\n"
        ),
        i % 28 + 1,
        i % 24,
        (i * 7) % 60,
        (i * 13) % 60,
        levels[i % levels.len()],
        services[i % services.len()],
        i.wrapping_mul(2_654_435_761) & 0xffff_ffff,
        1000 + i * 37,
        i % 3 + 1,
        services[(i + 2) % services.len()],
        i * 11,
        if i % 9 == 0 { 500 } else { 200 },
        (i * 17) % 300,
        services[(i + 1) % services.len()],
        i % 50,
    );
    record.into_bytes()
}

/// `n` records, one sample each.
#[must_use]
pub fn log_samples(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(log_record).collect()
}

/// Pseudo-random bytes from a fixed seed; compresses poorly.
#[must_use]
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state.to_le_bytes()[0]
        })
        .collect()
}
