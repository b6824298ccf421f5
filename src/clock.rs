// Server clock synchronization from round-trip probes.

use chrono::{DateTime, Duration, Utc};

/// How often a `TimeRequest` probe goes out.
pub const SYNC_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

/// How often an active auction countdown refreshes.
pub const COUNTDOWN_REFRESH: std::time::Duration = std::time::Duration::from_millis(200);

/// Samples folded into the running offset estimate. Bounding the window keeps
/// a noisy first estimate from dragging on the average forever while still
/// smoothing transient jitter.
const SAMPLE_WINDOW: u32 = 5;

/// Estimates `server clock - local clock` so a server-issued deadline can be
/// turned into a countdown against local time.
///
/// All arithmetic takes explicit timestamps so the estimator is testable with
/// synthetic probes; the event loop feeds it wall-clock readings.
#[derive(Debug, Default)]
pub struct ClockSync {
    /// Estimated server minus local clock, in milliseconds.
    offset_ms: f64,
    samples: u32,
    last_probe: Option<DateTime<Utc>>,
}

impl ClockSync {
    pub fn new() -> Self {
        ClockSync::default()
    }

    /// Record that a probe left at local time `sent_at`.
    pub fn probe_sent(&mut self, sent_at: DateTime<Utc>) {
        self.last_probe = Some(sent_at);
    }

    /// Fold a `TimeResponse` carrying `server_time` into the estimate.
    ///
    /// Assumes symmetric one-way latency: the server's send moment is
    /// estimated as `(now - t0)/2 + now`, and the sample is the difference
    /// between the reported server time and that estimate. The estimate is
    /// the incremental mean of up to the last [`SAMPLE_WINDOW`] samples.
    /// Responses with no preceding probe are ignored.
    pub fn record_response(&mut self, server_time: DateTime<Utc>, now: DateTime<Utc>) {
        let Some(t0) = self.last_probe else {
            return;
        };
        let now_ms = now.timestamp_millis() as f64;
        let t0_ms = t0.timestamp_millis() as f64;
        let estimated_server_send = (now_ms - t0_ms) / 2.0 + now_ms;
        let sample = server_time.timestamp_millis() as f64 - estimated_server_send;

        self.samples += 1;
        let window = self.samples.min(SAMPLE_WINDOW) as f64;
        self.offset_ms = ((window - 1.0) * self.offset_ms + sample) / window;
    }

    /// Number of responses folded in so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Current offset estimate in milliseconds.
    pub fn offset_ms(&self) -> f64 {
        self.offset_ms
    }

    /// The server clock reading corresponding to local time `local`.
    pub fn server_time_at(&self, local: DateTime<Utc>) -> DateTime<Utc> {
        local + Duration::milliseconds(self.offset_ms.round() as i64)
    }

    /// Estimated server time right now.
    pub fn server_now(&self) -> DateTime<Utc> {
        self.server_time_at(Utc::now())
    }

    /// Whole seconds until `deadline` on the server clock, rounded up.
    /// Negative when the deadline has passed.
    pub fn seconds_left(&self, deadline: DateTime<Utc>, local_now: DateTime<Utc>) -> i64 {
        let remaining_ms = (deadline - self.server_time_at(local_now)).num_milliseconds();
        remaining_ms.div_euclid(1000) + i64::from(remaining_ms.rem_euclid(1000) > 0)
    }
}
