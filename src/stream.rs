//! Timed reading stream.
//!
//! A [`ReadingStream`] repeatedly invokes the reading generator on a fixed
//! interval and delivers each reading to a subscriber callback, starting with
//! one immediate delivery at subscription time. The returned [`StreamHandle`]
//! owns the producer task: stopping it (or dropping it) guarantees no further
//! callback invocations.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use crate::generator::{ReadingGenerator, SensorReading};

/// A repeating, cancellable producer of sensor readings.
///
/// Starting a stream consumes it, so each instance drives at most one timer.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use greengrow_telemetry::generator::ReadingGenerator;
/// use greengrow_telemetry::stream::ReadingStream;
///
/// #[tokio::main]
/// async fn main() {
///     let stream = ReadingStream::new(ReadingGenerator::with_defaults(), Duration::from_secs(5));
///     let handle = stream.start(|reading| {
///         println!("{:.1}C at {}", reading.temperature, reading.timestamp);
///     });
///
///     tokio::time::sleep(Duration::from_secs(30)).await;
///     handle.stop();
/// }
/// ```
pub struct ReadingStream {
    generator: Arc<ReadingGenerator>,
    period: Duration,
}

impl ReadingStream {
    /// Create a stream that produces one reading every `period`.
    pub fn new(generator: ReadingGenerator, period: Duration) -> Self {
        Self {
            generator: Arc::new(generator),
            period,
        }
    }

    /// The delivery period of this stream.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start delivering readings to `on_reading`.
    ///
    /// The first reading is delivered immediately; subsequent readings arrive
    /// every period until the handle is stopped or dropped. Callbacks are
    /// expected to be cheap (the original consumer is a state assignment);
    /// long-running work should be handed off to a channel.
    pub fn start<F>(self, mut on_reading: F) -> StreamHandle
    where
        F: FnMut(SensorReading) + Send + 'static,
    {
        let generator = self.generator;
        let period = self.period;

        let task = tokio::spawn(async move {
            // The first tick of a tokio interval completes immediately,
            // which gives subscribers their initial reading up front.
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                on_reading(generator.generate());
            }
        });

        debug!(period_ms = period.as_millis() as u64, "Reading stream started");
        StreamHandle { task }
    }
}

/// Owner handle for a running stream's producer task.
///
/// The handle is the stream's single cancellation token: once `stop` is
/// called (or the handle is dropped), the timer never fires again.
pub struct StreamHandle {
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Stop the stream. No callbacks are invoked after this returns.
    pub fn stop(self) {
        self.task.abort();
        debug!("Reading stream stopped");
    }

    /// Whether the producer task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        // A leaked timer must not outlive its owner.
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn collecting_stream(period: Duration) -> (StreamHandle, mpsc::UnboundedReceiver<SensorReading>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = ReadingStream::new(ReadingGenerator::with_defaults(), period);
        let handle = stream.start(move |reading| {
            tx.send(reading).ok();
        });
        (handle, rx)
    }

    #[test]
    fn test_stream_reports_period() {
        let stream = ReadingStream::new(ReadingGenerator::with_defaults(), Duration::from_secs(5));
        assert_eq!(stream.period(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_first_reading_is_immediate() {
        // Period far longer than the timeout: only the immediate first tick
        // can produce this reading.
        let (handle, mut rx) = collecting_stream(Duration::from_secs(60));

        let reading = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("first reading should arrive immediately")
            .expect("channel should be open");

        assert_eq!(reading.device_id, "greenhouse-01");
        assert!(handle.is_running());
        handle.stop();
    }

    #[tokio::test]
    async fn test_stream_delivers_repeatedly() {
        let (handle, mut rx) = collecting_stream(Duration::from_millis(10));

        for _ in 0..3 {
            tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("reading should arrive within the period")
                .expect("channel should be open");
        }

        handle.stop();
    }

    #[tokio::test]
    async fn test_stop_halts_deliveries() {
        let (handle, mut rx) = collecting_stream(Duration::from_millis(10));

        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("first reading should arrive")
            .expect("channel should be open");

        handle.stop();

        // Aborting the producer drops the sender; draining to `None` proves
        // no callback can fire again.
        while let Some(_reading) = rx.recv().await {}
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_stream() {
        let (handle, mut rx) = collecting_stream(Duration::from_millis(10));
        drop(handle);

        while let Some(_reading) = rx.recv().await {}
        assert!(rx.recv().await.is_none());
    }
}
