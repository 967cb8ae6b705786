//! Keep-alive service handle

/// On/off control over the background-execution token that keeps the hosting
/// process alive while push listeners run.
///
/// The controller guarantees edge-triggered calls: `start` is only invoked
/// when the service is believed stopped and vice versa, so implementations
/// do not need their own deduplication.
pub trait PushServiceManager: Send + Sync {
    fn start(&self);

    fn stop(&self);
}
