use async_trait::async_trait;

/// Result alias for link operations; implementations surface transport
/// details through the boxed error.
pub type LinkResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Commands the supervisor issues to the dispensing controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerCommand {
    /// Begin dispensing the given volumes.
    Start { water_ml: f64, syrup_ml: f64 },
    /// Halt the valves immediately.
    Stop,
}

/// Network seam to the physical controller.
///
/// `command` delivers a start/stop instruction; `ping` is a lightweight
/// liveness probe. Both are expected to be time-bounded by the
/// implementation so a hung controller cannot stall a caller.
#[async_trait]
pub trait ControllerLink: Send + Sync {
    async fn command(&self, command: ControllerCommand) -> LinkResult<()>;
    async fn ping(&self) -> LinkResult<()>;
}
