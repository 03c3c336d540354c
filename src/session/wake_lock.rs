/// Host screen keep-awake capability. Best effort: cook mode runs without it.
pub trait WakeLock: Send {
    fn acquire(&mut self) -> Result<(), WakeLockError>;
    fn release(&mut self);
}

#[derive(Debug, thiserror::Error)]
pub enum WakeLockError {
    #[error("Wake lock not supported on this host")]
    Unsupported,

    #[error("Wake lock request denied: {0}")]
    Denied(String),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoWakeLock;

impl WakeLock for NoWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        Err(WakeLockError::Unsupported)
    }

    fn release(&mut self) {}
}
