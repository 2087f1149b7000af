use std::fmt;

/// Simulation error types.
///
/// Every operation checks its preconditions before touching any state, so a
/// returned error means the machine is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// An operation that needs a running process found the CPU idle.
    NoRunningProcess,
    /// A disk index outside the configured range.
    DiskOutOfRange { disk: usize, count: usize },
    /// Rejected constructor arguments.
    InvalidConfiguration(&'static str),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::NoRunningProcess => write!(f, "No process currently using the CPU"),
            SimError::DiskOutOfRange { disk, count } => {
                write!(f, "Disk {} does not exist ({} disks present)", disk, count)
            }
            SimError::InvalidConfiguration(why) => write!(f, "Invalid configuration: {}", why),
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
