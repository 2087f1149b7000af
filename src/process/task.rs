use std::fmt;

/// Unique process identifier (PID).
///
/// PIDs are handed out starting from 1 and are never recycled. The value 0
/// is reserved: it stands for "no process" wherever a slot can be idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(pub u64);

impl Pid {
    /// The idle sentinel.
    pub const NONE: Pid = Pid(0);
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Anywhere in the live system: on the CPU, in the ready queue, or
    /// blocked on a disk read.
    Active,
    /// Blocked in wait until one of its children terminates.
    Waiting,
    /// Terminated but not yet collected by its parent. Owns no frames and
    /// has no pending disk requests.
    Zombie,
}

/// A single process record.
///
/// Records refer to each other by PID only; the table in `process::mod` is
/// the single owner of every record.
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: Pid,
    pub parent: Option<Pid>,
    /// Living children, in fork order.
    pub children: Vec<Pid>,
    pub state: ProcessState,
}

impl Process {
    pub fn new(pid: Pid, parent: Option<Pid>) -> Self {
        Process {
            pid,
            parent,
            children: Vec::new(),
            state: ProcessState::Active,
        }
    }

    pub fn is_zombie(&self) -> bool {
        self.state == ProcessState::Zombie
    }

    pub fn is_waiting(&self) -> bool {
        self.state == ProcessState::Waiting
    }
}
