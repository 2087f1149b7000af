//! Simulation of the kernel-visible state of a small operating system: one
//! CPU with a FIFO ready queue, any number of disks with FIFO request
//! queues, and paged RAM with a global LRU replacement policy.
//!
//! Nothing here runs concurrently and nothing does real I/O. A test driver
//! owns a [`Simulator`] and drives it through synchronous state transitions,
//! timer interrupts and disk completions included, then inspects the state
//! through the query methods.

pub mod disk;
pub mod error;
pub mod memory;
pub mod process;
pub mod scheduler;
pub mod sim;

pub use disk::FileReadRequest;
pub use error::{SimError, SimResult};
pub use memory::MemoryItem;
pub use process::{Pid, Process, ProcessState};
pub use sim::Simulator;
