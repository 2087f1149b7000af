use std::collections::VecDeque;

use crate::process::Pid;

/// A single outstanding file-read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReadRequest {
    pub pid: Pid,
    pub file_name: String,
}

impl FileReadRequest {
    pub fn new(pid: Pid, file_name: &str) -> Self {
        FileReadRequest {
            pid,
            file_name: String::from(file_name),
        }
    }

    /// The empty request reported for an idle disk: PID 0, no file name.
    pub fn idle() -> Self {
        FileReadRequest {
            pid: Pid::NONE,
            file_name: String::new(),
        }
    }
}

impl Default for FileReadRequest {
    fn default() -> Self {
        FileReadRequest::idle()
    }
}

/// One simulated disk: the request being served plus the FIFO backlog.
#[derive(Debug, Default)]
pub struct Disk {
    /// Request in service, `None` while the disk is idle.
    pub serving: Option<FileReadRequest>,
    /// Pending requests, next to be served at the front.
    pub queue: VecDeque<FileReadRequest>,
}

impl Disk {
    pub fn new() -> Self {
        Disk::default()
    }
}
