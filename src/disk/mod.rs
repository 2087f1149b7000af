pub mod request;

pub use request::{Disk, FileReadRequest};

use log::debug;

use crate::error::{SimError, SimResult};
use crate::process::Pid;

/// All disks in the machine, indexed from zero.
///
/// Each disk serves one request at a time and backs the rest up in a strict
/// FIFO queue; nothing here ever reorders requests.
#[derive(Debug)]
pub struct DiskManager {
    disks: Vec<Disk>,
}

impl DiskManager {
    pub fn new(count: usize) -> Self {
        DiskManager {
            disks: (0..count).map(|_| Disk::new()).collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.disks.len()
    }

    fn disk(&self, disk: usize) -> SimResult<&Disk> {
        let count = self.disks.len();
        self.disks
            .get(disk)
            .ok_or(SimError::DiskOutOfRange { disk, count })
    }

    fn disk_mut(&mut self, disk: usize) -> SimResult<&mut Disk> {
        let count = self.disks.len();
        self.disks
            .get_mut(disk)
            .ok_or(SimError::DiskOutOfRange { disk, count })
    }

    /// Hand a request to disk `disk`: it goes straight into the serving slot
    /// when the disk is idle, to the tail of the queue otherwise.
    pub fn submit(&mut self, pid: Pid, disk: usize, file_name: &str) -> SimResult<()> {
        let target = self.disk_mut(disk)?;
        let request = FileReadRequest::new(pid, file_name);
        if target.serving.is_none() {
            debug!("disk {}: serving \"{}\" for process {}", disk, file_name, pid);
            target.serving = Some(request);
        } else {
            debug!("disk {}: queued \"{}\" for process {}", disk, file_name, pid);
            target.queue.push_back(request);
        }
        Ok(())
    }

    /// Finish the request disk `disk` is serving and promote the head of its
    /// queue. Returns the served PID, or `None` when the disk was idle.
    pub fn complete(&mut self, disk: usize) -> SimResult<Option<Pid>> {
        let target = self.disk_mut(disk)?;
        match target.serving.take() {
            Some(done) => {
                target.serving = target.queue.pop_front();
                debug!("disk {}: completed \"{}\" for process {}", disk, done.file_name, done.pid);
                Ok(Some(done.pid))
            }
            None => Ok(None),
        }
    }

    /// Drop every queued request issued by `pid`, on every disk, keeping the
    /// survivors in order. A request already in a serving slot stays there;
    /// its completion is the caller's problem.
    pub fn purge(&mut self, pid: Pid) {
        for target in self.disks.iter_mut() {
            target.queue.retain(|request| request.pid != pid);
        }
    }

    /// The request disk `disk` is serving, or the empty request when idle.
    pub fn status(&self, disk: usize) -> SimResult<FileReadRequest> {
        self.disk(disk)
            .map(|d| d.serving.clone().unwrap_or_default())
    }

    /// Copy of disk `disk`'s backlog, next to be served first.
    pub fn queue(&self, disk: usize) -> SimResult<Vec<FileReadRequest>> {
        self.disk(disk)
            .map(|d| d.queue.iter().cloned().collect())
    }
}
