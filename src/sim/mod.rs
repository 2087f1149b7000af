use log::debug;

use crate::disk::{DiskManager, FileReadRequest};
use crate::error::{SimError, SimResult};
use crate::memory::{MemoryItem, MemoryManager};
use crate::process::{Pid, ProcessState, ProcessTable};
use crate::scheduler::Scheduler;

/// The simulated machine: process table, CPU, disks and RAM behind one
/// facade.
///
/// Every method is a complete, synchronous state transition; the caller
/// drives the whole simulation one call at a time, interrupts included.
/// Operations check their preconditions before mutating anything, so a
/// returned error always leaves the machine untouched.
#[derive(Debug)]
pub struct Simulator {
    processes: ProcessTable,
    scheduler: Scheduler,
    disks: DiskManager,
    memory: MemoryManager,
}

impl Simulator {
    /// Build a machine with `number_of_disks` disks and `amount_of_ram`
    /// bytes of RAM split into `page_size`-byte frames.
    pub fn new(number_of_disks: usize, amount_of_ram: u64, page_size: u64) -> SimResult<Self> {
        if page_size == 0 {
            return Err(SimError::InvalidConfiguration("page size must be positive"));
        }
        if amount_of_ram > 0 && page_size > amount_of_ram {
            return Err(SimError::InvalidConfiguration(
                "page size exceeds the amount of RAM",
            ));
        }
        debug!(
            "machine: {} disk(s), {} bytes of RAM, {} byte pages",
            number_of_disks, amount_of_ram, page_size
        );
        Ok(Simulator {
            processes: ProcessTable::new(),
            scheduler: Scheduler::new(),
            disks: DiskManager::new(number_of_disks),
            memory: MemoryManager::new(amount_of_ram, page_size),
        })
    }

    /// The running PID, or `NoRunningProcess` when the CPU is idle.
    fn running(&self) -> SimResult<Pid> {
        match self.scheduler.running() {
            Pid::NONE => Err(SimError::NoRunningProcess),
            pid => Ok(pid),
        }
    }

    // ---- lifecycle operations ----

    /// Create a parentless process and schedule it. It starts running at
    /// once when the CPU was free, otherwise it joins the ready-queue tail.
    /// Returns the freshly minted PID.
    pub fn new_process(&mut self) -> Pid {
        let pid = self.processes.create(None);
        self.scheduler.enqueue(pid);
        self.scheduler.dispatch();
        pid
    }

    /// Fork the running process. The child joins the tail of the ready
    /// queue; it never takes the CPU directly. Returns the child PID.
    pub fn fork(&mut self) -> SimResult<Pid> {
        let parent = self.running()?;
        let child = self.processes.create(Some(parent));
        self.scheduler.enqueue(child);
        Ok(child)
    }

    /// Terminate the running process together with its whole descendant
    /// tree. Frames and queued disk requests are reclaimed immediately; a
    /// request already being served keeps its slot until the disk reports
    /// completion, which then finds nobody to wake. A waiting parent is
    /// woken and collects the process right away, an unsuspecting one gets a
    /// zombie to wait on later, and with no parent at all the record simply
    /// disappears.
    pub fn exit(&mut self) -> SimResult<()> {
        let pid = self.running()?;
        self.scheduler.yield_running();
        self.memory.release(pid);
        self.disks.purge(pid);
        self.cascade(pid);

        let parent = self.processes.get(pid).and_then(|proc| proc.parent);
        match parent {
            None => {
                self.processes.remove(pid);
                debug!("process {} exited (no parent)", pid);
            }
            Some(parent_pid) => {
                let parent_waiting = self
                    .processes
                    .get(parent_pid)
                    .map_or(false, |proc| proc.is_waiting());
                if parent_waiting {
                    self.processes.remove(pid);
                    if let Some(parent_proc) = self.processes.get_mut(parent_pid) {
                        parent_proc.children.retain(|&child| child != pid);
                        parent_proc.state = ProcessState::Active;
                    }
                    self.scheduler.enqueue(parent_pid);
                    debug!("process {} exited, woke waiting parent {}", pid, parent_pid);
                } else {
                    if let Some(proc) = self.processes.get_mut(pid) {
                        proc.state = ProcessState::Zombie;
                    }
                    debug!("process {} exited, zombie until {} waits", pid, parent_pid);
                }
            }
        }
        self.scheduler.dispatch();
        Ok(())
    }

    /// Wait for a child to terminate. An existing zombie child (the oldest
    /// fork first) is collected immediately and the caller keeps the CPU;
    /// with none available the process blocks until a child exits.
    pub fn wait(&mut self) -> SimResult<()> {
        let pid = self.running()?;
        match self.processes.first_zombie_child(pid) {
            Some(child) => {
                self.processes.remove(child);
                if let Some(proc) = self.processes.get_mut(pid) {
                    proc.children.retain(|&c| c != child);
                }
                debug!("process {} collected zombie child {}", pid, child);
            }
            None => {
                if let Some(proc) = self.processes.get_mut(pid) {
                    proc.state = ProcessState::Waiting;
                }
                self.scheduler.yield_running();
                self.scheduler.dispatch();
                debug!("process {} blocked in wait", pid);
            }
        }
        Ok(())
    }

    /// Time slice expired: the running process rotates to the tail of the
    /// ready queue. With an empty queue the interrupt changes nothing.
    pub fn timer_interrupt(&mut self) -> SimResult<()> {
        self.running()?;
        self.scheduler.preempt_to_tail();
        Ok(())
    }

    // ---- disk operations ----

    /// The running process asks disk `disk` to read `file_name` and gives up
    /// the CPU immediately, even when nothing is ready to replace it.
    pub fn disk_read_request(&mut self, disk: usize, file_name: &str) -> SimResult<()> {
        let pid = self.running()?;
        self.disks.submit(pid, disk, file_name)?;
        self.scheduler.yield_running();
        self.scheduler.dispatch();
        Ok(())
    }

    /// Disk `disk` finished its current job. The served process returns to
    /// the ready queue, unless it died while the read was in flight, in
    /// which case the completion is dropped on the floor. An idle disk
    /// reporting completion is ignored.
    pub fn disk_job_completed(&mut self, disk: usize) -> SimResult<()> {
        let served = match self.disks.complete(disk)? {
            Some(pid) => pid,
            None => return Ok(()),
        };
        let alive = self
            .processes
            .get(served)
            .map_or(false, |proc| proc.state == ProcessState::Active);
        if alive {
            self.scheduler.enqueue(served);
            self.scheduler.dispatch();
        } else {
            debug!("discarding completed read for dead process {}", served);
        }
        Ok(())
    }

    // ---- memory operations ----

    /// The running process touches logical `address`; the page is faulted in
    /// or refreshed in the global recency order.
    pub fn access_memory_address(&mut self, address: u64) -> SimResult<()> {
        let pid = self.running()?;
        self.memory.access(pid, address);
        Ok(())
    }

    // ---- queries ----

    /// PID on the CPU, `Pid::NONE` when idle.
    pub fn cpu(&self) -> Pid {
        self.scheduler.running()
    }

    /// Copy of the ready queue, head first.
    pub fn ready_queue(&self) -> Vec<Pid> {
        self.scheduler.ready_queue()
    }

    /// Occupied RAM frames, ordered by ascending frame number.
    pub fn memory(&self) -> Vec<MemoryItem> {
        self.memory.snapshot()
    }

    /// Request served by disk `disk`, or the empty request when idle.
    pub fn disk(&self, disk: usize) -> SimResult<FileReadRequest> {
        self.disks.status(disk)
    }

    /// Copy of disk `disk`'s backlog, next to be served first.
    pub fn disk_queue(&self, disk: usize) -> SimResult<Vec<FileReadRequest>> {
        self.disks.queue(disk)
    }

    /// Number of disks in the machine.
    pub fn disk_count(&self) -> usize {
        self.disks.count()
    }

    // ---- internals ----

    /// Destroy every descendant of `root` outright: frames, queued disk
    /// requests, ready-queue entries and table records all go, and no zombie
    /// is left behind (the whole line of ancestors is dying with them). A
    /// descendant currently served by a disk keeps its serving slot; see
    /// `disk_job_completed`.
    fn cascade(&mut self, root: Pid) {
        for descendant in self.processes.descendants(root) {
            self.memory.release(descendant);
            self.disks.purge(descendant);
            self.scheduler.remove_from_ready(descendant);
            self.processes.remove(descendant);
            debug!("cascade killed descendant {} of {}", descendant, root);
        }
        if let Some(proc) = self.processes.get_mut(root) {
            proc.children.clear();
        }
    }
}
