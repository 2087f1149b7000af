use std::collections::VecDeque;

use crate::process::Pid;

/// The CPU dispatcher: one running slot plus a FIFO ready queue.
///
/// The queue holds PIDs only; the records themselves live in the process
/// table. Whoever mutates this struct is expected to keep a PID out of the
/// queue while it is running, on a disk, or blocked.
#[derive(Debug)]
pub struct Scheduler {
    /// Currently running process (if any).
    running: Option<Pid>,
    /// Ready queue of processes waiting for the CPU.
    ready: VecDeque<Pid>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            running: None,
            ready: VecDeque::new(),
        }
    }

    /// PID on the CPU, `Pid::NONE` when idle.
    pub fn running(&self) -> Pid {
        self.running.unwrap_or(Pid::NONE)
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Append a process to the tail of the ready queue.
    pub fn enqueue(&mut self, pid: Pid) {
        self.ready.push_back(pid);
    }

    /// Move the head of the ready queue onto an idle CPU. Calling this while
    /// a process is running, or with nothing queued, changes nothing.
    pub fn dispatch(&mut self) {
        if self.running.is_none() {
            self.running = self.ready.pop_front();
        }
    }

    /// Timer policy: the running process rotates to the tail of the queue
    /// and the head takes the CPU. With an empty queue the interrupt has no
    /// effect and the running process keeps its slot.
    pub fn preempt_to_tail(&mut self) {
        if let Some(next) = self.ready.pop_front() {
            if let Some(previous) = self.running.replace(next) {
                self.ready.push_back(previous);
            }
        }
    }

    /// Take the running process off the CPU, leaving it idle. The ready
    /// queue is untouched; callers decide where the process goes next.
    pub fn yield_running(&mut self) -> Option<Pid> {
        self.running.take()
    }

    /// Drop every queued occurrence of `pid`.
    pub fn remove_from_ready(&mut self, pid: Pid) {
        self.ready.retain(|&queued| queued != pid);
    }

    /// Copy of the ready queue, head first.
    pub fn ready_queue(&self) -> Vec<Pid> {
        self.ready.iter().copied().collect()
    }
}
