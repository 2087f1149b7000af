use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::process::Pid;

/// One occupied frame of simulated RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryItem {
    pub pid: Pid,
    pub page_number: u64,
    pub frame_number: u64,
}

/// Paged RAM with a global least-recently-used replacement policy.
///
/// Frames are indexed from 0 and handed out in allocation order; an index
/// freed by a process release is reused (smallest first) before a fresh one
/// is minted. Recency is shared across all processes: any access can evict
/// any other process's coldest frame once RAM is full.
#[derive(Debug)]
pub struct MemoryManager {
    page_size: u64,
    /// Total number of frames that fit in RAM.
    frame_count: u64,
    /// Occupied frames keyed by frame index, so snapshots come out sorted.
    frames: BTreeMap<u64, MemoryItem>,
    /// Indices freed by a release, pending reuse.
    free_frames: BTreeSet<u64>,
    /// Smallest index never handed out yet.
    next_fresh: u64,
    /// (pid, page) -> frame index for every occupied frame.
    page_table: HashMap<(Pid, u64), u64>,
    /// Frame indices from most to least recently used.
    lru: VecDeque<u64>,
}

impl MemoryManager {
    /// `page_size` must be nonzero; the facade validates configuration
    /// before constructing the machine.
    pub fn new(amount_of_ram: u64, page_size: u64) -> Self {
        MemoryManager {
            page_size,
            frame_count: amount_of_ram / page_size,
            frames: BTreeMap::new(),
            free_frames: BTreeSet::new(),
            next_fresh: 0,
            page_table: HashMap::new(),
            lru: VecDeque::new(),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Touch the page holding `address` on behalf of `pid`, faulting it in
    /// if needed. The touched frame becomes the most recently used. There is
    /// no bound on the address: any page number is valid.
    pub fn access(&mut self, pid: Pid, address: u64) {
        let page = address / self.page_size;

        if let Some(&frame) = self.page_table.get(&(pid, page)) {
            // Already resident: refresh recency only.
            self.touch(frame);
            return;
        }

        if (self.frames.len() as u64) < self.frame_count {
            let frame = self.next_free_frame();
            self.map(pid, page, frame);
            return;
        }

        // RAM is full: replace the coldest frame.
        let victim = match self.lru.pop_back() {
            Some(frame) => frame,
            None => return, // zero-frame machine, nothing to replace
        };
        if let Some(old) = self.frames.get(&victim) {
            debug!(
                "evicted frame {} (page {} of process {})",
                victim, old.page_number, old.pid
            );
            self.page_table.remove(&(old.pid, old.page_number));
        }
        self.map(pid, page, victim);
    }

    /// Free every frame owned by `pid`. The freed indices become the first
    /// candidates for the next allocations, smallest index first.
    pub fn release(&mut self, pid: Pid) {
        let owned: Vec<u64> = self
            .frames
            .values()
            .filter(|item| item.pid == pid)
            .map(|item| item.frame_number)
            .collect();
        if owned.is_empty() {
            return;
        }

        for &frame in &owned {
            if let Some(item) = self.frames.remove(&frame) {
                self.page_table.remove(&(item.pid, item.page_number));
            }
            self.free_frames.insert(frame);
        }
        self.lru.retain(|frame| !owned.contains(frame));
        debug!("released {} frame(s) of process {}", owned.len(), pid);
    }

    /// Copy of all occupied frames, ordered by ascending frame index.
    pub fn snapshot(&self) -> Vec<MemoryItem> {
        self.frames.values().cloned().collect()
    }

    /// Smallest index not currently occupied: a previously freed hole if one
    /// exists, the next fresh index otherwise.
    fn next_free_frame(&mut self) -> u64 {
        match self.free_frames.pop_first() {
            Some(frame) => frame,
            None => {
                let frame = self.next_fresh;
                self.next_fresh += 1;
                frame
            }
        }
    }

    fn map(&mut self, pid: Pid, page: u64, frame: u64) {
        self.frames.insert(
            frame,
            MemoryItem {
                pid,
                page_number: page,
                frame_number: frame,
            },
        );
        self.page_table.insert((pid, page), frame);
        self.lru.push_front(frame);
    }

    /// Move `frame` to the front of the recency order.
    fn touch(&mut self, frame: u64) {
        if let Some(position) = self.lru.iter().position(|&f| f == frame) {
            self.lru.remove(position);
        }
        self.lru.push_front(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pid: u64, page: u64, frame: u64) -> MemoryItem {
        MemoryItem {
            pid: Pid(pid),
            page_number: page,
            frame_number: frame,
        }
    }

    #[test]
    fn frames_fill_in_allocation_order() {
        let mut mem = MemoryManager::new(12, 4);
        assert_eq!(mem.frame_count(), 3);
        mem.access(Pid(1), 0);
        mem.access(Pid(1), 4);
        mem.access(Pid(2), 0);

        assert_eq!(
            mem.snapshot(),
            vec![item(1, 0, 0), item(1, 1, 1), item(2, 0, 2)]
        );
    }

    #[test]
    fn full_ram_evicts_least_recently_used() {
        let mut mem = MemoryManager::new(12, 4);
        mem.access(Pid(1), 0); // page 0 -> frame 0
        mem.access(Pid(1), 4); // page 1 -> frame 1
        mem.access(Pid(1), 8); // page 2 -> frame 2
        mem.access(Pid(1), 0); // hit, page 0 becomes hottest
        mem.access(Pid(1), 16); // page 4 must evict page 1

        assert_eq!(
            mem.snapshot(),
            vec![item(1, 0, 0), item(1, 4, 1), item(1, 2, 2)]
        );
    }

    #[test]
    fn hit_does_not_move_frames() {
        let mut mem = MemoryManager::new(8, 4);
        mem.access(Pid(1), 0);
        mem.access(Pid(1), 5); // page 1
        let before = mem.snapshot();
        mem.access(Pid(1), 2); // same page 0
        assert_eq!(mem.snapshot(), before);
    }

    #[test]
    fn release_frees_holes_reused_smallest_first() {
        let mut mem = MemoryManager::new(16, 4);
        mem.access(Pid(1), 0); // frame 0
        mem.access(Pid(2), 0); // frame 1
        mem.access(Pid(1), 4); // frame 2
        mem.access(Pid(2), 4); // frame 3

        mem.release(Pid(1)); // frames 0 and 2 become holes

        assert_eq!(mem.snapshot(), vec![item(2, 0, 1), item(2, 1, 3)]);

        mem.access(Pid(3), 0); // takes hole 0
        mem.access(Pid(3), 4); // takes hole 2

        assert_eq!(
            mem.snapshot(),
            vec![item(3, 0, 0), item(2, 0, 1), item(3, 1, 2), item(2, 1, 3)]
        );
    }

    #[test]
    fn released_process_allocates_like_a_fresh_one() {
        let mut mem = MemoryManager::new(8, 4);
        mem.access(Pid(1), 0);
        mem.access(Pid(1), 4);
        mem.release(Pid(1));
        assert!(mem.snapshot().is_empty());

        // same discipline as a first-ever allocation: frames 0 then 1
        mem.access(Pid(1), 100);
        mem.access(Pid(1), 104);
        assert_eq!(mem.snapshot(), vec![item(1, 25, 0), item(1, 26, 1)]);
    }

    #[test]
    fn eviction_after_release_targets_the_coldest_survivor() {
        let mut mem = MemoryManager::new(12, 4);
        mem.access(Pid(1), 0); // frame 0
        mem.access(Pid(2), 0); // frame 1
        mem.access(Pid(2), 4); // frame 2
        mem.release(Pid(1)); // frame 0 is a hole, recency is [2, 1]

        mem.access(Pid(3), 0); // fills hole 0, RAM full again
        mem.access(Pid(3), 4); // must evict frame 1, the coldest occupied

        assert_eq!(
            mem.snapshot(),
            vec![item(3, 0, 0), item(3, 1, 1), item(2, 1, 2)]
        );
    }

    #[test]
    fn zero_frame_machine_ignores_accesses() {
        let mut mem = MemoryManager::new(0, 4);
        mem.access(Pid(1), 0);
        assert!(mem.snapshot().is_empty());
    }

    #[test]
    fn pages_are_per_process() {
        let mut mem = MemoryManager::new(16, 4);
        mem.access(Pid(1), 0);
        mem.access(Pid(2), 0); // same page number, different process
        assert_eq!(mem.snapshot(), vec![item(1, 0, 0), item(2, 0, 1)]);
    }
}
