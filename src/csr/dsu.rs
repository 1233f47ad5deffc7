//! Parallel Disjoint-Set-Union with deterministic lock ordering. `find` is
//! lock-free path-splitting over atomics (safe: writes only shorten paths,
//! never violating the forest invariant); `union` takes a pair of
//! lightweight per-element monitors in ascending index order to stay
//! deadlock-free under concurrent unions.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

pub struct Dsu {
    parent: Vec<AtomicUsize>,
    rank: Vec<AtomicU8>,
    locks: Vec<Mutex<()>>,
}

impl Dsu {
    pub fn new(n: usize) -> Self {
        Dsu {
            parent: (0..n).map(AtomicUsize::new).collect(),
            rank: (0..n).map(|_| AtomicU8::new(0)).collect(),
            locks: (0..n).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Path-split find: no locks, safe under concurrent unions because a
    /// parent pointer only ever gets replaced by its own grandparent.
    pub fn find(&self, mut i: usize) -> usize {
        loop {
            let p = self.parent[i].load(Ordering::Relaxed);
            if p == i {
                return i;
            }
            let grandparent = self.parent[p].load(Ordering::Relaxed);
            let _ = self.parent[i].compare_exchange(
                p,
                grandparent,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
            i = p;
        }
    }

    /// Union by rank, retrying if a racing union invalidates a root between
    /// `find` and the pair-lock acquisition.
    pub fn union(&self, u: usize, v: usize) {
        loop {
            let ru = self.find(u);
            let rv = self.find(v);
            if ru == rv {
                return;
            }
            let (lo, hi) = if ru < rv { (ru, rv) } else { (rv, ru) };
            let _lo_guard = self.locks[lo].lock();
            let _hi_guard = self.locks[hi].lock();

            if self.parent[ru].load(Ordering::Relaxed) != ru || self.parent[rv].load(Ordering::Relaxed) != rv {
                continue; // a concurrent union already reparented one of these roots
            }

            let rank_ru = self.rank[ru].load(Ordering::Relaxed);
            let rank_rv = self.rank[rv].load(Ordering::Relaxed);
            if rank_ru < rank_rv {
                self.parent[ru].store(rv, Ordering::Relaxed);
            } else if rank_ru > rank_rv {
                self.parent[rv].store(ru, Ordering::Relaxed);
            } else {
                self.parent[rv].store(ru, Ordering::Relaxed);
                self.rank[ru].fetch_add(1, Ordering::Relaxed);
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_their_own_root() {
        let dsu = Dsu::new(5);
        for i in 0..5 {
            assert_eq!(dsu.find(i), i);
        }
    }

    #[test]
    fn union_merges_roots() {
        let dsu = Dsu::new(4);
        dsu.union(0, 1);
        dsu.union(2, 3);
        assert_eq!(dsu.find(0), dsu.find(1));
        assert_eq!(dsu.find(2), dsu.find(3));
        assert_ne!(dsu.find(0), dsu.find(2));
        dsu.union(1, 2);
        assert_eq!(dsu.find(0), dsu.find(3));
    }

    #[test]
    fn concurrent_unions_converge_to_one_set() {
        use std::sync::Arc;
        use std::thread;
        let dsu = Arc::new(Dsu::new(100));
        let mut handles = Vec::new();
        for t in 0..8 {
            let dsu = Arc::clone(&dsu);
            handles.push(thread::spawn(move || {
                for i in (t..100).step_by(8) {
                    dsu.union(i, (i + 1) % 100);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let root = dsu.find(0);
        for i in 1..100 {
            assert_eq!(dsu.find(i), root);
        }
    }
}
