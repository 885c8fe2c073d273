// src/collective/local.rs

//! In-process collective group backed by channels.
//!
//! `local_group` wires up a fixed set of worker handles that communicate
//! through dedicated channels — one worker-to-coordinator and one
//! coordinator-to-worker channel per rank, so consecutive collectives from
//! different workers can never interleave. Handles are `Send` and are meant
//! to be moved into one thread each.
//!
//! A peer that drops its handle mid-step surfaces as `WorkerUnreachable` on
//! the next collective: the pool is fixed for the run, so an unreachable
//! worker fails the whole step rather than degrading it.

use std::sync::{Arc, Barrier};

use crossbeam::channel::{unbounded, Receiver, Sender};

use super::{Collective, COORDINATOR_RANK};
use crate::error::{RefineError, Result};

/// One worker's membership in an in-process collective group.
pub struct LocalCollective {
    rank: usize,
    world_size: usize,
    barrier: Arc<Barrier>,
    role: Role,
}

enum Role {
    Coordinator {
        // One receiver and one sender per non-coordinator rank, indexed by
        // `rank - 1`.
        from_workers: Vec<Receiver<Vec<u32>>>,
        to_workers: Vec<Sender<Vec<u32>>>,
    },
    Worker {
        to_coordinator: Sender<Vec<u32>>,
        from_coordinator: Receiver<Vec<u32>>,
    },
}

/// Create a collective group of `world_size` workers, returning one handle
/// per rank, indexed by rank.
pub fn local_group(world_size: usize) -> Vec<LocalCollective> {
    assert!(world_size > 0, "worker pool must not be empty");

    let barrier = Arc::new(Barrier::new(world_size));

    let mut from_workers = Vec::with_capacity(world_size - 1);
    let mut to_workers = Vec::with_capacity(world_size - 1);
    let mut worker_ends = Vec::with_capacity(world_size - 1);

    for _ in 1..world_size {
        let (up_tx, up_rx) = unbounded();
        let (down_tx, down_rx) = unbounded();
        from_workers.push(up_rx);
        to_workers.push(down_tx);
        worker_ends.push((up_tx, down_rx));
    }

    let mut group = Vec::with_capacity(world_size);
    group.push(LocalCollective {
        rank: COORDINATOR_RANK,
        world_size,
        barrier: Arc::clone(&barrier),
        role: Role::Coordinator {
            from_workers,
            to_workers,
        },
    });

    for (idx, (up_tx, down_rx)) in worker_ends.into_iter().enumerate() {
        group.push(LocalCollective {
            rank: idx + 1,
            world_size,
            barrier: Arc::clone(&barrier),
            role: Role::Worker {
                to_coordinator: up_tx,
                from_coordinator: down_rx,
            },
        });
    }

    group
}

impl Collective for LocalCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn barrier(&self) -> Result<()> {
        self.barrier.wait();
        Ok(())
    }

    fn gather(&self, local: &[u32]) -> Result<Option<Vec<Vec<u32>>>> {
        match &self.role {
            Role::Coordinator { from_workers, .. } => {
                let mut chunks = Vec::with_capacity(self.world_size);
                chunks.push(local.to_vec());
                for (idx, rx) in from_workers.iter().enumerate() {
                    let chunk = rx
                        .recv()
                        .map_err(|_| RefineError::worker_unreachable(idx + 1))?;
                    chunks.push(chunk);
                }
                Ok(Some(chunks))
            }
            Role::Worker { to_coordinator, .. } => {
                to_coordinator
                    .send(local.to_vec())
                    .map_err(|_| RefineError::worker_unreachable(COORDINATOR_RANK))?;
                Ok(None)
            }
        }
    }

    fn broadcast(&self, buf: Option<Vec<u32>>) -> Result<Vec<u32>> {
        match &self.role {
            Role::Coordinator { to_workers, .. } => {
                let buf = buf.ok_or_else(|| {
                    RefineError::collective("broadcast source buffer missing on coordinator")
                })?;
                for (idx, tx) in to_workers.iter().enumerate() {
                    tx.send(buf.clone())
                        .map_err(|_| RefineError::worker_unreachable(idx + 1))?;
                }
                Ok(buf)
            }
            Role::Worker {
                from_coordinator, ..
            } => from_coordinator
                .recv()
                .map_err(|_| RefineError::worker_unreachable(COORDINATOR_RANK)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_group_shape() {
        let group = local_group(4);
        assert_eq!(group.len(), 4);
        for (rank, comm) in group.iter().enumerate() {
            assert_eq!(comm.rank(), rank);
            assert_eq!(comm.world_size(), 4);
        }
    }

    #[test]
    fn test_gather_orders_chunks_by_rank() {
        let group = local_group(3);

        thread::scope(|s| {
            let mut handles = Vec::new();
            for comm in &group {
                handles.push(s.spawn(move || {
                    let payload = vec![comm.rank() as u32; comm.rank() + 1];
                    comm.gather(&payload).unwrap()
                }));
            }
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

            let chunks = results[0].as_ref().unwrap();
            assert_eq!(chunks[0], vec![0]);
            assert_eq!(chunks[1], vec![1, 1]);
            assert_eq!(chunks[2], vec![2, 2, 2]);
            assert!(results[1].is_none());
            assert!(results[2].is_none());
        });
    }

    #[test]
    fn test_gather_one() {
        let group = local_group(3);

        thread::scope(|s| {
            let mut handles = Vec::new();
            for comm in &group {
                handles.push(s.spawn(move || comm.gather_one(10 + comm.rank() as u32).unwrap()));
            }
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(results[0], Some(vec![10, 11, 12]));
            assert!(results[1].is_none());
        });
    }

    #[test]
    fn test_broadcast_reaches_every_rank() {
        let group = local_group(3);

        thread::scope(|s| {
            let mut handles = Vec::new();
            for comm in &group {
                handles.push(s.spawn(move || {
                    let source = if comm.rank() == COORDINATOR_RANK {
                        Some(vec![7, 8, 9])
                    } else {
                        None
                    };
                    comm.broadcast(source).unwrap()
                }));
            }
            for handle in handles {
                assert_eq!(handle.join().unwrap(), vec![7, 8, 9]);
            }
        });
    }

    #[test]
    fn test_barrier_releases_all() {
        let group = local_group(4);

        thread::scope(|s| {
            let mut handles = Vec::new();
            for comm in &group {
                handles.push(s.spawn(move || comm.barrier().is_ok()));
            }
            for handle in handles {
                assert!(handle.join().unwrap());
            }
        });
    }

    #[test]
    fn test_dropped_worker_is_unreachable() {
        let mut group = local_group(2);
        let worker = group.pop().unwrap();
        drop(worker);

        let coordinator = &group[0];
        let err = coordinator.gather(&[1, 2]).unwrap_err();
        assert!(matches!(err, RefineError::WorkerUnreachable { rank: 1 }));
    }

    #[test]
    fn test_single_worker_group_is_trivial() {
        let group = local_group(1);
        let comm = &group[0];

        comm.barrier().unwrap();
        let chunks = comm.gather(&[5, 6]).unwrap().unwrap();
        assert_eq!(chunks, vec![vec![5, 6]]);
        let out = comm.broadcast(Some(vec![1])).unwrap();
        assert_eq!(out, vec![1]);
    }
}
