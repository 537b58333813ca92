//! One-shot, one-directional delivery of the partition table.
use crate::error::{MospError, Result};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, OnceLock};

/// The rank that computes and publishes the partition table.
pub const ROOT_WORKER: u32 = 0;

/// A transport that moves one integer table from the root to every worker.
///
/// `receive` blocks until the table arrives and fails with `BroadcastAborted`
/// if the root goes away without publishing.
pub trait Broadcast: Send {
    fn rank(&self) -> u32;
    fn publish(&self, table: &[u32]) -> Result<()>;
    fn receive(&self) -> Result<Arc<[u32]>>;
}

/// In-process transport over `std::sync::mpsc`, one endpoint per worker thread.
pub struct ChannelBroadcast {
    rank: u32,
    peers: Mutex<Vec<Sender<Arc<[u32]>>>>,
    inbox: Option<Mutex<Receiver<Arc<[u32]>>>>,
    delivered: OnceLock<Arc<[u32]>>,
}

impl ChannelBroadcast {
    /// Creates the endpoints of a group of `workers`; index `i` belongs to rank `i`.
    pub fn group(workers: u32) -> Vec<ChannelBroadcast> {
        let mut senders = Vec::new();
        let mut endpoints = Vec::with_capacity(workers as usize);
        for rank in 0..workers {
            let inbox = if rank == ROOT_WORKER {
                None
            } else {
                let (tx, rx) = channel();
                senders.push(tx);
                Some(Mutex::new(rx))
            };
            endpoints.push(ChannelBroadcast {
                rank,
                peers: Mutex::new(Vec::new()),
                inbox,
                delivered: OnceLock::new(),
            });
        }
        if let Some(root) = endpoints.first_mut() {
            root.peers = Mutex::new(senders);
        }
        endpoints
    }
}

impl Broadcast for ChannelBroadcast {
    fn rank(&self) -> u32 { self.rank }

    fn publish(&self, table: &[u32]) -> Result<()> {
        if self.rank != ROOT_WORKER {
            return Err(MospError::Broadcast(format!("rank {} cannot publish", self.rank)));
        }
        let table: Arc<[u32]> = Arc::from(table);
        if self.delivered.set(Arc::clone(&table)).is_err() {
            return Err(MospError::Broadcast("partition table already published".into()));
        }
        let peers = std::mem::take(&mut *self.peers.lock().map_err(|_| MospError::BroadcastAborted)?);
        for (i, peer) in peers.iter().enumerate() {
            // A peer that already hung up has failed on its own; the run reports its error.
            if peer.send(Arc::clone(&table)).is_err() {
                tracing::warn!(peer = i + 1, "broadcast peer hung up before delivery");
            }
        }
        tracing::debug!(len = table.len(), peers = peers.len(), "partition table published");
        Ok(())
    }

    fn receive(&self) -> Result<Arc<[u32]>> {
        if let Some(table) = self.delivered.get() {
            return Ok(Arc::clone(table));
        }
        let inbox = self.inbox.as_ref().ok_or(MospError::BroadcastAborted)?;
        let table = inbox
            .lock()
            .map_err(|_| MospError::BroadcastAborted)?
            .recv()
            .map_err(|_| MospError::BroadcastAborted)?;
        Ok(Arc::clone(self.delivered.get_or_init(|| table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_every_rank_receives_the_same_table() {
        let mut group = ChannelBroadcast::group(3).into_iter();
        let root = group.next().unwrap();
        let handles: Vec<_> = group.map(|ep| thread::spawn(move || ep.receive().unwrap())).collect();

        root.publish(&[0, 1, 2, 1]).unwrap();
        assert_eq!(&*root.receive().unwrap(), &[0, 1, 2, 1]);
        for h in handles {
            assert_eq!(&*h.join().unwrap(), &[0, 1, 2, 1]);
        }
    }

    #[test]
    fn test_dropped_root_aborts_receivers() {
        let mut group = ChannelBroadcast::group(2).into_iter();
        let root = group.next().unwrap();
        let peer = group.next().unwrap();
        drop(root);
        assert!(matches!(peer.receive(), Err(MospError::BroadcastAborted)));
    }

    #[test]
    fn test_publish_is_one_shot_and_root_only() {
        let group = ChannelBroadcast::group(2);
        assert!(group[1].publish(&[0]).is_err());
        group[0].publish(&[0, 1]).unwrap();
        assert!(group[0].publish(&[1, 0]).is_err());
        assert_eq!(&*group[1].receive().unwrap(), &[0, 1]);
        // Repeated receives return the cached table.
        assert_eq!(&*group[1].receive().unwrap(), &[0, 1]);
    }

    #[test]
    fn test_root_receive_before_publish_fails() {
        let group = ChannelBroadcast::group(1);
        assert!(matches!(group[0].receive(), Err(MospError::BroadcastAborted)));
    }
}
