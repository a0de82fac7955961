//! In-process message transport between distributed workers.
//!
//! Every worker owns an unbounded inbox and a sender into each peer's inbox. Sends never
//! block; the only blocking points are the inbox drain and the end-of-round barrier.

use std::sync::{Arc, Barrier};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::{Result, TablebaseError};
use crate::solve::distributed::message::{Envelope, RoundStatus};

pub struct Mailbox<A> {
    id: usize,
    inbox: Receiver<Envelope<A>>,
    /// Indexed by worker id; this worker's own slot is `None`.
    peers: Vec<Option<Sender<Envelope<A>>>>,
    barrier: Arc<Barrier>,
}

/// Fully connected mailboxes for `workers` workers, sharing one barrier.
pub fn mesh<A>(workers: usize) -> Vec<Mailbox<A>> {
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..workers).map(|_| unbounded()).unzip();
    let barrier = Arc::new(Barrier::new(workers));

    receivers
        .into_iter()
        .enumerate()
        .map(|(id, inbox)| Mailbox {
            id,
            inbox,
            peers: senders
                .iter()
                .enumerate()
                .map(|(peer, tx)| (peer != id).then(|| tx.clone()))
                .collect(),
            barrier: Arc::clone(&barrier),
        })
        .collect()
}

impl<A> Mailbox<A> {
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.peers.len()
    }

    pub fn send(&self, to: usize, envelope: Envelope<A>) -> Result<()> {
        let Some(Some(tx)) = self.peers.get(to) else {
            return Err(self.transport(format!("no route to worker {to}")));
        };
        tx.send(envelope)
            .map_err(|_| self.transport(format!("worker {to} hung up")))
    }

    /// Sends one control message to every peer.
    pub fn broadcast_status(&self, status: RoundStatus) -> Result<()> {
        for peer in 0..self.peers.len() {
            if peer != self.id {
                self.send(peer, Envelope::Control(status))?;
            }
        }
        Ok(())
    }

    /// Best effort: tell every peer this worker is gone. Peers that already left are skipped.
    pub fn broadcast_abort(&self) {
        for tx in self.peers.iter().flatten() {
            let _ = tx.send(Envelope::Abort { worker: self.id });
        }
    }

    pub fn recv(&self) -> Result<Envelope<A>> {
        self.inbox
            .recv()
            .map_err(|_| self.transport("all peers hung up".to_string()))
    }

    pub fn wait(&self) {
        self.barrier.wait();
    }

    pub fn transport(&self, reason: String) -> TablebaseError {
        TablebaseError::Transport {
            worker: self.id,
            reason,
        }
    }
}

/// Broadcasts an abort if the owning worker unwinds.
pub struct AbortOnPanic<'a, A>(pub &'a Mailbox<A>);

impl<A> Drop for AbortOnPanic<'_, A> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.broadcast_abort();
        }
    }
}
