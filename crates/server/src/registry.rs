// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;

/// Live subscribers of a single address. Owns its own lock and monotonic
/// id counter; the outer registry lock is never held while sending.
pub struct AddressSubscribers<T> {
    inner: Mutex<Slot<T>>,
}

struct Slot<T> {
    id_counter: u32,
    clients: HashMap<u32, ClientEntry<T>>,
}

struct ClientEntry<T> {
    sink: mpsc::Sender<T>,
    errors: mpsc::Sender<anyhow::Error>,
}

impl<T> AddressSubscribers<T> {
    fn new() -> Self {
        Self {
            inner: Mutex::new(Slot {
                id_counter: 0,
                clients: HashMap::new(),
            }),
        }
    }
}

/// Per-address fan-out of live logs to subscriber sinks.
pub struct SubscriptionRegistry<T> {
    slots: Mutex<HashMap<Address, Arc<AddressSubscribers<T>>>>,
}

impl<T: Clone> SubscriptionRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a subscriber sink for `address`. The returned guard removes
    /// the entry (and closes the error channel) when dropped; the receiver
    /// yields the first send failure for this subscriber.
    pub fn add(
        &self,
        address: Address,
        sink: mpsc::Sender<T>,
    ) -> (SubscriptionGuard<T>, mpsc::Receiver<anyhow::Error>) {
        let slot = self
            .slots
            .lock()
            .unwrap()
            .entry(address)
            .or_insert_with(|| Arc::new(AddressSubscribers::new()))
            .clone();

        let (err_tx, err_rx) = mpsc::channel(1);
        let id = {
            let mut inner = slot.inner.lock().unwrap();
            inner.id_counter += 1;
            let id = inner.id_counter;
            inner.clients.insert(
                id,
                ClientEntry {
                    sink,
                    errors: err_tx,
                },
            );
            id
        };

        (SubscriptionGuard { slot, id }, err_rx)
    }

    /// Sends `item` to every subscriber of `address`. A failed send is
    /// routed to that entry's error sink; other entries are unaffected.
    pub fn broadcast(&self, address: &Address, item: T) {
        let slot = match self.slots.lock().unwrap().get(address) {
            Some(slot) => slot.clone(),
            None => return,
        };
        let inner = slot.inner.lock().unwrap();
        for entry in inner.clients.values() {
            if let Err(err) = entry.sink.try_send(item.clone()) {
                let _ = entry.errors.try_send(anyhow::anyhow!("stream send error: {err}"));
            }
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self, address: &Address) -> usize {
        self.slots
            .lock()
            .unwrap()
            .get(address)
            .map(|slot| slot.inner.lock().unwrap().clients.len())
            .unwrap_or(0)
    }
}

impl<T: Clone> Default for SubscriptionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes its subscription entry when dropped.
pub struct SubscriptionGuard<T> {
    slot: Arc<AddressSubscribers<T>>,
    id: u32,
}

impl<T> Drop for SubscriptionGuard<T> {
    fn drop(&mut self) {
        self.slot.inner.lock().unwrap().clients.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const A: Address = address!("00000000000000000000000000000000000000aa");

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let registry = SubscriptionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        let (_g1, _e1) = registry.add(A, tx1);
        let (_g2, _e2) = registry.add(A, tx2);

        registry.broadcast(&A, 1u32);
        registry.broadcast(&A, 2u32);

        assert_eq!(rx1.recv().await, Some(1));
        assert_eq!(rx1.recv().await, Some(2));
        assert_eq!(rx2.recv().await, Some(1));
        assert_eq!(rx2.recv().await, Some(2));
    }

    #[tokio::test]
    async fn send_failure_is_isolated_to_the_failing_entry() {
        let registry = SubscriptionRegistry::new();
        let (full_tx, _stuck_rx) = mpsc::channel(1);
        let (ok_tx, mut ok_rx) = mpsc::channel(4);
        let (_g1, mut full_errors) = registry.add(A, full_tx);
        let (_g2, mut ok_errors) = registry.add(A, ok_tx);

        registry.broadcast(&A, 1u32);
        registry.broadcast(&A, 2u32); // overflows the capacity-1 sink

        assert!(full_errors.recv().await.is_some());
        assert!(ok_errors.try_recv().is_err());
        assert_eq!(ok_rx.recv().await, Some(1));
        assert_eq!(ok_rx.recv().await, Some(2));
    }

    #[tokio::test]
    async fn dropping_the_guard_removes_the_entry() {
        let registry = SubscriptionRegistry::new();
        let (tx, _rx) = mpsc::channel::<u32>(1);
        let (guard, _errors) = registry.add(A, tx);
        assert_eq!(registry.subscriber_count(&A), 1);
        drop(guard);
        assert_eq!(registry.subscriber_count(&A), 0);
    }

    #[tokio::test]
    async fn broadcast_to_unknown_address_is_a_noop() {
        let registry = SubscriptionRegistry::<u32>::new();
        registry.broadcast(&A, 1u32);
    }

    #[tokio::test]
    async fn ids_are_monotonic_per_address() {
        let registry = SubscriptionRegistry::new();
        let (tx, _rx) = mpsc::channel::<u32>(1);
        let (g1, _e1) = registry.add(A, tx.clone());
        let id1 = g1.id;
        drop(g1);
        let (g2, _e2) = registry.add(A, tx);
        assert!(g2.id > id1);
    }
}
