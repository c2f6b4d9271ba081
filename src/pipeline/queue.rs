//! Pending request queue: suspended replay handles awaiting the coordinator's outcome.
//!
//! Each suspended request is a task blocked on a oneshot channel; the queue owns the
//! senders in arrival order and the coordinator settles them exactly once when the
//! in-flight refresh resolves.

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::_prelude::*;

/// Outcome fanned out to every caller that waited on a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// The refresh settled successfully; the credential store holds whatever is current.
	Refreshed,
	/// The refresh failed or errored; callers surface their original fault.
	Failed,
}

/// A suspended waiter held by the queue until the refresh settles.
#[derive(Debug)]
pub(crate) struct QueueEntry {
	tx: oneshot::Sender<RefreshOutcome>,
	sequence: u64,
}
impl QueueEntry {
	/// Builds an entry together with the ticket its owner awaits.
	pub(crate) fn channel() -> (Self, RefreshTicket) {
		let (tx, rx) = oneshot::channel();

		(Self { tx, sequence: 0 }, RefreshTicket(rx))
	}

	/// Position in detection order, assigned at enqueue time.
	pub(crate) fn sequence(&self) -> u64 {
		self.sequence
	}

	/// Delivers the outcome. A waiter that went away is ignored.
	pub(crate) fn settle(self, outcome: RefreshOutcome) {
		let _ = self.tx.send(outcome);
	}
}

/// Receiver half a suspended request awaits; resolves when the refresh settles.
#[derive(Debug)]
pub struct RefreshTicket(oneshot::Receiver<RefreshOutcome>);
impl RefreshTicket {
	/// Waits for the refresh to settle. A dropped coordinator counts as a failure.
	pub async fn outcome(self) -> RefreshOutcome {
		self.0.await.unwrap_or(RefreshOutcome::Failed)
	}
}

/// FIFO collection of suspended waiters.
///
/// No upper bound is imposed here; callers may bound it externally.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
	entries: Vec<QueueEntry>,
	next_sequence: u64,
}
impl PendingQueue {
	/// Appends an entry, assigning its detection-order sequence number.
	pub(crate) fn enqueue(&mut self, mut entry: QueueEntry) {
		self.next_sequence += 1;
		entry.sequence = self.next_sequence;
		self.entries.push(entry);
	}

	/// Takes ownership of the current batch, leaving the live queue empty.
	///
	/// Swapping before any entry is settled keeps faults detected during the drain out of
	/// the batch currently draining.
	pub(crate) fn take_all(&mut self) -> Vec<QueueEntry> {
		mem::take(&mut self.entries)
	}

	#[cfg(test)]
	pub(crate) fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Settles a drained batch in arrival order.
pub(crate) fn drain_with(entries: Vec<QueueEntry>, outcome: RefreshOutcome) {
	for entry in entries {
		entry.settle(outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn enqueue_assigns_fifo_sequences() {
		let mut queue = PendingQueue::default();

		for _ in 0..3 {
			let (entry, _ticket) = QueueEntry::channel();

			queue.enqueue(entry);
		}

		let drained = queue.take_all();
		let sequences = drained.iter().map(QueueEntry::sequence).collect::<Vec<_>>();

		assert_eq!(sequences, [1, 2, 3]);
		assert!(queue.is_empty());
	}

	#[test]
	fn take_all_leaves_live_queue_usable() {
		let mut queue = PendingQueue::default();
		let (first, _first_ticket) = QueueEntry::channel();

		queue.enqueue(first);

		let batch = queue.take_all();

		assert_eq!(batch.len(), 1);

		let (second, _second_ticket) = QueueEntry::channel();

		queue.enqueue(second);

		// Sequence numbers keep climbing across drains.
		assert_eq!(queue.take_all()[0].sequence(), 2);
	}

	#[tokio::test]
	async fn settle_delivers_outcome() {
		let (entry, ticket) = QueueEntry::channel();

		entry.settle(RefreshOutcome::Refreshed);

		assert_eq!(ticket.outcome().await, RefreshOutcome::Refreshed);
	}

	#[tokio::test]
	async fn dropped_entry_counts_as_failure() {
		let (entry, ticket) = QueueEntry::channel();

		drop(entry);

		assert_eq!(ticket.outcome().await, RefreshOutcome::Failed);
	}

	#[tokio::test]
	async fn drain_settles_every_entry() {
		let mut queue = PendingQueue::default();
		let mut tickets = Vec::new();

		for _ in 0..4 {
			let (entry, ticket) = QueueEntry::channel();

			queue.enqueue(entry);
			tickets.push(ticket);
		}

		drain_with(queue.take_all(), RefreshOutcome::Failed);

		for ticket in tickets {
			assert_eq!(ticket.outcome().await, RefreshOutcome::Failed);
		}
	}
}
