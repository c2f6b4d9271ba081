//! Single-flight refresh coordinator.
//!
//! The coordinator guarantees exactly one outstanding [`RefreshGateway`] call at any time
//! and fans its outcome out to every caller that asked for a refresh while one was already
//! running. State and queue live behind one mutex, so the single-flight guarantee holds
//! under true parallelism, not just cooperative scheduling. The transition back to
//! [`RefreshState::Idle`] is unconditional: a drop guard settles the queue with a failure
//! even if the driving future errors or is cancelled mid-flight.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	gateway::RefreshGateway,
	obs::{self, StageKind, StageOutcome, StageSpan},
	pipeline::queue::{self, PendingQueue, QueueEntry, RefreshOutcome, RefreshTicket},
	store::{CredentialStore, StoreError},
};

/// Whether a refresh is currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshState {
	/// No refresh in flight; the next authorization fault starts one.
	Idle,
	/// A gateway call is outstanding; new faults join its queue.
	Refreshing,
}

struct Inner {
	state: RefreshState,
	queue: PendingQueue,
}

/// Coordinates credential refreshes with a single-flight guarantee.
pub struct RefreshCoordinator {
	gateway: Arc<dyn RefreshGateway>,
	store: Arc<dyn CredentialStore>,
	inner: Mutex<Inner>,
	metrics: Arc<RefreshMetrics>,
}
impl RefreshCoordinator {
	/// Creates a coordinator around the provided gateway and credential store.
	pub fn new(gateway: Arc<dyn RefreshGateway>, store: Arc<dyn CredentialStore>) -> Self {
		Self {
			gateway,
			store,
			inner: Mutex::new(Inner { state: RefreshState::Idle, queue: PendingQueue::default() }),
			metrics: Default::default(),
		}
	}

	/// Returns the current refresh state.
	pub fn state(&self) -> RefreshState {
		self.inner.lock().state
	}

	/// Shared metrics recorder for refresh outcomes.
	pub fn metrics(&self) -> Arc<RefreshMetrics> {
		self.metrics.clone()
	}

	/// Requests a refresh, coalescing onto an in-flight one when present.
	///
	/// Every caller is enqueued and receives the outcome of exactly one gateway call; the
	/// caller that finds the coordinator idle drives that call itself. On a token-carrying
	/// success the new token is installed into the credential store before waiters are
	/// notified, so replays reading the store at send time observe it. On failure the
	/// store is left untouched and every waiter receives [`RefreshOutcome::Failed`].
	pub async fn request_refresh(&self) -> RefreshOutcome {
		let (ticket, leader) = self.enlist();

		if leader {
			self.drive().await;
		}

		ticket.outcome().await
	}

	/// Registers a waiter; returns its ticket and whether the caller was elected leader.
	///
	/// Enqueue and the Idle→Refreshing transition happen under one lock, which keeps the
	/// invariant that the queue is only ever non-empty while a refresh is in flight.
	fn enlist(&self) -> (RefreshTicket, bool) {
		let (entry, ticket) = QueueEntry::channel();
		let leader = {
			let mut inner = self.inner.lock();

			inner.queue.enqueue(entry);

			match inner.state {
				RefreshState::Idle => {
					inner.state = RefreshState::Refreshing;

					true
				},
				RefreshState::Refreshing => false,
			}
		};

		if leader {
			self.metrics.record_attempt();
		} else {
			self.metrics.record_join();
		}

		(ticket, leader)
	}

	async fn drive(&self) {
		const KIND: StageKind = StageKind::Refresh;

		let span = StageSpan::new(KIND, "request_refresh");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		// Settles with Failed on drop unless defused by an explicit settle below, so a
		// cancelled or panicking drive can never leave the state stuck at Refreshing.
		let guard = SettleGuard { coordinator: self, armed: true };
		let outcome = span.instrument(self.call_gateway()).await;

		guard.settle(outcome);
		obs::record_stage_outcome(KIND, match outcome {
			RefreshOutcome::Refreshed => StageOutcome::Success,
			RefreshOutcome::Failed => StageOutcome::Failure,
		});
	}

	async fn call_gateway(&self) -> RefreshOutcome {
		match self.gateway.refresh().await {
			Ok(reply) if reply.ok => match reply.token {
				Some(token) => match self.install_token(token) {
					Ok(()) => RefreshOutcome::Refreshed,
					Err(_) => RefreshOutcome::Failed,
				},
				// Backend rotated the session server-side; nothing to install.
				None => RefreshOutcome::Refreshed,
			},
			Ok(_) => RefreshOutcome::Failed,
			Err(_) => RefreshOutcome::Failed,
		}
	}

	fn install_token(&self, token: AccessToken) -> Result<(), StoreError> {
		let credential = self.store.load()?.with_token(token);

		self.store.save(credential)
	}

	fn settle_with(&self, outcome: RefreshOutcome) {
		let drained = {
			let mut inner = self.inner.lock();

			inner.state = RefreshState::Idle;
			inner.queue.take_all()
		};

		match outcome {
			RefreshOutcome::Refreshed => self.metrics.record_success(),
			RefreshOutcome::Failed => self.metrics.record_failure(),
		}

		queue::drain_with(drained, outcome);
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator").field("state", &self.state()).finish()
	}
}

struct SettleGuard<'a> {
	coordinator: &'a RefreshCoordinator,
	armed: bool,
}
impl SettleGuard<'_> {
	fn settle(mut self, outcome: RefreshOutcome) {
		self.armed = false;
		self.coordinator.settle_with(outcome);
	}
}
impl Drop for SettleGuard<'_> {
	fn drop(&mut self) {
		if self.armed {
			self.coordinator.settle_with(RefreshOutcome::Failed);
		}
	}
}
