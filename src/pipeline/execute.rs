//! Response fault detection and single-replay orchestration.

// self
use crate::{
	_prelude::*,
	http::{OutboundRequest, RelayResponse, RelayTransport},
	obs::{self, StageKind, StageOutcome, StageSpan},
	pipeline::{RelayClient, decorator, queue::RefreshOutcome},
};

impl<T> RelayClient<T>
where
	T: ?Sized + RelayTransport,
{
	/// Executes a request through the authenticated pipeline.
	///
	/// The request is decorated with the current credential and dispatched. Every
	/// completed exchange comes back as `Ok`, whatever its status; only transport,
	/// configuration, and storage failures are errors. A 401 on a fresh request suspends
	/// the caller on the refresh coordinator; when the refresh settles the request is
	/// replayed once with the credential read fresh from the store. A 401 on a request
	/// already carrying the retry marker passes through untouched, and after a failed
	/// refresh the caller receives the original 401, not the refresh error.
	pub async fn execute(&self, request: OutboundRequest) -> Result<RelayResponse> {
		const KIND: StageKind = StageKind::Execute;

		let span = StageSpan::new(KIND, "execute");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = span.instrument(self.execute_inner(request)).await;

		match &result {
			Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	async fn execute_inner(&self, mut request: OutboundRequest) -> Result<RelayResponse> {
		let response = self.dispatch(&request).await?;

		if !response.is_unauthorized() || request.is_retried() {
			return Ok(response);
		}

		// The marker is set before replay; a replayed request that faults again is
		// rejected as-is instead of re-entering the refresh path.
		request.mark_retried();

		match self.coordinator.request_refresh().await {
			RefreshOutcome::Refreshed => self.replay(&request).await,
			// Every queued caller surfaces its own original fault here, so a failed
			// refresh looks exactly like one that never happened.
			RefreshOutcome::Failed => Ok(response),
		}
	}

	/// Replays the suspended request, reading the credential fresh at send time.
	async fn replay(&self, request: &OutboundRequest) -> Result<RelayResponse> {
		const KIND: StageKind = StageKind::Replay;

		let span = StageSpan::new(KIND, "replay");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		match &result {
			Ok(response) if !response.is_unauthorized() =>
				obs::record_stage_outcome(KIND, StageOutcome::Success),
			_ => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	async fn dispatch(&self, request: &OutboundRequest) -> Result<RelayResponse> {
		let credential = self.store.load()?;
		let stamped = decorator::decorate(request, &credential)?;

		self.transport.execute(&stamped).await.map_err(Error::from)
	}
}
