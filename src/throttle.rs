//! Minimum inter-request spacing shared by every call a scraper makes.

// std
use std::time::Duration;
// crates.io
use tokio::time::{Instant, sleep_until};
// self
use crate::_prelude::*;

/// Enforces a minimum delay between consecutive API requests.
///
/// Each attempt acquires a slot before dispatch and schedules the next window when
/// it finishes, so the spacing applies across concurrent tasks sharing one scraper.
/// A zero delay disables scheduling entirely.
#[derive(Debug)]
pub struct RequestThrottle {
	delay: RwLock<Duration>,
	next_slot: Mutex<Option<Instant>>,
}
impl RequestThrottle {
	/// Creates a throttle with the provided minimum spacing.
	pub fn new(delay: Duration) -> Self {
		Self { delay: RwLock::new(delay), next_slot: Mutex::new(None) }
	}

	/// Replaces the minimum spacing applied to subsequently scheduled windows.
	pub fn set_delay(&self, delay: Duration) {
		*self.delay.write() = delay;
	}

	/// Returns the currently configured spacing.
	pub fn delay(&self) -> Duration {
		*self.delay.read()
	}

	/// Waits until every previously scheduled window has elapsed.
	///
	/// The slot is not claimed exclusively; concurrent waiters are all released once
	/// the window passes, and each finished attempt pushes the next window out.
	pub async fn acquire(&self) {
		loop {
			let deadline = match *self.next_slot.lock() {
				Some(deadline) if deadline > Instant::now() => deadline,
				_ => return,
			};

			sleep_until(deadline).await;
		}
	}

	/// Stamps the next window after a finished attempt; never blocks.
	///
	/// Windows only move forward: a scheduled instant is kept when it is already
	/// later than the one this call would set.
	pub fn schedule(&self) {
		let delay = self.delay();

		if delay.is_zero() {
			return;
		}

		let candidate = Instant::now() + delay;
		let mut slot = self.next_slot.lock();

		match *slot {
			Some(current) if candidate <= current => {},
			_ => *slot = Some(candidate),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn zero_delay_never_schedules_a_window() {
		let throttle = RequestThrottle::new(Duration::ZERO);

		throttle.schedule();

		let started = Instant::now();

		throttle.acquire().await;

		assert!(started.elapsed() < Duration::from_millis(50));
		assert!(throttle.next_slot.lock().is_none());
	}

	#[tokio::test]
	async fn acquire_waits_out_the_scheduled_window() {
		let throttle = RequestThrottle::new(Duration::from_millis(80));

		throttle.acquire().await;
		throttle.schedule();

		let started = Instant::now();

		throttle.acquire().await;

		assert!(started.elapsed() >= Duration::from_millis(80));
	}

	#[tokio::test]
	async fn delay_can_be_changed_at_runtime() {
		let throttle = RequestThrottle::new(Duration::ZERO);

		throttle.set_delay(Duration::from_millis(60));

		assert_eq!(throttle.delay(), Duration::from_millis(60));

		throttle.schedule();

		let started = Instant::now();

		throttle.acquire().await;

		assert!(started.elapsed() >= Duration::from_millis(60));
	}

	#[tokio::test]
	async fn scheduled_windows_only_move_forward() {
		let throttle = RequestThrottle::new(Duration::from_millis(80));

		throttle.schedule();
		throttle.set_delay(Duration::from_millis(1));
		// A shorter reschedule must not pull the pending window closer.
		throttle.schedule();

		let started = Instant::now();

		throttle.acquire().await;

		assert!(started.elapsed() >= Duration::from_millis(70));
	}
}
