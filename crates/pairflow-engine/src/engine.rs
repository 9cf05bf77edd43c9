// SPDX-License-Identifier: MIT

//! The engine: one bubble lock, one session adapter, one clock, shared by
//! every handler.

use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Default bubble-lock acquisition timeout.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Composes the multiplexer adapter and the clock every handler needs.
/// Generic over both so tests can swap in [`pairflow_adapters::FakeSessionAdapter`]
/// and [`pairflow_core::clock::FakeClock`]. The adapter is `Arc`-wrapped so
/// handlers can cheaply move a handle of it into the `'static` closures the
/// bubble-lock bridge requires.
pub struct Engine<A: SessionAdapter, C: Clock> {
    pub session: Arc<A>,
    pub clock: Arc<C>,
    pub lock_timeout: Duration,
}

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    pub fn new(session: A, clock: C) -> Self {
        Self {
            session: Arc::new(session),
            clock: Arc::new(clock),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}
