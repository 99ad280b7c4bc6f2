use crate::policy::{ConcurrentEmit, Policy};

/// A handle which can disconnect one slot from its signal.
///
/// Dropping a `Connection` leaves the slot connected. Use [`ScopedConnection`] to disconnect on drop.
/// A connection does not keep its signal alive; once the signal is gone, disconnecting does nothing.
pub struct Connection<P: Policy = ConcurrentEmit> {
    detach: Option<P::Detach>,
}

impl<P: Policy> Connection<P> {
    pub(crate) fn new(detach: P::Detach) -> Self { Self { detach: Some(detach) } }

    /// Removes the slot from its signal. Calling this more than once has no further effect.
    pub fn disconnect(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    /// Whether [`disconnect`](Self::disconnect) has not been called yet
    pub fn is_connected(&self) -> bool { self.detach.is_some() }

    /// Turn this into a connection which disconnects when dropped
    pub fn scoped(self) -> ScopedConnection<P> { ScopedConnection(self) }
}

impl<P: Policy> std::fmt::Debug for Connection<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("connected", &self.is_connected()).finish()
    }
}

/// A connection which disconnects its slot when dropped.
#[must_use = "dropping a ScopedConnection disconnects its slot immediately"]
pub struct ScopedConnection<P: Policy = ConcurrentEmit>(Connection<P>);

impl<P: Policy> ScopedConnection<P> {
    /// Disconnect early, before the end of the scope
    pub fn disconnect(&mut self) { self.0.disconnect() }

    pub fn is_connected(&self) -> bool { self.0.is_connected() }

    /// Give up the scope obligation, leaving the slot connected
    pub fn release(mut self) -> Connection<P> { Connection { detach: self.0.detach.take() } }
}

impl<P: Policy> From<Connection<P>> for ScopedConnection<P> {
    fn from(connection: Connection<P>) -> Self { connection.scoped() }
}

impl<P: Policy> Drop for ScopedConnection<P> {
    fn drop(&mut self) { self.0.disconnect() }
}

impl<P: Policy> std::fmt::Debug for ScopedConnection<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedConnection").field("connected", &self.is_connected()).finish()
    }
}
