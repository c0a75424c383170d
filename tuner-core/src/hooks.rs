//! Capability interface the sensing engine calls into.

use tuner_proto::CommandPacket;

/// A validated command together with the snapshot it applies to.
pub struct TunerRequest<'a, const N: usize> {
    pub packet: &'a CommandPacket,
    pub snapshot: &'a mut [u8; N],
}

/// The two callbacks a sensing engine's tuner step needs.
///
/// Implemented by [`crate::TunerTransport`]; engines depend on this trait
/// rather than on a concrete channel.
pub trait TunerHooks<const N: usize> {
    /// Publish `snapshot` to the host.
    fn send(&mut self, snapshot: &[u8; N]);

    /// Poll for a complete command.
    ///
    /// Returns `None` when no full, valid frame is available yet. On
    /// success the engine's live snapshot is handed back alongside the
    /// packet so the command can be applied to it.
    fn receive<'a>(&'a mut self, snapshot: &'a mut [u8; N]) -> Option<TunerRequest<'a, N>>;
}
