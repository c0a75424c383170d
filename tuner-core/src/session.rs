//! Tuner command session: what an engine does in its "run tuner" step.

use tuner_proto::Command;

use crate::hooks::TunerHooks;

/// Outcome of one tuner step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TunerStatus {
    /// Keep scanning.
    Running,
    /// The host asked to pause scanning; keep calling the tuner step.
    Suspended,
    /// The host asked for the engine to be reinitialised.
    Restart,
}

/// Command handling state carried between tuner steps.
#[derive(Debug, Clone, Default)]
pub struct TunerSession {
    suspended: bool,
    last_counter: Option<u8>,
    handled: u32,
}

impl TunerSession {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            suspended: false,
            last_counter: None,
            handled: 0,
        }
    }

    /// Publish `snapshot`, then apply every command the host has sent.
    ///
    /// `Write` commands patch the snapshot in place; a write reaching past
    /// the end is ignored. A `Restart` stops processing immediately so the
    /// caller can reinitialise before anything else is applied.
    pub fn run<const N: usize, H: TunerHooks<N>>(
        &mut self,
        hooks: &mut H,
        snapshot: &mut [u8; N],
    ) -> TunerStatus {
        hooks.send(snapshot);

        while let Some(request) = hooks.receive(snapshot) {
            self.last_counter = Some(request.packet.counter());
            self.handled = self.handled.wrapping_add(1);

            match request.packet.command() {
                Ok(Command::Restart) => {
                    info!("tuner requested restart");
                    return TunerStatus::Restart;
                }
                Ok(command) => self.apply(command, request.snapshot),
                Err(e) => warn!("ignoring tuner command: {:?}", e),
            }
        }

        self.status()
    }

    fn apply<const N: usize>(&mut self, command: Command<'_>, snapshot: &mut [u8; N]) {
        match command {
            Command::Ping => debug!("tuner ping"),
            Command::Suspend => {
                if !self.suspended {
                    info!("tuner suspended scanning");
                }
                self.suspended = true;
            }
            Command::Resume => {
                if self.suspended {
                    info!("tuner resumed scanning");
                }
                self.suspended = false;
            }
            Command::Write { offset, data } => {
                let start = usize::from(offset);
                match snapshot.get_mut(start..start + data.len()) {
                    Some(target) => target.copy_from_slice(data),
                    None => warn!(
                        "tuner write out of range: offset {} len {}",
                        offset,
                        data.len()
                    ),
                }
            }
            Command::Restart => {}
        }
    }

    #[must_use]
    pub fn status(&self) -> TunerStatus {
        if self.suspended {
            TunerStatus::Suspended
        } else {
            TunerStatus::Running
        }
    }

    #[inline]
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Sequence counter of the most recent command.
    #[inline]
    #[must_use]
    pub fn last_counter(&self) -> Option<u8> {
        self.last_counter
    }

    /// Commands received since the session started.
    #[inline]
    #[must_use]
    pub fn handled(&self) -> u32 {
        self.handled
    }

    /// Forget all state, as after an engine restart.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
