//! Lock-protected, RTT-style channel buffers.
//!
//! [`UpBuffer`] holds at most one outbound frame. Publishing rewrites it
//! from the start (read cursor 0, write cursor at the frame length), so a
//! slow reader only ever sees the newest frame. [`DownBuffer`] is a plain
//! FIFO the host side fills and the transport empties byte by byte.
//!
//! Both keep their state in an `embassy_sync` blocking mutex, so the
//! raw mutex type decides what "exclusive" means: `CriticalSectionRawMutex`
//! when an interrupt or a second core drains the buffer, `NoopRawMutex`
//! for single-context use.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use crate::channel::{ChannelMode, DownChannel, UpChannel};

struct UpState<const CAP: usize> {
    buf: [u8; CAP],
    rd: usize,
    wr: usize,
    dropped: u32,
}

/// Single-frame overwrite buffer for the device-to-host direction.
pub struct UpBuffer<M: RawMutex, const CAP: usize> {
    mode: ChannelMode,
    state: Mutex<M, RefCell<UpState<CAP>>>,
}

impl<M: RawMutex, const CAP: usize> UpBuffer<M, CAP> {
    pub const fn new(mode: ChannelMode) -> Self {
        Self {
            mode,
            state: Mutex::new(RefCell::new(UpState {
                buf: [0; CAP],
                rd: 0,
                wr: 0,
                dropped: 0,
            })),
        }
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Current `(read, write)` cursors.
    #[must_use]
    pub fn cursors(&self) -> (usize, usize) {
        self.state.lock(|state| {
            let state = state.borrow();
            (state.rd, state.wr)
        })
    }

    /// Unread bytes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.lock(|state| {
            let state = state.borrow();
            state.wr - state.rd
        })
    }

    /// Frames rejected because they did not fit in skip mode.
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.state.lock(|state| state.borrow().dropped)
    }

    /// Hand the unread bytes to `f` under the lock.
    ///
    /// `f` returns how many bytes it consumed; the read cursor advances by
    /// that much (clamped to what was offered).
    pub fn drain_with<F>(&self, f: F) -> usize
    where
        F: FnOnce(&[u8]) -> usize,
    {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let (rd, wr) = (state.rd, state.wr);
            let consumed = f(&state.buf[rd..wr]).min(wr - rd);
            state.rd += consumed;
            consumed
        })
    }

    /// Copy unread bytes into `out`, returning how many were copied.
    pub fn drain(&self, out: &mut [u8]) -> usize {
        self.drain_with(|unread| {
            let n = unread.len().min(out.len());
            out[..n].copy_from_slice(&unread[..n]);
            n
        })
    }

    fn overwrite(&self, parts: &[&[u8]]) {
        let total: usize = parts.iter().map(|part| part.len()).sum();
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if total > CAP && self.mode == ChannelMode::NoBlockSkip {
                state.dropped = state.dropped.saturating_add(1);
                return;
            }
            let mut wr = 0;
            for part in parts {
                let take = part.len().min(CAP - wr);
                state.buf[wr..wr + take].copy_from_slice(&part[..take]);
                wr += take;
            }
            state.rd = 0;
            state.wr = wr;
        });
        if total > CAP {
            warn!("frame of {} bytes exceeds up buffer of {}", total, CAP);
        }
    }
}

impl<M: RawMutex, const CAP: usize> UpChannel for &UpBuffer<M, CAP> {
    #[inline]
    fn publish(&mut self, parts: &[&[u8]]) {
        self.overwrite(parts);
    }
}

/// FIFO for the host-to-device direction.
pub struct DownBuffer<M: RawMutex, const CAP: usize> {
    mode: ChannelMode,
    fifo: Mutex<M, RefCell<Deque<u8, CAP>>>,
}

impl<M: RawMutex, const CAP: usize> DownBuffer<M, CAP> {
    pub const fn new(mode: ChannelMode) -> Self {
        Self {
            mode,
            fifo: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Queue bytes from the host side.
    ///
    /// Returns how many were accepted: all or nothing in
    /// [`ChannelMode::NoBlockSkip`], as many as fit otherwise.
    pub fn write(&self, bytes: &[u8]) -> usize {
        self.fifo.lock(|fifo| {
            let mut fifo = fifo.borrow_mut();
            let room = CAP - fifo.len();
            if bytes.len() > room && self.mode == ChannelMode::NoBlockSkip {
                return 0;
            }
            let mut written = 0;
            for &byte in bytes {
                if fifo.push_back(byte).is_err() {
                    break;
                }
                written += 1;
            }
            written
        })
    }

    /// Unread bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fifo.lock(|fifo| fifo.borrow().len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M: RawMutex, const CAP: usize> DownChannel for &DownBuffer<M, CAP> {
    #[inline]
    fn read_byte(&mut self) -> Option<u8> {
        self.fifo.lock(|fifo| fifo.borrow_mut().pop_front())
    }
}
