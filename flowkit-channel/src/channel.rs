// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Channel[T]`: a bounded `mpsc` queue paired with a terminal-state cell
//! that both sides observe.
//!
//! The value queue and the terminal state are tracked separately on purpose.
//! `receive()` checks the terminal state *before* touching the queue, so once
//! a channel has been put into `Errored`, every subsequent `receive()` call
//! returns that error immediately — it does not drain whatever values were
//! still buffered ahead of it. `Done` is weaker: it only fires once the
//! buffer has actually run dry.

use std::sync::Arc;

use flowkit_error::FlowError;
use tokio::sync::{mpsc, watch};

/// Why a channel refused a send, or why a receive came up empty for good.
#[derive(Debug, Clone)]
pub enum Closed {
    /// The producer finished normally; no more values will ever arrive.
    Done,
    /// The producer (or a downstream consumer) failed; no more values will
    /// ever arrive and this error is the one to report.
    Error(FlowError),
}

#[derive(Debug, Clone)]
enum TerminalState {
    Done,
    Errored(FlowError),
}

impl From<TerminalState> for Closed {
    fn from(state: TerminalState) -> Self {
        match state {
            TerminalState::Done => Closed::Done,
            TerminalState::Errored(e) => Closed::Error(e),
        }
    }
}

/// Error from [`Sender::try_send`].
#[derive(Debug, Clone)]
pub enum TrySendError<T> {
    /// The bounded buffer is full; try again later or `send().await`.
    Full(T),
    /// The channel has already reached a terminal state.
    Closed(Closed),
}

/// Error from [`Receiver::try_receive`].
#[derive(Debug, Clone)]
pub enum TryReceiveError {
    /// No value is buffered right now, but the channel is still open.
    Empty,
    /// The channel has reached a terminal state and has nothing left to give.
    Closed(Closed),
}

/// The sending half of a [`channel`].
///
/// Cloning a `Sender` shares the same underlying queue and terminal-state
/// cell — any clone can call `done()`/`error()` and every clone (and the
/// paired `Receiver`) observes it.
pub struct Sender<T> {
    tx: mpsc::Sender<T>,
    terminal: Arc<watch::Sender<Option<TerminalState>>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            terminal: self.terminal.clone(),
        }
    }
}

/// The receiving half of a [`channel`]. Not cloneable — a `Channel[T]` has
/// exactly one consumer, matching the `mpsc` queue underneath it.
pub struct Receiver<T> {
    rx: mpsc::Receiver<T>,
    terminal: watch::Receiver<Option<TerminalState>>,
}

/// Create a bounded channel with room for `capacity` in-flight values
/// (rounded up to at least 1).
pub fn channel<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (terminal_tx, terminal_rx) = watch::channel(None);
    (
        Sender {
            tx,
            terminal: Arc::new(terminal_tx),
        },
        Receiver {
            rx,
            terminal: terminal_rx,
        },
    )
}

impl<T> Sender<T> {
    /// Send a value, suspending while the buffer is full. Returns the
    /// terminal reason if the channel was already closed (by either side).
    pub async fn send(&self, value: T) -> Result<(), Closed> {
        if let Some(state) = self.terminal.borrow().clone() {
            return Err(state.into());
        }
        self.tx.send(value).await.map_err(|_| self.closed_reason())
    }

    /// Non-blocking send: fails with [`TrySendError::Full`] instead of
    /// suspending when the buffer has no room.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        if let Some(state) = self.terminal.borrow().clone() {
            return Err(TrySendError::Closed(state.into()));
        }
        match self.tx.try_send(value) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(v)) => Err(TrySendError::Full(v)),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(TrySendError::Closed(self.closed_reason()))
            }
        }
    }

    /// Mark the channel `Done`. A no-op if a terminal state is already set
    /// (first write wins).
    pub fn done(&self) {
        self.set_terminal(TerminalState::Done);
    }

    /// Mark the channel `Errored(error)`. A no-op if a terminal state is
    /// already set. Once set, a pending or future `receive()` returns this
    /// error immediately, ahead of any values still buffered in the queue.
    pub fn error(&self, error: FlowError) {
        self.set_terminal(TerminalState::Errored(error));
    }

    /// `true` once a terminal state has been set.
    pub fn is_closed(&self) -> bool {
        self.terminal.borrow().is_some()
    }

    fn set_terminal(&self, state: TerminalState) {
        self.terminal.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(state);
                true
            } else {
                false
            }
        });
    }

    fn closed_reason(&self) -> Closed {
        self.terminal
            .borrow()
            .clone()
            .map(Into::into)
            .unwrap_or(Closed::Done)
    }
}

impl<T> Receiver<T> {
    /// Receive the next value, suspending until one arrives or the channel
    /// reaches a terminal state.
    ///
    /// An `Errored` terminal state is checked before every attempt to pull
    /// from the queue, so it supersedes any values still buffered.
    pub async fn receive(&mut self) -> Result<T, Closed> {
        loop {
            if let Some(TerminalState::Errored(e)) = self.terminal.borrow().clone() {
                return Err(Closed::Error(e));
            }

            tokio::select! {
                biased;
                maybe_value = self.rx.recv() => {
                    return match maybe_value {
                        Some(value) => Ok(value),
                        None => Err(self.closed_reason()),
                    };
                }
                changed = self.terminal.changed() => {
                    if changed.is_err() {
                        // Sender side dropped without ever publishing a
                        // terminal state; the mpsc disconnect branch above
                        // will catch this on the next loop iteration.
                    }
                }
            }
        }
    }

    /// Non-blocking receive: [`TryReceiveError::Empty`] instead of
    /// suspending when nothing is buffered yet.
    pub fn try_receive(&mut self) -> Result<T, TryReceiveError> {
        if let Some(TerminalState::Errored(e)) = self.terminal.borrow().clone() {
            return Err(TryReceiveError::Closed(Closed::Error(e)));
        }
        match self.rx.try_recv() {
            Ok(value) => Ok(value),
            Err(mpsc::error::TryRecvError::Empty) => Err(TryReceiveError::Empty),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(TryReceiveError::Closed(self.closed_reason()))
            }
        }
    }

    fn closed_reason(&self) -> Closed {
        self.terminal
            .borrow()
            .clone()
            .map(Into::into)
            .unwrap_or(Closed::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, Clone)]
    #[error("boom")]
    struct Boom;

    #[tokio::test]
    async fn send_then_receive_round_trips() {
        let (tx, mut rx) = channel::<i32>(4);
        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        assert_eq!(rx.receive().await.unwrap(), 1);
        assert_eq!(rx.receive().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn done_drains_remaining_buffer_before_reporting_done() {
        let (tx, mut rx) = channel::<i32>(4);
        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        tx.done();
        assert_eq!(rx.receive().await.unwrap(), 1);
        assert_eq!(rx.receive().await.unwrap(), 2);
        assert!(matches!(rx.receive().await, Err(Closed::Done)));
    }

    #[tokio::test]
    async fn error_supersedes_buffered_values() {
        let (tx, mut rx) = channel::<i32>(4);
        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        tx.error(FlowError::user(Boom));
        match rx.receive().await {
            Err(Closed::Error(_)) => {}
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_wakes_a_receiver_blocked_on_an_empty_queue() {
        let (tx, mut rx) = channel::<i32>(4);
        let handle = tokio::spawn(async move { rx.receive().await });
        tokio::task::yield_now().await;
        tx.error(FlowError::user(Boom));
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(Closed::Error(_))));
    }

    #[tokio::test]
    async fn done_is_idempotent_and_first_write_wins() {
        let (tx, mut rx) = channel::<i32>(4);
        tx.done();
        tx.error(FlowError::user(Boom));
        assert!(matches!(rx.receive().await, Err(Closed::Done)));
    }

    #[tokio::test]
    async fn send_after_terminal_state_fails_without_blocking() {
        let (tx, _rx) = channel::<i32>(4);
        tx.done();
        assert!(matches!(tx.send(1).await, Err(Closed::Done)));
    }

    #[test]
    fn try_send_reports_full_without_blocking() {
        let (tx, _rx) = channel::<i32>(1);
        tx.try_send(1).unwrap();
        match tx.try_send(2) {
            Err(TrySendError::Full(2)) => {}
            other => panic!("expected Full(2), got {other:?}"),
        }
    }

    #[test]
    fn try_receive_reports_empty_without_blocking() {
        let (_tx, mut rx) = channel::<i32>(4);
        assert!(matches!(rx.try_receive(), Err(TryReceiveError::Empty)));
    }

    #[tokio::test]
    async fn dropping_sender_without_terminal_state_reports_done() {
        let (tx, mut rx) = channel::<i32>(4);
        drop(tx);
        assert!(matches!(rx.receive().await, Err(Closed::Done)));
    }

    #[tokio::test]
    async fn clone_of_sender_shares_terminal_state() {
        let (tx, mut rx) = channel::<i32>(4);
        let tx2 = tx.clone();
        tx2.error(FlowError::user(Boom));
        assert!(tx.is_closed());
        assert!(matches!(rx.receive().await, Err(Closed::Error(_))));
    }
}
