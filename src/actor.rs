// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Actors in the window manager.
//!
//! An actor owns some piece of state and reacts to events delivered over a
//! channel. The [`wm`] actor owns all window-management state; the protocol
//! layer on the other end of its channels is the only place I/O happens.

use tokio::sync::mpsc::error::SendError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::Span;

pub mod wm;

/// Sends events along with the sender's current span, so the receiver can
/// handle each one in the context it was emitted from.
pub struct Sender<Event>(UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = UnboundedReceiver<(Span, Event)>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    pub fn send(&self, event: Event) {
        // A closed channel only means the other side is shutting down.
        _ = self.try_send(event)
    }

    pub fn try_send(&self, event: Event) -> Result<(), SendError<(Span, Event)>> {
        self.0.send((Span::current(), event))
    }
}

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
