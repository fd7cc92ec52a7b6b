//! Tokio timers backing the controller's schedules.
//!
//! Cosmetic pauses can be compressed with a time scale. The decision deadline
//! always runs at wall-clock speed.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::DriverEvent;
use crate::engine::models::{CosmeticCue, SelectionPhase};

pub struct CosmeticTimers {
    tx: UnboundedSender<DriverEvent>,
    time_scale: f64,
    handles: Vec<JoinHandle<()>>,
}

impl CosmeticTimers {
    /// `time_scale` multiplies every delay; 0 fires cues on the next tick.
    pub fn new(tx: UnboundedSender<DriverEvent>, time_scale: f64) -> Self {
        let time_scale = if time_scale.is_finite() && time_scale >= 0.0 {
            time_scale
        } else {
            1.0
        };
        Self {
            tx,
            time_scale,
            handles: Vec::new(),
        }
    }

    pub fn schedule(&mut self, cue: CosmeticCue, after: Duration) {
        self.handles.retain(|h| !h.is_finished());
        let delay = after.mul_f64(self.time_scale);
        let tx = self.tx.clone();
        self.handles.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DriverEvent::Cosmetic(cue));
        }));
    }

    /// Deliver a scripted event (bot playback) after a scaled delay.
    pub fn schedule_event(&mut self, event: DriverEvent, after: Duration) {
        self.handles.retain(|h| !h.is_finished());
        let delay = after.mul_f64(self.time_scale);
        let tx = self.tx.clone();
        self.handles.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        }));
    }

    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn pending(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }
}

impl Drop for CosmeticTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Single-slot decision deadline. Arming replaces whatever was armed.
pub struct DeadlineTimer {
    tx: UnboundedSender<DriverEvent>,
    slot: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    pub fn new(tx: UnboundedSender<DriverEvent>) -> Self {
        Self { tx, slot: None }
    }

    pub fn arm(&mut self, phase: SelectionPhase, after: Duration) {
        self.disarm();
        let tx = self.tx.clone();
        self.slot = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(DriverEvent::Deadline(phase));
        }));
    }

    pub fn disarm(&mut self) {
        if let Some(handle) = self.slot.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
