//! Status display sink.
//!
//! The controller only emits [`DisplayEvent`] values; drawing is the
//! renderer's job behind the [`StatusDisplay`] seam. The deployed renderer
//! is an OLED on the companion board; [`LogDisplay`] stands in wherever no
//! panel is attached.

use std::sync::{Arc, Mutex};

use fingate_core::{DisplayEvent, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// External status renderer.
pub trait StatusDisplay: Send {
    async fn render(&mut self, event: DisplayEvent) -> Result<()>;
}

/// Renderer that writes status lines to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDisplay;

impl StatusDisplay for LogDisplay {
    async fn render(&mut self, event: DisplayEvent) -> Result<()> {
        let line = match event {
            DisplayEvent::FingerOk => "access granted",
            DisplayEvent::FingerFail => "access denied",
            DisplayEvent::DoorOpen => "door open",
            DisplayEvent::DoorClosed => "door closed",
            DisplayEvent::Error => "fault",
            DisplayEvent::Idle => "ready",
        };
        info!(?event, "display: {line}");
        Ok(())
    }
}

/// Recording renderer for tests.
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl MockDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StatusDisplay for MockDisplay {
    async fn render(&mut self, event: DisplayEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Drain the display mailbox into a renderer until the mailbox closes.
///
/// Renders `Idle` once at startup so the panel never shows stale content
/// from before a restart. Render failures are logged and skipped; the
/// display is never allowed to take the controller down.
pub async fn run_display<D: StatusDisplay>(
    mut display: D,
    mut events: mpsc::Receiver<DisplayEvent>,
) {
    if let Err(err) = display.render(DisplayEvent::Idle).await {
        warn!(error = %err, "display render failed");
    }
    while let Some(event) = events.recv().await {
        if let Err(err) = display.render(event).await {
            warn!(error = %err, ?event, "display render failed");
        }
    }
    info!("display mailbox closed, display task stopping");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_display_task_renders_idle_then_events() {
        let mock = MockDisplay::new();
        let (tx, rx) = mpsc::channel(5);
        let task = tokio::spawn(run_display(mock.clone(), rx));

        tx.send(DisplayEvent::FingerOk).await.unwrap();
        tx.send(DisplayEvent::DoorOpen).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(
            mock.events(),
            vec![
                DisplayEvent::Idle,
                DisplayEvent::FingerOk,
                DisplayEvent::DoorOpen
            ]
        );
    }
}
