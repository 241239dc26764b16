use device_link::{DeviceLink, LinkError};
use shared::domain::ChannelIndex;
use tracing::{debug, info, warn};

use crate::{blackout::BlackoutEdge, config::DeskConfig, session::DeskSession};

/// Effective values last transmitted, plus the grand master level they were
/// computed with. Only used to detect change between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSnapshot {
    effective: Vec<u8>,
    grand_master: u8,
}

impl DispatchSnapshot {
    pub fn new(effective: Vec<u8>, grand_master: u8) -> Self {
        Self {
            effective,
            grand_master,
        }
    }

    pub fn effective(&self) -> &[u8] {
        &self.effective
    }

    pub fn grand_master(&self) -> u8 {
        self.grand_master
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub blackout_edge: Option<BlackoutEdge>,
    pub mirrors_corrected: usize,
    pub sent: usize,
    pub failed: usize,
    pub reconnected: bool,
}

/// Periodic reconciliation of desk state onto the output link.
///
/// The dispatcher is the only writer to the link. Each call to [`tick`] runs
/// to completion; scheduling is left to the caller.
///
/// [`tick`]: DispatchLoop::tick
pub struct DispatchLoop<L> {
    link: L,
    last_sent: Option<DispatchSnapshot>,
    reconnect_counter: u32,
    reconnect_threshold: u32,
}

impl<L: DeviceLink> DispatchLoop<L> {
    pub fn new(link: L, config: &DeskConfig) -> Self {
        Self {
            link,
            last_sent: None,
            reconnect_counter: 0,
            reconnect_threshold: config.reconnect_threshold,
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn last_sent(&self) -> Option<&DispatchSnapshot> {
        self.last_sent.as_ref()
    }

    pub fn reconnect_counter(&self) -> u32 {
        self.reconnect_counter
    }

    pub fn tick(&mut self, session: &mut DeskSession) -> TickReport {
        match session.blackout_mut().observe() {
            Some(BlackoutEdge::Entered) => {
                let zeros = vec![0; session.channels().len()];
                let (sent, failed) = self.transmit(&zeros);
                info!(channels = sent, "blackout engaged");
                TickReport {
                    blackout_edge: Some(BlackoutEdge::Entered),
                    sent,
                    failed,
                    ..TickReport::default()
                }
            }
            Some(BlackoutEdge::Released) => {
                let mirrors_corrected = session.reconcile_mirrors();
                let current = session.snapshot();
                let (sent, failed) = self.transmit(current.effective());
                self.last_sent = Some(current);
                info!(channels = sent, "blackout released");
                TickReport {
                    blackout_edge: Some(BlackoutEdge::Released),
                    mirrors_corrected,
                    sent,
                    failed,
                    reconnected: false,
                }
            }
            None if session.blackout().is_active() => TickReport::default(),
            None => self.dispatch(session),
        }
    }

    fn dispatch(&mut self, session: &mut DeskSession) -> TickReport {
        let current = session.snapshot();
        let mirrors_corrected = session.reconcile_mirrors();

        let mut report = TickReport {
            mirrors_corrected,
            ..TickReport::default()
        };

        // Any difference re-sends the whole bank.
        if self.last_sent.as_ref() != Some(&current) {
            let (sent, failed) = self.transmit(current.effective());
            report.sent = sent;
            report.failed = failed;
            self.last_sent = Some(current);
        }

        self.reconnect_counter += 1;
        if self.reconnect_counter > self.reconnect_threshold {
            report.reconnected = true;
            self.reconnect_counter = 0;
            match self.link.reopen() {
                Ok(()) => debug!("output link reopened"),
                Err(error) => warn!(%error, "output link reopen failed"),
            }
        }

        report
    }

    /// Sends every value in ascending channel order. A failed send does not
    /// stop the rest of the bank.
    fn transmit(&mut self, values: &[u8]) -> (usize, usize) {
        let mut failed = 0;
        for (position, value) in values.iter().enumerate() {
            let channel = ChannelIndex::from_position(position);
            if let Err(error) = self.link.send(channel, *value) {
                failed += 1;
                debug!(%channel, value, %error, "send failed");
            }
        }
        if failed > 0 {
            warn!(failed, total = values.len(), "output link dropped sends");
        }
        (values.len() - failed, failed)
    }

    /// Releases the output link.
    pub fn shutdown(mut self) -> Result<L, LinkError> {
        self.link.close()?;
        Ok(self.link)
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
