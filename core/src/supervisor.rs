//! Supervisor Loop: poll the runtime for uncaught faults until told to stop.
//!
//! Faults are described, cleared, and counted; they never change the state.
//! Only the external stop signal moves the loop from `Running` to `Stopped`.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::runtime::RuntimeEnv;

/// Sending half of the supervisor's stop signal.
#[derive(Debug, Clone)]
pub struct StopHandle(Sender<()>);

impl StopHandle {
    /// Ask the supervisor to stop after its current poll.
    pub fn stop(&self) {
        if self.0.send(()).is_err() {
            tracing::debug!("Supervisor already stopped");
        }
    }
}

/// Receiving half, consumed by [`Supervisor::run`].
#[derive(Debug)]
pub struct StopSignal(Receiver<()>);

/// Create a connected stop handle and signal.
#[must_use]
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = mpsc::channel();
    (StopHandle(tx), StopSignal(rx))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Running,
    Stopped,
}

/// Totals over one supervised run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    pub polls: u64,
    pub faults: u64,
}

pub struct Supervisor<E: RuntimeEnv> {
    env: E,
    interval: Duration,
    state: SupervisorState,
    report: SupervisorReport,
}

impl<E: RuntimeEnv> Supervisor<E> {
    /// `env` must belong to the thread that will call [`Supervisor::run`].
    pub fn new(env: E, interval: Duration) -> Self {
        Self {
            env,
            interval,
            state: SupervisorState::Running,
            report: SupervisorReport::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    #[must_use]
    pub fn report(&self) -> SupervisorReport {
        self.report
    }

    /// One poll. Returns whether a fault was found (and cleared).
    pub fn poll_once(&mut self) -> bool {
        self.report.polls += 1;
        match self.env.take_fault() {
            Some(fault) => {
                self.report.faults += 1;
                tracing::error!(
                    poll = self.report.polls,
                    fault = fault.description(),
                    "Uncaught runtime fault"
                );
                true
            }
            None => false,
        }
    }

    /// Poll every interval until `stop` fires or its handles are all dropped.
    pub fn run(&mut self, stop: &StopSignal) -> SupervisorReport {
        tracing::info!(interval_ms = self.interval.as_millis(), "Supervising runtime");
        while self.state == SupervisorState::Running {
            self.poll_once();
            match stop.0.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) => {
                    tracing::info!("Supervisor stop requested");
                    self.state = SupervisorState::Stopped;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("Supervisor stop handle dropped");
                    self.state = SupervisorState::Stopped;
                }
            }
        }
        tracing::info!(
            polls = self.report.polls,
            faults = self.report.faults,
            "Supervisor stopped"
        );
        self.report
    }
}
