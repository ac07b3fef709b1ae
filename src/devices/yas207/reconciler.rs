//! Intent reconciliation
//!
//! The device can't be queried and commanded atomically: a command's effect
//! only shows up in the next status reply. Convergence is therefore a series
//! of passes, one per status reply, each computing the commands that close
//! the remaining gap and ending with a status query to observe the result.
//!
//! A pass that finds the gap still open after a previous pass already tried
//! to close it gives up (`RetryState::RetryArmed`), so a field the hardware
//! refuses to change can't drive an endless command loop.

use super::commands::NamedCommand;
use super::constants::SUBWOOFER_STEP;
use super::intent::{Intent, IntentKey};
use super::state::DeviceState;
use std::iter;

/// Oscillation breaker state of a reconciliation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryState {
    /// No pass has issued commands for this intent yet
    #[default]
    Pending,
    /// One pass already issued commands; a still-open gap ends the cycle
    RetryArmed,
}

/// Pending intent plus its breaker state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub intent: Intent,
    pub retry: RetryState,
}

impl Reconciliation {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            retry: RetryState::Pending,
        }
    }

    /// Fold newer targets into the cycle and give it a fresh attempt
    pub fn merge(&mut self, newer: &Intent) {
        self.intent.merge(newer);
        self.retry = RetryState::Pending;
    }
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Commands to enqueue, in order
    pub commands: Vec<NamedCommand>,
    /// Cycle to continue with on the next status reply; `None` once finished
    pub next: Option<Reconciliation>,
}

impl StepOutcome {
    fn finished() -> Self {
        Self {
            commands: Vec::new(),
            next: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next.is_none()
    }
}

/// Run one reconciliation pass of `cycle` against a fresh snapshot
pub fn step(cycle: &Reconciliation, observed: &DeviceState) -> StepOutcome {
    let mut delta = cycle.intent.delta(observed);

    if delta.is_empty() {
        log::debug!("Intent {} converged", cycle.intent);
        return StepOutcome::finished();
    }

    // Mute can't be observed or changed while the device is off
    if !observed.power && delta == [IntentKey::Mute] {
        log::debug!("Only mute differs and device is off, treating as converged");
        return StepOutcome::finished();
    }

    if cycle.retry == RetryState::RetryArmed {
        log::warn!(
            "Reconciliation stalled: device still differs on [{}] after retry, dropping intent {}",
            join_keys(&delta),
            cycle.intent
        );
        return StepOutcome::finished();
    }

    let mut intent = cycle.intent.clone();
    let mut commands = Vec::new();
    let mut powered = observed.power;

    if !powered && delta.iter().any(|&key| key != IntentKey::Power) {
        // Settings only take while on; return to standby afterwards unless asked otherwise
        commands.push(NamedCommand::PowerOn);
        powered = true;
        if !delta.contains(&IntentKey::Power) {
            delta.push(IntentKey::Power);
        }
        intent.power = Some(intent.power.unwrap_or(false));
    } else if !powered && intent.power == Some(true) {
        commands.push(NamedCommand::PowerOn);
        powered = true;
    }

    for key in IntentKey::PRIORITY {
        if !delta.contains(&key) {
            continue;
        }
        match key {
            IntentKey::Input => {
                if let Some(target) = intent.input {
                    match NamedCommand::select_input(target) {
                        Some(cmd) => commands.push(cmd),
                        None => log::warn!("No command selects input {}", target),
                    }
                }
            }
            IntentKey::Surround => {
                if let Some(target) = intent.surround {
                    match NamedCommand::select_surround(target) {
                        Some(cmd) => commands.push(cmd),
                        None => log::warn!("No command selects surround {}", target),
                    }
                }
            }
            IntentKey::Volume => {
                if let Some(target) = intent.volume {
                    push_steps(
                        &mut commands,
                        observed.volume,
                        target,
                        1,
                        NamedCommand::VolumeUp,
                        NamedCommand::VolumeDown,
                    );
                }
            }
            IntentKey::Subwoofer => {
                if let Some(target) = intent.subwoofer {
                    push_steps(
                        &mut commands,
                        observed.subwoofer,
                        target,
                        SUBWOOFER_STEP,
                        NamedCommand::SubwooferUp,
                        NamedCommand::SubwooferDown,
                    );
                }
            }
            IntentKey::Mute => {
                if let Some(target) = intent.mute {
                    commands.push(NamedCommand::mute(target));
                }
            }
            IntentKey::BassExt => {
                if let Some(target) = intent.bass_ext {
                    commands.push(NamedCommand::bass_ext(target));
                }
            }
            IntentKey::Clearvoice => {
                if let Some(target) = intent.clearvoice {
                    commands.push(NamedCommand::clearvoice(target));
                }
            }
            IntentKey::Power => {
                if let Some(target) = intent.power {
                    if target != powered {
                        commands.push(NamedCommand::power(target));
                    }
                }
            }
        }
    }

    commands.push(NamedCommand::ReportStatus);
    log::debug!(
        "Reconciling [{}] with {} commands",
        join_keys(&delta),
        commands.len()
    );

    StepOutcome {
        commands,
        next: Some(Reconciliation {
            intent,
            retry: RetryState::RetryArmed,
        }),
    }
}

fn push_steps(
    commands: &mut Vec<NamedCommand>,
    observed: u8,
    target: u8,
    unit: u8,
    up: NamedCommand,
    down: NamedCommand,
) {
    let (cmd, distance) = if target > observed {
        (up, target - observed)
    } else {
        (down, observed - target)
    };
    commands.extend(iter::repeat(cmd).take((distance / unit) as usize));
}

fn join_keys(keys: &[IntentKey]) -> String {
    keys.iter()
        .map(|key| key.name())
        .collect::<Vec<_>>()
        .join(",")
}
