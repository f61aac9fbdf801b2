/// ValidationContext - diagnostic sink shared by a validated device and its resources
///
/// Every validated resource holds an `Arc` to the context of the device
/// that created it, so resource-level calls (`dispose`, `read_data`) can
/// report without any process-wide state.

use std::collections::VecDeque;
use std::sync::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{DeviceId, Escalation, ValidationConfig};
use crate::{engine_error, engine_warn};
use super::violation::{Violation, ViolationKind, ViolationSeverity};

const LOG_SOURCE: &str = "galaxy3d::validation";

/// Counters over everything reported so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u64,
    pub warnings: u64,
    /// Violations that failed their call
    pub failed_calls: u64,
    /// Violations per operation name
    pub per_operation: FxHashMap<&'static str, u64>,
}

struct ValidationState {
    history: VecDeque<Violation>,
    stats: ValidationStats,
}

/// Shared validation state of one device
pub struct ValidationContext {
    config: ValidationConfig,
    device_id: DeviceId,
    state: Mutex<ValidationState>,
}

impl ValidationContext {
    pub fn new(config: ValidationConfig, device_id: DeviceId) -> Self {
        Self {
            config,
            device_id,
            state: Mutex::new(ValidationState {
                history: VecDeque::new(),
                stats: ValidationStats::default(),
            }),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Device the validated resources belong to
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    /// Log and record a violation, then decide whether the call fails
    ///
    /// Blocking violations always fail. Others fail according to the
    /// configured `Escalation`; when they don't, the caller forwards the
    /// call to the backend unchanged.
    pub fn report(&self, operation: &'static str, kind: ViolationKind) -> Result<()> {
        let violation = Violation::new(operation, kind);
        match violation.severity {
            ViolationSeverity::Error => engine_error!(LOG_SOURCE, "{}: {}", operation, violation.message),
            ViolationSeverity::Warning => engine_warn!(LOG_SOURCE, "{}: {}", operation, violation.message),
        }

        let fails = violation.kind.is_blocking()
            || match self.config.escalation {
                Escalation::Never => false,
                Escalation::Errors => violation.severity == ViolationSeverity::Error,
                Escalation::All => true,
            };

        let error = if !fails {
            None
        } else if violation.kind == ViolationKind::DeviceDisposed {
            Some(Error::DeviceDisposed)
        } else {
            Some(Error::ValidationFailed(format!("{}: {}", operation, violation.message)))
        };

        self.record(violation, error.is_some());
        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record(&self, violation: Violation, failed: bool) {
        // A poisoned lock only loses history; the violation was already logged
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        match violation.severity {
            ViolationSeverity::Error => state.stats.errors += 1,
            ViolationSeverity::Warning => state.stats.warnings += 1,
        }
        if failed {
            state.stats.failed_calls += 1;
        }
        *state.stats.per_operation.entry(violation.operation).or_insert(0) += 1;

        if self.config.max_recorded_violations == 0 {
            return;
        }
        while state.history.len() >= self.config.max_recorded_violations {
            state.history.pop_front();
        }
        state.history.push_back(violation);
    }

    /// Recorded violations, oldest first
    pub fn violations(&self) -> Vec<Violation> {
        self.state
            .lock()
            .map(|state| state.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> ValidationStats {
        self.state
            .lock()
            .map(|state| state.stats.clone())
            .unwrap_or_default()
    }

    /// Forget recorded violations and counters
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.history.clear();
            state.stats = ValidationStats::default();
        }
    }
}

#[cfg(test)]
#[path = "validation_context_tests.rs"]
mod tests;
