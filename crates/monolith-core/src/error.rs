//! Machine-level error taxonomy.
//!
//! Tick-path gating failures are never errors: they stall the machine for
//! the tick and are retried. These types cover the surfaces that do return
//! `Result`: explicit formation attempts, operator controls, and
//! post-formation consistency checks.

use thiserror::Error;

use crate::structure::MatchFailure;

/// Which resource a gate came up short on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Energy,
    Fluid,
    OutputSpace,
}

/// Operator-facing manual controls that can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorControl {
    RadiusCycle,
    ModeCycle,
}

/// Machine state that caused a manual control to be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCause {
    /// The machine is actively working; geometry/mode changes are locked out.
    Working,
    /// The structure is not formed.
    Unformed,
}

/// Errors reported by controller and machine operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    /// An explicit formation attempt failed. Per-tick re-validation never
    /// raises this; it just unforms.
    #[error("structure invalid: {0}")]
    StructureInvalid(#[from] MatchFailure),

    /// An energy/fluid/output-space gate failed.
    #[error("insufficient {kind:?}: need {need}, have {have}")]
    ResourceInsufficient {
        kind: ResourceKind,
        need: i64,
        have: i64,
    },

    /// A required ability provider vanished while the structure was formed.
    /// Fatal for that formation; the controller unforms.
    #[error("configuration inconsistent: {detail}")]
    ConfigurationInconsistent { detail: String },

    /// A manual control was invoked in a disallowed machine state. Reported
    /// to the operator; no state change.
    #[error("operator control {control:?} rejected: machine is {cause:?}")]
    OperatorRejected {
        control: OperatorControl,
        cause: RejectCause,
    },
}
