//! Verification gates guarding the orchestrator's side-effecting operations
//!
//! Each gate moves `Unchecked -> Passed -> Consumed`. A consumed gate is only
//! re-earned by running its verification again; there is no reset.

/// State of a single verification gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    /// The verification has never run
    #[default]
    Unchecked,
    /// The verification succeeded and the guarded action has not run since
    Passed,
    /// The guarded action ran; the verification must be repeated
    Consumed,
}

impl Gate {
    pub fn is_passed(self) -> bool {
        matches!(self, Gate::Passed)
    }

    pub fn pass(&mut self) {
        *self = Gate::Passed;
    }

    pub fn consume(&mut self) {
        *self = Gate::Consumed;
    }
}

/// The three gates owned by one orchestrator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gates {
    pub remote_valid: Gate,
    pub local_creation: Gate,
    pub push: Gate,
}
