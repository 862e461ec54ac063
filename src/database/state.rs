use std::fmt;

/// How an operation ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The operator declined a confirmation gate; nothing was changed
    Cancelled,
}

/// Steps of a database migration. `Failed` can follow any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Confirming,
    BackingUpLocal,
    BackingUpRemote,
    Importing,
    Transforming,
    Complete,
    Cancelled,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Complete | PipelineState::Cancelled | PipelineState::Failed
        )
    }

    /// Whether `next` may follow this state
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, Confirming)
                | (Idle, BackingUpLocal)
                | (Idle, BackingUpRemote)
                | (Confirming, BackingUpLocal)
                | (Confirming, Cancelled)
                | (BackingUpLocal, BackingUpRemote)
                | (BackingUpLocal, Importing)
                | (BackingUpLocal, Complete)
                | (BackingUpRemote, Importing)
                | (BackingUpRemote, Transforming)
                | (BackingUpRemote, Complete)
                | (Importing, Transforming)
                | (Transforming, Complete)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Confirming => "confirming",
            PipelineState::BackingUpLocal => "backing up local",
            PipelineState::BackingUpRemote => "backing up remote",
            PipelineState::Importing => "importing",
            PipelineState::Transforming => "transforming",
            PipelineState::Complete => "complete",
            PipelineState::Cancelled => "cancelled",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}
