use crate::error::{Result, RetentionError};

/// Run phases, in the only order they may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    Init,
    CacheBuild,
    Sweep,
    Publish,
    Cleanup,
    Done,
    /// A fatal error stopped the run; no further phase may start
    Failed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Init => "init",
            RunPhase::CacheBuild => "cache_build",
            RunPhase::Sweep => "sweep",
            RunPhase::Publish => "publish",
            RunPhase::Cleanup => "cleanup",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        }
    }

    /// Phase allowed to follow this one
    pub fn next(&self) -> Option<RunPhase> {
        match self {
            RunPhase::Init => Some(RunPhase::CacheBuild),
            RunPhase::CacheBuild => Some(RunPhase::Sweep),
            RunPhase::Sweep => Some(RunPhase::Publish),
            RunPhase::Publish => Some(RunPhase::Cleanup),
            RunPhase::Cleanup => Some(RunPhase::Done),
            RunPhase::Done | RunPhase::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed)
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phase transitions for one run
#[derive(Debug)]
pub struct PhaseMachine {
    phase: RunPhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Init,
        }
    }

    pub fn current(&self) -> RunPhase {
        self.phase
    }

    /// Transition: current → `to`, only if `to` directly follows
    pub fn advance(&mut self, to: RunPhase) -> Result<()> {
        if self.phase.next() == Some(to) {
            self.phase = to;
            Ok(())
        } else {
            Err(RetentionError::InvalidPhaseTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Transition: any non-terminal phase → FAILED
    pub fn fail(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = RunPhase::Failed;
        }
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence() {
        let mut machine = PhaseMachine::new();
        for phase in [
            RunPhase::CacheBuild,
            RunPhase::Sweep,
            RunPhase::Publish,
            RunPhase::Cleanup,
            RunPhase::Done,
        ] {
            machine.advance(phase).unwrap();
        }
        assert_eq!(machine.current(), RunPhase::Done);
        assert!(machine.current().is_terminal());
    }

    #[test]
    fn test_sweep_before_cache_build_rejected() {
        let mut machine = PhaseMachine::new();
        let err = machine.advance(RunPhase::Sweep).unwrap_err();
        match err {
            RetentionError::InvalidPhaseTransition { from, to } => {
                assert_eq!(from, "init");
                assert_eq!(to, "sweep");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(machine.current(), RunPhase::Init);
    }

    #[test]
    fn test_failed_is_final() {
        let mut machine = PhaseMachine::new();
        machine.advance(RunPhase::CacheBuild).unwrap();
        machine.fail();

        assert_eq!(machine.current(), RunPhase::Failed);
        assert!(machine.advance(RunPhase::Sweep).is_err());
    }

    #[test]
    fn test_repeating_a_phase_rejected() {
        let mut machine = PhaseMachine::new();
        machine.advance(RunPhase::CacheBuild).unwrap();
        assert!(machine.advance(RunPhase::CacheBuild).is_err());
    }
}
