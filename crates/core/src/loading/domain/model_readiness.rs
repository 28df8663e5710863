/// One-way readiness flag for the analysis capability.
///
/// Starts not-ready and can be set exactly once; it never reverts for the
/// rest of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModelReadiness {
    ready: bool,
}

impl ModelReadiness {
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns `true` only on the transition to ready.
    pub fn mark_ready(&mut self) -> bool {
        !std::mem::replace(&mut self.ready, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_not_ready() {
        assert!(!ModelReadiness::default().is_ready());
    }

    #[test]
    fn test_mark_ready_transitions_once() {
        let mut readiness = ModelReadiness::default();
        assert!(readiness.mark_ready());
        assert!(readiness.is_ready());
        assert!(!readiness.mark_ready());
        assert!(readiness.is_ready());
    }
}
