//! Fallback chain state machine.

use crate::domain::foundation::{StateMachine, ValidationError};

/// Progress of one generation request through the provider list.
///
/// `Pending -> TryingProvider(0) -> { Success | TryingProvider(1) | AllFailed }`
/// and so on; `Success` and `AllFailed` are terminal. `provider_count`
/// bounds how far the index may advance. Every step goes through
/// [`StateMachine::transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Pending { provider_count: usize },
    TryingProvider { index: usize, provider_count: usize },
    Success,
    AllFailed,
}

impl GenerationState {
    pub fn new(provider_count: usize) -> Self {
        Self::Pending { provider_count }
    }

    /// Moves to the first provider, or straight to `AllFailed` when there are none.
    pub fn start(&self) -> Result<Self, ValidationError> {
        let target = match *self {
            Self::Pending { provider_count } if provider_count > 0 => Self::TryingProvider {
                index: 0,
                provider_count,
            },
            _ => Self::AllFailed,
        };
        self.transition_to(target)
    }

    /// After the current provider failed: the next provider, or `AllFailed`.
    pub fn advance(&self) -> Result<Self, ValidationError> {
        let target = match *self {
            Self::TryingProvider {
                index,
                provider_count,
            } if index + 1 < provider_count => Self::TryingProvider {
                index: index + 1,
                provider_count,
            },
            _ => Self::AllFailed,
        };
        self.transition_to(target)
    }

    pub fn succeed(&self) -> Result<Self, ValidationError> {
        self.transition_to(Self::Success)
    }

    /// Index of the provider being tried.
    pub fn current_index(&self) -> Option<usize> {
        match self {
            Self::TryingProvider { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl StateMachine for GenerationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use GenerationState::*;
        match (self, target) {
            (Pending { provider_count: n }, TryingProvider { index: 0, provider_count: m }) => {
                *n > 0 && n == m
            }
            (Pending { provider_count: 0 }, AllFailed) => true,
            (
                TryingProvider {
                    index: i,
                    provider_count: n,
                },
                TryingProvider {
                    index: j,
                    provider_count: m,
                },
            ) => n == m && *j == i + 1 && j < n,
            (TryingProvider { .. }, Success) | (TryingProvider { .. }, AllFailed) => true,
            _ => false,
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use GenerationState::*;
        match *self {
            Pending { provider_count: 0 } => vec![AllFailed],
            Pending { provider_count } => vec![TryingProvider {
                index: 0,
                provider_count,
            }],
            TryingProvider {
                index,
                provider_count,
            } => {
                let mut next = vec![Success];
                if index + 1 < provider_count {
                    next.push(TryingProvider {
                        index: index + 1,
                        provider_count,
                    });
                }
                next.push(AllFailed);
                next
            }
            Success | AllFailed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_provider_then_fails() {
        let mut state = GenerationState::new(2).start().unwrap();
        assert_eq!(state.current_index(), Some(0));

        state = state.advance().unwrap();
        assert_eq!(state.current_index(), Some(1));

        state = state.advance().unwrap();
        assert_eq!(state, GenerationState::AllFailed);
        assert!(state.is_terminal());
    }

    #[test]
    fn no_providers_fails_immediately() {
        let state = GenerationState::new(0).start().unwrap();
        assert_eq!(state, GenerationState::AllFailed);
    }

    #[test]
    fn success_is_terminal() {
        let trying = GenerationState::new(3).start().unwrap();
        let done = trying.succeed().unwrap();
        assert!(done.is_terminal());
        assert!(done.transition_to(GenerationState::AllFailed).is_err());
    }

    #[test]
    fn steps_out_of_order_are_rejected() {
        let pending = GenerationState::new(2);
        assert!(pending.advance().is_err());
        assert!(pending.succeed().is_err());

        let done = pending.start().unwrap().succeed().unwrap();
        assert!(done.start().is_err());
        assert!(done.advance().is_err());
        assert!(GenerationState::AllFailed.succeed().is_err());
    }

    #[test]
    fn cannot_skip_providers() {
        let trying = GenerationState::new(3).start().unwrap();
        let skip = GenerationState::TryingProvider {
            index: 2,
            provider_count: 3,
        };
        assert!(!trying.can_transition_to(&skip));
        assert!(trying.transition_to(skip).is_err());
    }

    #[test]
    fn computed_steps_are_listed_transitions() {
        let pending = GenerationState::new(2);
        let first = pending.start().unwrap();
        assert!(pending.valid_transitions().contains(&first));
        let second = first.advance().unwrap();
        assert!(first.valid_transitions().contains(&second));
        let failed = second.advance().unwrap();
        assert!(second.valid_transitions().contains(&failed));
    }
}
