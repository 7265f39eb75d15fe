use crate::models::workout::{Mode, WorkoutResult};
use tracing::info;

/// Holds the currently selected exercise mode
#[derive(Debug, Clone)]
pub struct ModeSelector {
    current: Mode,
}

impl ModeSelector {
    pub fn new(initial: Mode) -> Self {
        Self { current: initial }
    }

    /// Validate and switch to `tag`. Leaves the current mode untouched on error.
    ///
    /// The caller resets rep counting on success; re-selecting the same mode
    /// still counts as a switch.
    pub fn select(&mut self, tag: &str) -> WorkoutResult<Mode> {
        let mode = Mode::from_string(tag)?;
        self.current = mode;
        info!("MODE = {}", mode);
        Ok(mode)
    }

    pub fn current(&self) -> Mode {
        self.current
    }
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workout::WorkoutError;

    #[test]
    fn test_select_valid_mode() {
        let mut selector = ModeSelector::default();
        assert_eq!(selector.current(), Mode::Auto);
        assert_eq!(selector.select("side").unwrap(), Mode::Side);
        assert_eq!(selector.current(), Mode::Side);
    }

    #[test]
    fn test_invalid_mode_leaves_state() {
        let mut selector = ModeSelector::new(Mode::Front);
        let err = selector.select("sideways").unwrap_err();
        assert_eq!(err, WorkoutError::InvalidMode("sideways".to_string()));
        assert_eq!(selector.current(), Mode::Front);
    }
}
