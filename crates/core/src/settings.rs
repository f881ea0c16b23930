use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("exam target size must be > 0")]
    InvalidExamTargetSize,

    #[error("exam duration must be between 60 and 14400 seconds")]
    InvalidExamDuration,

    #[error("tick interval must be between 10 and 60000 ms")]
    InvalidTickInterval,

    #[error("prefetch debounce must be <= 5000 ms")]
    InvalidPrefetchDebounce,
}

/// Tunables for building and running quiz sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    exam_target_size: u32,
    exam_duration_secs: u32,
    tick_interval_ms: u64,
    prefetch_debounce_ms: u64,
    reveal_all_answers: bool,
}

impl Default for SessionSettings {
    /// Official exam shape: 30 questions in 30 minutes, one tick per second,
    /// 100 ms prefetch debounce, answers hidden until checked.
    fn default() -> Self {
        Self {
            exam_target_size: 30,
            exam_duration_secs: 1800,
            tick_interval_ms: 1000,
            prefetch_debounce_ms: 100,
            reveal_all_answers: false,
        }
    }
}

impl SessionSettings {
    /// Creates custom session settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if any value is out of range.
    pub fn new(
        exam_target_size: u32,
        exam_duration_secs: u32,
        tick_interval_ms: u64,
        prefetch_debounce_ms: u64,
        reveal_all_answers: bool,
    ) -> Result<Self, SettingsError> {
        if exam_target_size == 0 {
            return Err(SettingsError::InvalidExamTargetSize);
        }
        if !(60..=14_400).contains(&exam_duration_secs) {
            return Err(SettingsError::InvalidExamDuration);
        }
        if !(10..=60_000).contains(&tick_interval_ms) {
            return Err(SettingsError::InvalidTickInterval);
        }
        if prefetch_debounce_ms > 5_000 {
            return Err(SettingsError::InvalidPrefetchDebounce);
        }

        Ok(Self {
            exam_target_size,
            exam_duration_secs,
            tick_interval_ms,
            prefetch_debounce_ms,
            reveal_all_answers,
        })
    }

    #[must_use]
    pub fn exam_target_size(&self) -> usize {
        usize::try_from(self.exam_target_size).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn exam_duration_secs(&self) -> u32 {
        self.exam_duration_secs
    }

    #[must_use]
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub fn prefetch_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.prefetch_debounce_ms)
    }

    #[must_use]
    pub fn reveal_all_answers(&self) -> bool {
        self.reveal_all_answers
    }

    #[must_use]
    pub fn with_reveal_all_answers(mut self, reveal: bool) -> Self {
        self.reveal_all_answers = reveal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_exam_rules() {
        let settings = SessionSettings::default();
        assert_eq!(settings.exam_target_size(), 30);
        assert_eq!(settings.exam_duration_secs(), 1800);
        assert_eq!(settings.prefetch_debounce().as_millis(), 100);
        assert!(!settings.reveal_all_answers());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            SessionSettings::new(0, 1800, 1000, 100, false),
            Err(SettingsError::InvalidExamTargetSize)
        );
        assert_eq!(
            SessionSettings::new(30, 5, 1000, 100, false),
            Err(SettingsError::InvalidExamDuration)
        );
        assert_eq!(
            SessionSettings::new(30, 1800, 0, 100, false),
            Err(SettingsError::InvalidTickInterval)
        );
        assert_eq!(
            SessionSettings::new(30, 1800, 1000, 9_000, false),
            Err(SettingsError::InvalidPrefetchDebounce)
        );
    }
}
