use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};

const DEFAULT_CAPACITY: usize = 4;

/// Construction-time settings for a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of tasks running at once. Must be positive.
    pub capacity: usize,
    /// Label attached to every log event from this scheduler.
    pub name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            name: "pacer".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Parses a capacity given as text, e.g. from an environment variable.
    pub fn from_str_capacity(raw: &str) -> Result<Self, SchedulerError> {
        let capacity = raw.trim().parse::<usize>().map_err(|e| {
            SchedulerError::InvalidConfiguration(format!("capacity {raw:?} is not a number: {e}"))
        })?;
        let config = Self::new(capacity);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.capacity == 0 {
            return Err(SchedulerError::InvalidConfiguration(
                "capacity must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SchedulerConfig::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            SchedulerConfig::new(0).validate(),
            Err(SchedulerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_str_capacity() {
        assert_eq!(SchedulerConfig::from_str_capacity(" 3 ").unwrap().capacity, 3);
        assert!(SchedulerConfig::from_str_capacity("0").is_err());
        assert!(SchedulerConfig::from_str_capacity("-1").is_err());
        assert!(SchedulerConfig::from_str_capacity("two").is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"capacity": 8}"#).unwrap();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.name, "pacer");

        let config: SchedulerConfig =
            serde_json::from_str(r#"{"capacity": 2, "name": "uploads"}"#).unwrap();
        assert_eq!(config, SchedulerConfig::new(2).with_name("uploads"));
    }
}
