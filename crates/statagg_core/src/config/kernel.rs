use serde::{Deserialize, Serialize};
use statagg_error::{DbError, Result, ResultExt};

pub const DEFAULT_BATCH_SIZE: usize = 2048;

const MIN_BATCH_SIZE: usize = 1;
const MAX_BATCH_SIZE: usize = 8192;

/// Configuration for operators driving aggregate kernels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Maximum number of logical rows in a batch.
    pub batch_size: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl KernelConfig {
    /// Check all settings are within their allowed ranges.
    pub fn validate(&self) -> Result<()> {
        BatchSize::validate_value(self.batch_size)
    }

    pub fn set_from_str(&mut self, name: &str, value: &str) -> Result<()> {
        if name == BatchSize::NAME {
            return BatchSize::set_from_str(value, self);
        }
        Err(DbError::new(format!("Missing setting for '{name}'")))
    }

    pub fn get_as_string(&self, name: &str) -> Result<String> {
        if name == BatchSize::NAME {
            return Ok(BatchSize::get_as_string(self));
        }
        Err(DbError::new(format!("Missing setting for '{name}'")))
    }

    /// Reset a setting to its default.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let default = Self::default();
        let value = default.get_as_string(name)?;
        self.set_from_str(name, &value)
    }
}

pub trait KernelSetting: Sync + Send + 'static {
    const NAME: &'static str;

    fn set_from_str(value: &str, conf: &mut KernelConfig) -> Result<()>;
    fn get_as_string(conf: &KernelConfig) -> String;
}

pub struct BatchSize;

impl BatchSize {
    pub fn validate_value(val: usize) -> Result<()> {
        if val < MIN_BATCH_SIZE {
            return Err(DbError::new(format!(
                "Batch size cannot be less than {MIN_BATCH_SIZE}"
            )));
        }

        if val > MAX_BATCH_SIZE {
            return Err(DbError::new(format!(
                "Batch size cannot be greater than {MAX_BATCH_SIZE}"
            )));
        }

        Ok(())
    }
}

impl KernelSetting for BatchSize {
    const NAME: &'static str = "batch_size";

    fn set_from_str(value: &str, conf: &mut KernelConfig) -> Result<()> {
        let val: usize = value
            .trim()
            .parse()
            .context("Failed to parse batch size")?;
        Self::validate_value(val)?;

        conf.batch_size = val;
        Ok(())
    }

    fn get_as_string(conf: &KernelConfig) -> String {
        conf.batch_size.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let conf = KernelConfig::default();
        conf.validate().unwrap();
        assert_eq!(DEFAULT_BATCH_SIZE, conf.batch_size);
    }

    #[test]
    fn set_and_get() {
        let mut conf = KernelConfig::default();
        conf.set_from_str("batch_size", "1024").unwrap();
        assert_eq!(1024, conf.batch_size);
        assert_eq!("1024", conf.get_as_string("batch_size").unwrap());

        conf.reset("batch_size").unwrap();
        assert_eq!(DEFAULT_BATCH_SIZE, conf.batch_size);
    }

    #[test]
    fn set_invalid() {
        let mut conf = KernelConfig::default();
        conf.set_from_str("batch_size", "0").unwrap_err();
        conf.set_from_str("batch_size", "8193").unwrap_err();
        conf.set_from_str("batch_size", "lots").unwrap_err();
        conf.set_from_str("partitions", "4").unwrap_err();
        assert_eq!(DEFAULT_BATCH_SIZE, conf.batch_size);
    }

    #[test]
    fn deserialize_json() {
        let conf: KernelConfig = serde_json::from_str(r#"{"batch_size": 512}"#).unwrap();
        assert_eq!(512, conf.batch_size);
        conf.validate().unwrap();

        let conf: KernelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(KernelConfig::default(), conf);

        let conf: KernelConfig = serde_json::from_str(r#"{"batch_size": 100000}"#).unwrap();
        conf.validate().unwrap_err();
    }
}
