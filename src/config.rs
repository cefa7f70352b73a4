//! Publisher configuration

use crate::bucketing::Capacity;
use crate::core::{vocab, PrefixTable};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to publish one event stream.
///
/// Loaded from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Stream root container, ending with `/`
    pub base_url: String,
    /// Predicate whose subjects become stream members
    pub member_predicate: String,
    /// Predicate holding each member's `xsd:dateTime`
    pub timestamp_path: String,
    /// Namespace shape IRIs are minted under; defaults to `{base_url}shape#`
    pub shape_namespace: Option<String>,
    /// Maximum members per bucket; `None` means unbounded
    pub capacity: Option<usize>,
    pub min_split_size: usize,
    /// Rebalance after every append
    pub auto_rebalance: bool,
    /// Publish a shape inferred from the first admitted member
    pub publish_shape: bool,
    /// Extra prefixes on top of the built-in ones
    pub prefixes: Vec<(String, String)>,
    pub timeout_secs: u64,
    pub auth_token: Option<String>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            member_predicate: vocab::DCT_CREATED.to_string(),
            timestamp_path: vocab::DCT_CREATED.to_string(),
            shape_namespace: None,
            capacity: Some(100),
            min_split_size: 1,
            auto_rebalance: true,
            publish_shape: true,
            prefixes: Vec::new(),
            timeout_secs: 30,
            auth_token: None,
        }
    }
}

impl PublisherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base_url is required".to_string()));
        }
        if !self.base_url.ends_with('/') {
            return Err(Error::Config(format!(
                "base_url must end with '/': {}",
                self.base_url
            )));
        }
        if self.capacity == Some(0) {
            return Err(Error::Config("capacity must be at least 1".to_string()));
        }
        if self.min_split_size == 0 {
            return Err(Error::Config("min_split_size must be at least 1".to_string()));
        }
        if self.member_predicate.is_empty() || self.timestamp_path.is_empty() {
            return Err(Error::Config(
                "member_predicate and timestamp_path must not be empty".to_string(),
            ));
        }
        self.prefix_table()?;
        Ok(())
    }

    pub fn capacity(&self) -> Capacity {
        Capacity::from(self.capacity)
    }

    pub fn shape_namespace(&self) -> String {
        self.shape_namespace
            .clone()
            .unwrap_or_else(|| format!("{}shape#", self.base_url))
    }

    /// Built-in prefixes extended with the configured ones.
    pub fn prefix_table(&self) -> Result<PrefixTable> {
        PrefixTable::default_ldes().extended_with(self.prefixes.iter().cloned())
    }
}
