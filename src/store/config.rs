use serde::{Deserialize, Serialize};

/// When store writes are flushed to stable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Leave flushing to the operating system
    Never,
    /// Sync once when the dataset is closed
    #[default]
    OnClose,
    /// Sync after every appended record (slowest, survives power loss per record)
    EveryRecord,
}

/// Configuration for opening or creating a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Flush policy
    pub sync: SyncPolicy,

    /// Create missing parent directories when creating a store
    pub create_parent_dirs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sync: SyncPolicy::OnClose,
            create_parent_dirs: false,
        }
    }
}

impl StoreConfig {
    /// Sync every record before `append` returns
    pub fn durable() -> Self {
        Self {
            sync: SyncPolicy::EveryRecord,
            ..Self::default()
        }
    }

    /// Never sync explicitly (fastest, for scratch data)
    pub fn fast_write() -> Self {
        Self {
            sync: SyncPolicy::Never,
            ..Self::default()
        }
    }

    /// Set the sync policy
    pub fn with_sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }

    /// Create missing parent directories
    pub fn with_parent_dirs(mut self, create: bool) -> Self {
        self.create_parent_dirs = create;
        self
    }
}
