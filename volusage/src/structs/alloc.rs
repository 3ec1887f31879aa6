//! Allocation and job types.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Claimant;

/// Unique allocation identifier (UUID string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocID(String);

impl AllocID {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random allocation ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AllocID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AllocID {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AllocID {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Job definition an allocation was scheduled from.
///
/// Can be large; allocations share it through an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub task_groups: Vec<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Client-side status of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocClientStatus {
    #[default]
    Pending,
    Running,
    Complete,
    Failed,
    Lost,
}

/// A scheduled workload instance.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub id: AllocID,
    pub namespace: String,
    pub node_id: String,
    pub task_group: String,
    pub client_status: AllocClientStatus,
    pub job: Option<Arc<Job>>,
}

impl Allocation {
    /// Create an allocation in the `default` namespace with no job attached.
    pub fn new(id: impl Into<AllocID>) -> Self {
        Self {
            id: id.into(),
            namespace: "default".to_string(),
            node_id: String::new(),
            task_group: String::new(),
            client_status: AllocClientStatus::default(),
            job: None,
        }
    }

    pub fn with_job(mut self, job: Arc<Job>) -> Self {
        self.namespace = job.namespace.clone();
        self.job = Some(job);
        self
    }

    /// Clone the allocation without its job reference.
    pub fn copy_skip_job(&self) -> Self {
        Self {
            id: self.id.clone(),
            namespace: self.namespace.clone(),
            node_id: self.node_id.clone(),
            task_group: self.task_group.clone(),
            client_status: self.client_status,
            job: None,
        }
    }
}

impl Claimant for Allocation {
    fn claim_id(&self) -> &AllocID {
        &self.id
    }

    fn detached_copy(&self) -> Self {
        self.copy_skip_job()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_job() -> Arc<Job> {
        Arc::new(Job {
            id: "web".to_string(),
            name: "web".to_string(),
            namespace: "prod".to_string(),
            task_groups: vec!["frontend".to_string()],
            meta: BTreeMap::new(),
        })
    }

    #[test]
    fn test_generate_ids_are_unique() {
        let a = AllocID::generate();
        let b = AllocID::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_copy_skip_job_drops_job_reference() {
        let job = test_job();
        let alloc = Allocation::new("a1").with_job(job.clone());
        assert_eq!(Arc::strong_count(&job), 2);

        let copy = alloc.copy_skip_job();
        assert!(copy.job.is_none());
        assert_eq!(copy.id, alloc.id);
        assert_eq!(copy.namespace, "prod");
        assert_eq!(Arc::strong_count(&job), 2);

        drop(alloc);
        assert_eq!(Arc::strong_count(&job), 1);
    }

    #[test]
    fn test_client_status_serializes_lowercase() {
        let json = serde_json::to_string(&AllocClientStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
        assert_eq!(AllocClientStatus::default(), AllocClientStatus::Pending);
    }

    #[test]
    fn test_alloc_id_serializes_as_plain_string() {
        let id = AllocID::new("a1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a1\"");
    }
}
