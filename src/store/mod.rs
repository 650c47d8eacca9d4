//! Collaborator interfaces for the billing application's persistence layer.
//!
//! The cluster client itself never touches a database; the enclosing
//! application stores VM/LXC configuration templates and storage tags and
//! hands an implementation of these traits to its admin surfaces. The
//! backing schema is the application's business — this module fixes only
//! the record shapes and the operation contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known numeric-setting names read through [`SettingsProvider`].
pub const SETTING_CPU_OVERPROVISION: &str = "cpu_overprovisioning";
pub const SETTING_RAM_OVERPROVISION: &str = "ram_overprovisioning";

/// A reusable QEMU guest configuration template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmConfigTemplate {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// CPU cores granted to guests created from this template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    /// Memory in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
    /// Disk size in GiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_gb: Option<u64>,
}

/// A reusable LXC container configuration template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LxcConfigTemplate {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_gb: Option<u64>,
    /// OS template volume identifier (e.g. a vztmpl reference).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ostemplate: Option<String>,
}

/// A guest on a managed server that is marked as a cloneable template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QemuTemplate {
    pub id: u64,
    /// The managed-server record this template lives on.
    pub server_id: u64,
    /// Display name of that server, resolved at listing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub vmid: u32,
    pub name: String,
}

/// A typed tag, e.g. a storage class such as `ssd` or `hdd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageTag {
    pub id: u64,
    /// The tag namespace (the original data model calls this `type`).
    pub kind: String,
    pub name: String,
}

/// Failures surfaced by a store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Type alias for results that may fail with a [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam for templates and tags, implemented by the billing
/// application on top of its own ORM.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// All VM configuration templates.
    async fn vm_templates(&self) -> StoreResult<Vec<VmConfigTemplate>>;

    /// All LXC configuration templates.
    async fn lxc_templates(&self) -> StoreResult<Vec<LxcConfigTemplate>>;

    /// All cloneable QEMU templates, with `server_name` resolved.
    async fn qemu_templates(&self) -> StoreResult<Vec<QemuTemplate>>;

    /// A single VM configuration template.
    async fn vm_template(&self, id: u64) -> StoreResult<Option<VmConfigTemplate>>;

    /// A single LXC configuration template.
    async fn lxc_template(&self, id: u64) -> StoreResult<Option<LxcConfigTemplate>>;

    /// Tags of one kind.
    async fn tags(&self, kind: &str) -> StoreResult<Vec<StorageTag>>;

    /// Returns the existing tag for `(kind, name)` or creates it.
    async fn save_tag(&self, kind: &str, name: &str) -> StoreResult<StorageTag>;

    /// The tag names attached to one storage record.
    async fn storage_tags(&self, storage_id: u64) -> StoreResult<Vec<String>>;
}

/// Named numeric settings exposed by the billing application's
/// configuration (e.g. overprovisioning ratios).
pub trait SettingsProvider: Send + Sync {
    /// Returns the setting value, or `None` when it is not configured.
    fn numeric_setting(&self, name: &str) -> Option<f64>;
}
