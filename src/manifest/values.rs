//! Helm values payload for the `grafana/loki` chart

use super::profile::ResourceRequirements;
use super::request::DeploymentMode;
use serde::Serialize;
use std::collections::BTreeMap;

pub const WORKLOAD_IDENTITY_CLIENT_ID_ANNOTATION: &str = "azure.workload.identity/client-id";
pub const WORKLOAD_IDENTITY_USE_LABEL: &str = "azure.workload.identity/use";

pub const CHUNKS_CONTAINER: &str = "chunks";
pub const RULER_CONTAINER: &str = "ruler";
pub const ADMIN_CONTAINER: &str = "admin";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LokiValues {
    pub deployment_mode: DeploymentMode,
    pub loki: LokiConfig,
    pub single_binary: ComponentValues,
    pub ingester: ComponentValues,
    pub querier: ComponentValues,
    pub distributor: ComponentValues,
    pub compactor: ComponentValues,
    pub query_frontend: ComponentValues,
    pub query_scheduler: ComponentValues,
    pub index_gateway: ComponentValues,
    pub gateway: GatewayValues,
    pub backend: ReplicaCount,
    pub read: ReplicaCount,
    pub write: ReplicaCount,
    pub minio: Toggle,
    pub service_account: ServiceAccountValues,
    pub pod_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LokiConfig {
    #[serde(rename = "auth_enabled")]
    pub auth_enabled: bool,
    pub common_config: CommonConfig,
    pub storage: StorageValues,
    pub schema_config: SchemaConfig,
    pub ingester: IngesterConfig,
    pub compactor: CompactorConfig,
    pub ruler_config: RulerConfig,
    pub querier: QuerierConfig,
    #[serde(rename = "limits_config")]
    pub limits_config: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonConfig {
    pub replication_factor: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageValues {
    #[serde(rename = "type")]
    pub kind: String,
    pub bucket_names: BucketNames,
    pub azure: AzureStorage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketNames {
    pub chunks: String,
    pub ruler: String,
    pub admin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureStorage {
    pub account_name: String,
    pub use_federated_token: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaConfig {
    pub configs: Vec<PeriodConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodConfig {
    pub from: String,
    pub store: String,
    pub object_store: String,
    pub schema: String,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexConfig {
    pub prefix: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngesterConfig {
    pub chunk_encoding: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactorConfig {
    pub retention_enabled: bool,
    pub delete_request_store: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerConfig {
    pub enable_api: bool,
    pub storage: RulerStorage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerStorage {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerierConfig {
    pub max_concurrent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitsConfig {
    pub retention_period: String,
    pub allow_structured_metadata: bool,
    pub volume_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentValues {
    pub replicas: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_aware_replication: Option<Toggle>,
    pub resources: ResourceRequirements,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayValues {
    pub enabled: bool,
    pub replicas: u32,
    pub resources: ResourceRequirements,
    pub service: ServiceValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceType {
    ClusterIP,
    LoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceValues {
    #[serde(rename = "type")]
    pub kind: ServiceType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicaCount {
    pub replicas: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toggle {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceAccountValues {
    pub create: bool,
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}
