//! Manifest rendering and serialization
//!
//! `render_at` is a pure function of its inputs. The pipeline
//! (`validate → resolve_profile → render → serialize`) is wrapped by
//! `generate`, which also prepares the optional provisioning script. Nothing
//! in this module touches the filesystem.

use super::models::*;
use super::profile::{resolve_profile, ComponentSizing, ResourceProfile};
use super::request::{validate, DeploymentMode, DeploymentRequest, ValidatedRequest};
use super::values::*;
use crate::error::{LokigenError, Result};
use crate::provision::ProvisioningScript;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

pub const APPLICATION_NAME: &str = "loki";
pub const ARGOCD_NAMESPACE: &str = "argocd";
pub const ARGOCD_PROJECT: &str = "default";
pub const TARGET_SERVER: &str = "https://kubernetes.default.svc";
pub const TARGET_NAMESPACE: &str = "loki";
pub const SERVICE_ACCOUNT_NAME: &str = "loki";

pub const CHART_REPOSITORY: &str = "https://grafana.github.io/helm-charts";
pub const CHART_NAME: &str = "loki";
pub const CHART_VERSION: &str = "6.16.0";

pub const OBJECT_STORE: &str = "azure";
pub const INDEX_STORE: &str = "tsdb";
pub const SCHEMA_VERSION: &str = "v13";
pub const SCHEMA_FROM: &str = "2024-04-01";
pub const INDEX_PREFIX: &str = "loki_index_";
pub const INDEX_PERIOD: &str = "24h";

pub const ANNOTATION_DESCRIPTION: &str = "lokigen.io/description";
pub const ANNOTATION_GENERATED_AT: &str = "lokigen.io/generated-at";
pub const ANNOTATION_STORAGE_ACCOUNT: &str = "lokigen.io/storage-account";

const ARGOCD_FINALIZER: &str = "resources-finalizer.argocd.argoproj.io";

/// Render the manifest stamped with the current time
pub fn render(request: &ValidatedRequest, profile: &ResourceProfile) -> Result<DeploymentManifest> {
    render_at(request, profile, Utc::now())
}

/// Render the manifest with an explicit generation timestamp
pub fn render_at(
    request: &ValidatedRequest,
    profile: &ResourceProfile,
    generated_at: DateTime<Utc>,
) -> Result<DeploymentManifest> {
    let values = build_values(request, profile);
    let values_text = encode_yaml(&values)?;

    let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut annotations = BTreeMap::new();
    annotations.insert(
        ANNOTATION_DESCRIPTION.to_string(),
        format!(
            "Grafana Loki ({}) backed by Azure storage account '{}', generated by lokigen {} at {}",
            request.mode,
            request.storage_account,
            env!("CARGO_PKG_VERSION"),
            timestamp
        ),
    );
    annotations.insert(ANNOTATION_GENERATED_AT.to_string(), timestamp);
    annotations.insert(
        ANNOTATION_STORAGE_ACCOUNT.to_string(),
        request.storage_account.clone(),
    );

    let mut labels = BTreeMap::new();
    labels.insert("app.kubernetes.io/name".to_string(), APPLICATION_NAME.to_string());
    labels.insert("app.kubernetes.io/managed-by".to_string(), "lokigen".to_string());

    Ok(Application {
        api_version: ARGOCD_API_VERSION.to_string(),
        kind: ARGOCD_APPLICATION_KIND.to_string(),
        metadata: ObjectMeta {
            name: APPLICATION_NAME.to_string(),
            namespace: ARGOCD_NAMESPACE.to_string(),
            annotations,
            labels,
            finalizers: vec![ARGOCD_FINALIZER.to_string()],
        },
        spec: ApplicationSpec {
            project: ARGOCD_PROJECT.to_string(),
            destination: Destination {
                server: TARGET_SERVER.to_string(),
                namespace: TARGET_NAMESPACE.to_string(),
            },
            source: ApplicationSource {
                repo_url: CHART_REPOSITORY.to_string(),
                chart: CHART_NAME.to_string(),
                target_revision: CHART_VERSION.to_string(),
                helm: HelmSource {
                    release_name: APPLICATION_NAME.to_string(),
                    values: values_text,
                },
            },
            sync_policy: SyncPolicy {
                automated: AutomatedSync {
                    prune: true,
                    self_heal: true,
                },
                sync_options: vec![
                    "CreateNamespace=true".to_string(),
                    "ServerSideApply=true".to_string(),
                ],
            },
        },
    })
}

/// Encode a manifest as YAML text
pub fn serialize(manifest: &DeploymentManifest) -> Result<String> {
    encode_yaml(manifest)
}

fn encode_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| LokigenError::encoding(e.to_string()))
}

/// Build the Helm values payload. The mode decides which side of the
/// topology is scaled; the other side is pinned to zero replicas.
pub fn build_values(request: &ValidatedRequest, profile: &ResourceProfile) -> LokiValues {
    let distributed = request.mode == DeploymentMode::Distributed;

    let component = |sizing: &ComponentSizing, active: bool| ComponentValues {
        replicas: if active { sizing.replicas } else { 0 },
        zone_aware_replication: None,
        resources: sizing.resources,
    };

    let mut ingester = component(&profile.ingester, distributed);
    ingester.zone_aware_replication = Some(Toggle { enabled: false });

    let mut identity_labels = BTreeMap::new();
    identity_labels.insert(WORKLOAD_IDENTITY_USE_LABEL.to_string(), "true".to_string());

    let mut service_account_annotations = BTreeMap::new();
    service_account_annotations.insert(
        WORKLOAD_IDENTITY_CLIENT_ID_ANNOTATION.to_string(),
        request.client_id.clone(),
    );

    LokiValues {
        deployment_mode: request.mode,
        loki: LokiConfig {
            auth_enabled: false,
            common_config: CommonConfig {
                replication_factor: profile.replication_factor,
            },
            storage: StorageValues {
                kind: OBJECT_STORE.to_string(),
                bucket_names: BucketNames {
                    chunks: CHUNKS_CONTAINER.to_string(),
                    ruler: RULER_CONTAINER.to_string(),
                    admin: ADMIN_CONTAINER.to_string(),
                },
                azure: AzureStorage {
                    account_name: request.storage_account.clone(),
                    use_federated_token: true,
                },
            },
            schema_config: SchemaConfig {
                configs: vec![PeriodConfig {
                    from: SCHEMA_FROM.to_string(),
                    store: INDEX_STORE.to_string(),
                    object_store: OBJECT_STORE.to_string(),
                    schema: SCHEMA_VERSION.to_string(),
                    index: IndexConfig {
                        prefix: INDEX_PREFIX.to_string(),
                        period: INDEX_PERIOD.to_string(),
                    },
                }],
            },
            ingester: IngesterConfig {
                chunk_encoding: "snappy".to_string(),
            },
            compactor: CompactorConfig {
                retention_enabled: true,
                delete_request_store: OBJECT_STORE.to_string(),
            },
            ruler_config: RulerConfig {
                enable_api: true,
                storage: RulerStorage {
                    kind: OBJECT_STORE.to_string(),
                },
            },
            querier: QuerierConfig {
                max_concurrent: if distributed { 8 } else { 4 },
            },
            limits_config: LimitsConfig {
                retention_period: "744h".to_string(),
                allow_structured_metadata: true,
                volume_enabled: true,
            },
        },
        single_binary: component(&profile.single_binary, !distributed),
        ingester,
        querier: component(&profile.querier, distributed),
        distributor: component(&profile.distributor, distributed),
        compactor: component(&profile.compactor, distributed),
        query_frontend: component(&profile.query_frontend, distributed),
        query_scheduler: component(&profile.query_scheduler, distributed),
        index_gateway: component(&profile.index_gateway, distributed),
        gateway: GatewayValues {
            enabled: distributed,
            replicas: if distributed { profile.gateway.replicas } else { 0 },
            resources: profile.gateway.resources,
            service: ServiceValues {
                kind: if distributed {
                    ServiceType::LoadBalancer
                } else {
                    ServiceType::ClusterIP
                },
            },
        },
        backend: ReplicaCount { replicas: 0 },
        read: ReplicaCount { replicas: 0 },
        write: ReplicaCount { replicas: 0 },
        minio: Toggle { enabled: false },
        service_account: ServiceAccountValues {
            create: true,
            name: SERVICE_ACCOUNT_NAME.to_string(),
            annotations: service_account_annotations,
            labels: identity_labels.clone(),
        },
        pod_labels: identity_labels,
    }
}

/// One file the generator wants written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
    pub executable: bool,
}

/// Everything produced by a single generator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub request: ValidatedRequest,
    pub manifest: Artifact,
    pub provisioning_script: Option<Artifact>,
}

impl GeneratedArtifacts {
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        std::iter::once(&self.manifest).chain(self.provisioning_script.as_ref())
    }
}

/// Knobs that shape generated artifacts without being part of the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Azure region used by the provisioning script
    pub location: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            location: crate::provision::DEFAULT_LOCATION.to_string(),
        }
    }
}

/// Run the full pipeline, stamping the manifest with the current time
pub fn generate(request: &DeploymentRequest, options: &GeneratorOptions) -> Result<GeneratedArtifacts> {
    generate_at(request, options, Utc::now())
}

/// Run the full pipeline with an explicit generation timestamp
pub fn generate_at(
    request: &DeploymentRequest,
    options: &GeneratorOptions,
    generated_at: DateTime<Utc>,
) -> Result<GeneratedArtifacts> {
    let validated = validate(request)?;
    let profile = resolve_profile(validated.mode);
    debug!(mode = %validated.mode, "Resolved resource profile");

    let manifest = render_at(&validated, profile, generated_at)?;
    let manifest_text = serialize(&manifest)?;

    let provisioning_script = ProvisioningScript::for_request(&validated, &options.location).map(|script| Artifact {
        path: ProvisioningScript::path_for(&validated.output_path),
        contents: script.render(),
        executable: true,
    });

    info!(
        output = %validated.output_path.display(),
        mode = %validated.mode,
        provisioning_script = provisioning_script.is_some(),
        "Rendered Loki deployment manifest"
    );

    Ok(GeneratedArtifacts {
        manifest: Artifact {
            path: validated.output_path.clone(),
            contents: manifest_text,
            executable: false,
        },
        provisioning_script,
        request: validated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn validated(mode: DeploymentMode) -> ValidatedRequest {
        ValidatedRequest {
            storage_account: "acct1".to_string(),
            client_id: "cid-123".to_string(),
            subscription_id: None,
            resource_group: "rg-loki".to_string(),
            resource_group_supplied: false,
            mode,
            output_path: PathBuf::from("out.yaml"),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_single_binary_values() {
        let req = validated(DeploymentMode::SingleBinary);
        let values = build_values(&req, resolve_profile(req.mode));
        assert_eq!(values.single_binary.replicas, 1);
        for replicas in [
            values.ingester.replicas,
            values.querier.replicas,
            values.distributor.replicas,
            values.compactor.replicas,
            values.query_frontend.replicas,
            values.query_scheduler.replicas,
            values.index_gateway.replicas,
            values.gateway.replicas,
        ] {
            assert_eq!(replicas, 0);
        }
        assert!(!values.gateway.enabled);
        assert_eq!(values.gateway.service.kind, ServiceType::ClusterIP);
    }

    #[test]
    fn test_distributed_values() {
        let req = validated(DeploymentMode::Distributed);
        let values = build_values(&req, resolve_profile(req.mode));
        assert_eq!(values.single_binary.replicas, 0);
        assert_eq!(values.ingester.replicas, 3);
        assert!(values.gateway.enabled);
        assert_eq!(values.gateway.service.kind, ServiceType::LoadBalancer);
        assert_eq!(values.loki.common_config.replication_factor, 3);
    }

    #[test]
    fn test_mode_overrides_mismatched_profile() {
        // A distributed profile used for a single-binary request still yields
        // zero distributed replicas.
        let req = validated(DeploymentMode::SingleBinary);
        let values = build_values(&req, resolve_profile(DeploymentMode::Distributed));
        assert_eq!(values.ingester.replicas, 0);
        assert_eq!(values.gateway.replicas, 0);
    }

    #[test]
    fn test_identity_and_storage_wiring() {
        let req = validated(DeploymentMode::SingleBinary);
        let values = build_values(&req, resolve_profile(req.mode));
        assert_eq!(values.loki.storage.azure.account_name, "acct1");
        assert_eq!(values.loki.storage.kind, "azure");
        assert_eq!(
            values.service_account.annotations.get(WORKLOAD_IDENTITY_CLIENT_ID_ANNOTATION).map(String::as_str),
            Some("cid-123")
        );
        assert_eq!(values.loki.schema_config.configs[0].schema, SCHEMA_VERSION);
        assert_eq!(values.loki.schema_config.configs[0].index.period, INDEX_PERIOD);
    }

    #[test]
    fn test_render_is_deterministic_for_fixed_time() {
        let req = validated(DeploymentMode::Distributed);
        let profile = resolve_profile(req.mode);
        let first = serialize(&render_at(&req, profile, fixed_time()).unwrap()).unwrap();
        let second = serialize(&render_at(&req, profile, fixed_time()).unwrap()).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("2025-01-02T03:04:05Z"));
    }

    #[test]
    fn test_metadata_and_source() {
        let req = validated(DeploymentMode::SingleBinary);
        let manifest = render_at(&req, resolve_profile(req.mode), fixed_time()).unwrap();
        assert_eq!(manifest.api_version, ARGOCD_API_VERSION);
        assert_eq!(manifest.kind, "Application");
        assert_eq!(manifest.spec.source.chart, CHART_NAME);
        assert_eq!(manifest.spec.source.target_revision, CHART_VERSION);
        assert!(manifest.metadata.annotations[ANNOTATION_DESCRIPTION].contains("acct1"));
        assert!(manifest.spec.sync_policy.automated.prune);
        assert!(manifest.spec.sync_policy.automated.self_heal);
        assert!(manifest
            .spec
            .sync_policy
            .sync_options
            .contains(&"CreateNamespace=true".to_string()));
    }

    #[test]
    fn test_top_level_key_order() {
        let req = validated(DeploymentMode::SingleBinary);
        let text = serialize(&render_at(&req, resolve_profile(req.mode), fixed_time()).unwrap()).unwrap();
        let position = |key: &str| text.find(key).unwrap_or_else(|| panic!("missing {key}"));
        assert!(position("apiVersion:") < position("kind:"));
        assert!(position("kind:") < position("metadata:"));
        assert!(position("metadata:") < position("spec:"));
        assert!(position("project:") < position("destination:"));
        assert!(position("destination:") < position("source:"));
        assert!(position("source:") < position("syncPolicy:"));
    }

    #[test]
    fn test_generate_without_provisioning_target() {
        let request = DeploymentRequest {
            storage_account: Some("acct1".to_string()),
            client_id: Some("cid-123".to_string()),
            subscription_id: Some("sub".to_string()),
            ..Default::default()
        };
        let artifacts = generate_at(&request, &GeneratorOptions::default(), fixed_time()).unwrap();
        assert!(artifacts.provisioning_script.is_none());
        assert_eq!(artifacts.iter().count(), 1);
        assert!(!artifacts.manifest.executable);
    }
}
