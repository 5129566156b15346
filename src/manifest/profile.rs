//! Static per-mode sizing table

use super::request::DeploymentMode;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceQuantity {
    pub cpu: &'static str,
    pub memory: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceRequirements {
    pub requests: ResourceQuantity,
    pub limits: ResourceQuantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentSizing {
    pub replicas: u32,
    pub resources: ResourceRequirements,
}

/// Replica counts and resource envelopes for every Loki component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceProfile {
    pub mode: DeploymentMode,
    pub replication_factor: u32,
    pub single_binary: ComponentSizing,
    pub ingester: ComponentSizing,
    pub querier: ComponentSizing,
    pub distributor: ComponentSizing,
    pub compactor: ComponentSizing,
    pub query_frontend: ComponentSizing,
    pub query_scheduler: ComponentSizing,
    pub index_gateway: ComponentSizing,
    pub gateway: ComponentSizing,
}

const fn sizing(
    replicas: u32,
    request_cpu: &'static str,
    request_memory: &'static str,
    limit_cpu: &'static str,
    limit_memory: &'static str,
) -> ComponentSizing {
    ComponentSizing {
        replicas,
        resources: ResourceRequirements {
            requests: ResourceQuantity {
                cpu: request_cpu,
                memory: request_memory,
            },
            limits: ResourceQuantity {
                cpu: limit_cpu,
                memory: limit_memory,
            },
        },
    }
}

static SINGLE_BINARY_PROFILE: ResourceProfile = ResourceProfile {
    mode: DeploymentMode::SingleBinary,
    replication_factor: 1,
    single_binary: sizing(1, "500m", "1Gi", "2", "4Gi"),
    ingester: sizing(0, "250m", "512Mi", "1", "2Gi"),
    querier: sizing(0, "250m", "512Mi", "1", "2Gi"),
    distributor: sizing(0, "100m", "256Mi", "500m", "1Gi"),
    compactor: sizing(0, "100m", "256Mi", "500m", "1Gi"),
    query_frontend: sizing(0, "100m", "256Mi", "500m", "1Gi"),
    query_scheduler: sizing(0, "100m", "128Mi", "250m", "512Mi"),
    index_gateway: sizing(0, "100m", "256Mi", "500m", "1Gi"),
    gateway: sizing(0, "50m", "64Mi", "200m", "256Mi"),
};

static DISTRIBUTED_PROFILE: ResourceProfile = ResourceProfile {
    mode: DeploymentMode::Distributed,
    replication_factor: 3,
    single_binary: sizing(0, "500m", "1Gi", "2", "4Gi"),
    ingester: sizing(3, "500m", "2Gi", "2", "4Gi"),
    querier: sizing(3, "500m", "1Gi", "2", "4Gi"),
    distributor: sizing(3, "250m", "512Mi", "1", "1Gi"),
    compactor: sizing(1, "250m", "512Mi", "1", "2Gi"),
    query_frontend: sizing(2, "250m", "512Mi", "1", "1Gi"),
    query_scheduler: sizing(2, "100m", "128Mi", "500m", "512Mi"),
    index_gateway: sizing(2, "250m", "512Mi", "1", "2Gi"),
    gateway: sizing(2, "100m", "128Mi", "500m", "512Mi"),
};

/// Look up the sizing table for a deployment mode
pub fn resolve_profile(mode: DeploymentMode) -> &'static ResourceProfile {
    match mode {
        DeploymentMode::SingleBinary => &SINGLE_BINARY_PROFILE,
        DeploymentMode::Distributed => &DISTRIBUTED_PROFILE,
    }
}

/// One row of the sizing table, for console display
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ComponentRow {
    #[tabled(rename = "Component")]
    pub component: &'static str,
    #[tabled(rename = "Replicas")]
    pub replicas: u32,
    #[tabled(rename = "CPU Request")]
    pub cpu_request: &'static str,
    #[tabled(rename = "Memory Request")]
    pub memory_request: &'static str,
    #[tabled(rename = "CPU Limit")]
    pub cpu_limit: &'static str,
    #[tabled(rename = "Memory Limit")]
    pub memory_limit: &'static str,
}

impl ResourceProfile {
    /// Components in chart order, paired with their values key
    pub fn components(&self) -> [(&'static str, &ComponentSizing); 9] {
        [
            ("singleBinary", &self.single_binary),
            ("ingester", &self.ingester),
            ("querier", &self.querier),
            ("distributor", &self.distributor),
            ("compactor", &self.compactor),
            ("queryFrontend", &self.query_frontend),
            ("queryScheduler", &self.query_scheduler),
            ("indexGateway", &self.index_gateway),
            ("gateway", &self.gateway),
        ]
    }

    pub fn rows(&self) -> Vec<ComponentRow> {
        self.components()
            .into_iter()
            .map(|(component, sizing)| ComponentRow {
                component,
                replicas: sizing.replicas,
                cpu_request: sizing.resources.requests.cpu,
                memory_request: sizing.resources.requests.memory,
                cpu_limit: sizing.resources.limits.cpu,
                memory_limit: sizing.resources.limits.memory,
            })
            .collect()
    }
}
