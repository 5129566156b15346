//! Companion Azure provisioning script
//!
//! When both a subscription and an explicit resource group are known, the
//! generator also emits a bash script that creates the storage account,
//! containers and federated identity the manifest expects. The script is
//! only written, never executed.

use crate::manifest::generator::{SERVICE_ACCOUNT_NAME, TARGET_NAMESPACE};
use crate::manifest::values::{ADMIN_CONTAINER, CHUNKS_CONTAINER, RULER_CONTAINER};
use crate::manifest::ValidatedRequest;
use crate::utils::interactive::SetupHelper;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_LOCATION: &str = "eastus";
pub const IDENTITY_NAME: &str = "loki-identity";
pub const FEDERATED_CREDENTIAL_NAME: &str = "loki-federated";
const BLOB_CONTRIBUTOR_ROLE: &str = "Storage Blob Data Contributor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningScript {
    pub subscription_id: String,
    pub resource_group: String,
    pub storage_account: String,
    pub client_id: String,
    pub location: String,
}

impl ProvisioningScript {
    /// Build the script parameters, or `None` unless both the subscription
    /// and the resource group were supplied by the caller. Names Azure would
    /// reject also suppress the script.
    pub fn for_request(request: &ValidatedRequest, location: &str) -> Option<Self> {
        if !request.resource_group_supplied {
            return None;
        }
        let subscription_id = request.subscription_id.clone()?;

        let checks = [
            ("storage account", SetupHelper::validate_storage_account_name(&request.storage_account)),
            ("resource group", SetupHelper::validate_resource_group_name(&request.resource_group)),
        ];
        for (field, check) in checks {
            if let Err(reason) = check {
                warn!(field = field, "Skipping provisioning script: {reason}");
                return None;
            }
        }

        Some(Self {
            subscription_id,
            resource_group: request.resource_group.clone(),
            storage_account: request.storage_account.clone(),
            client_id: request.client_id.clone(),
            location: if location.trim().is_empty() {
                DEFAULT_LOCATION.to_string()
            } else {
                location.trim().to_string()
            },
        })
    }

    /// Script path derived from the manifest path: `dir/<stem>-provision.sh`
    pub fn path_for(manifest_path: &Path) -> PathBuf {
        let stem = manifest_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("loki");
        manifest_path.with_file_name(format!("{stem}-provision.sh"))
    }

    pub fn render(&self) -> String {
        let subject = format!("system:serviceaccount:{TARGET_NAMESPACE}:{SERVICE_ACCOUNT_NAME}");
        format!(
            r#"#!/usr/bin/env bash
# Provisions Azure resources for the Loki deployment manifest.
# Requires: az CLI logged in, AKS_CLUSTER_NAME set to the target cluster.
set -euo pipefail

SUBSCRIPTION_ID={subscription}
RESOURCE_GROUP={group}
LOCATION={location}
STORAGE_ACCOUNT={account}
CLIENT_ID={client}
IDENTITY_NAME={identity}
AKS_CLUSTER_NAME="${{AKS_CLUSTER_NAME:?set AKS_CLUSTER_NAME to the target AKS cluster}}"

az account set --subscription "$SUBSCRIPTION_ID"

az group create --name "$RESOURCE_GROUP" --location "$LOCATION" --output none

az storage account create \
  --name "$STORAGE_ACCOUNT" \
  --resource-group "$RESOURCE_GROUP" \
  --location "$LOCATION" \
  --sku Standard_LRS \
  --kind StorageV2 \
  --allow-blob-public-access false \
  --output none

for container in {chunks} {ruler} {admin}; do
  az storage container create \
    --name "$container" \
    --account-name "$STORAGE_ACCOUNT" \
    --auth-mode login \
    --output none
done

az identity create --name "$IDENTITY_NAME" --resource-group "$RESOURCE_GROUP" --location "$LOCATION" --output none
PRINCIPAL_ID="$(az identity show --name "$IDENTITY_NAME" --resource-group "$RESOURCE_GROUP" --query principalId -o tsv)"
IDENTITY_CLIENT_ID="$(az identity show --name "$IDENTITY_NAME" --resource-group "$RESOURCE_GROUP" --query clientId -o tsv)"
if [ "$IDENTITY_CLIENT_ID" != "$CLIENT_ID" ]; then
  echo "warning: identity client id $IDENTITY_CLIENT_ID differs from manifest client id $CLIENT_ID" >&2
fi

STORAGE_SCOPE="$(az storage account show --name "$STORAGE_ACCOUNT" --resource-group "$RESOURCE_GROUP" --query id -o tsv)"
az role assignment create \
  --assignee-object-id "$PRINCIPAL_ID" \
  --assignee-principal-type ServicePrincipal \
  --role "{role}" \
  --scope "$STORAGE_SCOPE" \
  --output none

OIDC_ISSUER="$(az aks show --name "$AKS_CLUSTER_NAME" --resource-group "$RESOURCE_GROUP" --query oidcIssuerProfile.issuerUrl -o tsv)"
az identity federated-credential create \
  --name "{federated}" \
  --identity-name "$IDENTITY_NAME" \
  --resource-group "$RESOURCE_GROUP" \
  --issuer "$OIDC_ISSUER" \
  --subject "{subject}" \
  --audience api://AzureADTokenExchange \
  --output none

echo "Provisioning complete for storage account $STORAGE_ACCOUNT"
"#,
            subscription = shell_quote(&self.subscription_id),
            group = shell_quote(&self.resource_group),
            location = shell_quote(&self.location),
            account = shell_quote(&self.storage_account),
            client = shell_quote(&self.client_id),
            identity = shell_quote(IDENTITY_NAME),
            chunks = CHUNKS_CONTAINER,
            ruler = RULER_CONTAINER,
            admin = ADMIN_CONTAINER,
            role = BLOB_CONTRIBUTOR_ROLE,
            federated = FEDERATED_CREDENTIAL_NAME,
            subject = subject,
        )
    }
}

/// Single-quote a value for a bash assignment
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DeploymentMode;

    fn request(subscription: Option<&str>, group_supplied: bool) -> ValidatedRequest {
        ValidatedRequest {
            storage_account: "acct1".to_string(),
            client_id: "cid-123".to_string(),
            subscription_id: subscription.map(String::from),
            resource_group: "rg-observability".to_string(),
            resource_group_supplied: group_supplied,
            mode: DeploymentMode::SingleBinary,
            output_path: PathBuf::from("deploy/loki.yaml"),
        }
    }

    #[test]
    fn test_trigger_requires_both_fields() {
        assert!(ProvisioningScript::for_request(&request(Some("sub"), true), "eastus").is_some());
        assert!(ProvisioningScript::for_request(&request(None, true), "eastus").is_none());
        assert!(ProvisioningScript::for_request(&request(Some("sub"), false), "eastus").is_none());
        assert!(ProvisioningScript::for_request(&request(None, false), "eastus").is_none());
    }

    #[test]
    fn test_blank_location_falls_back() {
        let script = ProvisioningScript::for_request(&request(Some("sub"), true), "  ").unwrap();
        assert_eq!(script.location, DEFAULT_LOCATION);
    }

    #[test]
    fn test_script_path() {
        assert_eq!(
            ProvisioningScript::path_for(Path::new("deploy/loki.yaml")),
            PathBuf::from("deploy/loki-provision.sh")
        );
        assert_eq!(
            ProvisioningScript::path_for(Path::new("app.yaml")),
            PathBuf::from("app-provision.sh")
        );
    }

    #[test]
    fn test_script_is_parameterized() {
        let script = ProvisioningScript::for_request(&request(Some("sub-42"), true), "westeurope")
            .unwrap()
            .render();
        assert!(script.starts_with("#!/usr/bin/env bash"));
        assert!(script.contains("SUBSCRIPTION_ID='sub-42'"));
        assert!(script.contains("RESOURCE_GROUP='rg-observability'"));
        assert!(script.contains("LOCATION='westeurope'"));
        assert!(script.contains("STORAGE_ACCOUNT='acct1'"));
        assert!(script.contains("for container in chunks ruler admin; do"));
        assert!(script.contains("system:serviceaccount:loki:loki"));
        assert!(script.contains("${AKS_CLUSTER_NAME:?"));
    }

    #[test]
    fn test_invalid_names_suppress_script() {
        let mut hostile_account = request(Some("sub"), true);
        hostile_account.storage_account = r#"acct"; touch /tmp/owned; echo ""#.to_string();
        assert!(ProvisioningScript::for_request(&hostile_account, "eastus").is_none());

        let mut hostile_group = request(Some("sub"), true);
        hostile_group.resource_group = "rg$(id)".to_string();
        assert!(ProvisioningScript::for_request(&hostile_group, "eastus").is_none());
    }

    #[test]
    fn test_values_are_single_quoted() {
        let script = ProvisioningScript {
            subscription_id: "sub`id`".to_string(),
            resource_group: "rg-obs".to_string(),
            storage_account: "acct1".to_string(),
            client_id: "cid$(id)".to_string(),
            location: "west'; rm -rf ~; echo '".to_string(),
        }
        .render();

        assert!(script.contains("SUBSCRIPTION_ID='sub`id`'\n"));
        assert!(script.contains("CLIENT_ID='cid$(id)'\n"));
        assert!(script.contains(r#"LOCATION='west'\''; rm -rf ~; echo '\'''"#));
        assert!(!script.contains("\"cid$(id)\""));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
