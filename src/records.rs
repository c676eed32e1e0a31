//! Raw asset records
//!
//! A `RawRecord` is an opaque resource descriptor as emitted by an asset
//! inventory export: a name, a type tag and an unparsed JSON payload. The
//! payload is only parsed on demand through [`RawRecord::attributes`], and
//! the parse is memoized on the record itself.

use crate::attributes::Attributes;
use crate::error::{CostctlError, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Resource kinds understood by the reconciliation builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Instance,
    Disk,
    RegionalDisk,
    Image,
    Network,
    Subnetwork,
    Firewall,
    Route,
    ServiceAccount,
    ServiceAccountKey,
    Service,
}

impl AssetKind {
    pub const ALL: [AssetKind; 11] = [
        AssetKind::Instance,
        AssetKind::Disk,
        AssetKind::RegionalDisk,
        AssetKind::Image,
        AssetKind::Network,
        AssetKind::Subnetwork,
        AssetKind::Firewall,
        AssetKind::Route,
        AssetKind::ServiceAccount,
        AssetKind::ServiceAccountKey,
        AssetKind::Service,
    ];

    /// Map an asset inventory type tag to a kind
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            "compute.googleapis.com/Instance" => Some(AssetKind::Instance),
            "compute.googleapis.com/Disk" => Some(AssetKind::Disk),
            "compute.googleapis.com/RegionDisk" => Some(AssetKind::RegionalDisk),
            "compute.googleapis.com/Image" => Some(AssetKind::Image),
            "compute.googleapis.com/Network" => Some(AssetKind::Network),
            "compute.googleapis.com/Subnetwork" => Some(AssetKind::Subnetwork),
            "compute.googleapis.com/Firewall" => Some(AssetKind::Firewall),
            "compute.googleapis.com/Route" => Some(AssetKind::Route),
            "iam.googleapis.com/ServiceAccount" => Some(AssetKind::ServiceAccount),
            "iam.googleapis.com/ServiceAccountKey" => Some(AssetKind::ServiceAccountKey),
            "serviceusage.googleapis.com/Service" => Some(AssetKind::Service),
            _ => None,
        }
    }

    pub fn type_tag(self) -> &'static str {
        match self {
            AssetKind::Instance => "compute.googleapis.com/Instance",
            AssetKind::Disk => "compute.googleapis.com/Disk",
            AssetKind::RegionalDisk => "compute.googleapis.com/RegionDisk",
            AssetKind::Image => "compute.googleapis.com/Image",
            AssetKind::Network => "compute.googleapis.com/Network",
            AssetKind::Subnetwork => "compute.googleapis.com/Subnetwork",
            AssetKind::Firewall => "compute.googleapis.com/Firewall",
            AssetKind::Route => "compute.googleapis.com/Route",
            AssetKind::ServiceAccount => "iam.googleapis.com/ServiceAccount",
            AssetKind::ServiceAccountKey => "iam.googleapis.com/ServiceAccountKey",
            AssetKind::Service => "serviceusage.googleapis.com/Service",
        }
    }
}

/// Opaque resource descriptor
#[derive(Debug)]
pub struct RawRecord {
    name: String,
    asset_type: String,
    payload: String,
    parsed: OnceCell<Attributes>,
}

impl RawRecord {
    pub fn new(
        name: impl Into<String>,
        asset_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            asset_type: asset_type.into(),
            payload: payload.into(),
            parsed: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn kind(&self) -> Option<AssetKind> {
        AssetKind::from_type_tag(&self.asset_type)
    }

    /// Parsed attributes, computed on first access
    pub fn attributes(&self) -> Result<&Attributes> {
        self.parsed
            .get_or_try_init(|| Attributes::parse(&self.name, &self.payload))
    }

    /// Whether the payload has been parsed yet
    pub fn is_parsed(&self) -> bool {
        self.parsed.get().is_some()
    }
}

impl Clone for RawRecord {
    fn clone(&self) -> Self {
        Self::new(self.name.clone(), self.asset_type.clone(), self.payload.clone())
    }
}

impl PartialEq for RawRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.asset_type == other.asset_type
            && self.payload == other.payload
    }
}

/// One entry of an asset inventory JSON export
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportedAsset {
    name: String,
    #[serde(default)]
    asset_type: String,
    #[serde(default)]
    resource: Option<ExportedResource>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportedResource {
    #[serde(default)]
    data: serde_json::Value,
}

/// Parse an asset inventory export (a JSON array of assets)
pub fn parse_records(content: &str) -> Result<Vec<RawRecord>> {
    let assets: Vec<ExportedAsset> = serde_json::from_str(content)?;
    let records: Vec<RawRecord> = assets
        .into_iter()
        .map(|asset| {
            let payload = match asset.resource {
                Some(resource) if !resource.data.is_null() => resource.data.to_string(),
                _ => "{}".to_string(),
            };
            RawRecord::new(asset.name, asset.asset_type, payload)
        })
        .collect();
    debug!("Parsed {} asset records", records.len());
    Ok(records)
}

/// Load an asset inventory export from disk
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CostctlError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read assets {}: {}", path.display(), e),
        ))
    })?;
    parse_records(&content)
}

/// Serialize records back into the export format
pub fn records_to_json(records: &[RawRecord]) -> Result<String> {
    let assets = records
        .iter()
        .map(|r| {
            Ok(ExportedAsset {
                name: r.name.clone(),
                asset_type: r.asset_type.clone(),
                resource: Some(ExportedResource {
                    data: serde_json::from_str(&r.payload).map_err(|e| {
                        CostctlError::MalformedPayload {
                            record: r.name.clone(),
                            reason: e.to_string(),
                        }
                    })?,
                }),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&assets)?)
}
