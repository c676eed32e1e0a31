//! Re-serialize a graph into raw records
//!
//! The payloads carry exactly the fields the builder reads, so rebuilding
//! from the exported records yields an equal graph.

use super::types::*;
use crate::attributes::Location;
use crate::records::{AssetKind, RawRecord};
use crate::utils::short_name;
use serde_json::{json, Map, Value};

const COMPUTE_ASSET: &str = "//compute.googleapis.com/";
const IAM_ASSET: &str = "//iam.googleapis.com/";
const SERVICE_USAGE_ASSET: &str = "//serviceusage.googleapis.com/";
const COMPUTE_API: &str = "https://www.googleapis.com/compute/v1/";

fn record(prefix: &str, name: &str, kind: AssetKind, payload: Value) -> RawRecord {
    RawRecord::new(format!("{}{}", prefix, name), kind.type_tag(), payload.to_string())
}

fn location_fields(location: &Location, payload: &mut Map<String, Value>) {
    match location {
        Location::Region(region) => {
            payload.insert("region".to_string(), json!(region));
        }
        Location::Zone { zone, .. } => {
            payload.insert("zone".to_string(), json!(zone));
        }
        Location::MultiRegion(regions) => {
            payload.insert("storageLocations".to_string(), json!(regions));
        }
    }
}

fn with_location(location: &Location, value: Value) -> Value {
    let mut payload = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    location_fields(location, &mut payload);
    Value::Object(payload)
}

/// API URL for a `projects/...` path; other references are written as stored
fn api_url(path: &str) -> String {
    if path.starts_with("projects/") {
        format!("{}{}", COMPUTE_API, path)
    } else {
        path.to_string()
    }
}

impl ResourceGraph {
    /// Export every entity as a raw record
    pub fn to_records(&self) -> Vec<RawRecord> {
        let mut records = Vec::new();

        for network in &self.networks {
            records.push(record(
                COMPUTE_ASSET,
                &network.name,
                AssetKind::Network,
                json!({ "name": short_name(&network.name) }),
            ));
            let parent = api_url(&network.name);
            for subnetwork in &network.subnetworks {
                records.push(record(
                    COMPUTE_ASSET,
                    &subnetwork.name,
                    AssetKind::Subnetwork,
                    json!({
                        "network": parent,
                        "region": subnetwork.region,
                        "ipCidrRange": subnetwork.ip_cidr_range,
                    }),
                ));
            }
            for firewall in &network.firewalls {
                records.push(record(
                    COMPUTE_ASSET,
                    &firewall.name,
                    AssetKind::Firewall,
                    json!({
                        "network": parent,
                        "direction": firewall.direction,
                        "disabled": firewall.disabled,
                    }),
                ));
            }
            for route in &network.routes {
                records.push(record(
                    COMPUTE_ASSET,
                    &route.name,
                    AssetKind::Route,
                    json!({
                        "network": parent,
                        "destRange": route.dest_range,
                        "priority": route.priority,
                    }),
                ));
            }
        }

        for instance in &self.instances {
            records.push(instance_record(instance));
        }

        for disk in &self.disks {
            let kind = if disk.regional {
                AssetKind::RegionalDisk
            } else {
                AssetKind::Disk
            };
            let mut payload = json!({
                "sizeGb": disk.size_gb.to_string(),
                "type": format!("diskTypes/{}", disk.disk_type),
                "licenses": disk.licenses,
            });
            if let Some(source) = &disk.source_image {
                payload["sourceImage"] = json!(api_url(source));
            }
            records.push(record(
                COMPUTE_ASSET,
                &disk.name,
                kind,
                with_location(&disk.location, payload),
            ));
            for image in &disk.images {
                records.push(image_record(image, Some(&disk.name)));
            }
        }

        for image in &self.images {
            records.push(image_record(image, None));
        }

        for account in &self.service_accounts {
            records.push(record(
                IAM_ASSET,
                &account.name,
                AssetKind::ServiceAccount,
                json!({ "email": account.email }),
            ));
            for key in &account.keys {
                records.push(record(
                    IAM_ASSET,
                    &key.name,
                    AssetKind::ServiceAccountKey,
                    json!({ "keyType": key.key_type }),
                ));
            }
        }

        for service in &self.services {
            let state = if service.enabled { "ENABLED" } else { "DISABLED" };
            records.push(record(
                SERVICE_USAGE_ASSET,
                &service.name,
                AssetKind::Service,
                json!({ "state": state }),
            ));
        }

        records
    }
}

fn instance_record(instance: &Instance) -> RawRecord {
    let interfaces: Vec<Value> = instance
        .interfaces
        .iter()
        .map(|iface| {
            let mut value = json!({
                "network": api_url(&iface.network),
                "subnetwork": api_url(&iface.subnetwork),
            });
            if let Some(tier) = iface.tier {
                value["accessConfigs"] = json!([{ "networkTier": tier.as_str() }]);
            }
            value
        })
        .collect();

    let disks = match &instance.license {
        Some(license) => json!([{ "licenses": [license] }]),
        None => json!([]),
    };
    let scheduling = match instance.preemptible {
        Some(preemptible) => json!({ "preemptible": preemptible }),
        None => json!({}),
    };

    let payload = json!({
        "machineType": format!("machineTypes/{}", instance.machine_type),
        "scheduling": scheduling,
        "disks": disks,
        "networkInterfaces": interfaces,
    });
    record(
        COMPUTE_ASSET,
        &instance.name,
        AssetKind::Instance,
        with_location(&instance.location, payload),
    )
}

fn image_record(image: &Image, source_disk: Option<&str>) -> RawRecord {
    let mut payload = json!({
        "diskSizeGb": image.size_gb.to_string(),
        "licenses": image.licenses,
    });
    if let Some(disk) = source_disk {
        payload["sourceDisk"] = json!(api_url(disk));
    }
    record(
        COMPUTE_ASSET,
        &image.name,
        AssetKind::Image,
        with_location(&image.location, payload),
    )
}
