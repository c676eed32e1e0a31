//! Shared asset fixtures for integration tests

#![allow(dead_code)]

use costctl::RawRecord;

pub const NETWORK: &str = "//compute.googleapis.com/projects/demo/global/networks/default";
pub const NETWORK_URL: &str =
    "https://www.googleapis.com/compute/v1/projects/demo/global/networks/default";
pub const SUBNET_US: &str =
    "https://www.googleapis.com/compute/v1/projects/demo/regions/us-east1/subnetworks/default";
pub const SUBNET_EU: &str =
    "https://www.googleapis.com/compute/v1/projects/demo/regions/europe-west1/subnetworks/default";

pub fn network() -> RawRecord {
    RawRecord::new(NETWORK, "compute.googleapis.com/Network", r#"{"name":"default"}"#)
}

pub fn subnetwork(region: &str) -> RawRecord {
    RawRecord::new(
        format!(
            "//compute.googleapis.com/projects/demo/regions/{}/subnetworks/default",
            region
        ),
        "compute.googleapis.com/Subnetwork",
        format!(
            r#"{{"network":"{}","region":"https://www.googleapis.com/compute/v1/projects/demo/regions/{}","ipCidrRange":"10.0.0.0/20"}}"#,
            NETWORK_URL, region
        ),
    )
}

pub fn route(name: &str) -> RawRecord {
    RawRecord::new(
        format!("//compute.googleapis.com/projects/demo/global/routes/{}", name),
        "compute.googleapis.com/Route",
        format!(
            r#"{{"network":"{}","destRange":"0.0.0.0/0","priority":1000}}"#,
            NETWORK_URL
        ),
    )
}

pub fn firewall(name: &str) -> RawRecord {
    RawRecord::new(
        format!("//compute.googleapis.com/projects/demo/global/firewalls/{}", name),
        "compute.googleapis.com/Firewall",
        format!(r#"{{"network":"{}","direction":"INGRESS"}}"#, NETWORK_URL),
    )
}

/// Instance in `zone` on the subnetwork of its region
pub fn instance(
    name: &str,
    zone: &str,
    machine_type: &str,
    preemptible: Option<bool>,
    tier: Option<&str>,
    license: Option<&str>,
) -> RawRecord {
    let region = &zone[..zone.len() - 2];
    let subnet = format!(
        "https://www.googleapis.com/compute/v1/projects/demo/regions/{}/subnetworks/default",
        region
    );
    let scheduling = preemptible
        .map(|p| format!(r#"{{"preemptible":{}}}"#, p))
        .unwrap_or_else(|| "{}".to_string());
    let access = tier
        .map(|t| format!(r#","accessConfigs":[{{"networkTier":"{}"}}]"#, t))
        .unwrap_or_default();
    let disks = license
        .map(|l| format!(r#"[{{"licenses":["{}"]}}]"#, l))
        .unwrap_or_else(|| "[]".to_string());
    RawRecord::new(
        format!(
            "//compute.googleapis.com/projects/demo/zones/{}/instances/{}",
            zone, name
        ),
        "compute.googleapis.com/Instance",
        format!(
            r#"{{"zone":"https://www.googleapis.com/compute/v1/projects/demo/zones/{zone}","machineType":"https://www.googleapis.com/compute/v1/projects/demo/zones/{zone}/machineTypes/{mt}","scheduling":{sched},"disks":{disks},"networkInterfaces":[{{"network":"{net}","subnetwork":"{sub}"{access}}}]}}"#,
            zone = zone,
            mt = machine_type,
            sched = scheduling,
            disks = disks,
            net = NETWORK_URL,
            sub = subnet,
            access = access
        ),
    )
}

pub fn disk(name: &str, zone: &str, disk_type: &str, size_gb: u64) -> RawRecord {
    RawRecord::new(
        format!("//compute.googleapis.com/projects/demo/zones/{}/disks/{}", zone, name),
        "compute.googleapis.com/Disk",
        format!(
            r#"{{"zone":"{}","type":"projects/demo/zones/{}/diskTypes/{}","sizeGb":"{}","sourceImage":"https://www.googleapis.com/compute/v1/projects/debian-cloud/global/images/debian-12"}}"#,
            zone, zone, disk_type, size_gb
        ),
    )
}

pub fn regional_disk(name: &str, region: &str, size_gb: u64) -> RawRecord {
    RawRecord::new(
        format!("//compute.googleapis.com/projects/demo/regions/{}/disks/{}", region, name),
        "compute.googleapis.com/RegionDisk",
        format!(
            r#"{{"region":"{}","type":"projects/demo/regions/{}/diskTypes/pd-balanced","sizeGb":"{}"}}"#,
            region, region, size_gb
        ),
    )
}

pub fn image(name: &str, source_disk: Option<&str>, locations: &[&str]) -> RawRecord {
    let source = source_disk
        .map(|d| {
            format!(
                r#","sourceDisk":"https://www.googleapis.com/compute/v1/projects/demo/zones/{}""#,
                d
            )
        })
        .unwrap_or_default();
    RawRecord::new(
        format!("//compute.googleapis.com/projects/demo/global/images/{}", name),
        "compute.googleapis.com/Image",
        format!(
            r#"{{"diskSizeGb":"10","storageLocations":{:?},"licenses":[]{}}}"#,
            locations, source
        ),
    )
}

pub fn service_account(email: &str) -> RawRecord {
    RawRecord::new(
        format!("//iam.googleapis.com/projects/demo/serviceAccounts/{}", email),
        "iam.googleapis.com/ServiceAccount",
        format!(r#"{{"email":"{}"}}"#, email),
    )
}

pub fn service_account_key(email: &str, key: &str) -> RawRecord {
    RawRecord::new(
        format!(
            "//iam.googleapis.com/projects/demo/serviceAccounts/{}/keys/{}",
            email, key
        ),
        "iam.googleapis.com/ServiceAccountKey",
        r#"{"keyType":"USER_MANAGED"}"#,
    )
}

pub fn service(name: &str, state: &str) -> RawRecord {
    RawRecord::new(
        format!("//serviceusage.googleapis.com/projects/123/services/{}", name),
        "serviceusage.googleapis.com/Service",
        format!(r#"{{"state":"{}"}}"#, state),
    )
}

pub const WINDOWS_LICENSE: &str =
    "https://www.googleapis.com/compute/v1/projects/windows-cloud/global/licenses/windows-server-2022-dc";

/// A small but complete project
pub fn project_records() -> Vec<RawRecord> {
    vec![
        network(),
        subnetwork("us-east1"),
        subnetwork("europe-west1"),
        firewall("allow-ssh"),
        route("default-internet"),
        instance("web-1", "us-east1-b", "e2-small", None, None, None),
        instance("web-2", "us-east1-c", "e2-small", Some(false), None, None),
        instance(
            "batch-1",
            "europe-west1-d",
            "n2-standard-4",
            Some(true),
            Some("PREMIUM"),
            Some(WINDOWS_LICENSE),
        ),
        disk("web-1", "us-east1-b", "pd-balanced", 20),
        disk("web-2", "us-east1-c", "pd-balanced", 20),
        regional_disk("shared", "us-east1", 100),
        image("web-golden", Some("us-east1-b/disks/web-1"), &["us"]),
        image("imported", None, &["eu"]),
        service_account("ci@demo.iam.gserviceaccount.com"),
        service_account_key("ci@demo.iam.gserviceaccount.com", "k1"),
        service_account_key("ci@demo.iam.gserviceaccount.com", "k2"),
        service("compute.googleapis.com", "ENABLED"),
        service("bigquery.googleapis.com", "DISABLED"),
    ]
}
