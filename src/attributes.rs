//! Typed access to record payloads
//!
//! `Attributes` wraps the parsed JSON object of a single record and exposes
//! typed getters over dotted paths (`scheduling.preemptible`,
//! `disks.0.licenses.0`). A getter returns `Ok(None)` when the field is
//! absent and `UnexpectedShape` when it is present with the wrong JSON type.
//!
//! Derived accessors implement the location, scheduling and OS-label
//! policies shared by every resource kind.

use crate::assets::SchedulingClass;
use crate::error::{CostctlError, Result};
use crate::utils::short_name;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

static ZONE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<region>.+)-[a-z]$").expect("zone suffix pattern is valid")
});

/// Where a resource lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Region(String),
    Zone { zone: String, region: String },
    MultiRegion(Vec<String>),
}

impl Location {
    /// Build a zonal location, deriving the region from the zone name
    pub fn zone(zone: impl Into<String>) -> Self {
        let zone = zone.into();
        let region = region_of_zone(&zone).to_string();
        Location::Zone { zone, region }
    }

    /// Regions used for price lookup
    pub fn regions(&self) -> Vec<String> {
        match self {
            Location::Region(region) | Location::Zone { region, .. } => vec![region.clone()],
            Location::MultiRegion(regions) => regions.clone(),
        }
    }

    /// Region-or-regions label, as used in fingerprints and reports
    pub fn region_label(&self) -> String {
        self.regions().join(",")
    }
}

/// Strip the trailing `-<letter>` from a zone name
pub fn region_of_zone(zone: &str) -> &str {
    ZONE_SUFFIX
        .captures(zone)
        .and_then(|c| c.name("region"))
        .map(|m| m.as_str())
        .unwrap_or(zone)
}

/// Canonical OS label for a license URL
///
/// Takes the last path segment, lower-cases the first `-` token and maps it
/// through a fixed table. Unknown or missing licenses get `fallback`.
pub fn os_from_license(license: Option<&str>, fallback: &str) -> String {
    let token = license
        .map(short_name)
        .and_then(|segment| segment.split('-').next())
        .map(|t| t.to_lowercase())
        .unwrap_or_default();

    let os = match token.as_str() {
        "debian" => "Debian",
        "ubuntu" => "Ubuntu",
        "centos" => "CentOS",
        "rhel" => "RHEL",
        "rocky" => "Rocky",
        "sles" => "SLES",
        "windows" => "Windows",
        "cos" => "COS",
        "fedora" => "Fedora",
        _ => {
            if let Some(license) = license {
                warn!(
                    "Unrecognized license {}, labeling OS as {}",
                    license, fallback
                );
            }
            return fallback.to_string();
        }
    };
    os.to_string()
}

/// Parsed payload of one record
#[derive(Debug, Clone)]
pub struct Attributes {
    record: String,
    fields: Map<String, Value>,
}

impl Attributes {
    /// Parse a payload; it must be a JSON object
    pub fn parse(record: &str, payload: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| CostctlError::MalformedPayload {
                record: record.to_string(),
                reason: e.to_string(),
            })?;
        match value {
            Value::Object(fields) => Ok(Self {
                record: record.to_string(),
                fields,
            }),
            other => Err(CostctlError::MalformedPayload {
                record: record.to_string(),
                reason: format!("expected a JSON object, found {}", json_type(&other)),
            }),
        }
    }

    pub fn record(&self) -> &str {
        &self.record
    }

    /// Raw lookup along a dotted path; numeric segments index arrays
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn shape_error(&self, path: &str, expected: &'static str) -> CostctlError {
        CostctlError::UnexpectedShape {
            record: self.record.clone(),
            field: path.to_string(),
            expected,
        }
    }

    pub fn str(&self, path: &str) -> Result<Option<&str>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.shape_error(path, "a string")),
        }
    }

    pub fn require_str(&self, path: &str) -> Result<&str> {
        self.str(path)?.ok_or_else(|| CostctlError::MissingField {
            resource: self.record.clone(),
            field: path.to_string(),
        })
    }

    pub fn bool(&self, path: &str) -> Result<Option<bool>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.shape_error(path, "a boolean")),
        }
    }

    /// Unsigned integer; int64 fields arrive as decimal strings
    pub fn u64(&self, path: &str) -> Result<Option<u64>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.shape_error(path, "an unsigned integer")),
            Some(Value::String(s)) => s
                .parse::<u64>()
                .map(Some)
                .map_err(|_| self.shape_error(path, "an unsigned integer")),
            Some(_) => Err(self.shape_error(path, "an unsigned integer")),
        }
    }

    pub fn array(&self, path: &str) -> Result<Option<&Vec<Value>>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(self.shape_error(path, "a list")),
        }
    }

    /// List of strings; absent lists are empty
    pub fn str_list(&self, path: &str) -> Result<Vec<String>> {
        let Some(items) = self.array(path)? else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.shape_error(path, "a list of strings"))
            })
            .collect()
    }

    /// Region, zone-derived region, or multi-region storage locations
    pub fn location(&self) -> Result<Option<Location>> {
        if let Some(region) = self.str("region")? {
            return Ok(Some(Location::Region(short_name(region).to_string())));
        }
        if let Some(zone) = self.str("zone")? {
            return Ok(Some(Location::zone(short_name(zone))));
        }
        if self.get("storageLocations").is_some() {
            let locations = self.str_list("storageLocations")?;
            if !locations.is_empty() {
                return Ok(Some(Location::MultiRegion(locations)));
            }
        }
        Ok(None)
    }

    /// Location for kinds that cannot exist without one
    pub fn require_location(&self) -> Result<Location> {
        self.location()?.ok_or_else(|| CostctlError::MissingField {
            resource: self.record.clone(),
            field: "region|zone|storageLocations".to_string(),
        })
    }

    /// `Some` only when `scheduling.preemptible` is present
    pub fn scheduling_class(&self) -> Result<Option<SchedulingClass>> {
        Ok(self
            .bool("scheduling.preemptible")?
            .map(|preemptible| {
                if preemptible {
                    SchedulingClass::Preemptible
                } else {
                    SchedulingClass::OnDemand
                }
            }))
    }

    /// First license of the first attached disk
    pub fn first_disk_license(&self) -> Result<Option<&str>> {
        if let Some(disks) = self.array("disks")? {
            match disks.first() {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::Object(_)) => {}
                Some(_) => return Err(self.shape_error("disks.0", "an object")),
            }
            if let Some(licenses) = self.array("disks.0.licenses")? {
                if licenses.is_empty() {
                    return Ok(None);
                }
                return self.str("disks.0.licenses.0");
            }
        }
        Ok(None)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
