/// Normalize an asset name or API URL to its `projects/...` path
///
/// `//compute.googleapis.com/projects/p/zones/z/instances/i` and
/// `https://www.googleapis.com/compute/v1/projects/p/zones/z/instances/i`
/// both become `projects/p/zones/z/instances/i`. Other asset names lose
/// their `//service/` prefix; anything else is returned unchanged.
pub fn resource_path(name: &str) -> &str {
    if name.starts_with("projects/") {
        return name;
    }
    if let Some(idx) = name.find("/projects/") {
        return &name[idx + 1..];
    }
    match name.strip_prefix("//") {
        Some(rest) => rest.split_once('/').map_or(rest, |(_, path)| path),
        None => name,
    }
}

/// Last `/`-delimited segment of a name or URL
pub fn short_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Format a cost with two decimals
pub fn format_cost(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Format a usage quantity with its unit, e.g. `720 h`
pub fn format_quantity(amount: u64, unit: &str) -> String {
    if unit.is_empty() {
        amount.to_string()
    } else {
        format!("{} {}", amount, unit)
    }
}
