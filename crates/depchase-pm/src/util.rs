use std::collections::BTreeSet;
use std::path::Path;

use crate::error::Result;

/// Marker package present in every runtime profile that is not a real RPM.
const RUNTIME_CONFIG_PACKAGE: &str = "flatpak-runtime-config";

/// Strip the version and release from a `name-version-release` string.
pub fn rpm_name_only(nvr: &str) -> &str {
    nvr.rsplitn(3, '-').last().unwrap_or(nvr)
}

/// Read a list of package names, one per line.
///
/// Blank lines and the runtime config marker package are skipped.
pub fn read_package_list(path: &Path) -> Result<BTreeSet<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_package_list(&content))
}

pub fn parse_package_list(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != RUNTIME_CONFIG_PACKAGE)
        .map(str::to_string)
        .collect()
}
