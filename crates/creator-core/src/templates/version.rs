//! Version comparison between the creator and its template roots

use semver::Version;

/// Compare the running creator version against the version a template root
/// was written for. Returns a warning message when the creator is older.
pub fn check_compatibility(
    creator_version: &str,
    template_version: &str,
    root_name: &str,
) -> Option<String> {
    let creator_ver = parse_version(creator_version)?;
    let template_ver = parse_version(template_version)?;

    if creator_ver < template_ver {
        Some(format!(
            "Template '{}' was written for creator version {} or newer; \
             you are running version {}.",
            root_name, template_version, creator_version
        ))
    } else {
        None
    }
}

/// Parse a version string, tolerating a leading 'v'
fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).ok()
}
