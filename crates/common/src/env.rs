//! Startup sanity checks on the process environment.

use tracing::warn;

/// Names from `vars` that are unset or blank. Each one is logged at warn so a
/// misconfigured deployment is visible before the first failing request.
pub fn missing_vars(vars: &[&str]) -> Vec<String> {
    vars.iter()
        .filter(|name| std::env::var(name).map(|v| v.trim().is_empty()).unwrap_or(true))
        .map(|name| {
            warn!(var = %name, "environment variable not set");
            name.to_string()
        })
        .collect()
}
