use audit_config::AuditConfig;

/// Sections whose env vars must use `__` after the section name.
const SECTIONS: [&str; 3] = ["REMOTE", "STORE", "SYNC"];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &AuditConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &AuditConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();
    for section in SECTIONS {
        let prefix = format!("FIELDAUDIT_{section}");
        let nested = format!("{prefix}__");
        if let Some(key) = env_keys
            .iter()
            .find(|key| key.starts_with(&prefix) && !key.starts_with(&nested))
        {
            warnings.push(format!(
                "{key} is ignored. Use double underscores after the section name (example: {nested}{}).",
                example_field(section)
            ));
        }
    }

    if !config.remote.is_configured() && has_env_prefix(&env_keys, "FIELDAUDIT_REMOTE__") {
        warnings.push(
            "Remote config is incomplete although FIELDAUDIT_REMOTE__* env vars exist. base_url, upload_url, app_id and session_id are all required."
                .to_string(),
        );
    }

    warnings
}

fn example_field(section: &str) -> &'static str {
    match section {
        "REMOTE" => "SESSION_ID",
        "STORE" => "PATH",
        _ => "MAX_PARALLEL",
    }
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
