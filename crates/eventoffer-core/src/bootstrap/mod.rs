use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use eventoffer_auth::TokenVerifier;
use eventoffer_common::{AuthConfigPatch, GlobalConfig, GlobalConfigPatch};
use eventoffer_storage::db::ensure_sqlite_parent_dir;
use eventoffer_storage::{SeaOrmStorage, Storage};
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "eventoffer",
    version,
    about = "Event / Offer management API with bearer-token verification"
)]
pub struct CliArgs {
    /// Database DSN. Defaults to a SQLite file in the working directory.
    #[arg(long, env = "EVENTOFFER_DSN")]
    pub dsn: Option<String>,

    /// Bind host.
    #[arg(long, env = "EVENTOFFER_HOST")]
    pub host: Option<String>,

    /// Bind port.
    #[arg(long, env = "EVENTOFFER_PORT")]
    pub port: Option<String>,

    /// Require a bearer token on every /api resource route.
    #[arg(long, env = "EVENTOFFER_REQUIRE_AUTH")]
    pub require_auth: Option<String>,

    /// Identity provider base URL.
    #[arg(long, env = "KEYCLOAK_SERVER_URL")]
    pub keycloak_server_url: Option<String>,

    #[arg(long, env = "KEYCLOAK_REALM")]
    pub keycloak_realm: Option<String>,

    #[arg(long, env = "KEYCLOAK_CLIENT_ID")]
    pub keycloak_client_id: Option<String>,

    #[arg(long, env = "KEYCLOAK_CLIENT_SECRET")]
    pub keycloak_client_secret: Option<String>,

    /// Comma separated signature algorithms, e.g. `RS256,RS512`.
    #[arg(long, env = "KEYCLOAK_ALGORITHMS")]
    pub keycloak_algorithms: Option<String>,

    /// Expected `aud` claim.
    #[arg(long, env = "KEYCLOAK_AUDIENCE")]
    pub keycloak_audience: Option<String>,

    /// Seconds a fetched realm key stays cached.
    #[arg(long, env = "KEYCLOAK_KEY_TTL_SECS")]
    pub keycloak_key_ttl_secs: Option<String>,

    /// Timeout for the realm key request, in seconds.
    #[arg(long, env = "KEYCLOAK_FETCH_TIMEOUT_SECS")]
    pub keycloak_fetch_timeout_secs: Option<String>,
}

pub struct Bootstrap {
    pub storage: Arc<SeaOrmStorage>,
    pub state: Arc<AppState>,
}

pub async fn bootstrap_from_env() -> anyhow::Result<Bootstrap> {
    let args = CliArgs::parse();
    bootstrap(args).await
}

pub async fn bootstrap(args: CliArgs) -> anyhow::Result<Bootstrap> {
    // 1) merge config once: clap resolves CLI > ENV per field, defaults fill the rest.
    let global = resolve_config(args)?;

    // 2) connect DB and bring the schema up to date.
    ensure_sqlite_parent_dir(&global.dsn)
        .with_context(|| format!("create sqlite parent dir for {}", global.dsn))?;
    let storage = Arc::new(
        SeaOrmStorage::connect(&global.dsn)
            .await
            .context("connect storage")?,
    );
    storage.sync().await.context("schema sync")?;

    // 3) token verifier; the realm key is fetched lazily on first use.
    let verifier = TokenVerifier::from_config(&global.auth).context("build token verifier")?;
    info!(
        realm_url = %global.auth.public_key_url(),
        discovery_url = %global.auth.well_known_url(),
        require_auth = global.require_auth,
        "token verifier ready"
    );

    let state = AppState::new(global, storage.clone(), Arc::new(verifier));
    Ok(Bootstrap {
        storage,
        state: Arc::new(state),
    })
}

/// Turns raw CLI/ENV values into the final [`GlobalConfig`].
pub fn resolve_config(args: CliArgs) -> anyhow::Result<GlobalConfig> {
    let auth = AuthConfigPatch {
        server_url: sanitize_optional_env_value(args.keycloak_server_url),
        realm: sanitize_optional_env_value(args.keycloak_realm),
        client_id: sanitize_optional_env_value(args.keycloak_client_id),
        client_secret: sanitize_optional_env_value(args.keycloak_client_secret),
        algorithms: parse_list_env_value(args.keycloak_algorithms),
        audience: sanitize_optional_env_value(args.keycloak_audience),
        key_ttl_secs: parse_u64_env_value(args.keycloak_key_ttl_secs, "KEYCLOAK_KEY_TTL_SECS")?,
        fetch_timeout_secs: parse_u64_env_value(
            args.keycloak_fetch_timeout_secs,
            "KEYCLOAK_FETCH_TIMEOUT_SECS",
        )?,
    };
    let cli_patch = GlobalConfigPatch {
        host: sanitize_optional_env_value(args.host),
        port: parse_u16_env_value(args.port, "EVENTOFFER_PORT")?,
        dsn: Some(sanitize_dsn_value(args.dsn)),
        require_auth: parse_bool_env_value(args.require_auth, "EVENTOFFER_REQUIRE_AUTH")?,
        auth,
    };

    let mut merged = GlobalConfigPatch::default();
    merged.overlay(cli_patch);
    merged
        .into_config()
        .context("finalize merged global config")
}

fn sanitize_optional_env_value(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    if trimmed.is_empty() {
        return None;
    }
    // PaaS templates sometimes leave `${VAR}` unresolved; treat it as unset.
    if trimmed.starts_with("${") && trimmed.ends_with('}') {
        return None;
    }
    Some(trimmed)
}

fn sanitize_dsn_value(value: Option<String>) -> String {
    sanitize_optional_env_value(value).unwrap_or_else(default_dsn)
}

fn default_dsn() -> String {
    if let Some(data_dir) = sanitize_optional_env_value(std::env::var("EVENTOFFER_DATA_DIR").ok())
    {
        let dir = data_dir.trim_end_matches('/');
        return format!("sqlite://{dir}/eventoffer.db?mode=rwc");
    }
    "sqlite://eventoffer.db?mode=rwc".to_string()
}

fn parse_list_env_value(value: Option<String>) -> Option<Vec<String>> {
    let raw = sanitize_optional_env_value(value)?;
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

fn parse_u16_env_value(value: Option<String>, env_name: &str) -> anyhow::Result<Option<u16>> {
    let Some(raw) = sanitize_optional_env_value(value) else {
        return Ok(None);
    };
    let parsed = raw
        .parse::<u16>()
        .with_context(|| format!("invalid {env_name} value: {raw}"))?;
    Ok(Some(parsed))
}

fn parse_u64_env_value(value: Option<String>, env_name: &str) -> anyhow::Result<Option<u64>> {
    let Some(raw) = sanitize_optional_env_value(value) else {
        return Ok(None);
    };
    let parsed = raw
        .parse::<u64>()
        .with_context(|| format!("invalid {env_name} value: {raw}"))?;
    Ok(Some(parsed))
}

fn parse_bool_env_value(value: Option<String>, env_name: &str) -> anyhow::Result<Option<bool>> {
    let Some(raw) = sanitize_optional_env_value(value) else {
        return Ok(None);
    };
    let parsed = match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => return Err(anyhow::anyhow!("invalid {env_name} value: {raw}")),
    };
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_and_blanks_count_as_unset() {
        assert_eq!(sanitize_optional_env_value(Some("${PORT}".into())), None);
        assert_eq!(sanitize_optional_env_value(Some("   ".into())), None);
        assert_eq!(
            sanitize_optional_env_value(Some(" 8080 ".into())).as_deref(),
            Some("8080")
        );
    }

    #[test]
    fn bool_values_accept_common_spellings() {
        assert_eq!(parse_bool_env_value(Some("ON".into()), "X").unwrap(), Some(true));
        assert_eq!(parse_bool_env_value(Some("0".into()), "X").unwrap(), Some(false));
        assert!(parse_bool_env_value(Some("maybe".into()), "X").is_err());
    }

    #[test]
    fn algorithm_list_is_comma_separated() {
        assert_eq!(
            parse_list_env_value(Some("RS256, RS512,".into())),
            Some(vec!["RS256".to_string(), "RS512".to_string()])
        );
        assert_eq!(parse_list_env_value(Some(" , ".into())), None);
    }

    #[test]
    fn resolved_config_uses_args_over_defaults() {
        let config = resolve_config(CliArgs {
            dsn: Some("sqlite::memory:".into()),
            port: Some("9000".into()),
            require_auth: Some("true".into()),
            keycloak_realm: Some("shop".into()),
            keycloak_algorithms: Some("RS256,PS256".into()),
            ..CliArgs::default()
        })
        .unwrap();

        assert_eq!(config.dsn, "sqlite::memory:");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(config.require_auth);
        assert_eq!(config.auth.realm, "shop");
        assert_eq!(config.auth.algorithms, ["RS256", "PS256"]);
        assert_eq!(config.auth.server_url, "http://keycloak:8080");
    }

    #[test]
    fn invalid_port_and_algorithm_are_rejected() {
        assert!(
            resolve_config(CliArgs {
                dsn: Some("sqlite::memory:".into()),
                port: Some("http".into()),
                ..CliArgs::default()
            })
            .is_err()
        );
        assert!(
            resolve_config(CliArgs {
                dsn: Some("sqlite::memory:".into()),
                keycloak_algorithms: Some("HS256".into()),
                ..CliArgs::default()
            })
            .is_err()
        );
    }
}
