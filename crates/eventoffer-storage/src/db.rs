use std::path::PathBuf;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Opens a pool for `dsn`.
///
/// Every connection to `sqlite::memory:` is a fresh database, so in-memory DSNs
/// are pinned to a single pooled connection.
pub async fn connect(dsn: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(dsn.to_string());
    if is_sqlite_memory(dsn) {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);
    Database::connect(options).await
}

pub fn is_sqlite_memory(dsn: &str) -> bool {
    let Some(rest) = dsn.strip_prefix("sqlite:") else {
        return false;
    };
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path_part = rest.split(['?', '#']).next().unwrap_or("").trim();
    path_part.eq_ignore_ascii_case(":memory:") || rest.contains("mode=memory")
}

/// File backing a SQLite DSN, if any.
pub fn sqlite_file_path_from_dsn(dsn: &str) -> Option<PathBuf> {
    let rest = dsn.strip_prefix("sqlite:")?;
    let path_part = rest.split(['?', '#']).next()?.trim();
    if path_part.is_empty() {
        return None;
    }

    let mut normalized = path_part;
    if let Some(stripped) = normalized.strip_prefix("//") {
        normalized = stripped;
    }

    if normalized.eq_ignore_ascii_case(":memory:") {
        return None;
    }

    Some(PathBuf::from(normalized))
}

/// Creates the parent directory of a SQLite database file.
pub fn ensure_sqlite_parent_dir(dsn: &str) -> std::io::Result<()> {
    let Some(db_path) = sqlite_file_path_from_dsn(dsn) else {
        return Ok(());
    };
    let Some(parent) = db_path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent)
}

/// `dsn` with the userinfo password and any `password=` query value masked,
/// for logging.
pub fn redact_dsn(dsn: &str) -> String {
    let (base, query) = match dsn.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (dsn, None),
    };

    let mut out = match base.split_once("://") {
        Some((scheme, rest)) => {
            let authority_end = rest.find('/').unwrap_or(rest.len());
            let (authority, path) = rest.split_at(authority_end);
            match authority.rsplit_once('@') {
                Some((userinfo, host)) => {
                    let user = userinfo.split_once(':').map_or(userinfo, |(user, _)| user);
                    let masked = if user.len() == userinfo.len() { "" } else { ":***" };
                    format!("{scheme}://{user}{masked}@{host}{path}")
                }
                None => base.to_string(),
            }
        }
        None => base.to_string(),
    };

    if let Some(query) = query {
        let pairs: Vec<String> = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((key, _)) if key.eq_ignore_ascii_case("password") => format!("{key}=***"),
                _ => pair.to_string(),
            })
            .collect();
        out.push('?');
        out.push_str(&pairs.join("&"));
    }
    out
}
