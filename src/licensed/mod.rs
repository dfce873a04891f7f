pub mod license;
pub mod types;

use chrono::NaiveDate;
use log::info;
use serde_json::Value;

use crate::err::Denial;
use license::LicenseRecord;
use types::{LicensesDocument, RosterEntry};

/// Server name assumed when a user record names none. The parameter cascade
/// treats it as "no server tier": the global document already covers it, so
/// the same-named document is never fetched twice under two roles.
pub const DEFAULT_SERVER: &str = "global";

/// Successful license resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub user_name: String,
    pub level: String,
    pub server_name: String,
}

/// Session context captured on a grant; feeds the parameter cascade and is
/// discarded with the process.
#[derive(Debug, Clone)]
pub(crate) struct UserContext {
    pub user_name: String,
    pub server_name: String,
    pub record: LicenseRecord,
}

/// Full resolution pass over a validated license table: version gate first,
/// then identity, application, entitlement, and the record itself.
pub(crate) fn resolve(
    table: &LicensesDocument,
    hwid: &str,
    app_name: &str,
    client_version: &str,
    today: NaiveDate,
) -> Result<(Grant, UserContext), Denial> {
    check_version(table, client_version)?;

    let (user_name, server) = find_user(table, hwid).ok_or_else(|| Denial::IdentityNotFound {
        hwid: hwid.to_string(),
    })?;

    let app_users = table
        .app_licenses(app_name)
        .ok_or_else(|| Denial::ApplicationUnknown(app_name.to_string()))?;

    let record = app_users
        .get(user_name)
        .and_then(LicenseRecord::from_value)
        .ok_or_else(|| Denial::UserNotEntitled {
            user: user_name.to_string(),
            app: app_name.to_string(),
        })?;

    let level = record.evaluate(today)?;

    match record.days_left(today).filter(|_| !record.is_active()) {
        Some(days) => info!("access granted: {user_name} | {level} | {days} day(s) left"),
        None => info!("access granted: {user_name} | {level} | permanent"),
    }

    let server_name = server.unwrap_or(DEFAULT_SERVER).to_string();
    let grant = Grant {
        user_name: user_name.to_string(),
        level,
        server_name: server_name.clone(),
    };
    let context = UserContext {
        user_name: grant.user_name.clone(),
        server_name,
        record,
    };

    Ok((grant, context))
}

/// Minimum-version gate. Runs before any identity or entitlement check.
fn check_version(table: &LicensesDocument, client_version: &str) -> Result<(), Denial> {
    let Some(min_version) = table.min_version.as_ref() else {
        return Ok(());
    };

    let minimum = parse_version(min_version).ok_or(Denial::MalformedVersion)?;
    let current = client_version
        .trim()
        .parse::<i64>()
        .map_err(|_| Denial::MalformedVersion)?;

    if current < minimum {
        return Err(Denial::VersionTooOld { current, minimum });
    }

    Ok(())
}

// min_version may be written as "5" or 5
fn parse_version(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(version) => version.trim().parse().ok(),
        _ => None,
    }
}

/// First entry in document order whose normalized identity matches wins.
fn find_user<'a>(table: &'a LicensesDocument, hwid: &str) -> Option<(&'a str, Option<&'a str>)> {
    table.users.iter().find_map(|(name, entry)| {
        let identity = entry.identity()?;
        (identity.hwid == hwid).then_some((name.as_str(), identity.server))
    })
}

/// Every user licensed for `app_name`, with level, home server and status.
pub(crate) fn roster(table: &LicensesDocument, app_name: &str) -> Option<Vec<RosterEntry>> {
    let app_users = table.app_licenses(app_name)?;

    let entries = app_users
        .iter()
        .filter_map(|(user_name, value)| {
            let record = LicenseRecord::from_value(value)?;
            let server_name = table
                .users
                .get(user_name)
                .and_then(|entry| entry.identity())
                .and_then(|identity| identity.server)
                .unwrap_or(DEFAULT_SERVER)
                .to_string();

            Some(RosterEntry {
                user_name: user_name.clone(),
                level: record.level(),
                server_name,
                active: record.is_active(),
                expires: record.expires().map(str::to_string),
            })
        })
        .collect();

    Some(entries)
}
