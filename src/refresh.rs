use crate::dates::LogicalDate;
use crate::errors::AppError;
use crate::fetcher::ObservationFetcher;
use crate::models::{UserRecord, normalize_group};
use crate::reconcile::reconcile;
use crate::storage::UserStore;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug)]
pub struct RefreshOutcome {
    pub as_of: LogicalDate,
    pub users: Vec<UserRecord>,
    /// Handles whose fetch failed this cycle. Their stored state is unchanged.
    pub failed: HashSet<String>,
}

#[derive(Debug, PartialEq)]
pub enum Registration {
    Added { record: UserRecord, fetch_failed: bool },
    Existing(UserRecord),
}

/// Fetches every tracked handle concurrently, reconciles, and writes the
/// whole collection back once all fetches are in.
pub async fn refresh_all(
    store: &UserStore,
    fetcher: &dyn ObservationFetcher,
    as_of: LogicalDate,
) -> Result<RefreshOutcome, AppError> {
    let session = store.session().await;
    let users = session.load().await?;

    let observations = join_all(users.iter().map(|user| fetcher.fetch(&user.handle, as_of))).await;

    let mut failed = HashSet::new();
    let users: Vec<UserRecord> = users
        .iter()
        .zip(&observations)
        .map(|(user, obs)| {
            if obs.is_error() {
                failed.insert(user.handle.clone());
            }
            reconcile(user, obs)
        })
        .collect();

    session.save(&users).await?;
    info!(%as_of, users = users.len(), failed = failed.len(), "refresh complete");

    Ok(RefreshOutcome {
        as_of,
        users,
        failed,
    })
}

pub fn validate_handle(handle: &str) -> Result<&str, AppError> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(AppError::bad_request("handle must not be empty"));
    }
    if !handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::bad_request(
            "handle may only contain letters, digits and '_'",
        ));
    }
    Ok(handle)
}

/// Adds a handle and seeds it with one fetch. Registering a handle that is
/// already tracked changes nothing.
pub async fn register(
    store: &UserStore,
    fetcher: &dyn ObservationFetcher,
    as_of: LogicalDate,
    handle: &str,
    alias: &str,
    group: &str,
) -> Result<Registration, AppError> {
    let handle = validate_handle(handle)?;
    let session = store.session().await;
    let mut users = session.load().await?;

    if let Some(existing) = users.iter().find(|user| user.handle == handle) {
        return Ok(Registration::Existing(existing.clone()));
    }

    let fresh = UserRecord::new(handle).with_alias(alias).with_group(group);
    let obs = fetcher.fetch(handle, as_of).await;
    let record = reconcile(&fresh, &obs);
    users.push(record.clone());
    session.save(&users).await?;
    info!(handle, "registered user");

    Ok(Registration::Added {
        record,
        fetch_failed: obs.is_error(),
    })
}

/// `None` leaves a field as it is; an empty alias clears it and an empty
/// group puts the user back in the default group.
pub async fn update(
    store: &UserStore,
    handle: &str,
    alias: Option<&str>,
    group: Option<&str>,
) -> Result<UserRecord, AppError> {
    let session = store.session().await;
    let mut users = session.load().await?;
    let user = users
        .iter_mut()
        .find(|user| user.handle == handle)
        .ok_or_else(|| AppError::not_found(format!("unknown handle '{handle}'")))?;

    if let Some(alias) = alias {
        user.alias = alias.trim().to_string();
    }
    if let Some(group) = group {
        user.group = normalize_group(group);
    }
    let updated = user.clone();

    session.save(&users).await?;
    Ok(updated)
}

pub async fn remove(store: &UserStore, handle: &str) -> Result<(), AppError> {
    let session = store.session().await;
    let mut users = session.load().await?;
    let before = users.len();
    users.retain(|user| user.handle != handle);
    if users.len() == before {
        return Err(AppError::not_found(format!("unknown handle '{handle}'")));
    }
    session.save(&users).await?;
    info!(handle, "removed user");
    Ok(())
}
