use crate::{error::RosterError, normalizer, roster::RosterStore};
use super::RemoteApi;

/// Fetches the roster for an event day and replaces the stored snapshot with
/// it. A bad payload leaves the current snapshot untouched.
pub fn import_event(remote: &dyn RemoteApi, store: &RosterStore, www_id: &str, day: &str) -> Result<usize, RosterError> {
    let www_id = www_id.trim();
    let day = day.trim();
    if www_id.is_empty() || day.is_empty() {
        return Err(RosterError::MalformedPayload(String::from("event id and day are required")))
    }
    let body = remote.fetch_roster(www_id, day)?;
    let snapshot = normalizer::normalize_str(&body)?;
    let count = snapshot.participants.len();
    tracing::info!(www_id, day, count, title = %snapshot.title, "roster imported");
    store.replace(snapshot)?;
    Ok(count)
}
