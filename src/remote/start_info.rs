use std::collections::BTreeMap;

use crate::{error::RosterError, objects::participant::Participant, roster::RosterStore, types};
use super::{requests::StartInfoRequest, RemoteApi};

/// Dotted quad with every part in 0..=255.
pub fn validate_ip(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    parts.len() == 4 && parts.iter().all(|part| !part.is_empty() && part.parse::<u8>().is_ok())
}

pub fn start_info_url(server_addr: &str) -> Result<String, RosterError> {
    if !validate_ip(server_addr) {
        return Err(RosterError::Transport(format!("not connected, invalid server address '{server_addr}'")))
    }
    Ok(format!("http://{}:{}/{}", server_addr, types::START_INFO_SERVER_PORT, types::START_INFO_PATH))
}

/// Started participants packed back into the `+notes` form the timing
/// server reads.
pub fn build_start_info(participants: &[Participant]) -> StartInfoRequest {
    let mut start_info: BTreeMap<String, String> = BTreeMap::new();
    for p in participants.iter().filter(|p| p.is_started()) {
        start_info.insert(String::from(p.number()), format!("+{}", p.notes()));
    }
    StartInfoRequest { start_info }
}

pub fn send_start_info(remote: &dyn RemoteApi, store: &RosterStore, server_addr: &str) -> Result<usize, RosterError> {
    // refuse before building anything if there's no server to talk to
    start_info_url(server_addr)?;
    let snapshot = store.snapshot();
    let request = build_start_info(&snapshot.participants);
    let count = request.start_info.len();
    remote.send_start_info(server_addr, &request)?;
    tracing::info!(count, server_addr, "start info sent");
    Ok(count)
}
