use std::collections::BTreeMap;

use serde::Serialize;

use crate::objects::participant::Participant;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all="camelCase")]
pub struct UploadParticipantsRequest {
    pub participants: Vec<Participant>,
    pub session_key: Option<String>,
}

/// Hand-off to the local timing server, keyed by bib number with `+notes`
/// values.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StartInfoRequest {
    pub start_info: BTreeMap<String, String>,
}
