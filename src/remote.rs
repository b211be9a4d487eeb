use std::time::Duration;

use reqwest::StatusCode;

use crate::error::RosterError;

pub mod importer;
pub mod requests;
pub mod start_info;
pub mod uploader;


pub const HTTP_TIMEOUT_SECONDS: u64 = 15;

/// Remote side of the roster. Everything here is best effort: a failure is
/// reported to the caller and nothing is retried.
pub trait RemoteApi: Send + Sync {
    fn fetch_roster(&self, www_id: &str, day: &str) -> Result<String, RosterError>;
    fn upload_participants(&self, request: &requests::UploadParticipantsRequest) -> Result<(), RosterError>;
    fn send_start_info(&self, server_addr: &str, request: &requests::StartInfoRequest) -> Result<(), RosterError>;
}

pub struct HttpRemote {
    client: reqwest::blocking::Client,
    import_url: String,
    upload_url: String,
}

impl HttpRemote {
    pub fn new(import_url: &str, upload_url: &str) -> Result<HttpRemote, RosterError> {
        let client = reqwest::blocking::ClientBuilder::new()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .connect_timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| RosterError::Transport(format!("unable to build http client: {e}")))?;
        Ok(HttpRemote {
            client,
            import_url: String::from(import_url),
            upload_url: String::from(upload_url),
        })
    }
}

fn check_status(status: StatusCode) -> Result<(), RosterError> {
    if status.is_success() {
        return Ok(())
    }
    Err(RosterError::Transport(format!("server responded with {status}")))
}

impl RemoteApi for HttpRemote {
    fn fetch_roster(&self, www_id: &str, day: &str) -> Result<String, RosterError> {
        let resp = self.client.get(&self.import_url)
            .query(&[("action", "si"), ("varz", www_id), ("diena", day)])
            .send()
            .map_err(|e| RosterError::Transport(format!("error fetching roster: {e}")))?;
        check_status(resp.status())?;
        resp.text().map_err(|e| RosterError::Transport(format!("error reading roster body: {e}")))
    }

    fn upload_participants(&self, request: &requests::UploadParticipantsRequest) -> Result<(), RosterError> {
        let resp = self.client.post(&self.upload_url)
            .json(request)
            .send()
            .map_err(|e| RosterError::Transport(format!("error uploading participants: {e}")))?;
        check_status(resp.status())
    }

    fn send_start_info(&self, server_addr: &str, request: &requests::StartInfoRequest) -> Result<(), RosterError> {
        let url = start_info::start_info_url(server_addr)?;
        let resp = self.client.post(url)
            .json(request)
            .send()
            .map_err(|e| RosterError::Transport(format!("error sending start info: {e}")))?;
        check_status(resp.status())
    }
}
