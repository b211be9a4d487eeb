pub const STARTED_CHECKED: &str = "checked";
pub const STARTED_NONE: &str = "";

pub const MODE_CLOCK: &str = "clock";
pub const MODE_TIMER: &str = "timer";

pub const START_INFO_SERVER_PORT: u16 = 8001;
pub const START_INFO_PATH: &str = "api/start_app_upload";
