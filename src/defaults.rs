pub const DEFAULT_DURATION: u64 = 200;
pub const DEFAULT_FREQUENCY: u32 = 700;
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1";
pub const DEFAULT_STATUS: &str = "STATUS_NONE";
pub const DEFAULT_TIME_DIFF: i64 = 0;

pub const DEFAULT_UPLOAD_INTERVAL: u64 = 10 * 60;
pub const DEFAULT_SYNC_WINDOW: u64 = 10 * 60;
pub const DEFAULT_UPLOAD_URL: &str = "https://dbsportas.lt/upload";
pub const DEFAULT_IMPORT_URL: &str = "https://dbsportas.lt/ajaxvarz.php";
pub const DEFAULT_COLUMNS: usize = 4;

pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

pub const DOCUMENT_PATH: &str = "./content.json";
pub const DATABASE_PATH: &str = "./start-roster.sqlite";

pub const DOCUMENT_PATH_ENV: &str = "ROSTER_DOCUMENT_PATH";
pub const DATABASE_PATH_ENV: &str = "ROSTER_DATABASE_PATH";
