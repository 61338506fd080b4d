// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Procflow";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "procflow";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".procflow";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "procflow.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PROCFLOW_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PROCFLOW_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PROCFLOW_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PROCFLOW_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable for the SQLite database path
pub const ENV_DATABASE: &str = "PROCFLOW_DATABASE";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename (inside the profile folder)
pub const SQLITE_DB_FILENAME: &str = "procflow.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Query Paging
// =============================================================================

/// Environment variable for the maximum page size
pub const ENV_MAX_PAGE_SIZE: &str = "PROCFLOW_MAX_PAGE_SIZE";

/// Page size used when the client does not send one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a client may request
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
