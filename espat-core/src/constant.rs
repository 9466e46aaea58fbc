/* Engine Setup */

/// Producer -> Dispatch Worker mailbox depth
pub const MAILBOX_DEPTH: usize = 4;

/* Command Timeout */

/// Timeout for status queries and short set commands (ms)
pub const COMMAND_TIMEOUT_MS_DEFAULT: u64 = 1000;
/// Timeout for commands the device persists to its NVS area (ms)
/// AT+CWSAP writes flash before answering, so it needs much longer
pub const COMMAND_TIMEOUT_MS_PERSIST: u64 = 10_000;

/* Access Point Limits */

/// SSID maximum length in bytes
pub const AP_SSID_MAX_LEN: usize = 32;
/// Password maximum length in bytes
pub const AP_PASSWORD_MAX_LEN: usize = 64;
/// Highest accepted RF channel number
pub const AP_CHANNEL_MAX: u8 = 128;
/// Minimum number of stations the AP can be configured to accept
pub const AP_MAX_STATIONS_MIN: u8 = 1;
/// Maximum number of stations the AP can be configured to accept
pub const AP_MAX_STATIONS_MAX: u8 = 10;
