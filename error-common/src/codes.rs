// Error codes implementation
// Standardized codes attached to every diagnostic the check reports

pub mod config {
    pub const MISSING_REQUIRED_OPTION: &str = "CONFIG_1001";
    pub const TYPE_MISMATCH: &str = "CONFIG_1002";
    pub const INVALID_VALUE: &str = "CONFIG_1003";
    pub const UNKNOWN_OPTION: &str = "CONFIG_1004";
    pub const DEPRECATED_OPTION: &str = "CONFIG_1005";
    pub const PARSE_FAILED: &str = "CONFIG_1006";
    pub const SOURCE_NOT_FOUND: &str = "CONFIG_1007";
    pub const INVALID_SCHEMA: &str = "CONFIG_1008";
}

pub mod whitelist {
    pub const MALFORMED: &str = "WHITELIST_2001";
}

pub mod logs {
    pub const INVALID_SOURCE: &str = "LOGS_3001";
    pub const INVALID_PATTERN: &str = "LOGS_3002";
    pub const IO_FAILED: &str = "LOGS_3003";
}

pub mod system {
    pub const WATCHER_FAILED: &str = "SYSTEM_9001";
    pub const INTERNAL: &str = "SYSTEM_9999";
}
