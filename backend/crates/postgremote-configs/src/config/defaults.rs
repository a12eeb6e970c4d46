// Default value functions

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_workers() -> usize {
    0 // 0 = one worker per CPU
}

pub fn default_true() -> bool {
    true
}

pub fn default_database_url() -> String {
    "postgres://postgres@localhost:5432/postgres".to_string()
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_min_connections() -> u32 {
    0
}

pub fn default_acquire_timeout_secs() -> u64 {
    30
}

/// "NONE" restores the session's login role (`RESET ROLE`).
pub fn default_neutral_role() -> String {
    "NONE".to_string()
}

pub fn default_jwt_secret() -> String {
    String::new() // must be provided via config or POSTGREMOTE_JWT_SECRET
}

pub fn default_jwt_issuer() -> String {
    "postgremote".to_string()
}

pub fn default_token_expiry_secs() -> i64 {
    86_400 // 1 day
}

pub fn default_cookie_name() -> String {
    "jwt".to_string()
}

pub fn default_max_body_bytes() -> usize {
    256 * 1024
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

pub fn default_cors_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
}

pub fn default_cors_headers() -> Vec<String> {
    vec![
        "Authorization".to_string(),
        "Content-Type".to_string(),
        "Accept".to_string(),
        "Origin".to_string(),
    ]
}

pub fn default_cors_max_age() -> u64 {
    3600
}
