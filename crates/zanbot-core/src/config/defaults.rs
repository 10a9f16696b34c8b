//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "ZanCoin Bot".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

pub fn default_webhook_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_webhook_port() -> u16 {
    8080
}

pub fn default_webhook_path() -> String {
    "/telegram/webhook".to_string()
}

pub fn default_translate_url() -> String {
    "https://translate.googleapis.com".to_string()
}

pub fn default_translate_timeout() -> u64 {
    10
}
