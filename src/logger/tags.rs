/// Log tags identifying the subsystem a message comes from

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Api,
    Database,
    Alerts,
    Telegram,
    Publish,
    Other(String),
}

impl LogTag {
    /// Key used by --debug-<key> / --verbose-<key> flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Database => "database".to_string(),
            LogTag::Alerts => "alerts".to_string(),
            LogTag::Telegram => "telegram".to_string(),
            LogTag::Publish => "publish".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uncolored label for the log file
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Other(name) => name.to_uppercase(),
            other => other.to_debug_key().to_uppercase(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
