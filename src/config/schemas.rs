/// Configuration schemas - every section defined once with its defaults
use crate::config_struct;

// ============================================================================
// PRICE SOURCE
// ============================================================================

config_struct! {
    /// Where the current bid comes from
    pub struct SourceConfig {
        /// CriptoYa endpoint returning {ask, totalAsk, bid, totalBid, time}
        api_url: String = "https://criptoya.com/api/binancep2p/USDT/BOB".to_string(),
        timeout_secs: u64 = 15,
        /// Stored on every sample
        currency: String = "USDT".to_string(),
        /// Stored on every sample
        exchange: String = "binancep2p".to_string(),
    }
}

// ============================================================================
// ALERTS (decision engine)
// ============================================================================

config_struct! {
    /// Spike detection and weekly average window
    pub struct AlertsConfig {
        /// Absolute increase over the weekly average that counts as a spike (strict >)
        spike_threshold: f64 = 0.50,
        /// Length of the trailing average window
        average_window_days: i64 = 7,
        /// false: window ends at today's midnight (previous week only)
        /// true: window ends now and includes today's samples
        average_includes_today: bool = false,
    }
}

// ============================================================================
// TELEGRAM
// ============================================================================

config_struct! {
    /// Telegram channel notifications
    pub struct TelegramConfig {
        enabled: bool = true,
        /// Overridden by TELEGRAM_BOT_TOKEN
        bot_token: String = String::new(),
        /// Overridden by TELEGRAM_CHAT_ID
        chat_id: String = String::new(),
        /// Linked at the bottom of every message
        site_url: String = "https://cotizaciones.devcito.org/".to_string(),
        base_currency: String = "USDT".to_string(),
        quote_currency: String = "BOB".to_string(),
        exchange_label: String = "Binance P2P".to_string(),
    }
}

// ============================================================================
// DATABASE
// ============================================================================

config_struct! {
    /// Rate history storage
    pub struct DatabaseConfig {
        /// Empty = <data>/rates.db
        path: String = String::new(),
        /// Samples older than this are pruned at the end of each run
        retention_days: i64 = 30,
    }
}

// ============================================================================
// PUBLISH (static site repository)
// ============================================================================

config_struct! {
    /// Export of the full history to the frontend repository
    pub struct PublishConfig {
        enabled: bool = false,
        repo_path: String = "/opt/codes/cotizaciones_ng".to_string(),
        json_output_path: String = "/opt/codes/cotizaciones_ng/docs/data.json".to_string(),
        commit_message: String = "data upload".to_string(),
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration structure
    pub struct Config {
        source: SourceConfig = SourceConfig::default(),
        alerts: AlertsConfig = AlertsConfig::default(),
        telegram: TelegramConfig = TelegramConfig::default(),
        database: DatabaseConfig = DatabaseConfig::default(),
        publish: PublishConfig = PublishConfig::default(),
    }
}
