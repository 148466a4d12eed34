//! Telegram channel output
//!
//! - `notifier`   - teloxide-backed [`crate::alerts::Notifier`]
//! - `formatters` - HTML layouts for daily and spike messages

pub mod formatters;
pub mod notifier;

pub use formatters::{html_escape, render_daily, render_for, render_spike, MessageStyle};
pub use notifier::TelegramNotifier;
