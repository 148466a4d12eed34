//! HTML message formatters for the channel
//!
//! Both layouts share a fixed-width `<pre>` table so values line up in the
//! Telegram client. Message text is Spanish: the channel audience is Bolivian.

use crate::alerts::{Action, Decision};
use crate::config::TelegramConfig;
use chrono::NaiveDateTime;

/// Width of the label column in table rows (characters, not bytes)
const LABEL_WIDTH: usize = 14;

/// Width of the separator line
const DIVIDER_WIDTH: usize = 28;

const TIMESTAMP_DISPLAY: &str = "%d/%m/%Y · %H:%M:%S";

/// Labels shown in every message
#[derive(Debug, Clone, PartialEq)]
pub struct MessageStyle {
    pub base: String,
    pub quote: String,
    pub exchange_label: String,
    pub site_url: String,
}

impl Default for MessageStyle {
    fn default() -> Self {
        Self {
            base: "USDT".to_string(),
            quote: "BOB".to_string(),
            exchange_label: "Binance P2P".to_string(),
            site_url: "https://cotizaciones.devcito.org/".to_string(),
        }
    }
}

impl MessageStyle {
    pub fn from_settings(settings: &TelegramConfig) -> Self {
        Self {
            base: settings.base_currency.clone(),
            quote: settings.quote_currency.clone(),
            exchange_label: settings.exchange_label.clone(),
            site_url: settings.site_url.clone(),
        }
    }

    fn pair(&self) -> String {
        format!("{} / {}", self.base, self.quote)
    }

    fn amount(&self, value: f64) -> String {
        format!("{:.4} {}", value, html_escape(&self.quote))
    }

    fn footer(&self, stamp: String) -> [String; 2] {
        [
            stamp,
            format!(
                "📊 <a href=\"{}\">Ver historial completo</a>",
                html_escape(&self.site_url)
            ),
        ]
    }
}

/// Text for the action in `decision`, stamped with `at`
pub fn render_for(decision: &Decision, style: &MessageStyle, at: NaiveDateTime) -> String {
    match decision.action {
        Action::SendSpikeAlert {
            weekly_average,
            diff,
        } => render_spike(decision.price, weekly_average, diff, style, at),
        Action::SendDaily | Action::EditMessage { .. } => render_daily(decision.price, style, at),
    }
}

/// Compact daily summary; also used for in-place edits
pub fn render_daily(price: f64, style: &MessageStyle, at: NaiveDateTime) -> String {
    let table = [
        row("Precio", &style.amount(price)),
        row("Par", &html_escape(&style.pair())),
        row("Exchange", &html_escape(&style.exchange_label)),
    ];

    let base = html_escape(&style.base);
    let quote = html_escape(&style.quote);
    let mut lines = vec![
        format!("<blockquote>💱 {}·{} — Cotización del Día</blockquote>", base, quote),
        String::new(),
        format!("<b>💵  1 {} = {:.4} {}</b>", base, price, quote),
        String::new(),
        format!("<pre>{}</pre>", table.join("\n")),
        String::new(),
    ];
    lines.extend(style.footer(format!(
        "🕐 <i>Actualizado: {}</i>",
        at.format(TIMESTAMP_DISPLAY)
    )));
    lines.join("\n")
}

/// Spike alert with the weekly average, absolute and relative change
pub fn render_spike(
    price: f64,
    weekly_average: f64,
    diff: f64,
    style: &MessageStyle,
    at: NaiveDateTime,
) -> String {
    let pct = diff / weekly_average * 100.0;
    let base = html_escape(&style.base);
    let quote = html_escape(&style.quote);

    let table = [
        format!("🚨 <b>¡El {} subió significativamente!</b>", base),
        String::new(),
        row("Precio actual", &style.amount(price)),
        row("Prom. 7 días", &style.amount(weekly_average)),
        divider(),
        row("Diferencia", &format!("▲ +{}", style.amount(diff))),
        row("Variación", &format!("▲ +{:.2}%", pct)),
        String::new(),
        row("Exchange", &html_escape(&style.exchange_label)),
        row("Par", &html_escape(&style.pair())),
    ];

    let mut lines = vec![
        format!("<blockquote>📈 {}·{} — Alerta de Subida</blockquote>", base, quote),
        String::new(),
        format!("<pre>{}</pre>", table.join("\n")),
        String::new(),
    ];
    lines.extend(style.footer(format!("🕐 <i>{}</i>", at.format(TIMESTAMP_DISPLAY))));
    lines.join("\n")
}

/// Label padded to the label column, then the value
fn row(label: &str, value: &str) -> String {
    let pad = LABEL_WIDTH.saturating_sub(label.chars().count()).max(1);
    format!("{}{}{}", label, " ".repeat(pad), value)
}

fn divider() -> String {
    "─".repeat(DIVIDER_WIDTH)
}

/// Escape the characters Telegram's HTML parse mode treats as markup
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{ConversationState, DecisionEngine};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_row_pads_by_characters() {
        assert_eq!(row("Par", "x"), format!("Par{}x", " ".repeat(11)));
        // "í" is one character even though it is two bytes
        assert_eq!(row("Prom. 7 días", "x"), "Prom. 7 días  x");
        assert_eq!(row("A label longer than 14", "x"), "A label longer than 14 x");
    }

    #[test]
    fn test_daily_message_layout() {
        let text = render_daily(6.9512, &MessageStyle::default(), at());

        assert!(text.starts_with("<blockquote>💱 USDT·BOB — Cotización del Día</blockquote>"));
        assert!(text.contains("<b>💵  1 USDT = 6.9512 BOB</b>"));
        assert!(text.contains("Precio        6.9512 BOB"));
        assert!(text.contains("Exchange      Binance P2P"));
        assert!(text.contains("🕐 <i>Actualizado: 01/05/2024 · 09:05:07</i>"));
        assert!(text.ends_with(
            "📊 <a href=\"https://cotizaciones.devcito.org/\">Ver historial completo</a>"
        ));
    }

    #[test]
    fn test_spike_message_shows_average_and_percentage() {
        let text = render_spike(7.60, 6.90, 0.70, &MessageStyle::default(), at());

        assert!(text.contains("Alerta de Subida"));
        assert!(text.contains("Precio actual 7.6000 BOB"));
        assert!(text.contains("Prom. 7 días  6.9000 BOB"));
        assert!(text.contains("Diferencia    ▲ +0.7000 BOB"));
        assert!(text.contains("Variación     ▲ +10.14%"));
        assert!(text.contains(&"─".repeat(28)));
    }

    #[test]
    fn test_render_for_picks_layout_from_action() {
        let today = at().date();
        let engine = DecisionEngine::default();
        let style = MessageStyle::default();

        let spike = engine.decide(7.60, Some(6.90), &ConversationState::idle(), today);
        assert!(render_for(&spike, &style, at()).contains("Alerta de Subida"));

        let daily = engine.decide(6.95, Some(6.90), &ConversationState::idle(), today);
        assert!(render_for(&daily, &style, at()).contains("Cotización del Día"));
    }

    #[test]
    fn test_style_from_settings_matches_default() {
        assert_eq!(
            MessageStyle::from_settings(&TelegramConfig::default()),
            MessageStyle::default()
        );
    }

    #[test]
    fn test_labels_are_escaped() {
        let style = MessageStyle {
            exchange_label: "P2P <beta>".to_string(),
            ..MessageStyle::default()
        };
        let text = render_daily(1.0, &style, at());
        assert!(text.contains("P2P &lt;beta&gt;"));
    }
}
