// One pipeline run: fetch, store, notify, publish, prune

use crate::alerts::{deliver, Decision, DecisionEngine, DeliveryOutcome, Notifier};
use crate::apis::{CriptoYaClient, PriceSource};
use crate::config::{with_config, TelegramConfig};
use crate::database::{AverageWindow, HistoryDatabase};
use crate::errors::{PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use crate::process_lock::ProcessLock;
use crate::publish::{self, CommitOutcome};
use crate::telegram::{render_for, MessageStyle, TelegramNotifier};
use chrono::{Duration, Local, NaiveDateTime};
use std::path::PathBuf;

const TOTAL_STEPS: usize = 8;

/// Flags that change what a run is allowed to touch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Decide and log only: no sample insert, no Telegram call, no state
    /// write, no publish, no prune
    pub dry_run: bool,
    pub skip_publish: bool,
}

impl RunOptions {
    pub fn from_args() -> Self {
        Self {
            dry_run: crate::arguments::is_dry_run_enabled(),
            skip_publish: crate::arguments::is_skip_publish_enabled(),
        }
    }
}

/// Result of the notification step
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyReport {
    pub weekly_average: Option<f64>,
    pub decision: Decision,
    /// `None` when no notifier was available (dry run or disabled)
    pub outcome: Option<DeliveryOutcome>,
    pub state_saved: bool,
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub price: f64,
    pub notify: NotifyReport,
    pub published: Option<CommitOutcome>,
    pub pruned: usize,
}

/// Load the average and state, decide, deliver and persist the new state
///
/// A failed average query degrades to "no average" (never a spike). With no
/// notifier the decision is only logged.
pub async fn evaluate_and_notify(
    db: &HistoryDatabase,
    engine: &DecisionEngine,
    window: &AverageWindow,
    notifier: Option<&dyn Notifier>,
    style: &MessageStyle,
    price: f64,
    now: NaiveDateTime,
) -> PipelineResult<NotifyReport> {
    let weekly_average = match db.weekly_average(window, now) {
        Ok(average) => average,
        Err(e) => {
            logger::warning(
                LogTag::Database,
                &format!("Weekly average unavailable, spike check disabled: {}", e),
            );
            None
        }
    };

    match weekly_average {
        Some(average) => logger::info(
            LogTag::Alerts,
            &format!("{}-day average: {:.4}", window.days, average),
        ),
        None => logger::info(LogTag::Alerts, "No samples in the average window"),
    }

    let state = db.get_conversation_state()?;
    let decision = engine.decide(price, weekly_average, &state, now.date());
    logger::info(LogTag::Alerts, &format!("Decision: {}", decision.action));

    let Some(notifier) = notifier else {
        logger::info(LogTag::Alerts, "No notifier, decision not delivered");
        return Ok(NotifyReport {
            weekly_average,
            decision,
            outcome: None,
            state_saved: false,
        });
    };

    let text = render_for(&decision, style, now);
    let outcome = deliver(&decision, &state, &text, notifier).await;

    for warning in &outcome.warnings {
        logger::warning(LogTag::Telegram, &warning.to_string());
    }
    if let Some(delivery) = &outcome.delivery {
        logger::info(LogTag::Telegram, &format!("Delivered: {}", delivery));
    }

    let state_saved = outcome.state_changed(&state);
    if state_saved {
        db.update_conversation_state(&outcome.state)?;
    }

    Ok(NotifyReport {
        weekly_average,
        decision,
        outcome: Some(outcome),
        state_saved,
    })
}

/// Run the whole pipeline once, holding the process lock throughout
pub async fn run_pipeline(options: RunOptions) -> PipelineResult<RunSummary> {
    let _lock = ProcessLock::acquire_default()?;

    let telegram = with_config(|c| c.telegram.clone());
    let source = CriptoYaClient::from_config()?;
    run_steps(options, &telegram, &source, HistoryDatabase::open_from_config).await
}

/// Steps 1-8 against the given source and store
///
/// Telegram credentials are checked before the fetch: a misconfigured
/// channel fails the run before anything is stored.
pub async fn run_steps<F>(
    options: RunOptions,
    telegram: &TelegramConfig,
    source: &dyn PriceSource,
    open_store: F,
) -> PipelineResult<RunSummary>
where
    F: FnOnce() -> PipelineResult<HistoryDatabase>,
{
    let notifier = if options.dry_run {
        None
    } else {
        TelegramNotifier::from_settings(telegram)?
    };

    let style = MessageStyle::from_settings(telegram);
    logger::log_banner(
        &format!("{}/{}", style.base, style.quote),
        &style.exchange_label,
    );
    if options.dry_run {
        logger::warning(
            LogTag::System,
            "Dry run: no sample, message, state, publish or prune",
        );
    } else if notifier.is_none() {
        logger::info(LogTag::Telegram, "Telegram disabled in config");
    }

    // 1. Fetch
    logger::log_step(1, TOTAL_STEPS, "🌐", &format!("Fetching price from {}...", source.name()));
    let price = source.fetch_price().await?;
    logger::info(LogTag::Api, &format!("{} answered bid={:.4}", source.name(), price));
    logger::log_price_box(price, &style.base, &style.quote);

    // 2. Open store
    logger::log_step(2, TOTAL_STEPS, "🗄️", "Opening rate history database...");
    let db = open_store()?;

    // 3. Insert
    logger::log_step(3, TOTAL_STEPS, "💾", "Saving sample...");
    let now = Local::now().naive_local();
    if options.dry_run {
        logger::info(LogTag::Database, "Dry run, sample not stored");
    } else {
        let sample = db.insert_sample_at(price, now)?;
        logger::info(
            LogTag::Database,
            &format!(
                "Stored {} {:.4} ({}) at {}",
                sample.currency, sample.amount, sample.exchange, sample.recorded_at
            ),
        );
    }

    // 4. Notify
    logger::log_step(4, TOTAL_STEPS, "📨", "Processing Telegram notification...");
    let notify = evaluate_and_notify(
        &db,
        &DecisionEngine::from_config(),
        &AverageWindow::from_config(),
        notifier.as_ref().map(|t| t as &dyn Notifier),
        &style,
        price,
        now,
    )
    .await?;

    // 5-7. Publish
    let publish_config = with_config(|c| c.publish.clone());
    let published = if options.dry_run || options.skip_publish || !publish_config.enabled {
        logger::log_step(5, TOTAL_STEPS, "⏭️", "Publishing skipped (steps 5-7)");
        None
    } else {
        let repo = PathBuf::from(&publish_config.repo_path);
        let output = PathBuf::from(&publish_config.json_output_path);

        logger::log_step(5, TOTAL_STEPS, "🔄", "Syncing frontend repository (forced pull)...");
        let branch = publish::force_pull(&repo).await?;
        logger::info(
            LogTag::Publish,
            &format!("{} now at origin/{}", repo.display(), branch),
        );

        logger::log_step(6, TOTAL_STEPS, "📄", "Exporting history to JSON...");
        let exported = db.export_samples_json(&output)?;
        logger::info(
            LogTag::Publish,
            &format!("Wrote {} samples to {}", exported, output.display()),
        );

        logger::log_step(7, TOTAL_STEPS, "🚀", "Pushing to repository...");
        let outcome = publish::commit_and_push(&repo, &publish_config.commit_message).await?;
        Some(outcome)
    };

    // 8. Prune
    logger::log_step(8, TOTAL_STEPS, "🧹", "Pruning old samples...");
    let retention_days = with_config(|c| c.database.retention_days);
    let pruned = if options.dry_run {
        0
    } else if retention_days <= 0 {
        logger::info(LogTag::Database, "Retention disabled, nothing pruned");
        0
    } else {
        let max_age = Duration::try_days(retention_days).ok_or_else(|| {
            PipelineError::Config(format!(
                "database.retention_days out of range: {}",
                retention_days
            ))
        })?;
        let deleted = db.delete_older_than(max_age, now)?;
        logger::info(
            LogTag::Database,
            &format!("Deleted {} samples older than {} days", deleted, retention_days),
        );
        deleted
    };

    logger::log_done(&format!("Run finished: {}", notify.decision.action));

    Ok(RunSummary {
        price,
        notify,
        published,
        pruned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{
        Action, Call, ConversationState, Delivery, MessageId, MessageKind, MockNotifier,
    };
    use crate::database::{test_db, TIMESTAMP_FORMAT};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    /// Previous week averaging 6.90
    fn seeded_db() -> HistoryDatabase {
        let db = test_db();
        db.insert_sample_at(6.85, at("2024-04-25 10:00:00")).unwrap();
        db.insert_sample_at(6.95, at("2024-04-29 10:00:00")).unwrap();
        db
    }

    async fn evaluate(
        db: &HistoryDatabase,
        notifier: Option<&dyn Notifier>,
        price: f64,
        now: &str,
    ) -> NotifyReport {
        evaluate_and_notify(
            db,
            &DecisionEngine::default(),
            &AverageWindow::default(),
            notifier,
            &MessageStyle::default(),
            price,
            at(now),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_run_sends_daily_and_saves_state() {
        let db = seeded_db();
        let notifier = MockNotifier::new(10);

        let report = evaluate(&db, Some(&notifier), 6.95, "2024-05-01 09:00:00").await;

        assert_eq!(report.decision.action, Action::SendDaily);
        assert!(report.state_saved);
        assert_eq!(
            db.get_conversation_state().unwrap(),
            ConversationState::posted(at("2024-05-01 00:00:00").date(), MessageId(10))
        );
        assert!(matches!(notifier.calls()[0], Call::Send(ref text) if text.contains("6.9500")));
    }

    #[tokio::test]
    async fn test_same_day_edits_without_state_write() {
        let db = seeded_db();
        let notifier = MockNotifier::new(10);

        evaluate(&db, Some(&notifier), 6.95, "2024-05-01 09:00:00").await;
        let report = evaluate(&db, Some(&notifier), 6.97, "2024-05-01 10:00:00").await;

        assert_eq!(
            report.decision.action,
            Action::EditMessage {
                message_id: MessageId(10)
            }
        );
        assert!(!report.state_saved);
        assert!(matches!(notifier.calls()[1], Call::Edit(MessageId(10), _)));
    }

    #[tokio::test]
    async fn test_spike_uses_previous_week_average() {
        let db = seeded_db();
        let notifier = MockNotifier::new(20);

        let report = evaluate(&db, Some(&notifier), 7.60, "2024-05-01 09:00:00").await;

        assert_eq!(report.weekly_average.map(|a| (a * 100.0).round()), Some(690.0));
        assert_eq!(report.decision.message_kind(), MessageKind::SpikeAlert);
        assert_eq!(
            report.outcome.unwrap().delivery,
            Some(Delivery::Sent {
                kind: MessageKind::SpikeAlert,
                message_id: MessageId(20),
            })
        );
        assert!(matches!(notifier.calls()[0], Call::Send(ref text) if text.contains("Alerta de Subida")));
    }

    #[tokio::test]
    async fn test_failed_edit_persists_fallback_message() {
        let db = seeded_db();
        let today = at("2024-05-01 00:00:00").date();
        db.update_conversation_state(&ConversationState::posted(today, MessageId(42)))
            .unwrap();
        let notifier = MockNotifier::new(43).failing_edits();

        let report = evaluate(&db, Some(&notifier), 6.97, "2024-05-01 11:00:00").await;

        assert!(report.state_saved);
        assert_eq!(report.outcome.unwrap().warnings.len(), 1);
        assert_eq!(
            db.get_conversation_state().unwrap(),
            ConversationState::posted(today, MessageId(43))
        );
    }

    #[tokio::test]
    async fn test_send_failure_keeps_previous_state() {
        let db = seeded_db();
        let previous = ConversationState::posted(at("2024-04-30 00:00:00").date(), MessageId(5));
        db.update_conversation_state(&previous).unwrap();
        let notifier = MockNotifier::new(6).failing_sends();

        let report = evaluate(&db, Some(&notifier), 6.95, "2024-05-01 09:00:00").await;

        assert!(!report.state_saved);
        assert!(!report.outcome.unwrap().is_delivered());
        assert_eq!(db.get_conversation_state().unwrap(), previous);
    }

    #[tokio::test]
    async fn test_without_notifier_only_decides() {
        let db = seeded_db();

        let report = evaluate(&db, None, 7.60, "2024-05-01 09:00:00").await;

        assert!(matches!(report.decision.action, Action::SendSpikeAlert { .. }));
        assert_eq!(report.outcome, None);
        assert!(db.get_conversation_state().unwrap().is_idle());
    }

    #[tokio::test]
    async fn test_empty_history_never_spikes() {
        let db = test_db();
        let notifier = MockNotifier::new(1);

        let report = evaluate(&db, Some(&notifier), 100.0, "2024-05-01 09:00:00").await;

        assert_eq!(report.weekly_average, None);
        assert_eq!(report.decision.action, Action::SendDaily);
    }

    /// Fixed-price source that counts fetches
    struct CountingSource {
        price: f64,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(price: f64) -> Self {
            Self {
                price,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        async fn fetch_price(&self) -> PipelineResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.price)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn telegram(enabled: bool, chat_id: &str) -> TelegramConfig {
        TelegramConfig {
            enabled,
            bot_token: "123:abc".to_string(),
            chat_id: chat_id.to_string(),
            ..TelegramConfig::default()
        }
    }

    #[tokio::test]
    async fn test_bad_chat_id_fails_before_fetch_and_insert() {
        let db = test_db();
        let store = db.clone();
        let source = CountingSource::new(6.95);

        let result = run_steps(
            RunOptions::default(),
            &telegram(true, "not-a-number"),
            &source,
            move || Ok(store),
        )
        .await;

        assert!(matches!(result, Err(PipelineError::Config(_))));
        assert_eq!(source.calls(), 0);
        assert_eq!(db.count_samples().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_with_telegram_disabled_stores_sample_only() {
        let db = test_db();
        let store = db.clone();
        let source = CountingSource::new(6.95);

        let summary = run_steps(
            RunOptions::default(),
            &telegram(false, ""),
            &source,
            move || Ok(store),
        )
        .await
        .unwrap();

        assert_eq!(summary.price, 6.95);
        assert_eq!(summary.notify.outcome, None);
        assert_eq!(summary.published, None);
        assert_eq!(summary.pruned, 0);
        assert_eq!(db.count_samples().unwrap(), 1);
        assert!(db.get_conversation_state().unwrap().is_idle());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing_and_skips_credential_check() {
        let db = test_db();
        let store = db.clone();
        let source = CountingSource::new(7.60);

        let summary = run_steps(
            RunOptions {
                dry_run: true,
                skip_publish: false,
            },
            &telegram(true, ""),
            &source,
            move || Ok(store),
        )
        .await
        .unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(summary.notify.outcome, None);
        assert_eq!(db.count_samples().unwrap(), 0);
        assert!(db.get_conversation_state().unwrap().is_idle());
    }
}
