//! The unit of work executed on every tick for one alert: compute the query
//! window, count new mentions, record a notification and advance the cursor,
//! then deliver the digest.

use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    mailer::{
        digest::{DigestRenderer, DIGEST_SUBJECT},
        Mailer,
    },
    models::{AlertFrequency, CursorAdvance, NewNotification},
    persistence::traits::AlertRepository,
    search::{ContentSearchPort, MentionQuery, TimeWindow},
};

/// The result of one tick, consumed by the scheduling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// New mentions were found; a notification was recorded and a digest
    /// dispatched.
    Notified,
    /// The window held no new mentions; only the cursor advanced.
    QuietWindow,
    /// The tick was skipped (validation or collaborator failure). The alert
    /// stays armed and the window is retried on the next tick.
    Skipped,
    /// The alert no longer exists or was soft-deleted; the job must be
    /// disarmed.
    Disarm,
}

/// Executes one alert's periodic check.
///
/// Failures never propagate out of a tick: collaborator errors are logged and
/// the tick is skipped, so one alert's failure cannot affect another's timer.
pub struct AlertRunner {
    repo: Arc<dyn AlertRepository>,
    search: Arc<dyn ContentSearchPort>,
    mailer: Arc<dyn Mailer>,
    digest: DigestRenderer,
    /// Upper bound on each external search/mail call.
    external_call_timeout: Duration,
}

impl AlertRunner {
    /// Creates a new runner over the given collaborators.
    pub fn new(
        repo: Arc<dyn AlertRepository>,
        search: Arc<dyn ContentSearchPort>,
        mailer: Arc<dyn Mailer>,
        external_call_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            search,
            mailer,
            digest: DigestRenderer::new(),
            external_call_timeout,
        }
    }

    /// Runs one tick for the given alert id.
    ///
    /// The alert row is re-fetched on every tick rather than trusting a
    /// snapshot captured at arm time, so edits and deletions made since the
    /// job was armed are observed before any side effect.
    pub async fn run_tick(&self, alert_id: i64) -> TickOutcome {
        let alert = match self.repo.find_alert(alert_id).await {
            Ok(Some(alert)) => alert,
            Ok(None) => {
                tracing::info!(alert_id, "Alert no longer exists, disarming its job.");
                return TickOutcome::Disarm;
            }
            Err(e) => {
                tracing::error!(alert_id, error = %e, "Failed to load alert, skipping tick.");
                return TickOutcome::Skipped;
            }
        };

        if alert.is_deleted {
            tracing::info!(alert_id, "Alert was deleted, disarming its job.");
            return TickOutcome::Disarm;
        }

        if alert.has_empty_keywords() {
            // A later edit may fix the keywords, so the job stays armed.
            tracing::warn!(alert_id, "Alert has empty keywords, skipping tick.");
            return TickOutcome::Skipped;
        }

        let schedule = AlertFrequency::resolve(&alert.frequency);
        let end = Utc::now();
        let previous_cursor = alert.last_updated_at;
        let start = previous_cursor.unwrap_or_else(|| end - schedule.default_lookback);

        let query = MentionQuery {
            keywords: alert.keywords.trim().to_string(),
            sources: alert.sources.clone(),
            sentiments: alert.sentiments.clone(),
            topic_id: alert.topic_id,
            window: TimeWindow { start, end },
        };

        let counts = match tokio::time::timeout(
            self.external_call_timeout,
            self.search.count_mentions(&query),
        )
        .await
        {
            Ok(Ok(counts)) => counts,
            Ok(Err(e)) => {
                // The cursor is untouched, so this window is retried on the
                // next tick.
                tracing::error!(alert_id, error = %e, "Mention query failed, skipping tick.");
                return TickOutcome::Skipped;
            }
            Err(_) => {
                tracing::error!(alert_id, "Mention query timed out, skipping tick.");
                return TickOutcome::Skipped;
            }
        };

        let total = counts.total();
        let cursor = CursorAdvance { last_updated_at: end, last_updated_from: previous_cursor };

        if total == 0 {
            // Advance the cursor so an empty window is never re-queried.
            if let Err(e) = self.repo.advance_cursor(alert_id, &cursor).await {
                tracing::error!(alert_id, error = %e, "Failed to advance cursor, skipping tick.");
                return TickOutcome::Skipped;
            }
            tracing::debug!(alert_id, "No new mentions in window.");
            return TickOutcome::QuietWindow;
        }

        let notification = NewNotification {
            alert_id,
            start_date: start,
            end_date: end,
            total_mentions: total as i64,
        };
        if let Err(e) = self.repo.create_notification(&notification).await {
            tracing::error!(alert_id, error = %e, "Failed to record notification, skipping tick.");
            return TickOutcome::Skipped;
        }
        if let Err(e) = self.repo.advance_cursor(alert_id, &cursor).await {
            tracing::error!(alert_id, error = %e, "Failed to advance cursor, skipping tick.");
            return TickOutcome::Skipped;
        }

        // The notification row and cursor advance are authoritative even if
        // delivery fails: at-most-once email, detectable from the audit
        // trail.
        match self.digest.render(&alert, &counts) {
            Ok(body) => {
                match tokio::time::timeout(
                    self.external_call_timeout,
                    self.mailer.send(&alert.recipients, DIGEST_SUBJECT, &body),
                )
                .await
                {
                    Ok(Ok(())) => {
                        tracing::info!(alert_id, total, "Digest dispatched.");
                    }
                    Ok(Err(e)) => {
                        tracing::error!(
                            alert_id,
                            error = %e,
                            "Digest delivery failed; notification already recorded."
                        );
                    }
                    Err(_) => {
                        tracing::error!(
                            alert_id,
                            "Digest delivery timed out; notification already recorded."
                        );
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    alert_id,
                    error = %e,
                    "Digest rendering failed; notification already recorded."
                );
            }
        }

        TickOutcome::Notified
    }
}
