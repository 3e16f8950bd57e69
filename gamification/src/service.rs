//! The gamification service: ledger appends, action awards, leaderboards
//! and reconciliation.

use crate::backfill::{BackfillOutcome, BackfillReport, GamificationDebugReport};
use crate::error::{GamificationError, Result};
use crate::ranking::{RankingEntry, RankingPeriod, RANKING_LIMIT};
use chrono::Utc;
use marcha_core::points::RECONCILIATION_REASON;
use marcha_core::{
    ActionKey, GamificationConfig, GamificationStore, NewPointLogEntry, PointLogEntry, UserId,
};
use std::collections::HashMap;

/// How many recent ledger entries a debug report carries.
const DEBUG_SAMPLE_SIZE: usize = 10;

/// Points ledger and ranking service.
///
/// Cheap to clone when `S` is (the Postgres stores wrap a pooled
/// connection); construct one per subsystem and share it.
#[derive(Clone, Debug)]
pub struct GamificationService<S> {
    store: S,
}

impl<S: GamificationStore> GamificationService<S> {
    /// Creates a service over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends a ledger entry and increments the user's denormalized total
    /// in one transaction.
    ///
    /// `points` is typically positive; negative manual adjustments are
    /// allowed. The returned entry is permanent and individually
    /// attributable to one action occurrence.
    ///
    /// # Errors
    ///
    /// Propagates store failures; the user row must exist.
    pub async fn log_points(
        &self,
        user_id: &UserId,
        points: i64,
        reason: &str,
    ) -> Result<PointLogEntry> {
        let entry = self
            .store
            .append_and_increment(NewPointLogEntry::new(user_id.clone(), points, reason))
            .await?;

        tracing::info!(
            user_id = %entry.user_id,
            points = entry.points,
            reason = %entry.reason,
            "Points logged"
        );
        metrics::counter!("gamification.points.logged").increment(1);

        Ok(entry)
    }

    /// Awards the configured point value for `action`.
    ///
    /// Resolves the value from the singleton config, seeding the hardcoded
    /// defaults on first use. A resolved value of 0 performs no write.
    ///
    /// Failures are swallowed: a fuel log must succeed even when points
    /// cannot be awarded, so every error path logs, counts and returns 0.
    /// Returns the number of points actually awarded.
    pub async fn award_points_for_action(
        &self,
        user_id: &UserId,
        action: ActionKey,
        custom_reason: Option<&str>,
    ) -> i64 {
        let config = self.effective_config().await;
        let points = config.value_for(action);
        if points == 0 {
            return 0;
        }

        let reason = custom_reason.unwrap_or(action.as_str());
        match self.log_points(user_id, points, reason).await {
            Ok(_) => points,
            Err(error) => {
                tracing::warn!(
                    user_id = %user_id,
                    action = %action,
                    %error,
                    "Failed to award points, primary action unaffected"
                );
                metrics::counter!("gamification.award.failed").increment(1);
                0
            }
        }
    }

    /// The action-value config, defaulting on any failure.
    ///
    /// A missing config is seeded with the defaults so administrators find
    /// an editable document; the seed itself is best-effort.
    async fn effective_config(&self) -> GamificationConfig {
        match self.store.load_config().await {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = GamificationConfig::with_defaults(Utc::now());
                if let Err(error) = self.store.save_config(&config).await {
                    tracing::warn!(%error, "Failed to seed gamification config");
                }
                config
            }
            Err(error) => {
                tracing::warn!(%error, "Gamification config unreadable, using defaults");
                GamificationConfig::with_defaults(Utc::now())
            }
        }
    }

    /// Computes the leaderboard for `period`.
    ///
    /// Administrator accounts never appear, regardless of window. Ties
    /// break deterministically by user id. A failing store yields an empty
    /// leaderboard rather than an error: "no data yet" beats a crashed
    /// page.
    pub async fn get_ranking(&self, period: RankingPeriod) -> Vec<RankingEntry> {
        let result = match period.window_start(Utc::now()) {
            None => self.all_time_ranking().await,
            Some(start) => self.windowed_ranking(start).await,
        };

        match result {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(period = %period, %error, "Ranking query failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Fast path: the denormalized totals already hold the answer.
    async fn all_time_ranking(&self) -> Result<Vec<RankingEntry>> {
        let mut users: Vec<_> = self
            .store
            .users_with_points()
            .await?
            .into_iter()
            .filter(|user| user.points > 0 && !user.role.is_admin())
            .collect();

        users.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(users
            .into_iter()
            .map(|user| RankingEntry::new(user.id, user.name, user.points, user.points))
            .collect())
    }

    /// Aggregates ledger entries from `start`, then hydrates the top rows
    /// with user records, dropping administrators and vanished users.
    async fn windowed_ranking(
        &self,
        start: chrono::DateTime<Utc>,
    ) -> Result<Vec<RankingEntry>> {
        let mut totals: HashMap<UserId, i64> = HashMap::new();
        for entry in self.store.entries_since(start).await? {
            *totals.entry(entry.user_id).or_insert(0) += entry.points;
        }

        let mut ranked: Vec<_> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(RANKING_LIMIT);

        let mut entries = Vec::with_capacity(ranked.len());
        for (user_id, points) in ranked {
            let Some(user) = self.store.user(&user_id).await? else {
                continue;
            };
            if user.role.is_admin() {
                continue;
            }
            entries.push(RankingEntry::new(user.id, user.name, points, user.points));
        }
        Ok(entries)
    }

    /// Bulk reconciliation: repairs drift between every user's
    /// denormalized total and their ledger sum.
    ///
    /// Per-user failures are caught and counted, never fatal to the batch.
    ///
    /// # Errors
    ///
    /// Only the initial user listing can fail the whole run.
    pub async fn backfill_points(&self) -> Result<BackfillReport> {
        let users = self.store.users_with_points().await?;
        let mut report = BackfillReport::default();

        for user in users {
            match self.reconcile(&user.id, user.points).await {
                Ok(Some(correction)) => {
                    report.users_updated += 1;
                    tracing::info!(
                        user_id = %user.id,
                        correction,
                        "Backfill corrected ledger drift"
                    );
                }
                Ok(None) => report.users_consistent += 1,
                Err(error) => {
                    report.users_errored += 1;
                    tracing::warn!(user_id = %user.id, %error, "Backfill failed for user");
                }
            }
        }

        metrics::counter!("gamification.backfill.corrections")
            .increment(u64::from(report.users_updated));
        tracing::info!(
            updated = report.users_updated,
            consistent = report.users_consistent,
            errored = report.users_errored,
            "Backfill run finished"
        );
        Ok(report)
    }

    /// Single-user reconciliation, identified by email.
    ///
    /// # Errors
    ///
    /// [`GamificationError::UserNotFound`] for an unknown email; store
    /// failures propagate.
    pub async fn force_backfill_user(&self, email: &str) -> Result<BackfillOutcome> {
        let user = self.require_user(email).await?;
        let ledger_sum = self.store.ledger_sum(&user.id).await?;

        match self.reconcile(&user.id, user.points).await? {
            Some(correction) => Ok(BackfillOutcome::Corrected {
                correction,
                total: user.points,
            }),
            None => Ok(BackfillOutcome::NothingToFix {
                denormalized: user.points,
                ledger_sum,
            }),
        }
    }

    /// Read-only drift diagnosis for one user, identified by email.
    ///
    /// # Errors
    ///
    /// [`GamificationError::UserNotFound`] for an unknown email; store
    /// failures propagate.
    pub async fn debug_user_gamification(&self, email: &str) -> Result<GamificationDebugReport> {
        let user = self.require_user(email).await?;
        let ledger_sum = self.store.ledger_sum(&user.id).await?;
        let recent_entries = self
            .store
            .recent_entries(&user.id, DEBUG_SAMPLE_SIZE)
            .await?;

        Ok(GamificationDebugReport {
            user_id: user.id,
            email: email.to_string(),
            denormalized: user.points,
            ledger_sum,
            diff: user.points - ledger_sum,
            recent_entries,
        })
    }

    /// Appends a corrective entry when the ledger is behind the
    /// denormalized total. Returns the correction, `None` when consistent.
    async fn reconcile(&self, user_id: &UserId, denormalized: i64) -> Result<Option<i64>> {
        let ledger_sum = self.store.ledger_sum(user_id).await?;
        let diff = denormalized - ledger_sum;
        if diff <= 0 {
            // Ledger equal or ahead: nothing to fix. The total is never
            // decreased and history is never removed.
            return Ok(None);
        }

        self.store
            .append(NewPointLogEntry::new(
                user_id.clone(),
                diff,
                RECONCILIATION_REASON,
            ))
            .await?;
        Ok(Some(diff))
    }

    async fn require_user(&self, email: &str) -> Result<marcha_core::User> {
        self.store
            .user_by_email(email)
            .await?
            .ok_or_else(|| GamificationError::UserNotFound {
                email: email.to_string(),
            })
    }
}
