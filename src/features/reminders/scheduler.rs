//! Background reminder scheduler.
//!
//! One long-lived task polls the store on a fixed period and walks three
//! passes per cycle: approaching, final, overdue. Passes are strictly
//! sequential and the loop only sleeps after the whole cycle, network
//! sends included, has finished, so cycles never overlap. An unexpected
//! store error aborts the cycle and the loop retries after a longer backoff;
//! it never exits.
//!
//! Delivery is at-least-once: a send that fails or times out leaves the
//! reminder untouched and the tier retries on the next cycle. The opposite
//! direction is covered by the store's conditional guard updates, which make
//! each tier fire at most once per reminder even with concurrent pollers.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use log::{debug, error, info};

use crate::core::error::StoreError;
use crate::core::time::{TimeKeeper, UtcTime};
use crate::features::notify::Notifier;

use super::model::{Reminder, ReminderId};
use super::store::{ReminderQuery, ReminderStore};
use super::tiers::{evaluate, Tier};

/// How far ahead the approaching pass scans. The tier engine narrows the
/// actual firing window to the last two minutes.
const APPROACH_SCAN_MINUTES: i64 = 5;
/// How far ahead the final pass scans.
const FINAL_SCAN_MINUTES: i64 = 1;

/// What one cycle did. A reminder fires at most one tier per cycle; the
/// `fired` set enforces that across the three passes.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub approaching: usize,
    pub completed: usize,
    pub overdue: usize,
    fired: HashSet<ReminderId>,
}

impl CycleReport {
    pub fn total(&self) -> usize {
        self.approaching + self.completed + self.overdue
    }

    fn already_fired(&self, id: &str) -> bool {
        self.fired.contains(id)
    }

    fn note(&mut self, id: &ReminderId) {
        self.fired.insert(id.clone());
    }
}

pub struct ReminderScheduler<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    keeper: TimeKeeper,
    poll: StdDuration,
    backoff: StdDuration,
}

impl<S: ReminderStore, N: Notifier> ReminderScheduler<S, N> {
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        keeper: TimeKeeper,
        poll_seconds: u64,
        backoff_seconds: u64,
    ) -> ReminderScheduler<S, N> {
        ReminderScheduler {
            store,
            notifier,
            keeper,
            poll: StdDuration::from_secs(poll_seconds),
            backoff: StdDuration::from_secs(backoff_seconds),
        }
    }

    /// Poll forever. Runs for the lifetime of the process.
    pub async fn run(self) {
        info!(
            "⏰ Reminder scheduler started (poll {}s, backoff {}s)",
            self.poll.as_secs(),
            self.backoff.as_secs()
        );
        loop {
            match self.run_cycle(self.keeper.now_utc()).await {
                Ok(report) => {
                    if report.total() > 0 {
                        info!(
                            "📨 Cycle done: {} approaching, {} completed, {} overdue",
                            report.approaching, report.completed, report.overdue
                        );
                    }
                    tokio::time::sleep(self.poll).await;
                }
                Err(e) => {
                    error!("Reminder cycle failed: {e}");
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }

    /// One full cycle at instant `now`. Split out from [`run`] so tests can
    /// drive the loop at synthetic instants.
    pub async fn run_cycle(&self, now: UtcTime) -> Result<CycleReport, StoreError> {
        let mut report = CycleReport::default();
        self.approaching_pass(now, &mut report).await?;
        self.final_pass(now, &mut report).await?;
        self.overdue_pass(now, &mut report).await?;
        Ok(report)
    }

    async fn approaching_pass(
        &self,
        now: UtcTime,
        report: &mut CycleReport,
    ) -> Result<(), StoreError> {
        let query = ReminderQuery::pending()
            .due_after(self.keeper.strip_zone(now))
            .due_at_or_before(
                self.keeper
                    .strip_zone(now.plus(Duration::minutes(APPROACH_SCAN_MINUTES))),
            )
            .never_reminded();

        for reminder in self.store.find(query).await? {
            if report.already_fired(&reminder.id) {
                continue;
            }
            if let Tier::Approaching { minutes_left } = evaluate(&reminder, now, &self.keeper) {
                let message = self.approaching_message(&reminder, minutes_left);
                if !self.notifier.send(&message).await {
                    debug!("approaching notice for {} not delivered, retrying next cycle", reminder.id);
                    continue;
                }
                if self
                    .store
                    .mark_approached(&reminder.id, self.keeper.strip_zone(now))
                    .await?
                {
                    report.approaching += 1;
                    report.note(&reminder.id);
                    info!("🔔 Approaching notice sent: {}", reminder.title);
                } else {
                    debug!("reminder {} was claimed by another poller", reminder.id);
                }
            }
        }
        Ok(())
    }

    async fn final_pass(&self, now: UtcTime, report: &mut CycleReport) -> Result<(), StoreError> {
        let query = ReminderQuery::pending()
            .due_after(self.keeper.strip_zone(now))
            .due_at_or_before(
                self.keeper
                    .strip_zone(now.plus(Duration::minutes(FINAL_SCAN_MINUTES))),
            )
            .awaiting_final();

        for reminder in self.store.find(query).await? {
            if report.already_fired(&reminder.id) {
                continue;
            }
            if evaluate(&reminder, now, &self.keeper) == Tier::Final {
                let message = self.final_message(&reminder);
                if !self.notifier.send(&message).await {
                    debug!("final notice for {} not delivered, retrying next cycle", reminder.id);
                    continue;
                }
                if self
                    .store
                    .complete_final(&reminder.id, self.keeper.strip_zone(now))
                    .await?
                {
                    report.completed += 1;
                    report.note(&reminder.id);
                    info!("✅ Final notice sent and reminder completed: {}", reminder.title);
                } else {
                    debug!("reminder {} was completed by another poller", reminder.id);
                }
            }
        }
        Ok(())
    }

    async fn overdue_pass(&self, now: UtcTime, report: &mut CycleReport) -> Result<(), StoreError> {
        let query = ReminderQuery::pending()
            .due_at_or_before(self.keeper.strip_zone(now))
            .never_reminded();

        for reminder in self.store.find(query).await? {
            if report.already_fired(&reminder.id) {
                continue;
            }
            if evaluate(&reminder, now, &self.keeper) == Tier::Overdue {
                let message = self.overdue_message(&reminder);
                if !self.notifier.send(&message).await {
                    debug!("overdue notice for {} not delivered, retrying next cycle", reminder.id);
                    continue;
                }
                if self
                    .store
                    .mark_overdue_notified(&reminder.id, self.keeper.strip_zone(now))
                    .await?
                {
                    report.overdue += 1;
                    report.note(&reminder.id);
                    info!("🔔 Overdue notice sent: {}", reminder.title);
                }
            }
        }
        Ok(())
    }

    fn due_local_display(&self, reminder: &Reminder) -> String {
        self.keeper
            .to_local(self.keeper.rehydrate(reminder.due_date))
            .format("%d/%m/%Y a las %H:%M")
    }

    fn approaching_message(&self, reminder: &Reminder, minutes_left: i64) -> String {
        let mut message = String::from("🔔 <b>RECORDATORIO PRÓXIMO</b>\n\n");
        message.push_str(&format!("<b>{}</b>\n", reminder.title));
        if let Some(description) = &reminder.description {
            message.push_str(&format!("📝 {description}\n"));
        }
        message.push_str(&format!("\n⏰ <b>Hora:</b> {}\n", self.due_local_display(reminder)));
        message.push_str(&format!("⏳ <i>Faltan {minutes_left} minutos</i>"));
        message
    }

    fn final_message(&self, reminder: &Reminder) -> String {
        let mut message = String::from("⏰ <b>RECORDATORIO INMEDIATO</b>\n\n");
        message.push_str(&format!("<b>{}</b>\n", reminder.title));
        if let Some(description) = &reminder.description {
            message.push_str(&format!("📝 {description}\n"));
        }
        message.push_str(&format!("\n🕐 <b>Es ahora:</b> {}", self.due_local_display(reminder)));
        message.push_str("\n\n✅ <i>Este recordatorio se ha completado automáticamente</i>");
        message
    }

    fn overdue_message(&self, reminder: &Reminder) -> String {
        let mut message = String::from("🔔 <b>RECORDATORIO VENCIDO</b>\n\n");
        message.push_str(&format!("<b>{}</b>\n", reminder.title));
        if let Some(description) = &reminder.description {
            message.push_str(&format!("{description}\n"));
        }
        message.push_str("\n⏰ <i>¡Este recordatorio ya venció!</i>");
        message
    }
}
