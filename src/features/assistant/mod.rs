//! # Assistant Feature
//!
//! Conversational front door: classifies each input into a coarse intent,
//! extracts the day/time/event fields, and drives the reminder service.
//! Every exchange is appended to the interactions audit log.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.4.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.2.0: Meeting flow creates the advance reminder through the service
//! - 1.1.0: Priority and tag extraction on reminder creation
//! - 1.0.0: Intent tables and canned replies

pub mod intent;

use std::sync::Arc;

use log::{debug, error, warn};

use crate::core::error::ServiceError;
use crate::core::time::TimeKeeper;
use crate::features::reminders::service::{CreateReminder, DueSpec, ReminderService};
use crate::features::reminders::store::{EventJournal, ReminderStore};

pub use intent::{
    detect_intent, detect_priority, extract_entities, extract_meeting_title,
    extract_reminder_title, extract_tags, Entities, Intent,
};

const GREETING_REPLY: &str = "¡Hola! Soy tu asistente inteligente. Puedo ayudarte a programar \
     reuniones, crear recordatorios, y aprender de tus rutinas. ¿En qué te puedo ayudar hoy?";

const TASK_REPLY: &str =
    "📝 Anotado! He agregado esta tarea a tu lista. ¿Tiene alguna fecha límite específica?";

const HELP_REPLY: &str = "🤖 **Puedo ayudarte con:**\n\
     • 📅 Programar reuniones y eventos\n\
     • 🔔 Crear recordatorios inteligentes\n\
     • 📝 Gestionar tus tareas pendientes\n\n\
     Solo dime qué necesitas en lenguaje natural!";

const THANKS_REPLY: &str =
    "¡De nada! Estoy aquí para hacer tu día más productivo. ¿Hay algo más en lo que pueda ayudarte?";

const UNKNOWN_REPLY: &str = "🤔 Interesante! Todavía estoy aprendiendo a entender solicitudes \
     como esta. ¿Podrías reformularlo de otra manera? Por ejemplo: 'Programar reunión mañana a \
     las 3 PM' o 'Recordarme llamar a Juan'.";

const MEETING_PROMPT: &str = "📅 Veo que quieres programar una reunión. ¿Para qué día y hora te \
     gustaría?\n\n**Ejemplos:**\n- 'Mañana a las 10 AM'\n- 'El viernes a las 3 PM'\n- 'Hoy a las \
     2 de la tarde'";

pub struct Assistant<S> {
    service: ReminderService<S>,
    store: Arc<S>,
    keeper: TimeKeeper,
}

impl<S: ReminderStore + EventJournal> Assistant<S> {
    pub fn new(store: Arc<S>, keeper: TimeKeeper) -> Assistant<S> {
        Assistant {
            service: ReminderService::new(store.clone(), keeper),
            store,
            keeper,
        }
    }

    pub fn service(&self) -> &ReminderService<S> {
        &self.service
    }

    /// Answer one input and append the exchange to the audit log.
    pub async fn respond(&self, owner: &str, input: &str) -> String {
        let intent = detect_intent(input);
        let entities = extract_entities(input);
        debug!("intent {intent:?}, entities {entities:?}");

        let reply = match intent {
            Intent::CreateReminder => self.create_reminder_reply(owner, input).await,
            Intent::ScheduleMeeting => self.meeting_reply(owner, input, &entities).await,
            Intent::Greeting => GREETING_REPLY.to_string(),
            Intent::CreateTask => TASK_REPLY.to_string(),
            Intent::AskHelp => HELP_REPLY.to_string(),
            Intent::ThankYou => THANKS_REPLY.to_string(),
            Intent::Unknown => UNKNOWN_REPLY.to_string(),
        };

        let now = self.keeper.strip_zone(self.keeper.now_utc());
        if let Err(e) = self.store.log_interaction(owner, input, &reply, now).await {
            warn!("failed to record interaction: {e}");
        }

        reply
    }

    async fn create_reminder_reply(&self, owner: &str, input: &str) -> String {
        let title = extract_reminder_title(input);
        let mut tags = extract_tags(input);
        let lower = input.to_lowercase();
        if ["reunión", "reunion", "meeting"].iter().any(|w| lower.contains(w)) {
            tags.push("reunión".to_string());
        }

        let request = CreateReminder {
            owner: owner.to_string(),
            title: title.clone(),
            description: Some(input.to_string()),
            due: DueSpec::Text(input.to_string()),
            priority: detect_priority(input),
            tags,
            is_recurring: false,
            recurrence_pattern: None,
        };

        match self.service.create(request).await {
            Ok(created) => {
                let due_utc = self.keeper.rehydrate(created.due_date);
                let due_local = self.keeper.to_local(due_utc);
                let delay = human_delay(due_utc.since(self.keeper.now_utc()).num_seconds());
                format!(
                    "🔔 **Recordatorio creado:** '{title}' para el {} ({delay}). \
                     ¡Te avisaré y se completará automáticamente!",
                    due_local.format("%d/%m/%Y a las %H:%M")
                )
            }
            Err(ServiceError::Resolve(_)) => "❌ No pude entender la fecha y hora. ¿Podrías ser \
                 más específico? Ej: 'mañana a las 10 AM' o 'en 2 horas'"
                .to_string(),
            Err(e) => {
                error!("reminder creation failed: {e}");
                "❌ No pude crear el recordatorio. Por favor intenta de nuevo.".to_string()
            }
        }
    }

    async fn meeting_reply(&self, owner: &str, input: &str, entities: &Entities) -> String {
        match (&entities.day, &entities.time) {
            (Some(day), Some(time)) => {
                let when = format!("{day} a las {time}");
                let title = extract_meeting_title(input);
                match self.service.schedule_meeting(owner, &title, &when, input).await {
                    Ok(meeting) => {
                        let meeting_local =
                            self.keeper.to_local(self.keeper.rehydrate(meeting.meeting_at));
                        let reminder_local =
                            self.keeper.to_local(self.keeper.rehydrate(meeting.reminder_at));
                        format!(
                            "✅ **¡Reunión programada!**\n\n📅 **{title}**\n🕐 **Cuándo:** {}\n\
                             🔔 **Recordatorio:** {} (15 minutos antes)\n\n\
                             ¡El recordatorio ya está en tu lista!",
                            meeting_local.format("%A %d de %B a las %H:%M"),
                            reminder_local.format("%H:%M")
                        )
                    }
                    Err(ServiceError::Resolve(_)) => format!(
                        "❌ No pude entender la fecha y hora '{when}'. ¿Podrías ser más \
                         específico? Ej: 'mañana a las 10 AM'"
                    ),
                    Err(e) => {
                        error!("meeting scheduling failed: {e}");
                        "❌ Error programando la reunión. Por favor intenta de nuevo.".to_string()
                    }
                }
            }
            (None, Some(time)) => {
                format!("🕐 Entendido, programar reunión a las {time}. ¿Para qué día sería?")
            }
            (Some(day), None) => format!("📅 Reunión programada para el {day}. ¿A qué hora?"),
            (None, None) => MEETING_PROMPT.to_string(),
        }
    }
}

/// Human-readable time-until text for confirmation replies.
fn human_delay(total_seconds: i64) -> String {
    if total_seconds < 60 {
        "en menos de 1 minuto".to_string()
    } else if total_seconds < 3600 {
        format!("en {} minutos", total_seconds / 60)
    } else if total_seconds < 86400 {
        format!("en {} horas", total_seconds / 3600)
    } else {
        format!("en {} días", total_seconds / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::features::reminders::model::{ReminderPriority, ReminderStatus};
    use crate::features::reminders::service::StatusFilter;
    use chrono_tz::America::Caracas;

    fn assistant() -> (Arc<MemoryStore>, Assistant<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Assistant::new(store, TimeKeeper::new(Caracas)))
    }

    #[test]
    fn test_human_delay_buckets() {
        assert_eq!(human_delay(30), "en menos de 1 minuto");
        assert_eq!(human_delay(300), "en 5 minutos");
        assert_eq!(human_delay(7200), "en 2 horas");
        assert_eq!(human_delay(172800), "en 2 días");
    }

    #[tokio::test]
    async fn test_respond_creates_reminder_and_logs_exchange() {
        let (store, assistant) = assistant();
        let reply = assistant
            .respond("ana", "Recordarme llamar a Juan urgente mañana a las 10 am")
            .await;
        assert!(reply.contains("Recordatorio creado"), "{reply}");

        let reminders = assistant
            .service()
            .list("ana", StatusFilter::Only(ReminderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].priority, ReminderPriority::Urgent);
        assert_eq!(store.interactions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_respond_meeting_creates_event_and_advance_reminder() {
        let (store, assistant) = assistant();
        let reply = assistant
            .respond("ana", "Programar reunión con el equipo mañana a las 3 pm")
            .await;
        assert!(reply.contains("Reunión programada"), "{reply}");
        assert!(reply.contains("15 minutos antes"), "{reply}");

        assert_eq!(store.events().await.len(), 1);
        let reminders = assistant
            .service()
            .list("ana", StatusFilter::Any)
            .await
            .unwrap();
        assert_eq!(reminders.len(), 1);
        assert!(reminders[0].title.starts_with("Reunión:"));
    }

    #[tokio::test]
    async fn test_respond_meeting_missing_time_asks_back() {
        let (store, assistant) = assistant();
        let reply = assistant.respond("ana", "quiero una reunión el viernes").await;
        assert!(reply.contains("¿A qué hora?"), "{reply}");
        assert_eq!(store.events().await.len(), 0);
    }

    #[tokio::test]
    async fn test_respond_canned_replies_are_logged() {
        let (store, assistant) = assistant();
        let reply = assistant.respond("ana", "hola").await;
        assert_eq!(reply, GREETING_REPLY);
        let reply = assistant.respond("ana", "gracias").await;
        assert_eq!(reply, THANKS_REPLY);
        assert_eq!(store.interactions().await.len(), 2);
    }

    #[tokio::test]
    async fn test_respond_unknown_input() {
        let (_, assistant) = assistant();
        let reply = assistant.respond("ana", "el clima de madrid").await;
        assert_eq!(reply, UNKNOWN_REPLY);
    }
}
