//! Coarse intent and entity extraction.
//!
//! Keyword tables, nothing clever: the first table row with a keyword found
//! anywhere in the lowercased input wins. The extracted day/time strings are
//! handed onward to the natural-time resolver, which owns the real parsing.

use regex::Regex;

use crate::features::reminders::model::ReminderPriority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    ScheduleMeeting,
    CreateReminder,
    CreateTask,
    AskHelp,
    ThankYou,
    Unknown,
}

const INTENT_TABLE: &[(Intent, &[&str])] = &[
    (
        Intent::Greeting,
        &["hola", "hi", "buenos días", "buenos dias", "buenas tardes"],
    ),
    (
        Intent::ScheduleMeeting,
        &["reunión", "reunion", "meeting", "programar reunión"],
    ),
    (
        Intent::CreateReminder,
        &["recordar", "recordatorio", "reminder", "no olvidar"],
    ),
    (
        Intent::CreateTask,
        &["tarea", "task", "pendiente", "por hacer"],
    ),
    (
        Intent::AskHelp,
        &["ayuda", "help", "qué puedes hacer", "que puedes hacer"],
    ),
    (Intent::ThankYou, &["gracias", "thanks", "thank you"]),
];

pub fn detect_intent(input: &str) -> Intent {
    let lower = input.to_lowercase();
    for (intent, keywords) in INTENT_TABLE {
        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            return *intent;
        }
    }
    Intent::Unknown
}

/// Day names recognised as an entity, scanned in order.
const ENTITY_DAYS: &[&str] = &[
    "lunes", "martes", "miércoles", "miercoles", "jueves", "viernes", "sábado", "sabado",
    "domingo", "hoy", "mañana", "manana", "monday", "tuesday", "wednesday", "thursday",
    "friday", "saturday", "sunday", "today", "tomorrow",
];

const EVENT_TYPES: &[(&str, &str)] = &[
    ("reunión", "meeting"),
    ("reunion", "meeting"),
    ("meeting", "meeting"),
    ("llamada", "call"),
    ("call", "call"),
    ("tarea", "task"),
    ("task", "task"),
    ("recordatorio", "reminder"),
    ("reminder", "reminder"),
    ("evento", "event"),
    ("event", "event"),
];

/// Bag of fields pulled out of the input. The time span is kept verbatim
/// (meridiem included) so the resolver can apply its own rules to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub time: Option<String>,
    pub day: Option<String>,
    pub event_type: Option<String>,
}

pub fn extract_entities(input: &str) -> Entities {
    let lower = input.to_lowercase();
    let mut entities = Entities::default();

    let time_pattern =
        Regex::new(r"(\d{1,2}):?(\d{2})?\s*(am|pm|hrs)?").expect("hardcoded pattern");
    if let Some(found) = time_pattern.find(&lower) {
        entities.time = Some(found.as_str().trim().to_string());
    }

    for day in ENTITY_DAYS {
        if lower.contains(day) {
            entities.day = Some((*day).to_string());
            break;
        }
    }

    for (keyword, event_type) in EVENT_TYPES {
        if lower.contains(keyword) {
            entities.event_type = Some((*event_type).to_string());
            break;
        }
    }

    entities
}

pub fn detect_priority(input: &str) -> ReminderPriority {
    let lower = input.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if any(&["urgente", "importante", "crítico", "critico", "inmediato"]) {
        ReminderPriority::Urgent
    } else if any(&["alto", "prioridad", "esencial"]) {
        ReminderPriority::High
    } else if any(&["bajo", "cuando puedas", "sin prisa"]) {
        ReminderPriority::Low
    } else {
        ReminderPriority::Medium
    }
}

const TAG_TABLE: &[(&str, &[&str])] = &[
    (
        "trabajo",
        &["reunión", "reunion", "oficina", "proyecto", "cliente", "jefe"],
    ),
    (
        "personal",
        &["casa", "familia", "amigos", "personal", "cita"],
    ),
    (
        "salud",
        &["doctor", "médico", "medico", "ejercicio", "gimnasio", "salud"],
    ),
    (
        "compras",
        &["comprar", "supermercado", "tienda", "mercado"],
    ),
];

pub fn extract_tags(input: &str) -> Vec<String> {
    let lower = input.to_lowercase();
    TAG_TABLE
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(tag, _)| (*tag).to_string())
        .collect()
}

/// Words dropped from the input when deriving a display title.
const TIME_WORDS: &[&str] = &[
    "pasado mañana", "mañana", "hoy", "lunes", "martes", "miércoles", "miercoles", "jueves",
    "viernes", "sábado", "sabado", "domingo", "tomorrow", "today", "a las", "las", "at",
    "pm", "am", "hrs", "horas",
];

const MEETING_WORDS: &[&str] = &["reunión", "reunion", "meeting"];

fn strip_words(input: &str, extra: &[&str]) -> String {
    let mut title = input.to_string();
    for word in TIME_WORDS.iter().chain(extra) {
        // Whole words only: "am" must not eat the middle of "llamar".
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
            .expect("hardcoded pattern");
        title = pattern.replace_all(&title, " ").into_owned();
    }
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn extract_reminder_title(input: &str) -> String {
    let title = strip_words(input, &[]);
    if title.is_empty() {
        "Recordatorio importante".to_string()
    } else {
        title
    }
}

pub fn extract_meeting_title(input: &str) -> String {
    let title = strip_words(input, MEETING_WORDS);
    if title.is_empty() {
        "Reunión importante".to_string()
    } else {
        title
    }
}
