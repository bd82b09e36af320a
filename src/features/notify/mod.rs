//! # Notify Feature
//!
//! Outbound notification delivery. One fixed destination, best-effort,
//! timeout-bounded: the sender reports plain success or failure and the
//! caller decides whether to retry.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

pub mod telegram;

use async_trait::async_trait;

pub use telegram::TelegramNotifier;

/// Delivers a formatted text message to the configured destination.
///
/// `true` means the destination accepted the message. Failure carries no
/// detail on purpose: delivery problems are logged where they happen and
/// the only sensible reaction upstream is to try again later.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> bool;
}

/// Boot-time self test: tells the destination the assistant is up and proves
/// the delivery path works.
pub async fn send_startup_greeting<N: Notifier + ?Sized>(notifier: &N) -> bool {
    let message = "🔔 <b>ASISTENTE INICIADO</b>\n\n\
                   ¡Tu asistente virtual se ha iniciado correctamente! 🤖\n\n\
                   Ahora recibirás notificaciones de recordatorios y reuniones por Telegram.";
    notifier.send(message).await
}
