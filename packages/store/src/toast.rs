//! Transient confirmation messages.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a toast stays visible, in milliseconds.
pub const TOAST_LIFETIME_MS: i64 = 3000;

/// A short confirmation message shown after an action succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    /// Message text (French).
    pub message: String,
    /// Distinguishes two toasts with the same text.
    pub key: i64,
    /// When the toast was raised.
    pub shown_at: DateTime<Utc>,
}

impl Toast {
    /// Raises a toast at `now`.
    #[must_use]
    pub fn new(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            key: now.timestamp_millis(),
            shown_at: now,
        }
    }

    /// Whether the toast has outlived [`TOAST_LIFETIME_MS`] at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.shown_at >= Duration::milliseconds(TOAST_LIFETIME_MS)
    }
}

/// Toast raised after an owner status update, stamped `HH:MM`.
///
/// Bamako runs on UTC year-round, so the UTC clock is the local clock.
#[must_use]
pub fn status_updated(now: DateTime<Utc>) -> String {
    format!("Statut mis à jour avec succès à {}.", now.format("%H:%M"))
}

pub const REVIEW_SUBMITTED: &str = "Vos modifications ont été soumises pour validation.";
pub const STATION_SUBMITTED: &str = "Station soumise avec succès. Elle sera visible publiquement après vérification par notre équipe (Mode Admin).";
pub const INTEGRITY_REPORTED: &str = "Signalement envoyé. Merci pour votre contribution.";
pub const INCIDENT_REPORTED: &str = "Signalement d'incident envoyé. Merci.";
pub const STATION_APPROVED: &str = "Station vérifiée et publiée !";
pub const STATION_REJECTED: &str = "Soumission de station rejetée.";
pub const ADMIN_WELCOME: &str = "Authentification réussie. Bienvenue !";
pub const ADMIN_LOGGED_OUT: &str = "Vous avez été déconnecté.";
