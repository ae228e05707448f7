//! Notification display formatting.
//!
//! Builds the title and body text for a classified payload. Body text is
//! truncated to a fixed character limit for the dropdown list.

use facilityhub_entity::notification::{NotificationCategory, NotificationPayload};

/// Maximum characters shown in the notification list before truncation.
pub const DISPLAY_TEXT_LIMIT: usize = 40;

/// Truncates a display string: strings longer than the limit are cut at
/// the limit and `" ..."` is appended; shorter strings are shown verbatim.
pub fn truncate(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(DISPLAY_TEXT_LIMIT) {
        Some((byte_idx, _)) => format!("{} ...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Title line shown above the body text.
pub fn title(category: NotificationCategory) -> &'static str {
    match category {
        NotificationCategory::PaymentUnpaid => "Payment pending",
        NotificationCategory::PaymentPaid => "Payment completed",
        NotificationCategory::MeterUnconfirmed => "Meter reading unconfirmed",
        NotificationCategory::MeterConfirmed => "Meter reading confirmed",
        NotificationCategory::BirthdayReminder => "Birthday reminder",
        NotificationCategory::MaintenanceReminder => "Maintenance reminder",
        NotificationCategory::Unknown => "Notification",
    }
}

/// Full body text for a payload, before truncation.
pub fn display_text(payload: &NotificationPayload) -> String {
    match payload {
        NotificationPayload::Payment {
            unpaid: true,
            amount,
            date,
        } => format!(
            "A payment of {} is due by {}.",
            format_amount(*amount),
            format_date(date)
        ),
        NotificationPayload::Payment {
            unpaid: false,
            amount,
            date,
        } => format!(
            "A payment of {} was completed on {}.",
            format_amount(*amount),
            format_date(date)
        ),
        NotificationPayload::Meter {
            confirmed: false,
            serial_number,
            reading_date,
        } => format!(
            "Please verify meter {} read on {}.",
            serial_number.as_deref().unwrap_or("N/A"),
            format_date(reading_date)
        ),
        NotificationPayload::Meter {
            confirmed: true,
            serial_number,
            reading_date,
        } => format!(
            "Meter {} was confirmed on {}.",
            serial_number.as_deref().unwrap_or("N/A"),
            format_date(reading_date)
        ),
        NotificationPayload::Birthday {
            company_name,
            director_name,
        } => format!(
            "{} of {} has a birthday in 3 days.",
            director_name.as_deref().unwrap_or("The director"),
            company_name
        ),
        NotificationPayload::Maintenance {
            maintenance_date, ..
        } => format!("You have a maintenance visit scheduled on {maintenance_date}."),
        NotificationPayload::Unknown => "You have a new notification.".to_string(),
    }
}

/// The truncated list line for a payload.
pub fn display_line(payload: &NotificationPayload) -> String {
    truncate(&display_text(payload))
}

fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(a) => format!("{a:.0}"),
        None => "N/A".to_string(),
    }
}

fn format_date(date: &Option<String>) -> &str {
    date.as_deref().unwrap_or("N/A")
}
