//! Notification category enumeration.

use serde::{Deserialize, Serialize};

/// Display category of a notification, produced once by classification.
/// Rendering code matches on this enum, never on raw payload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationCategory {
    /// A payment is due.
    PaymentUnpaid,
    /// A payment completed.
    PaymentPaid,
    /// A meter reading awaits customer confirmation.
    MeterUnconfirmed,
    /// A meter reading was confirmed.
    MeterConfirmed,
    /// A customer birthday is coming up.
    BirthdayReminder,
    /// A maintenance visit is scheduled.
    MaintenanceReminder,
    /// Payload matched none of the known shapes.
    Unknown,
}

impl NotificationCategory {
    /// Return the category as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentUnpaid => "payment-unpaid",
            Self::PaymentPaid => "payment-paid",
            Self::MeterUnconfirmed => "meter-unconfirmed",
            Self::MeterConfirmed => "meter-confirmed",
            Self::BirthdayReminder => "birthday-reminder",
            Self::MaintenanceReminder => "maintenance-reminder",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
