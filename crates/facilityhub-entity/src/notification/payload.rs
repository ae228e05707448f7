//! Loosely-typed notification payload decoded into a tagged union.
//!
//! The backend serializes the payload as a JSON string whose shape depends
//! on the originating event. Classification happens here, exactly once, in
//! a fixed precedence order; everything downstream works with the tagged
//! variant.

use serde::Deserialize;

use super::category::NotificationCategory;

/// Raw payload fields as they appear on the wire. All optional; presence
/// decides the variant.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    payment_status: Option<String>,
    payment_amount: Option<f64>,
    payment_date: Option<String>,
    status: Option<String>,
    meter: Option<RawMeter>,
    reading_date: Option<String>,
    company_name: Option<String>,
    director_name: Option<String>,
    maintenance_date: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeter {
    serial_number: Option<String>,
}

/// A notification payload, decoded and classified.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationPayload {
    /// A payment event (due or completed).
    Payment {
        /// Whether the payment is still outstanding.
        unpaid: bool,
        /// Amount in the backend's currency.
        amount: Option<f64>,
        /// Due date or payment date, as formatted by the backend.
        date: Option<String>,
    },
    /// A meter-verification event.
    Meter {
        /// Whether the reading has been confirmed.
        confirmed: bool,
        /// Meter serial number.
        serial_number: Option<String>,
        /// Reading date, as formatted by the backend.
        reading_date: Option<String>,
    },
    /// An upcoming customer birthday.
    Birthday {
        /// Customer's company name.
        company_name: String,
        /// Company director's name.
        director_name: Option<String>,
    },
    /// A scheduled maintenance visit.
    Maintenance {
        /// Scheduled date, as formatted by the backend.
        maintenance_date: String,
        /// Optional schedule title.
        title: Option<String>,
    },
    /// Payload matched none of the known shapes.
    Unknown,
}

impl NotificationPayload {
    /// Parse and classify a raw payload string.
    ///
    /// Precedence (first match wins): payment UNPAID, payment PAID, meter
    /// UNACTIV, meter ACTIV, birthday (`companyName` present), maintenance
    /// (`maintenanceDate` present), otherwise [`Self::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let raw: RawPayload = match serde_json::from_str(raw) {
            Ok(p) => p,
            Err(_) => return Self::Unknown,
        };

        match raw.payment_status.as_deref() {
            Some("UNPAID") => {
                return Self::Payment {
                    unpaid: true,
                    amount: raw.payment_amount,
                    date: raw.payment_date,
                };
            }
            Some("PAID") => {
                return Self::Payment {
                    unpaid: false,
                    amount: raw.payment_amount,
                    date: raw.payment_date,
                };
            }
            _ => {}
        }

        match raw.status.as_deref() {
            Some("UNACTIV") => {
                return Self::Meter {
                    confirmed: false,
                    serial_number: raw.meter.and_then(|m| m.serial_number),
                    reading_date: raw.reading_date,
                };
            }
            Some("ACTIV") => {
                return Self::Meter {
                    confirmed: true,
                    serial_number: raw.meter.and_then(|m| m.serial_number),
                    reading_date: raw.reading_date,
                };
            }
            _ => {}
        }

        if let Some(company_name) = raw.company_name {
            return Self::Birthday {
                company_name,
                director_name: raw.director_name,
            };
        }

        if let Some(maintenance_date) = raw.maintenance_date {
            return Self::Maintenance {
                maintenance_date,
                title: raw.title,
            };
        }

        Self::Unknown
    }

    /// The display category of this payload.
    pub fn category(&self) -> NotificationCategory {
        match self {
            Self::Payment { unpaid: true, .. } => NotificationCategory::PaymentUnpaid,
            Self::Payment { unpaid: false, .. } => NotificationCategory::PaymentPaid,
            Self::Meter {
                confirmed: false, ..
            } => NotificationCategory::MeterUnconfirmed,
            Self::Meter {
                confirmed: true, ..
            } => NotificationCategory::MeterConfirmed,
            Self::Birthday { .. } => NotificationCategory::BirthdayReminder,
            Self::Maintenance { .. } => NotificationCategory::MaintenanceReminder,
            Self::Unknown => NotificationCategory::Unknown,
        }
    }
}
