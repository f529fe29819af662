use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use referral_engine::config::IntakeConfig;
use referral_engine::error::AppError;
use referral_engine::workflows::intake::{
    NotificationError, NotificationMessage, Notifier, PartnerFirm,
};
use referral_engine::workflows::roster::PartnerRoster;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes outbound messages to the log instead of a mail relay.
#[derive(Default, Clone)]
pub(crate) struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn deliver(&self, message: NotificationMessage) -> Result<(), NotificationError> {
        info!(
            submission_id = %message.submission_id,
            template = ?message.template,
            to = %message.to,
            subject = %message.subject,
            "notification queued"
        );
        Ok(())
    }
}

/// Keeps every delivered message so the demo can print them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryOutbox {
    messages: Arc<Mutex<Vec<NotificationMessage>>>,
}

impl Notifier for InMemoryOutbox {
    fn deliver(&self, message: NotificationMessage) -> Result<(), NotificationError> {
        let mut guard = self.messages.lock().expect("outbox mutex poisoned");
        guard.push(message);
        Ok(())
    }
}

impl InMemoryOutbox {
    pub(crate) fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().expect("outbox mutex poisoned").clone()
    }
}

pub(crate) fn load_partner_roster(settings: &IntakeConfig) -> Result<Vec<PartnerFirm>, AppError> {
    match &settings.partner_roster {
        Some(path) => {
            let firms = PartnerRoster::from_path(path)?;
            info!(path = %path.display(), firms = firms.len(), "partner roster loaded");
            Ok(firms)
        }
        None => Ok(PartnerRoster::sample()),
    }
}

/// Midday UTC on the given date, used when a caller pins "today".
pub(crate) fn evaluation_instant(today: Option<NaiveDate>) -> DateTime<Utc> {
    match today {
        Some(date) => date
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
            .and_utc(),
        None => Utc::now(),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
