//! Delivery records and the status lifecycle

use chrono::{NaiveDate, NaiveTime};
use fleetdesk_types::Error;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a delivery.
///
/// The sequence is strictly ordered: `Ordered → Pending → In Transit →
/// Delivered`. A record carries exactly one status at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Ordered,
    Pending,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
}

impl DeliveryStatus {
    /// The database string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Ordered => "Ordered",
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::InTransit => "In Transit",
            DeliveryStatus::Delivered => "Delivered",
        }
    }

    /// Position in the lifecycle sequence
    pub fn rank(&self) -> u8 {
        match self {
            DeliveryStatus::Ordered => 0,
            DeliveryStatus::Pending => 1,
            DeliveryStatus::InTransit => 2,
            DeliveryStatus::Delivered => 3,
        }
    }

    /// Whether moving to `next` follows the lifecycle (forward only)
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        next.rank() > self.rank()
    }

    /// Statuses that count as not-yet-completed
    pub fn is_open(&self) -> bool {
        !matches!(self, DeliveryStatus::Delivered)
    }

    /// All statuses in lifecycle order
    pub fn all() -> [DeliveryStatus; 4] {
        [
            DeliveryStatus::Ordered,
            DeliveryStatus::Pending,
            DeliveryStatus::InTransit,
            DeliveryStatus::Delivered,
        ]
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Ordered" => Ok(DeliveryStatus::Ordered),
            "Pending" => Ok(DeliveryStatus::Pending),
            "In Transit" => Ok(DeliveryStatus::InTransit),
            "Delivered" => Ok(DeliveryStatus::Delivered),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for DeliveryStatus {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A delivery record as stored in `delivery_log`.
///
/// `pickup_time` is a time of day; `delivery_minutes` is the duration from
/// pickup to drop-off.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Delivery {
    pub order_id: String,
    pub store_id: String,
    pub vehicle_id: Option<String>,
    pub driver: Option<String>,
    pub order_date: NaiveDate,
    pub order_time: Option<NaiveTime>,
    pub pickup_time: Option<NaiveTime>,
    pub delivery_minutes: Option<f64>,
    #[sqlx(try_from = "String")]
    pub status: DeliveryStatus,
    pub dest_lat: Option<f64>,
    pub dest_lon: Option<f64>,
}

impl Delivery {
    /// Minutes between order and pickup, when both times are present
    pub fn prep_minutes(&self) -> Option<f64> {
        let order = self.order_time?;
        let pickup = self.pickup_time?;
        let delta = (pickup - order).num_seconds() as f64 / 60.0;
        (delta >= 0.0).then_some(delta)
    }
}

/// Input for inserting a new delivery record
#[derive(Clone, Debug)]
pub struct NewDelivery {
    pub order_id: String,
    pub store_id: String,
    pub vehicle_id: Option<String>,
    pub driver: Option<String>,
    pub order_date: NaiveDate,
    pub order_time: Option<NaiveTime>,
    pub status: DeliveryStatus,
    pub dest_lat: Option<f64>,
    pub dest_lon: Option<f64>,
}

/// Punctuality bucket for an in-flight route
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punctuality {
    OnTime,
    Delayed,
    Critical,
}

impl Punctuality {
    pub fn label(&self) -> &'static str {
        match self {
            Punctuality::OnTime => "On Time",
            Punctuality::Delayed => "Delayed",
            Punctuality::Critical => "Critical",
        }
    }
}

/// An active route row: an open delivery joined with its vehicle
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActiveRoute {
    pub order_id: String,
    pub store_id: String,
    pub vehicle_id: Option<String>,
    pub order_date: NaiveDate,
    pub pickup_time: Option<NaiveTime>,
    pub delivery_minutes: Option<f64>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<i32>,
}

impl ActiveRoute {
    /// Pickup time expressed as minutes past midnight
    pub fn pickup_minute_of_day(&self) -> Option<i64> {
        use chrono::Timelike;
        self.pickup_time
            .map(|t| (t.num_seconds_from_midnight() / 60) as i64)
    }

    /// On-time / delayed classification.
    ///
    /// Pickup later than 60 minutes into the working window counts as
    /// delayed, later than 90 as critical.
    pub fn punctuality(&self) -> Punctuality {
        match self.pickup_minute_of_day() {
            Some(m) if m > 90 => Punctuality::Critical,
            Some(m) if m > 60 => Punctuality::Delayed,
            _ => Punctuality::OnTime,
        }
    }
}

/// A delivery awaiting assignment: no pickup or drop recorded yet
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingDelivery {
    pub order_id: String,
    pub store_id: String,
    pub order_date: NaiveDate,
    pub order_time: Option<NaiveTime>,
    pub vehicle_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for status in DeliveryStatus::all() {
            let parsed: DeliveryStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_rejects_unknown() {
        assert!("Lost".parse::<DeliveryStatus>().is_err());
    }

    #[test]
    fn lifecycle_is_forward_only() {
        use DeliveryStatus::*;
        assert!(Ordered.can_transition_to(Pending));
        assert!(Pending.can_transition_to(InTransit));
        assert!(InTransit.can_transition_to(Delivered));
        assert!(Ordered.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(InTransit));
        assert!(!Pending.can_transition_to(Ordered));
        assert!(!InTransit.can_transition_to(InTransit));
    }

    #[test]
    fn punctuality_thresholds() {
        let route = |minute: u32| ActiveRoute {
            order_id: "o1".into(),
            store_id: "s1".into(),
            vehicle_id: None,
            order_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            pickup_time: NaiveTime::from_hms_opt(minute / 60, minute % 60, 0),
            delivery_minutes: None,
            vehicle_model: None,
            vehicle_year: None,
        };
        assert_eq!(route(45).punctuality(), Punctuality::OnTime);
        assert_eq!(route(75).punctuality(), Punctuality::Delayed);
        assert_eq!(route(95).punctuality(), Punctuality::Critical);
    }

    #[test]
    fn prep_minutes_requires_both_times() {
        let mut delivery = Delivery {
            order_id: "o1".into(),
            store_id: "s1".into(),
            vehicle_id: None,
            driver: None,
            order_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            order_time: NaiveTime::from_hms_opt(9, 0, 0),
            pickup_time: NaiveTime::from_hms_opt(9, 30, 0),
            delivery_minutes: None,
            status: DeliveryStatus::Pending,
            dest_lat: None,
            dest_lon: None,
        };
        assert_eq!(delivery.prep_minutes(), Some(30.0));

        delivery.pickup_time = None;
        assert_eq!(delivery.prep_minutes(), None);
    }
}
