//! Event model and the ordering rules of the public event listings.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{double_option, missing_required, Defaulted, Record};

/// Lifecycle state of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub const ALL: [EventStatus; 3] = [
        EventStatus::Upcoming,
        EventStatus::Ongoing,
        EventStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            other => Err(format!("Unknown event status '{}'", other)),
        }
    }
}

/// Someone to contact about an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinator {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Last day to register plus the banner text shown until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDeadline {
    pub date: String,
    #[serde(default = "default_deadline_message")]
    pub message: String,
}

pub fn default_deadline_message() -> String {
    "Register now!".to_string()
}

fn default_true() -> bool {
    true
}

/// A club event, addressed by its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub how: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub coordinators: Vec<Coordinator>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub register_link: String,
    /// Written as `null` when the event has none
    #[serde(default)]
    pub registration_deadline: Option<RegistrationDeadline>,
    /// Hidden events stay in the admin panel but not on public pages
    #[serde(default = "default_true")]
    pub show_in_events: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub defaulted: Defaulted,
}

impl Record for Event {
    fn defaulted(&self) -> &Defaulted {
        &self.defaulted
    }

    fn defaulted_mut(&mut self) -> &mut Defaulted {
        &mut self.defaulted
    }
}

impl Event {
    pub fn missing_fields(&self) -> Vec<String> {
        missing_required(&[
            ("name", &self.name),
            ("date", &self.date),
            ("time", &self.time),
            ("location", &self.location),
            ("description", &self.description),
        ])
    }

    /// `#` is the placeholder the admin forms write for "no link".
    pub fn has_register_link(&self) -> bool {
        let link = self.register_link.trim();
        !link.is_empty() && link != "#"
    }
}

/// Request body for creating an event. The id is assigned by the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub how: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub coordinators: Vec<Coordinator>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub register_link: String,
    #[serde(default)]
    pub registration_deadline: Option<RegistrationDeadline>,
    #[serde(default = "default_true")]
    pub show_in_events: bool,
}

impl Default for CreateEventRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            date: String::new(),
            time: String::new(),
            location: String::new(),
            description: String::new(),
            how: String::new(),
            rules: Vec::new(),
            coordinators: Vec::new(),
            status: EventStatus::default(),
            image: String::new(),
            register_link: String::new(),
            registration_deadline: None,
            show_in_events: true,
        }
    }
}

impl CreateEventRequest {
    pub fn into_event(self, id: u64) -> Event {
        Event {
            id,
            name: self.name,
            date: self.date,
            time: self.time,
            location: self.location,
            description: self.description,
            how: self.how,
            rules: self.rules,
            coordinators: self.coordinators,
            status: self.status,
            image: self.image,
            register_link: self.register_link,
            registration_deadline: self.registration_deadline,
            show_in_events: self.show_in_events,
            extra: Map::new(),
            defaulted: Defaulted::default(),
        }
    }
}

/// Request body for a partial event update. The id never changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub how: Option<String>,
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    #[serde(default)]
    pub coordinators: Option<Vec<Coordinator>>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub register_link: Option<String>,
    /// `null` removes the deadline, an absent key keeps it
    #[serde(default, deserialize_with = "double_option")]
    pub registration_deadline: Option<Option<RegistrationDeadline>>,
    #[serde(default)]
    pub show_in_events: Option<bool>,
}

impl UpdateEventRequest {
    pub fn apply(&self, event: &mut Event) {
        if let Some(name) = &self.name {
            event.name = name.clone();
        }
        if let Some(date) = &self.date {
            event.date = date.clone();
        }
        if let Some(time) = &self.time {
            event.time = time.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(how) = &self.how {
            event.how = how.clone();
        }
        if let Some(rules) = &self.rules {
            event.rules = rules.clone();
        }
        if let Some(coordinators) = &self.coordinators {
            event.coordinators = coordinators.clone();
        }
        if let Some(status) = self.status {
            event.status = status;
        }
        if let Some(image) = &self.image {
            event.image = image.clone();
        }
        if let Some(register_link) = &self.register_link {
            event.register_link = register_link.clone();
        }
        if let Some(deadline) = &self.registration_deadline {
            event.registration_deadline = deadline.clone();
        }
        if let Some(show) = self.show_in_events {
            event.show_in_events = show;
        }
    }
}

/// Accepts `2026-05-01` and `May 01, 2026`.
pub fn parse_deadline_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ["%Y-%m-%d", "%B %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Visible events in public display order.
///
/// Events with a registration link come first, then upcoming ones, and
/// completed events sink to the bottom. Ties keep collection order.
pub fn public_listing(events: &[Event]) -> Vec<&Event> {
    let mut visible: Vec<&Event> = events.iter().filter(|e| e.show_in_events).collect();
    visible.sort_by_key(|e| {
        (
            !e.has_register_link(),
            e.status != EventStatus::Upcoming,
            e.status == EventStatus::Completed,
        )
    });
    visible
}

/// The visible upcoming event whose registration closes soonest, not before `today`.
pub fn next_registration_deadline(events: &[Event], today: NaiveDate) -> Option<&Event> {
    events
        .iter()
        .filter(|e| e.show_in_events && e.status == EventStatus::Upcoming && e.has_register_link())
        .filter_map(|e| {
            let deadline = e.registration_deadline.as_ref()?;
            let date = parse_deadline_date(&deadline.date)?;
            (date >= today).then_some((date, e))
        })
        .min_by_key(|(date, _)| *date)
        .map(|(_, e)| e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u64, status: EventStatus, link: &str) -> Event {
        CreateEventRequest {
            name: format!("Event {}", id),
            status,
            register_link: link.to_string(),
            ..Default::default()
        }
        .into_event(id)
    }

    fn with_deadline(mut e: Event, date: &str) -> Event {
        e.registration_deadline = Some(RegistrationDeadline {
            date: date.to_string(),
            message: default_deadline_message(),
        });
        e
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let value = serde_json::to_value(EventStatus::Completed).unwrap();
        assert_eq!(value, "completed");
        assert_eq!("Ongoing".parse::<EventStatus>(), Ok(EventStatus::Ongoing));
        assert!("cancelled".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_public_listing_order() {
        let mut hidden = event(5, EventStatus::Upcoming, "https://reg");
        hidden.show_in_events = false;
        let events = vec![
            event(1, EventStatus::Completed, ""),
            event(2, EventStatus::Upcoming, "#"),
            event(3, EventStatus::Ongoing, ""),
            event(4, EventStatus::Upcoming, "https://reg"),
            hidden,
        ];

        let ids: Vec<u64> = public_listing(&events).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_next_deadline_picks_earliest_future_date() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let events = vec![
            with_deadline(event(1, EventStatus::Upcoming, "https://a"), "2026-06-10"),
            with_deadline(event(2, EventStatus::Upcoming, "https://b"), "May 20, 2026"),
            with_deadline(event(3, EventStatus::Upcoming, "https://c"), "2026-04-30"),
            with_deadline(event(4, EventStatus::Completed, "https://d"), "2026-05-02"),
            with_deadline(event(5, EventStatus::Upcoming, ""), "2026-05-03"),
            with_deadline(event(6, EventStatus::Upcoming, "https://f"), "soon"),
        ];

        let next = next_registration_deadline(&events, today).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_deadline_today_still_counts() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let events = vec![with_deadline(
            event(1, EventStatus::Upcoming, "https://a"),
            "2026-05-01",
        )];
        assert!(next_registration_deadline(&events, today).is_some());
    }

    #[test]
    fn test_update_can_clear_deadline() {
        let mut e = with_deadline(event(1, EventStatus::Upcoming, ""), "2026-05-01");

        let keep: UpdateEventRequest = serde_json::from_str(r#"{"name":"Renamed"}"#).unwrap();
        keep.apply(&mut e);
        assert!(e.registration_deadline.is_some());

        let clear: UpdateEventRequest =
            serde_json::from_str(r#"{"registration_deadline":null}"#).unwrap();
        clear.apply(&mut e);
        assert!(e.registration_deadline.is_none());
        assert_eq!(e.name, "Renamed");
    }
}
