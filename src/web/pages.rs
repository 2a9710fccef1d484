//! Public pages.

use std::fmt::Write;

use axum::{
    extract::{Path, State},
    response::Html,
};
use chrono::Utc;

use super::views::{self, escape};
use super::PageResult;
use crate::models::{next_registration_deadline, public_listing, EventStatus};
use crate::AppState;

/// Events shown on the home page.
const HOME_EVENT_COUNT: usize = 3;

/// GET /
pub async fn home_page(State(state): State<AppState>) -> PageResult {
    let data = state.repo.site_data().await?;
    let today = Utc::now()
        .with_timezone(&state.config.club_timezone())
        .date_naive();

    let mut body = format!(
        "<h1>{}</h1><p>{}</p>",
        escape(&data.club.name),
        escape(&data.club.tagline)
    );

    if let Some(event) = next_registration_deadline(&data.events, today) {
        if let Some(deadline) = &event.registration_deadline {
            let _ = write!(
                body,
                r#"<p class="banner"><a href="/events/{}">{}</a>: {} Registration closes {}.</p>"#,
                event.id,
                escape(&event.name),
                escape(&deadline.message),
                escape(&deadline.date)
            );
        }
    }

    body.push_str("<h2>Events</h2>");
    for event in public_listing(&data.events).into_iter().take(HOME_EVENT_COUNT) {
        body.push_str(&views::event_card(event));
    }
    body.push_str(r#"<p><a href="/events">All events</a></p>"#);

    Ok(Html(views::public_page(
        &data.club,
        &data.contact,
        "Home",
        &body,
    )))
}

/// GET /about
pub async fn about_page(State(state): State<AppState>) -> PageResult {
    let club = state.repo.get_club_info().await?;
    let contact = state.repo.get_contact_info().await?;

    let mut body = format!(
        "<h1>About {}</h1><p>{}</p><p>{}<br>{}<br>{}</p>",
        escape(&club.name),
        escape(&club.description),
        escape(&club.department),
        escape(&club.college),
        escape(&club.address)
    );

    for (heading, people) in [
        ("Faculty coordinators", &contact.faculty_coordinators),
        ("Secretaries", &contact.secretaries),
    ] {
        if people.is_empty() {
            continue;
        }
        let _ = write!(body, "<h2>{}</h2><ul>", heading);
        for person in people {
            let _ = write!(
                body,
                "<li>{} {}</li>",
                escape(&person.name),
                escape(&person.phone)
            );
        }
        body.push_str("</ul>");
    }

    Ok(Html(views::public_page(&club, &contact, "About", &body)))
}

/// GET /events
pub async fn events_page(State(state): State<AppState>) -> PageResult {
    let data = state.repo.site_data().await?;
    let listing = public_listing(&data.events);

    let mut body = String::from("<h1>Events</h1>");
    for status in EventStatus::ALL {
        let group: Vec<_> = listing.iter().filter(|e| e.status == status).collect();
        if group.is_empty() {
            continue;
        }
        let _ = write!(body, "<h2>{}</h2>", capitalize(status.as_str()));
        for event in group {
            body.push_str(&views::event_card(event));
        }
    }
    if listing.is_empty() {
        body.push_str(r#"<p class="muted">No events yet.</p>"#);
    }

    Ok(Html(views::public_page(
        &data.club,
        &data.contact,
        "Events",
        &body,
    )))
}

/// GET /events/{id}
///
/// Hidden events stay reachable by direct link.
pub async fn event_page(State(state): State<AppState>, Path(id): Path<u64>) -> PageResult {
    let event = state.repo.get_event(id).await?;
    let club = state.repo.get_club_info().await?;
    let contact = state.repo.get_contact_info().await?;

    Ok(Html(views::public_page(
        &club,
        &contact,
        &event.name,
        &views::event_detail(&event),
    )))
}

/// GET /members
pub async fn members_page(State(state): State<AppState>) -> PageResult {
    let data = state.repo.site_data().await?;
    let mut body = String::from("<h1>Members</h1>");
    for member in &data.members {
        body.push_str(&views::member_card(member));
    }

    Ok(Html(views::public_page(
        &data.club,
        &data.contact,
        "Members",
        &body,
    )))
}

/// GET /gallery
pub async fn gallery_page(State(state): State<AppState>) -> PageResult {
    let data = state.repo.site_data().await?;
    let mut body = String::from("<h1>Gallery</h1>");
    for item in &data.gallery {
        body.push_str(&views::gallery_card(item));
    }

    Ok(Html(views::public_page(
        &data.club,
        &data.contact,
        "Gallery",
        &body,
    )))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
