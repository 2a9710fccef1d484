//! Admin panel pages and form handlers.
//!
//! Mutations answer with a 303 redirect and a flash message. Recoverable
//! errors (unknown id, missing fields) become a flash on the originating page.

use std::fmt::Write;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use super::views::{self, escape, post_button, text_area, text_input};
use super::{PageError, PageResult};
use crate::auth::{self, cookie_value, take_flash, FLASH_COOKIE, SESSION_COOKIE};
use crate::errors::AppError;
use crate::models::{
    default_deadline_message, Coordinator, ContactPerson, CreateEventRequest,
    CreateGalleryItemRequest, CreateMemberRequest, Event, EventStatus, GalleryItem, Member,
    RegistrationDeadline, UpdateClubInfoRequest, UpdateContactInfoRequest, UpdateEventRequest,
    UpdateGalleryItemRequest, UpdateMemberRequest,
};
use crate::uploads::UploadCategory;
use crate::AppState;

// ==================== RESPONSE HELPERS ====================

/// Render an admin page, consuming any pending flash message.
fn admin_response(state: &AppState, headers: &HeaderMap, title: &str, body: &str) -> Response {
    match take_flash(headers) {
        Some(flash) => (
            AppendHeaders([(header::SET_COOKIE, state.sessions.clear_cookie(FLASH_COOKIE))]),
            Html(views::admin_page(title, Some(&flash), body)),
        )
            .into_response(),
        None => Html(views::admin_page(title, None, body)).into_response(),
    }
}

fn redirect_with_flash(state: &AppState, to: &str, message: &str) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, state.sessions.flash_cookie(message))]),
        Redirect::to(to),
    )
        .into_response()
}

/// Turn a mutation outcome into a redirect, keeping fatal errors fatal.
fn flash_outcome(
    state: &AppState,
    outcome: Result<String, AppError>,
    success_to: &str,
    failure_to: &str,
) -> PageResult<Response> {
    match outcome {
        Ok(message) => Ok(redirect_with_flash(state, success_to, &message)),
        Err(err) if err.is_recoverable() => {
            tracing::debug!(error = %err, "Admin action rejected");
            Ok(redirect_with_flash(state, failure_to, &err.to_string()))
        }
        Err(err) => Err(PageError(err)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// One entry per non-blank line.
fn lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pipe-separated columns, one record per non-blank line.
fn records(raw: &str) -> Vec<Vec<String>> {
    lines(raw)
        .iter()
        .map(|line| line.split('|').map(|col| col.trim().to_string()).collect())
        .collect()
}

fn column(cols: &[String], i: usize) -> String {
    cols.get(i).cloned().unwrap_or_default()
}

// ==================== LOGIN ====================

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

fn login_body(next: Option<&str>) -> String {
    format!(
        r#"<h1>Admin login</h1>
<form method="post" action="/admin/login">
<input type="hidden" name="next" value="{}">
<label>Username<input type="text" name="username" autocomplete="username"></label>
<label>Password<input type="password" name="password" autocomplete="current-password"></label>
<button type="submit">Log in</button>
</form>"#,
        escape(next.unwrap_or_default())
    )
}

/// GET /admin/login
pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    if let Some(value) = cookie_value(&headers, SESSION_COOKIE) {
        if state.sessions.verify(&value).await {
            return Redirect::to(auth::safe_next(query.next.as_deref())).into_response();
        }
    }

    let body = login_body(query.next.as_deref());
    match take_flash(&headers) {
        Some(flash) => (
            AppendHeaders([(header::SET_COOKIE, state.sessions.clear_cookie(FLASH_COOKIE))]),
            Html(views::plain_page("Admin login", Some(&flash), &body)),
        )
            .into_response(),
        None => Html(views::plain_page("Admin login", None, &body)).into_response(),
    }
}

/// POST /admin/login
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !auth::check_credentials(&state.config, &form.username, &form.password) {
        tracing::warn!(username = %form.username, "Rejected admin login");
        let body = login_body(form.next.as_deref());
        return (
            StatusCode::UNAUTHORIZED,
            Html(views::plain_page(
                "Admin login",
                Some("Invalid credentials"),
                &body,
            )),
        )
            .into_response();
    }

    let value = state.sessions.issue().await;
    let target = auth::safe_next(form.next.as_deref()).to_string();
    tracing::info!(username = %form.username, "Admin logged in");

    (
        AppendHeaders([
            (header::SET_COOKIE, state.sessions.session_cookie(&value)),
            (header::SET_COOKIE, state.sessions.flash_cookie("Logged in")),
        ]),
        Redirect::to(&target),
    )
        .into_response()
}

/// GET|POST /admin/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(value) = cookie_value(&headers, SESSION_COOKIE) {
        state.sessions.revoke(&value).await;
    }

    (
        AppendHeaders([
            (header::SET_COOKIE, state.sessions.clear_cookie(SESSION_COOKIE)),
            (header::SET_COOKIE, state.sessions.flash_cookie("Logged out")),
        ]),
        Redirect::to("/admin/login"),
    )
        .into_response()
}

// ==================== DASHBOARD ====================

/// GET /admin
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> PageResult<Response> {
    let stats = state.repo.dashboard().await?;
    let body = format!(
        r#"<h1>Dashboard</h1>
<div class="card"><a href="/admin/events">Events</a>: {}</div>
<div class="card"><a href="/admin/members">Members</a>: {}</div>
<div class="card"><a href="/admin/gallery">Gallery items</a>: {}</div>"#,
        stats.events_count, stats.members_count, stats.gallery_count
    );
    Ok(admin_response(&state, &headers, "Dashboard", &body))
}

// ==================== CLUB INFO ====================

#[derive(Debug, Deserialize)]
pub struct ClubInfoForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub logo: String,
}

impl From<ClubInfoForm> for UpdateClubInfoRequest {
    fn from(form: ClubInfoForm) -> Self {
        UpdateClubInfoRequest {
            name: Some(form.name),
            short_name: Some(form.short_name),
            tagline: Some(form.tagline),
            description: Some(form.description),
            college: Some(form.college),
            department: Some(form.department),
            address: Some(form.address),
            logo: Some(form.logo),
        }
    }
}

/// GET /admin/club-info
pub async fn club_info_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> PageResult<Response> {
    let info = state.repo.get_club_info().await?;
    let body = format!(
        r#"<h1>Club info</h1><form method="post" action="/admin/club-info">{}{}{}{}{}{}{}{}<button type="submit">Save</button></form>"#,
        text_input("name", "Name", &info.name),
        text_input("short_name", "Short name", &info.short_name),
        text_input("tagline", "Tagline", &info.tagline),
        text_area("description", "Description", &info.description),
        text_input("college", "College", &info.college),
        text_input("department", "Department", &info.department),
        text_input("address", "Address", &info.address),
        text_input("logo", "Logo path", &info.logo),
    );
    Ok(admin_response(&state, &headers, "Club info", &body))
}

/// POST /admin/club-info
pub async fn club_info_submit(
    State(state): State<AppState>,
    Form(form): Form<ClubInfoForm>,
) -> PageResult<Response> {
    let request = UpdateClubInfoRequest::from(form);
    let outcome = state
        .repo
        .replace_club_info(&request)
        .await
        .map(|_| "Club info updated".to_string());
    flash_outcome(&state, outcome, "/admin/club-info", "/admin/club-info")
}

// ==================== CONTACT ====================

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub facebook: String,
    /// One `name | phone` per line
    #[serde(default)]
    pub faculty_coordinators: String,
    /// One `name | phone` per line
    #[serde(default)]
    pub secretaries: String,
}

fn contact_people(raw: &str) -> Vec<ContactPerson> {
    records(raw)
        .iter()
        .map(|cols| ContactPerson {
            name: column(cols, 0),
            phone: column(cols, 1),
        })
        .collect()
}

fn people_text(people: &[ContactPerson]) -> String {
    people
        .iter()
        .map(|p| format!("{} | {}", p.name, p.phone))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ContactForm> for UpdateContactInfoRequest {
    fn from(form: ContactForm) -> Self {
        UpdateContactInfoRequest {
            email: Some(form.email),
            linkedin: Some(form.linkedin),
            instagram: Some(form.instagram),
            facebook: Some(form.facebook),
            faculty_coordinators: Some(contact_people(&form.faculty_coordinators)),
            secretaries: Some(contact_people(&form.secretaries)),
        }
    }
}

/// GET /admin/contact
pub async fn contact_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> PageResult<Response> {
    let contact = state.repo.get_contact_info().await?;
    let body = format!(
        r#"<h1>Contact</h1><form method="post" action="/admin/contact">{}{}{}{}{}{}<button type="submit">Save</button></form>"#,
        text_input("email", "Email", &contact.email),
        text_input("linkedin", "LinkedIn", &contact.linkedin),
        text_input("instagram", "Instagram", &contact.instagram),
        text_input("facebook", "Facebook", &contact.facebook),
        text_area(
            "faculty_coordinators",
            "Faculty coordinators (name | phone per line)",
            &people_text(&contact.faculty_coordinators)
        ),
        text_area(
            "secretaries",
            "Secretaries (name | phone per line)",
            &people_text(&contact.secretaries)
        ),
    );
    Ok(admin_response(&state, &headers, "Contact", &body))
}

/// POST /admin/contact
pub async fn contact_submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> PageResult<Response> {
    let request = UpdateContactInfoRequest::from(form);
    let outcome = state
        .repo
        .replace_contact_info(&request)
        .await
        .map(|_| "Contact info updated".to_string());
    flash_outcome(&state, outcome, "/admin/contact", "/admin/contact")
}

// ==================== EVENTS ====================

#[derive(Debug, Deserialize)]
pub struct EventForm {
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
    /// One rule per line
    #[serde(default)]
    pub rules: String,
    /// One `name | role | phone | email` per line
    #[serde(default)]
    pub coordinators: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub register_link: String,
    #[serde(default)]
    pub deadline_date: String,
    #[serde(default)]
    pub deadline_message: String,
    /// Checkbox; absent when unticked
    #[serde(default)]
    pub show_in_events: Option<String>,
}

impl EventForm {
    fn status(&self) -> Result<EventStatus, AppError> {
        if self.status.trim().is_empty() {
            return Ok(EventStatus::default());
        }
        self.status.parse().map_err(AppError::validation)
    }

    fn coordinators(&self) -> Vec<Coordinator> {
        records(&self.coordinators)
            .iter()
            .map(|cols| Coordinator {
                name: column(cols, 0),
                role: column(cols, 1),
                phone: column(cols, 2),
                email: column(cols, 3),
            })
            .collect()
    }

    /// Blank date means no deadline.
    fn deadline(&self) -> Option<RegistrationDeadline> {
        let date = non_empty(&self.deadline_date)?;
        Some(RegistrationDeadline {
            date,
            message: non_empty(&self.deadline_message).unwrap_or_else(default_deadline_message),
        })
    }

    pub fn into_create(self) -> Result<CreateEventRequest, AppError> {
        Ok(CreateEventRequest {
            status: self.status()?,
            rules: lines(&self.rules),
            coordinators: self.coordinators(),
            registration_deadline: self.deadline(),
            show_in_events: self.show_in_events.is_some(),
            name: self.name,
            date: self.date,
            time: self.time,
            location: self.location,
            description: self.description,
            how: self.how,
            image: self.image,
            register_link: self.register_link,
        })
    }

    /// Every field of the form is written; blank deadline clears it.
    pub fn into_update(self) -> Result<UpdateEventRequest, AppError> {
        Ok(UpdateEventRequest {
            status: Some(self.status()?),
            rules: Some(lines(&self.rules)),
            coordinators: Some(self.coordinators()),
            registration_deadline: Some(self.deadline()),
            show_in_events: Some(self.show_in_events.is_some()),
            name: Some(self.name),
            date: Some(self.date),
            time: Some(self.time),
            location: Some(self.location),
            description: Some(self.description),
            how: Some(self.how),
            image: Some(self.image),
            register_link: Some(self.register_link),
        })
    }
}

fn event_form(action: &str, event: Option<&Event>, submit: &str) -> String {
    let blank = CreateEventRequest::default().into_event(0);
    let event = event.unwrap_or(&blank);

    let mut status_options = String::new();
    for status in EventStatus::ALL {
        let selected = if status == event.status { " selected" } else { "" };
        let _ = write!(
            status_options,
            r#"<option value="{0}"{1}>{0}</option>"#,
            status, selected
        );
    }
    let coordinators = event
        .coordinators
        .iter()
        .map(|c| format!("{} | {} | {} | {}", c.name, c.role, c.phone, c.email))
        .collect::<Vec<_>>()
        .join("\n");
    let (deadline_date, deadline_message) = event
        .registration_deadline
        .as_ref()
        .map(|d| (d.date.as_str(), d.message.as_str()))
        .unwrap_or_default();
    let checked = if event.show_in_events { " checked" } else { "" };

    format!(
        r#"<form method="post" action="{action}">{}{}{}{}{}{}{}{}<label>Status<select name="status">{status_options}</select></label>{}{}{}{}<label><input type="checkbox" name="show_in_events" value="on"{checked}> Show on public pages</label><button type="submit">{submit}</button></form>"#,
        text_input("name", "Name", &event.name),
        text_input("date", "Date", &event.date),
        text_input("time", "Time", &event.time),
        text_input("location", "Location", &event.location),
        text_area("description", "Description", &event.description),
        text_area("how", "How it works", &event.how),
        text_area("rules", "Rules (one per line)", &event.rules.join("\n")),
        text_area(
            "coordinators",
            "Coordinators (name | role | phone | email per line)",
            &coordinators
        ),
        text_input("image", "Image path (from Upload)", &event.image),
        text_input("register_link", "Registration link", &event.register_link),
        text_input(
            "deadline_date",
            "Registration deadline (YYYY-MM-DD or Month DD, YYYY)",
            deadline_date
        ),
        text_input("deadline_message", "Deadline message", deadline_message),
        action = escape(action),
    )
}

/// GET /admin/events
pub async fn events_admin_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> PageResult<Response> {
    let events = state.repo.list_events().await?;

    let mut body = String::from("<h1>Events</h1>");
    for event in &events {
        let _ = write!(
            body,
            r#"<div class="card"><strong>#{} {}</strong> <span class="muted">{} &middot; {}{}</span><br><a href="/admin/events/{}/edit">Edit</a> {} {} {}</div>"#,
            event.id,
            escape(&event.name),
            escape(&event.date),
            event.status,
            if event.show_in_events { "" } else { " &middot; hidden" },
            event.id,
            post_button(
                &format!("/admin/events/{}/toggle-visibility", event.id),
                if event.show_in_events { "Hide" } else { "Show" }
            ),
            if event.image.is_empty() {
                String::new()
            } else {
                post_button(&format!("/admin/events/{}/delete-image", event.id), "Remove image")
            },
            post_button(&format!("/admin/events/{}/delete", event.id), "Delete"),
        );
    }
    body.push_str("<h2>Add event</h2>");
    body.push_str(&event_form("/admin/events", None, "Add event"));

    Ok(admin_response(&state, &headers, "Events", &body))
}

/// POST /admin/events
pub async fn event_create(
    State(state): State<AppState>,
    Form(form): Form<EventForm>,
) -> PageResult<Response> {
    let outcome = match form.into_create() {
        Ok(request) => state
            .repo
            .create_event(request)
            .await
            .map(|event| format!("Event '{}' added with id {}", event.name, event.id)),
        Err(err) => Err(err),
    };
    flash_outcome(&state, outcome, "/admin/events", "/admin/events")
}

/// GET /admin/events/{id}/edit
pub async fn event_edit_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> PageResult<Response> {
    let event = match state.repo.get_event(id).await {
        Ok(event) => event,
        Err(err) => return flash_outcome(&state, Err(err), "/admin/events", "/admin/events"),
    };

    let mut body = format!(
        "<h1>Edit event #{}</h1>{}",
        event.id,
        views::image_tag(&event.image, &event.name)
    );
    body.push_str(&event_form(
        &format!("/admin/events/{}/edit", id),
        Some(&event),
        "Save",
    ));
    Ok(admin_response(&state, &headers, "Edit event", &body))
}

/// POST /admin/events/{id}/edit
pub async fn event_edit_submit(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<EventForm>,
) -> PageResult<Response> {
    let edit_page = format!("/admin/events/{}/edit", id);
    let outcome = async {
        let request = form.into_update()?;
        let event = state.repo.update_event(id, &request).await?;
        Ok::<_, AppError>(format!("Event '{}' updated", event.name))
    }
    .await;
    flash_outcome(&state, outcome, "/admin/events", &edit_page)
}

/// POST /admin/events/{id}/delete
pub async fn event_delete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> PageResult<Response> {
    let outcome = state
        .repo
        .delete_event(id)
        .await
        .map(|event| format!("Event '{}' deleted", event.name));
    flash_outcome(&state, outcome, "/admin/events", "/admin/events")
}

/// POST /admin/events/{id}/delete-image
pub async fn event_delete_image(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> PageResult<Response> {
    let outcome = state
        .repo
        .clear_event_image(id)
        .await
        .map(|_| "Event image removed".to_string());
    flash_outcome(&state, outcome, "/admin/events", "/admin/events")
}

#[derive(Debug, Serialize)]
pub struct ToggleVisibilityResponse {
    pub success: bool,
    pub show_in_events: bool,
}

/// POST /admin/events/{id}/toggle-visibility
///
/// Answers JSON so the list can update in place.
pub async fn event_toggle_visibility(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ToggleVisibilityResponse>, AppError> {
    let show_in_events = state.repo.toggle_event_visibility(id).await?;
    Ok(Json(ToggleVisibilityResponse {
        success: true,
        show_in_events,
    }))
}

// ==================== MEMBERS ====================

#[derive(Debug, Deserialize)]
pub struct MemberForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
}

impl From<MemberForm> for CreateMemberRequest {
    fn from(form: MemberForm) -> Self {
        CreateMemberRequest {
            name: form.name,
            role: form.role,
            year: form.year,
            domain: form.domain,
            image: form.image,
            linkedin: form.linkedin,
            github: form.github,
        }
    }
}

impl From<MemberForm> for UpdateMemberRequest {
    fn from(form: MemberForm) -> Self {
        UpdateMemberRequest {
            name: Some(form.name),
            role: Some(form.role),
            year: Some(form.year),
            domain: Some(form.domain),
            image: Some(form.image),
            linkedin: Some(form.linkedin),
            github: Some(form.github),
        }
    }
}

fn member_form(action: &str, member: Option<&Member>, submit: &str) -> String {
    let blank = CreateMemberRequest::default();
    let field = |value: Option<&String>, fallback: &String| value.unwrap_or(fallback).clone();
    format!(
        r#"<form method="post" action="{}">{}{}{}{}{}{}{}<button type="submit">{}</button></form>"#,
        escape(action),
        text_input("name", "Name", &field(member.map(|m| &m.name), &blank.name)),
        text_input("role", "Role", &field(member.map(|m| &m.role), &blank.role)),
        text_input("year", "Year", &field(member.map(|m| &m.year), &blank.year)),
        text_input("domain", "Domain", &field(member.map(|m| &m.domain), &blank.domain)),
        text_input(
            "image",
            "Image path (blank for the default picture)",
            &field(member.map(|m| &m.image), &blank.image)
        ),
        text_input("linkedin", "LinkedIn", &field(member.map(|m| &m.linkedin), &blank.linkedin)),
        text_input("github", "GitHub", &field(member.map(|m| &m.github), &blank.github)),
        submit,
    )
}

/// GET /admin/members
pub async fn members_admin_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> PageResult<Response> {
    let members = state.repo.list_members().await?;

    let mut body = String::from("<h1>Members</h1>");
    for (index, member) in members.iter().enumerate() {
        let _ = write!(
            body,
            r#"<div class="card">{} <strong>{}</strong> <span class="muted">{} &middot; {}</span><br><a href="/admin/members/{}/edit">Edit</a> {}</div>"#,
            views::image_tag(&member.image, &member.name),
            escape(&member.name),
            escape(&member.role),
            escape(&member.year),
            index,
            post_button(&format!("/admin/members/{}/delete", index), "Delete"),
        );
    }
    body.push_str("<h2>Add member</h2>");
    body.push_str(&member_form("/admin/members", None, "Add member"));

    Ok(admin_response(&state, &headers, "Members", &body))
}

/// POST /admin/members
pub async fn member_create(
    State(state): State<AppState>,
    Form(form): Form<MemberForm>,
) -> PageResult<Response> {
    let outcome = state
        .repo
        .create_member(form.into())
        .await
        .map(|member| format!("Member '{}' added", member.name));
    flash_outcome(&state, outcome, "/admin/members", "/admin/members")
}

/// GET /admin/members/{index}/edit
pub async fn member_edit_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(index): Path<usize>,
) -> PageResult<Response> {
    let member = match state.repo.get_member(index).await {
        Ok(member) => member,
        Err(err) => return flash_outcome(&state, Err(err), "/admin/members", "/admin/members"),
    };

    let body = format!(
        "<h1>Edit member</h1>{}{}",
        views::image_tag(&member.image, &member.name),
        member_form(
            &format!("/admin/members/{}/edit", index),
            Some(&member),
            "Save"
        )
    );
    Ok(admin_response(&state, &headers, "Edit member", &body))
}

/// POST /admin/members/{index}/edit
pub async fn member_edit_submit(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Form(form): Form<MemberForm>,
) -> PageResult<Response> {
    let edit_page = format!("/admin/members/{}/edit", index);
    let request = UpdateMemberRequest::from(form);
    let outcome = state
        .repo
        .update_member(index, &request)
        .await
        .map(|member| format!("Member '{}' updated", member.name));
    flash_outcome(&state, outcome, "/admin/members", &edit_page)
}

/// POST /admin/members/{index}/delete
pub async fn member_delete(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> PageResult<Response> {
    let outcome = state
        .repo
        .delete_member(index)
        .await
        .map(|member| format!("Member '{}' deleted", member.name));
    flash_outcome(&state, outcome, "/admin/members", "/admin/members")
}

// ==================== GALLERY ====================

#[derive(Debug, Deserialize)]
pub struct GalleryForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

impl From<GalleryForm> for CreateGalleryItemRequest {
    fn from(form: GalleryForm) -> Self {
        CreateGalleryItemRequest {
            title: form.title,
            description: form.description,
            image: form.image,
            category: non_empty(&form.category),
        }
    }
}

impl From<GalleryForm> for UpdateGalleryItemRequest {
    fn from(form: GalleryForm) -> Self {
        UpdateGalleryItemRequest {
            title: Some(form.title),
            description: Some(form.description),
            image: Some(form.image),
            category: non_empty(&form.category),
        }
    }
}

fn gallery_form(action: &str, item: Option<&GalleryItem>, submit: &str) -> String {
    let (title, description, image, category) = item
        .map(|i| {
            (
                i.title.as_str(),
                i.description.as_str(),
                i.image.as_str(),
                i.category.as_str(),
            )
        })
        .unwrap_or(("", "", "", "event"));
    format!(
        r#"<form method="post" action="{}">{}{}{}{}<button type="submit">{}</button></form>"#,
        escape(action),
        text_input("title", "Title", title),
        text_area("description", "Description", description),
        text_input("image", "Image path (from Upload)", image),
        text_input(
            "category",
            "Category (event, workshop, hackathon, club-life)",
            category
        ),
        submit,
    )
}

/// GET /admin/gallery
pub async fn gallery_admin_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> PageResult<Response> {
    let gallery = state.repo.list_gallery().await?;

    let mut body = String::from("<h1>Gallery</h1>");
    for (index, item) in gallery.iter().enumerate() {
        let _ = write!(
            body,
            r#"<div class="card">{} <strong>{}</strong> <span class="muted">{}</span><br><a href="/admin/gallery/{}/edit">Edit</a> {}</div>"#,
            views::image_tag(&item.image, &item.title),
            escape(&item.title),
            escape(&item.category),
            index,
            post_button(&format!("/admin/gallery/{}/delete", index), "Delete"),
        );
    }
    body.push_str("<h2>Add item</h2>");
    body.push_str(&gallery_form("/admin/gallery", None, "Add item"));

    Ok(admin_response(&state, &headers, "Gallery", &body))
}

/// POST /admin/gallery
pub async fn gallery_create(
    State(state): State<AppState>,
    Form(form): Form<GalleryForm>,
) -> PageResult<Response> {
    let outcome = state
        .repo
        .create_gallery_item(form.into())
        .await
        .map(|item| format!("Gallery item '{}' added", item.title));
    flash_outcome(&state, outcome, "/admin/gallery", "/admin/gallery")
}

/// GET /admin/gallery/{index}/edit
pub async fn gallery_edit_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(index): Path<usize>,
) -> PageResult<Response> {
    let item = match state.repo.get_gallery_item(index).await {
        Ok(item) => item,
        Err(err) => return flash_outcome(&state, Err(err), "/admin/gallery", "/admin/gallery"),
    };

    let body = format!(
        "<h1>Edit gallery item</h1>{}{}",
        views::image_tag(&item.image, &item.title),
        gallery_form(
            &format!("/admin/gallery/{}/edit", index),
            Some(&item),
            "Save"
        )
    );
    Ok(admin_response(&state, &headers, "Edit gallery item", &body))
}

/// POST /admin/gallery/{index}/edit
pub async fn gallery_edit_submit(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Form(form): Form<GalleryForm>,
) -> PageResult<Response> {
    let edit_page = format!("/admin/gallery/{}/edit", index);
    let request = UpdateGalleryItemRequest::from(form);
    let outcome = state
        .repo
        .update_gallery_item(index, &request)
        .await
        .map(|item| format!("Gallery item '{}' updated", item.title));
    flash_outcome(&state, outcome, "/admin/gallery", &edit_page)
}

/// POST /admin/gallery/{index}/delete
pub async fn gallery_delete(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> PageResult<Response> {
    let outcome = state
        .repo
        .delete_gallery_item(index)
        .await
        .map(|item| format!("Gallery item '{}' deleted", item.title));
    flash_outcome(&state, outcome, "/admin/gallery", "/admin/gallery")
}

// ==================== UPLOAD ====================

/// GET /admin/upload
pub async fn upload_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut options = String::new();
    for category in UploadCategory::ALL {
        let _ = write!(options, r#"<option value="{0}">{0}</option>"#, category);
    }
    let body = format!(
        r#"<h1>Upload image</h1>
<p class="muted">PNG, JPG, GIF or WebP up to 16 MiB. Paste the returned path into an image field.</p>
<form method="post" action="/admin/upload" enctype="multipart/form-data">
<label>Category<select name="category">{options}</select></label>
<label>File<input type="file" name="file" accept=".png,.jpg,.jpeg,.gif,.webp"></label>
<button type="submit">Upload</button>
</form>"#
    );
    admin_response(&state, &headers, "Upload", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_form_with(deadline_date: &str, show: bool) -> EventForm {
        EventForm {
            name: "Hack Day".to_string(),
            date: "2026-05-01".to_string(),
            time: "10:00".to_string(),
            location: "Lab 1".to_string(),
            description: "Build things".to_string(),
            how: String::new(),
            rules: "No plagiarism\n\n  Teams of 3 \n".to_string(),
            coordinators: "Asha | Lead | 999 | asha@example.com\nRavi | Co-lead".to_string(),
            status: "Ongoing".to_string(),
            image: String::new(),
            register_link: "https://forms.example/reg".to_string(),
            deadline_date: deadline_date.to_string(),
            deadline_message: String::new(),
            show_in_events: show.then(|| "on".to_string()),
        }
    }

    #[test]
    fn test_event_form_into_create() {
        let request = event_form_with("2026-04-28", true).into_create().unwrap();

        assert_eq!(request.rules, vec!["No plagiarism", "Teams of 3"]);
        assert_eq!(request.coordinators.len(), 2);
        assert_eq!(request.coordinators[0].email, "asha@example.com");
        assert_eq!(request.coordinators[1].phone, "");
        assert_eq!(request.status, EventStatus::Ongoing);
        assert!(request.show_in_events);
        let deadline = request.registration_deadline.unwrap();
        assert_eq!(deadline.date, "2026-04-28");
        assert_eq!(deadline.message, default_deadline_message());
    }

    #[test]
    fn test_event_form_blank_deadline_clears_on_update() {
        let request = event_form_with("  ", false).into_update().unwrap();

        assert_eq!(request.registration_deadline, Some(None));
        assert_eq!(request.show_in_events, Some(false));
    }

    #[test]
    fn test_event_form_rejects_unknown_status() {
        let mut form = event_form_with("", true);
        form.status = "cancelled".to_string();
        assert!(matches!(
            form.into_create(),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_contact_people_parsing() {
        let people = contact_people("Dr. Rao | 98450\n\nMs. Iyer");
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].phone, "98450");
        assert_eq!(people[1].name, "Ms. Iyer");
        assert_eq!(people_text(&people), "Dr. Rao | 98450\nMs. Iyer | ");
    }
}
