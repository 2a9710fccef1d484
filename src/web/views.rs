//! HTML rendering helpers.

use std::fmt::Write;

use crate::models::{ClubInfo, ContactInfo, Event, EventStatus, GalleryItem, Member};

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#1d1d1f}\
header,footer{background:#111;color:#eee;padding:1rem 2rem}\
header a,footer a{color:#eee;margin-right:1rem}\
main{max-width:960px;margin:0 auto;padding:1.5rem}\
.card{border:1px solid #ddd;border-radius:8px;padding:1rem;margin-bottom:1rem}\
.flash{background:#fff4d6;border:1px solid #e6c66b;padding:.75rem;border-radius:6px}\
.banner{background:#e8f4ff;border:1px solid #7db7ef;padding:.75rem;border-radius:6px}\
.muted{color:#777}\
img.thumb{max-width:160px;border-radius:6px}\
form.inline{display:inline}\
label{display:block;margin-top:.5rem}\
input[type=text],input[type=password],textarea,select{width:100%;padding:.4rem}";

/// Escape text for use in HTML content and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, header: &str, flash: Option<&str>, body: &str, footer: &str) -> String {
    let flash = flash
        .map(|m| format!(r#"<p class="flash">{}</p>"#, escape(m)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<header>{header}</header>
<main>
{flash}
{body}
</main>
<footer>{footer}</footer>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Public site page.
pub fn public_page(club: &ClubInfo, contact: &ContactInfo, title: &str, body: &str) -> String {
    let header = format!(
        r#"<strong>{}</strong> <nav><a href="/">Home</a><a href="/about">About</a><a href="/events">Events</a><a href="/members">Members</a><a href="/gallery">Gallery</a></nav>"#,
        escape(&club.name)
    );
    let mut footer = format!("{} &middot; {}", escape(&club.name), escape(&club.college));
    if !contact.email.is_empty() {
        let _ = write!(
            footer,
            r#" &middot; <a href="mailto:{0}">{0}</a>"#,
            escape(&contact.email)
        );
    }
    for (label, link) in [
        ("LinkedIn", &contact.linkedin),
        ("Instagram", &contact.instagram),
        ("Facebook", &contact.facebook),
    ] {
        if !link.is_empty() {
            let _ = write!(footer, r#" <a href="{}">{}</a>"#, escape(link), label);
        }
    }
    let title = format!("{} | {}", title, club.name);
    document(&title, &header, None, body, &footer)
}

/// Admin panel page.
pub fn admin_page(title: &str, flash: Option<&str>, body: &str) -> String {
    let header = r#"<strong>Admin</strong> <nav><a href="/admin">Dashboard</a><a href="/admin/club-info">Club info</a><a href="/admin/events">Events</a><a href="/admin/members">Members</a><a href="/admin/gallery">Gallery</a><a href="/admin/contact">Contact</a><a href="/admin/upload">Upload</a><a href="/admin/logout">Log out</a></nav>"#;
    document(title, header, flash, body, r#"<a href="/">View site</a>"#)
}

/// Standalone page for errors and the login screen.
pub fn plain_page(title: &str, flash: Option<&str>, body: &str) -> String {
    document(title, r#"<a href="/">Home</a>"#, flash, body, "")
}

pub fn error_body(status: u16, message: &str) -> String {
    format!(
        r#"<h1>{}</h1><p>{}</p><p><a href="/">Back to the home page</a></p>"#,
        status,
        escape(message)
    )
}

pub fn image_tag(src: &str, alt: &str) -> String {
    if src.trim().is_empty() {
        return String::new();
    }
    format!(
        r#"<img class="thumb" src="{}" alt="{}">"#,
        escape(src),
        escape(alt)
    )
}

pub fn event_card(event: &Event) -> String {
    let mut html = format!(
        r#"<div class="card">{}<h3><a href="/events/{}">{}</a></h3><p class="muted">{} &middot; {} &middot; {} &middot; {}</p><p>{}</p>"#,
        image_tag(&event.image, &event.name),
        event.id,
        escape(&event.name),
        escape(&event.date),
        escape(&event.time),
        escape(&event.location),
        event.status,
        escape(&event.description),
    );
    if event.has_register_link() && event.status != EventStatus::Completed {
        let _ = write!(
            html,
            r#"<p><a href="{}">Register</a></p>"#,
            escape(&event.register_link)
        );
    }
    html.push_str("</div>");
    html
}

pub fn event_detail(event: &Event) -> String {
    let mut html = format!(
        "<h1>{}</h1>{}<p class=\"muted\">{} &middot; {} &middot; {}</p><p>Status: {}</p><p>{}</p>",
        escape(&event.name),
        image_tag(&event.image, &event.name),
        escape(&event.date),
        escape(&event.time),
        escape(&event.location),
        event.status,
        escape(&event.description),
    );
    if !event.how.is_empty() {
        let _ = write!(html, "<h2>How it works</h2><p>{}</p>", escape(&event.how));
    }
    if !event.rules.is_empty() {
        html.push_str("<h2>Rules</h2><ol>");
        for rule in &event.rules {
            let _ = write!(html, "<li>{}</li>", escape(rule));
        }
        html.push_str("</ol>");
    }
    if !event.coordinators.is_empty() {
        html.push_str("<h2>Coordinators</h2><ul>");
        for c in &event.coordinators {
            let _ = write!(
                html,
                "<li>{} ({}) {} {}</li>",
                escape(&c.name),
                escape(&c.role),
                escape(&c.phone),
                escape(&c.email)
            );
        }
        html.push_str("</ul>");
    }
    if let Some(deadline) = &event.registration_deadline {
        let _ = write!(
            html,
            r#"<p class="banner">{} Registration closes {}.</p>"#,
            escape(&deadline.message),
            escape(&deadline.date)
        );
    }
    if event.has_register_link() && event.status != EventStatus::Completed {
        let _ = write!(
            html,
            r#"<p><a href="{}">Register</a></p>"#,
            escape(&event.register_link)
        );
    }
    html
}

pub fn member_card(member: &Member) -> String {
    let mut html = format!(
        r#"<div class="card">{}<h3>{}</h3><p>{} &middot; {}</p>"#,
        image_tag(&member.image, &member.name),
        escape(&member.name),
        escape(&member.role),
        escape(&member.year),
    );
    if !member.domain.is_empty() {
        let _ = write!(html, r#"<p class="muted">{}</p>"#, escape(&member.domain));
    }
    for (label, link) in [("LinkedIn", &member.linkedin), ("GitHub", &member.github)] {
        if !link.is_empty() {
            let _ = write!(html, r#"<a href="{}">{}</a> "#, escape(link), label);
        }
    }
    html.push_str("</div>");
    html
}

pub fn gallery_card(item: &GalleryItem) -> String {
    format!(
        r#"<div class="card">{}<h3>{}</h3><p class="muted">{}</p><p>{}</p></div>"#,
        image_tag(&item.image, &item.title),
        escape(&item.title),
        escape(&item.category),
        escape(&item.description),
    )
}

/// Labelled single-line input.
pub fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<label>{label}<input type="text" name="{name}" value="{}"></label>"#,
        escape(value)
    )
}

/// Labelled textarea.
pub fn text_area(name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<label>{label}<textarea name="{name}" rows="4">{}</textarea></label>"#,
        escape(value)
    )
}

/// Button that POSTs to `action`.
pub fn post_button(action: &str, label: &str) -> String {
    format!(
        r#"<form class="inline" method="post" action="{}"><button type="submit">{}</button></form>"#,
        escape(action),
        escape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateEventRequest;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_event_card_escapes_user_content() {
        let event = CreateEventRequest {
            name: "<b>Hack</b> Day".to_string(),
            register_link: "#".to_string(),
            ..Default::default()
        }
        .into_event(3);

        let html = event_card(&event);
        assert!(html.contains("&lt;b&gt;Hack&lt;/b&gt; Day"));
        assert!(html.contains(r#"href="/events/3""#));
        assert!(!html.contains("Register"));
    }
}
