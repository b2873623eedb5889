//! Server-rendered pages.
//!
//! Every piece of visitor-supplied text goes through [`escape`].

use std::fmt::Write;

use axum::response::Html;

use crate::entity::submission;
use crate::validation::SubmissionForm;

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8">
        <meta name="viewport" content="width=device-width, initial-scale=1">
        <title>{title}</title>
    </head>
    <body>
        <main>
{body}
        </main>
    </body>
</html>
"#,
        title = escape(title),
    ))
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|message| format!(r#"<p class="error" role="alert">{}</p>"#, escape(message)))
        .unwrap_or_default()
}

/// The submission form, refilled with `values` after a failed attempt.
pub fn form_page(values: &SubmissionForm, error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Share Your Music</h1>
<p>Tell us about a song you love</p>
{error}
<form method="post" action="/" onsubmit="this.querySelector('button').disabled = true">
    <label>Your Name *
        <input type="text" name="name" placeholder="Enter your name" value="{name}" required>
    </label>
    <label>Song Name *
        <input type="text" name="song_name" placeholder="Enter the song title" value="{song_name}" required>
    </label>
    <label>Spotify Link *
        <input type="url" name="spotify_link" placeholder="https://open.spotify.com/track/..." value="{spotify_link}" required>
    </label>
    <button type="submit">Submit Your Song</button>
</form>"#,
        error = error_banner(error),
        name = escape(&values.name),
        song_name = escape(&values.song_name),
        spotify_link = escape(&values.spotify_link),
    );

    page("Share Your Music", &body)
}

/// Shown after an accepted submission, or when the session already has one.
pub fn thank_you_page(first_time: bool) -> Html<String> {
    let message = if first_time {
        "Your music submission has been received. We'll check out your song recommendation!"
    } else {
        "You've already shared a song from this browser. Thanks for the recommendation!"
    };

    page(
        "Thank You!",
        &format!("<h1>Thank You!</h1>\n<p>{}</p>", escape(message)),
    )
}

/// Password prompt for the viewer, with `error` shown above it after a failed attempt.
pub fn login_page(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Access Submissions</h1>
<p>Enter password to view submissions</p>
{error}
<form method="post" action="/submissions">
    <label>Password *
        <input type="password" name="password" placeholder="Enter password" required>
    </label>
    <button type="submit">Access Submissions</button>
</form>"#,
        error = error_banner(error),
    );

    page("Access Submissions", &body)
}

/// `Jan 5, 2025, 03:04 PM`
pub fn format_created_at(created_at: &sea_orm::prelude::DateTimeWithTimeZone) -> String {
    created_at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// The viewer: one card per row in the order given, or the empty state.
///
/// Rows are expected newest first, as returned by
/// [`SubmissionRepository::list_recent`](crate::SubmissionRepository::list_recent).
pub fn submissions_page(rows: &[submission::Model]) -> Html<String> {
    let mut body = String::from(
        "<h1>Music Submissions</h1>\n<p>All submitted songs and recommendations</p>\n",
    );

    if rows.is_empty() {
        body.push_str(r#"<p class="empty">No submissions yet</p>"#);
    } else {
        body.push_str("<ul class=\"submissions\">\n");
        for row in rows {
            // Writing into a String cannot fail
            let _ = write!(
                body,
                r#"    <li>
        <strong>{name}</strong>
        <span>{song_name}</span>
        <time datetime="{iso}">{date}</time>
        <a href="{link}" target="_blank" rel="noopener noreferrer">Open in Spotify</a>
    </li>
"#,
                name = escape(&row.name),
                song_name = escape(&row.song_name),
                iso = row.created_at.to_rfc3339(),
                date = format_created_at(&row.created_at),
                link = escape(&row.spotify_link),
            );
        }
        body.push_str("</ul>");
    }

    body.push_str(
        "\n<form method=\"post\" action=\"/submissions/logout\"><button type=\"submit\">Log out</button></form>",
    );

    page("Music Submissions", &body)
}

/// Bare page with a single escaped message.
pub fn error_page(message: &str) -> Html<String> {
    page(
        "Something went wrong",
        &format!(r#"<p class="error" role="alert">{}</p>"#, escape(message)),
    )
}
