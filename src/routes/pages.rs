//! Server-rendered page shells. The gate has already run by the time these
//! handlers see a request; the dashboard menu is built from the advisory
//! cookie and is display only.

use std::fmt::Write;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use super::session::{end_session, read_session, safe_return_path};
use crate::{
    AppState,
    session::navigation::{Menu, menu_for},
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub from: Option<String>,
    /// Set when a form post bounced back here.
    #[serde(default)]
    pub error: Option<String>,
}

fn escape_html(raw: &str) -> String {
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

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} | School Portal</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    ))
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| format!("<p role=\"alert\">{}</p>\n", escape_html(e)))
        .unwrap_or_default()
}

#[tracing::instrument(name = "pages.login", skip_all)]
pub async fn login(Query(query): Query<LoginQuery>) -> Html<String> {
    let mut body = format!(
        "<h1>Sign in</h1>\n{}<form method=\"post\" action=\"/api/auth/login\">\n\
         <input name=\"email\" type=\"email\" required>\n\
         <input name=\"password\" type=\"password\" required>\n",
        error_banner(query.error.as_deref())
    );
    if let Some(from) = safe_return_path(query.from.as_deref()) {
        let _ = writeln!(
            body,
            "<input name=\"from\" type=\"hidden\" value=\"{}\">",
            escape_html(from)
        );
    }
    body.push_str("<button type=\"submit\">Sign in</button>\n</form>\n<a href=\"/register\">Create an account</a>");
    page("Sign in", &body)
}

#[tracing::instrument(name = "pages.register", skip_all)]
pub async fn register(Query(query): Query<LoginQuery>) -> Html<String> {
    let body = format!(
        "<h1>Create an account</h1>\n{}<form method=\"post\" action=\"/api/auth/register\">\n\
         <input name=\"name\" required>\n\
         <input name=\"email\" type=\"email\" required>\n\
         <input name=\"password\" type=\"password\" required>\n\
         <button type=\"submit\">Register</button>\n</form>\n<a href=\"/login\">Sign in</a>",
        error_banner(query.error.as_deref())
    );
    page("Register", &body)
}

/// Sign out from a plain link: drop both cookies and go to the login page.
#[tracing::instrument(name = "pages.logout", skip_all)]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Response {
    end_session(&state, &cookies);
    Redirect::to("/login").into_response()
}

#[tracing::instrument(name = "pages.unauthorized", skip_all)]
pub async fn unauthorized() -> Html<String> {
    page(
        "Unauthorized",
        "<h1>Unauthorized</h1>\n<p>Your role does not have access to that page.</p>\n<a href=\"/dashboard\">Back to your dashboard</a>",
    )
}

fn render_menu(menu: &Menu, pathname: &str) -> String {
    let mut nav = String::from("<nav>\n<ul>\n");
    for link in menu.links.iter().chain(std::iter::once(&menu.settings)) {
        let class = if link.is_active(pathname) {
            " class=\"active\""
        } else {
            ""
        };
        let _ = writeln!(
            nav,
            "<li><a href=\"{}\"{}>{}</a></li>",
            link.href, class, link.label
        );
    }
    let _ = write!(
        nav,
        "</ul>\n<p>{}</p>\n</nav>",
        escape_html(&menu.signed_in_as)
    );
    nav
}

fn dashboard_page(state: &AppState, cookies: &Cookies, pathname: &str, title: &str) -> Html<String> {
    let session = read_session(state, cookies);
    let menu = menu_for(session.as_ref());
    let body = format!(
        "{}\n<main>\n<h1>{}</h1>\n</main>",
        render_menu(&menu, pathname),
        escape_html(title)
    );
    page(title, &body)
}

fn section_title(section: &str) -> String {
    let mut title = String::new();
    for word in section
        .split(['/', '-', '_'])
        .filter(|w| !w.is_empty())
    {
        if !title.is_empty() {
            title.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            title.extend(first.to_uppercase());
            title.push_str(chars.as_str());
        }
    }
    title
}

#[tracing::instrument(name = "pages.dashboard", skip_all)]
pub async fn dashboard(State(state): State<AppState>, cookies: Cookies) -> Html<String> {
    dashboard_page(&state, &cookies, "/dashboard", "Dashboard")
}

#[tracing::instrument(name = "pages.dashboard_section", skip(state, cookies))]
pub async fn dashboard_section(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(section): Path<String>,
) -> Html<String> {
    let pathname = format!("/dashboard/{}", section);
    dashboard_page(&state, &cookies, &pathname, &section_title(&section))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>&'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_error_banner_is_escaped() {
        assert_eq!(error_banner(None), "");
        assert_eq!(error_banner(Some("  ")), "");
        assert_eq!(
            error_banner(Some("<b>Invalid password</b>")),
            "<p role=\"alert\">&lt;b&gt;Invalid password&lt;/b&gt;</p>\n"
        );
    }

    #[test]
    fn test_section_title() {
        assert_eq!(section_title("admin/users"), "Admin Users");
        assert_eq!(section_title("payments"), "Payments");
        assert_eq!(section_title("report-cards"), "Report Cards");
    }

    #[test]
    fn test_menu_marks_active_link() {
        let menu = menu_for(None);
        let html = render_menu(&menu, "/dashboard/classes");
        assert!(html.contains("<a href=\"/dashboard/classes\" class=\"active\">Classes</a>"));
        assert!(html.contains("Signed in as Guest (GUEST)"));
    }
}
