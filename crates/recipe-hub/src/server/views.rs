//! Minimal HTML pages.
//!
//! Every interpolated value passes through [`html_escape`].

use crate::models::{QuizResult, Recipe, SessionUser, User};
use crate::quiz::QuizSheet;

const STYLE: &str = r#"body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; }
main { background: #fff; max-width: 720px; margin: 32px auto; padding: 32px; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
nav a { margin-right: 12px; }
.error { background: #fee; border: 1px solid #c00; color: #c00; padding: 10px; border-radius: 4px; margin-bottom: 16px; }
label { display: block; margin-top: 8px; }
button { margin-top: 12px; padding: 8px 16px; }"#;

fn layout(title: &str, lang: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title} - Recipe Hub</title>
<style>
{STYLE}
</style>
</head>
<body>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        lang = html_escape(lang),
        title = html_escape(title),
    )
}

fn message_html(message: Option<&str>) -> String {
    message
        .filter(|m| !m.is_empty())
        .map(|m| format!(r#"<div class="error">{}</div>"#, html_escape(m)))
        .unwrap_or_default()
}

fn nav(user: Option<&SessionUser>) -> String {
    match user {
        Some(user) => {
            let admin = if user.is_admin { r#"<a href="/admin">Admin</a>"# } else { "" };
            format!(
                r#"<nav>Signed in as <strong>{}</strong> <a href="/quiz">Quiz</a>{admin}<a href="/logout">Log out</a></nav>"#,
                html_escape(&user.username)
            )
        }
        None => r#"<nav><a href="/login">Log in</a><a href="/register">Register</a></nav>"#.to_string(),
    }
}

/// Home page, optionally with search results.
pub fn render_home(user: Option<&SessionUser>, lang: &str, recipes: Option<&[Recipe]>) -> String {
    let mut body = nav(user);
    body.push_str(
        r#"
<form method="POST" action="/search">
<input type="text" name="query" placeholder="Search recipes" required>
<button type="submit">Search</button>
</form>"#,
    );

    if let Some(recipes) = recipes {
        if recipes.is_empty() {
            body.push_str("\n<p>No recipes found.</p>");
        } else {
            body.push_str("\n<ul>");
            for recipe in recipes {
                body.push_str(&format!("\n<li><strong>{}</strong>", html_escape(&recipe.name)));
                if let Some(description) = &recipe.description {
                    body.push_str(&format!(" {}", html_escape(description)));
                }
                body.push_str("</li>");
            }
            body.push_str("\n</ul>");
        }
    }

    layout("Recipe Hub", lang, &body)
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"<form method="POST" action="{action}">
<label for="username">Username</label>
<input type="text" id="username" name="username" required autofocus>
<label for="password">Password</label>
<input type="password" id="password" name="password" required>
<button type="submit">{submit}</button>
</form>"#
    )
}

/// Registration form.
pub fn render_register(message: Option<&str>, lang: &str) -> String {
    let body = format!(
        "{}{}\n<p>Already registered? <a href=\"/login\">Log in</a></p>",
        message_html(message),
        credentials_form("/register", "Register")
    );
    layout("Register", lang, &body)
}

/// Login form.
pub fn render_login(message: Option<&str>, lang: &str) -> String {
    let body = format!(
        "{}{}\n<p>No account? <a href=\"/register\">Register</a></p>",
        message_html(message),
        credentials_form("/login", "Log in")
    );
    layout("Log in", lang, &body)
}

/// Admin dashboard: user list plus the add-user form.
pub fn render_admin(users: &[User], message: Option<&str>, lang: &str) -> String {
    let mut body = message_html(message);
    body.push_str("<table>\n<tr><th>Username</th><th>Admin</th><th>Created</th><th></th></tr>");
    for user in users {
        body.push_str(&format!(
            r#"
<tr><td>{}</td><td>{}</td><td>{}</td><td><form method="POST" action="/admin/delete-user/{}"><button type="submit">Delete</button></form></td></tr>"#,
            html_escape(&user.username),
            if user.is_admin { "yes" } else { "no" },
            user.created_at.format("%Y-%m-%d"),
            html_escape(&user.id),
        ));
    }
    body.push_str(
        r#"
</table>
<h2>Add user</h2>
<form method="POST" action="/admin/add-user">
<label for="username">Username</label>
<input type="text" id="username" name="username" required>
<label for="password">Password</label>
<input type="password" id="password" name="password" required>
<label><input type="checkbox" name="admin"> Administrator</label>
<button type="submit">Add</button>
</form>
<p><a href="/">Home</a></p>"#,
    );
    layout("Admin", lang, &body)
}

/// Quiz form with a client-side countdown.
pub fn render_quiz(sheet: &QuizSheet, lang: &str) -> String {
    let mut body = format!(
        r#"<p>Time left: <span id="timer">{limit}</span>s</p>
<form id="quiz" method="POST" action="/quiz/submit">"#,
        limit = sheet.time_limit
    );
    for question in &sheet.questions {
        let id = html_escape(&question.id);
        body.push_str(&format!("\n<fieldset><legend>{}</legend>", html_escape(&question.text)));
        for choice in &question.choices {
            let choice = html_escape(choice);
            body.push_str(&format!(
                r#"<label><input type="radio" name="{id}" value="{choice}"> {choice}</label>"#
            ));
        }
        body.push_str("</fieldset>");
    }
    body.push_str(&format!(
        r#"
<button type="submit">Submit</button>
</form>
<script>
let left = {limit};
const timer = document.getElementById("timer");
setInterval(() => {{
  left -= 1;
  timer.textContent = Math.max(left, 0);
  if (left === 0) document.getElementById("quiz").submit();
}}, 1000);
</script>"#,
        limit = sheet.time_limit
    ));
    layout("Quiz", lang, &body)
}

/// Result page with a signed share link.
pub fn render_quiz_result(result: QuizResult, share_path: &str, lang: &str) -> String {
    let body = format!(
        r#"<p>You scored <strong>{score}</strong> out of <strong>{total}</strong>.</p>
<p><a href="{share}">Share your result</a></p>
<p><a href="/quiz">Try again</a> <a href="/">Home</a></p>"#,
        score = result.score,
        total = result.total,
        share = html_escape(share_path),
    );
    layout("Quiz result", lang, &body)
}

/// Public share page.
pub fn render_share(result: QuizResult, lang: &str) -> String {
    let body = format!(
        r#"<p>I scored {} out of {} on the Recipe Hub cooking quiz!</p>
<p><a href="/quiz">Take the quiz</a></p>"#,
        result.score, result.total
    );
    layout("Quiz result", lang, &body)
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
