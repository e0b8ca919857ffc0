//! Server-rendered pages. Every value that came from a user goes through
//! [`escape`] before it lands in the markup.

use axum::http::StatusCode;
use time::{macros::format_description, PrimitiveDateTime};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        repo_types::User,
    },
    posts::{
        dto::PostForm,
        repo_types::{BlogPost, PostSummary},
    },
    redirect,
    validation::FormErrors,
};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn format_date(dt: &PrimitiveDateTime) -> String {
    dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default()
}

fn layout(title: &str, current: Option<&User>, body: &str) -> String {
    let nav = match current {
        Some(user) => format!(
            r#"<a href="/posts">Posts</a> <a href="/user/{id}">New post</a> <span>{name}</span> <a href="/logout">Log out</a>"#,
            id = user.id,
            name = escape(&user.username),
        ),
        None => r#"<a href="/posts">Posts</a> <a href="/login">Log in</a> <a href="/register">Sign up</a>"#.to_string(),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<nav>{nav}</nav>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn field_errors(errors: &FormErrors, field: &str) -> String {
    if !errors.has(field) {
        return String::new();
    }
    let mut out = String::from(r#"<ul class="errors">"#);
    for message in errors.field(field) {
        out.push_str(&format!("<li>{}</li>", escape(message)));
    }
    out.push_str("</ul>");
    out
}

fn input(label: &str, name: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"<p><label for="{name}">{label}</label> <input id="{name}" name="{name}" type="{kind}" value="{value}">{errs}</p>"#,
        value = escape(value),
        errs = field_errors(errors, name),
    )
}

fn post_form(action: &str, submit: &str, form: &PostForm, errors: &FormErrors) -> String {
    format!(
        r#"<form method="post" action="{action}">
{title}
<p><label for="content">Content</label> <textarea id="content" name="content">{content}</textarea>{content_errs}</p>
<p><button type="submit">{submit}</button></p>
</form>"#,
        action = escape(action),
        title = input("Title", "title", "text", &form.title, errors),
        content = escape(&form.content),
        content_errs = field_errors(errors, "content"),
    )
}

fn article(
    id: i64,
    title: &str,
    content: &str,
    date_posted: &PrimitiveDateTime,
    author: Option<&str>,
    can_manage: bool,
) -> String {
    let mut out = format!(r#"<article id="post-{id}"><h2>{}</h2>"#, escape(title));
    let byline = match author {
        Some(name) => format!("Posted by {} on {}", escape(name), format_date(date_posted)),
        None => format!("Posted on {}", format_date(date_posted)),
    };
    out.push_str(&format!("<p><small>{byline}</small></p><p>{}</p>", escape(content)));
    if can_manage {
        out.push_str(&format!(
            r#"<p><a href="/posts/edit/{id}">Edit</a> <a href="/posts/delete/{id}">Delete</a></p>"#
        ));
    }
    out.push_str("</article>");
    out
}

pub fn posts_page(current: Option<&User>, posts: &[PostSummary]) -> String {
    let mut body = String::from("<h1>All posts</h1>\n");
    if posts.is_empty() {
        body.push_str("<p>No posts yet.</p>\n");
    }
    for post in posts {
        let can_manage = current.is_some_and(|u| u.id == post.author_id);
        body.push_str(&article(
            post.id,
            &post.title,
            &post.content,
            &post.date_posted,
            Some(&post.author_username),
            can_manage,
        ));
        body.push('\n');
    }
    layout("Posts", current, &body)
}

pub fn user_page(
    current: Option<&User>,
    owner: &User,
    posts: &[BlogPost],
    form: &PostForm,
    errors: &FormErrors,
) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape(&owner.username));
    body.push_str(&post_form(&format!("/user/{}", owner.id), "Post", form, errors));
    body.push('\n');
    let can_manage = current.is_some_and(|u| u.id == owner.id);
    for post in posts {
        body.push_str(&article(post.id, &post.title, &post.content, &post.date_posted, None, can_manage));
        body.push('\n');
    }
    layout(&owner.username, current, &body)
}

pub fn edit_page(current: Option<&User>, post: &BlogPost, form: &PostForm, errors: &FormErrors) -> String {
    let body = format!(
        "<h1>Edit post</h1>\n{}",
        post_form(&format!("/posts/edit/{}", post.id), "Save", form, errors)
    );
    layout("Edit post", current, &body)
}

pub fn register_page(current: Option<&User>, form: &RegisterForm, errors: &FormErrors) -> String {
    let body = format!(
        r#"<h1>Sign Up</h1>
<form method="post" action="/register">
{username}
{email}
{password}
{confirm}
<p><button type="submit">Sign Up</button></p>
</form>"#,
        username = input("Username", "username", "text", &form.username, errors),
        email = input("Email", "email", "text", &form.email, errors),
        password = input("Password", "password", "password", "", errors),
        confirm = input("Confirm Password", "password_confirm", "password", "", errors),
    );
    layout("Sign Up", current, &body)
}

pub fn login_page(form: &LoginForm, errors: &FormErrors, next: Option<&str>) -> String {
    let action = match next {
        Some(next) => format!("/login?next={}", redirect::encode_component(next)),
        None => "/login".to_string(),
    };
    let body = format!(
        r#"<h1>Log In</h1>
<form method="post" action="{action}">
{username}
{password}
<p><button type="submit">Log In</button></p>
</form>"#,
        action = escape(&action),
        username = input("Username", "username", "text", &form.username, errors),
        password = input("Password", "password", "password", "", errors),
    );
    layout("Log In", None, &body)
}

pub fn error_page(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!("<h1>{} {}</h1>", status.as_u16(), escape(reason));
    layout(reason, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x&y")</script>'"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;&#x27;"
        );
    }

    #[test]
    fn form_errors_are_rendered_next_to_fields() {
        let mut errors = FormErrors::new();
        errors.add("username", "Username already taken.");
        let html = register_page(None, &RegisterForm { username: "alice".into(), ..Default::default() }, &errors);
        assert!(html.contains("Username already taken."));
        assert!(html.contains(r#"value="alice""#));
    }

    #[test]
    fn passwords_are_never_echoed() {
        let form = LoginForm { username: "alice".into(), password: "hunter22".into() };
        let html = login_page(&form, &FormErrors::new(), Some("/posts/edit/1"));
        assert!(!html.contains("hunter22"));
        assert!(html.contains("/login?next=%2Fposts%2Fedit%2F1"));
    }

    #[test]
    fn nav_reflects_session() {
        let user = User { id: 4, username: "alice".into(), email: "a@x.com".into(), password: "p".into() };
        assert!(posts_page(Some(&user), &[]).contains("/logout"));
        assert!(posts_page(None, &[]).contains("/login"));
    }

    #[test]
    fn articles_show_byline_and_owner_links() {
        let post = PostSummary {
            id: 9,
            title: "Hello".into(),
            content: "Body & soul".into(),
            date_posted: time::macros::datetime!(2024-03-05 14:07),
            author_id: 4,
            author_username: "alice".into(),
        };
        let owner = User { id: 4, username: "alice".into(), email: "a@x.com".into(), password: "p".into() };
        let other = User { id: 5, ..owner.clone() };

        let html = posts_page(Some(&owner), std::slice::from_ref(&post));
        assert!(html.contains("<p><small>Posted by alice on 2024-03-05 14:07</small></p><p>Body &amp; soul</p>"));
        assert!(html.contains(r#"<a href="/posts/edit/9">Edit</a> <a href="/posts/delete/9">Delete</a>"#));

        let html = posts_page(Some(&other), std::slice::from_ref(&post));
        assert!(!html.contains("/posts/delete/9"));
    }
}
