//! Server-rendered HTML pages.
//!
//! Every page goes through [`layout`], which shows the pending flash message.
//! All user-provided text is escaped; only rendered markdown is inserted raw.

use flatcms_core::utils::{encode_path_segment, escape_html};

/// Values every page needs from the session
pub struct PageContext<'a> {
    pub flash: Option<String>,
    pub username: Option<&'a str>,
}

pub fn layout(title: &str, page: &PageContext<'_>, body: &str) -> String {
    let flash = page
        .flash
        .as_deref()
        .map(|msg| format!("<p class=\"message\">{}</p>\n", escape_html(msg)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - flatcms</title>
</head>
<body>
{flash}<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        flash = flash,
        body = body,
    )
}

fn user_status(username: Option<&str>) -> String {
    match username {
        Some(name) => format!(
            r#"<form method="post" action="/users/signout">
<p class="user-status">Signed in as {}. <button type="submit">Sign Out</button></p>
</form>"#,
            escape_html(name)
        ),
        None => r#"<p class="user-status"><a href="/users/signin">Sign In</a> or <a href="/users/new">Sign Up</a></p>"#
            .to_string(),
    }
}

pub fn index(page: &PageContext<'_>, files: &[String]) -> String {
    let mut items = String::new();
    for file in files {
        let href = encode_path_segment(file);
        let name = escape_html(file);
        items.push_str(&format!(
            r#"<li><a href="/{href}">{name}</a> <a href="/{href}/edit">edit</a>
<form class="inline" method="post" action="/{href}/delete"><button type="submit">delete</button></form></li>
"#
        ));
    }

    let body = format!(
        "<ul>\n{}</ul>\n<p><a href=\"/new\">New Document</a></p>\n{}",
        items,
        user_status(page.username)
    );
    layout("Documents", page, &body)
}

pub fn new_document(page: &PageContext<'_>, filename: &str) -> String {
    let body = format!(
        r#"<form method="post" action="/create">
<label for="filename">Add a new document:</label>
<input name="filename" id="filename" value="{}">
<button type="submit">Create</button>
</form>"#,
        escape_html(filename)
    );
    layout("New Document", page, &body)
}

pub fn edit_document(page: &PageContext<'_>, filename: &str, content: &str) -> String {
    let body = format!(
        r#"<form method="post" action="/{href}">
<label for="new_content">Edit content of {name}:</label>
<textarea name="new_content" id="new_content" rows="20" cols="80">{content}</textarea>
<button type="submit">Save Changes</button>
</form>"#,
        href = encode_path_segment(filename),
        name = escape_html(filename),
        content = escape_html(content),
    );
    layout(&format!("Edit {}", filename), page, &body)
}

pub fn markdown_document(page: &PageContext<'_>, filename: &str, rendered: &str) -> String {
    layout(filename, page, rendered)
}

fn credentials_form(action: &str, heading: &str, username: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<p>{heading}</p>
<label for="username">Username:</label>
<input name="username" id="username" value="{username}">
<label for="password">Password:</label>
<input type="password" name="password" id="password">
<button type="submit">{submit}</button>
</form>"#,
        action = action,
        heading = heading,
        username = escape_html(username),
        submit = submit,
    )
}

pub fn sign_in(page: &PageContext<'_>, username: &str) -> String {
    let body = credentials_form("/users/signin", "Sign in to edit documents.", username, "Sign In");
    layout("Sign In", page, &body)
}

pub fn sign_up(page: &PageContext<'_>, username: &str) -> String {
    let body = credentials_form("/users/create", "Create an account.", username, "Sign Up");
    layout("Sign Up", page, &body)
}

pub fn server_error() -> String {
    let page = PageContext {
        flash: None,
        username: None,
    };
    layout(
        "Error",
        &page,
        "<p>Something went wrong. Please try again later.</p>",
    )
}
