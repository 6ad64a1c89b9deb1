use crate::models::{GroupView, UserView, UsersResponse};

pub fn render_index(response: &UsersResponse) -> String {
    let groups = if response.groups.is_empty() {
        EMPTY_HTML.to_string()
    } else {
        response.groups.iter().map(render_group).collect()
    };
    INDEX_HTML
        .replace("{{DATE}}", &escape_html(&response.date))
        .replace("{{GROUPS}}", &groups)
}

fn render_group(group: &GroupView) -> String {
    let items: String = group
        .users
        .iter()
        .map(|user| render_user(user, &group.name))
        .collect();
    format!(
        "<section class=\"group\"><h2>{}</h2><ul class=\"user-list\">{items}</ul></section>",
        escape_html(&group.name)
    )
}

fn render_user(user: &UserView, group: &str) -> String {
    let handle = escape_html(&user.handle);
    format!(
        r#"<li class="user-item">
  <span class="who">{label}</span>
  <span class="badge badge-{tone}">{status}</span>
  <details class="edit">
    <summary title="Edit alias / group">&#9998;</summary>
    <form method="post" action="/users/{handle}/edit">
      <input name="alias" value="{alias}" placeholder="Alias (empty clears)" />
      <input name="group" value="{group}" placeholder="Group" />
      <button type="submit">Save</button>
    </form>
  </details>
  <form method="post" action="/users/{handle}/delete">
    <button class="delete-btn" type="submit" title="Delete">&times;</button>
  </form>
</li>"#,
        label = escape_html(&user.label),
        tone = escape_html(&user.tone),
        status = escape_html(&user.status),
        alias = escape_html(&user.alias),
        group = escape_html(group),
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const EMPTY_HTML: &str =
    r#"<p class="hint">No handles tracked yet. Add one above to start watching.</p>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Streak Watch</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #2b2a28;
      --card: #ffffff;
      --ok: #2d7a4b;
      --info: #2f5f98;
      --danger: #c63b2b;
      --muted: #7a746d;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(640px, 100%);
      background: var(--card);
      border-radius: 20px;
      box-shadow: 0 16px 40px rgba(47, 72, 88, 0.14);
      padding: 28px;
      display: grid;
      gap: 22px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    h2 {
      margin: 0 0 8px;
      font-size: 1rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .subtitle,
    .hint {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .add-form {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    input {
      flex: 1 1 120px;
      padding: 8px 10px;
      border: 1px solid #d8d2c8;
      border-radius: 8px;
      font: inherit;
    }

    button {
      border: none;
      border-radius: 8px;
      padding: 8px 14px;
      font: inherit;
      cursor: pointer;
      background: var(--info);
      color: white;
    }

    .user-list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 6px;
    }

    .user-item {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 10px;
      padding: 8px 10px;
      border: 1px solid #eee8de;
      border-radius: 10px;
    }

    .who {
      flex: 1;
      font-weight: 600;
    }

    .badge {
      border-radius: 999px;
      padding: 2px 10px;
      font-size: 0.85rem;
      color: white;
    }

    .badge-ok {
      background: var(--ok);
    }

    .badge-info {
      background: var(--info);
    }

    .badge-danger,
    .badge-error {
      background: var(--danger);
    }

    .badge-error {
      opacity: 0.7;
    }

    .edit summary {
      cursor: pointer;
      list-style: none;
    }

    .edit form {
      display: flex;
      gap: 6px;
      margin-top: 6px;
    }

    .delete-btn {
      background: transparent;
      color: var(--danger);
      font-size: 1.2rem;
      padding: 0 6px;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Streak Watch</h1>
      <p class="subtitle">Reference date: <span id="date">{{DATE}}</span></p>
    </header>
    <form class="add-form" method="post" action="/users/add">
      <input name="handle" placeholder="solved.ac handle" required />
      <input name="alias" placeholder="Alias (optional)" />
      <input name="group" placeholder="Group (optional)" />
      <button type="submit">Add</button>
    </form>
    {{GROUPS}}
    <p class="hint">Days roll over at the solved.ac boundary, not at midnight.</p>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn view(handle: &str, alias: &str, status: &str, tone: &str) -> UserView {
        UserView {
            handle: handle.into(),
            alias: alias.into(),
            label: if alias.is_empty() {
                handle.into()
            } else {
                format!("{alias} ({handle})")
            },
            today_count: 0,
            reverse_streak: 1,
            last_solved_date: None,
            last_checked_date: None,
            status: status.into(),
            tone: tone.into(),
        }
    }

    #[test]
    fn escapes_user_text() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn renders_groups_and_badges() {
        let response = UsersResponse {
            date: "2024-06-01".into(),
            groups: vec![GroupView {
                name: "Study <1>".into(),
                users: vec![view("kim", "<K>", "at risk", "danger")],
            }],
        };
        let html = render_index(&response);
        assert!(html.contains("Reference date: <span id=\"date\">2024-06-01</span>"));
        assert!(html.contains("<h2>Study &lt;1&gt;</h2>"));
        assert!(html.contains("&lt;K&gt; (kim)"));
        assert!(html.contains(r#"<span class="badge badge-danger">at risk</span>"#));
        assert!(html.contains(r#"action="/users/kim/delete""#));
        assert!(!html.contains("{{GROUPS}}"));
    }

    #[test]
    fn empty_list_shows_hint() {
        let response = UsersResponse {
            date: "2024-06-01".into(),
            groups: Vec::new(),
        };
        assert!(render_index(&response).contains("No handles tracked yet"));
    }
}
