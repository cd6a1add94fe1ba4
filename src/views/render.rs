use serde::Serialize;
use serde_json::json;

use crate::AppState;

pub fn render_page(state: &AppState, tpl: &str, ctx: &impl Serialize) -> Result<String, String> {
    state.hbs.render(tpl, ctx).map_err(|e| e.to_string())
}

pub fn render_full(
    state: &AppState,
    title: &str,
    body_html: String,
    notice: Option<&str>,
) -> Result<String, String> {
    let ctx = json!({
        "title": title,
        "body": body_html,
        "notice": notice,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

/// Renders `tpl` into the base layout.
pub fn render_in_layout(
    state: &AppState,
    title: &str,
    tpl: &str,
    ctx: &impl Serialize,
    notice: Option<&str>,
) -> Result<String, String> {
    let body = render_page(state, tpl, ctx)?;
    render_full(state, title, body, notice)
}
