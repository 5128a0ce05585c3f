//! Expansion of `[rowlens_table]` embeds.
//!
//! An embed is `[rowlens_table]` or `[rowlens_table table='NAME']`; double
//! quotes and bare values are accepted too. Without a table the configured
//! default table is shown. Each embed naming a usable table becomes a viewer
//! container; any other embed becomes an inline error block.
//!
//! At most [`MAX_EMBEDS`] embeds are expanded per piece of content, and each
//! distinct table name is looked up once.

use regex::Regex;
use rowlens_core::TableName;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::nonce::ACTION_TABLE_DATA;
use crate::render;
use crate::state::AppState;

static EMBED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"\[rowlens_table(?:\s+table\s*=\s*(?:'([^']*)'|"([^"]*)"|([^\s\]'"]+)))?\s*\]"#,
    )
    .ok()
});

/// Embeds expanded per piece of content. Later ones become error blocks.
pub const MAX_EMBEDS: usize = 20;

/// The embed that shows `table`.
pub fn snippet(table: &str) -> String {
    format!("[rowlens_table table='{}']", table)
}

/// Result of expanding embeds in a piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub html: String,
    /// Tables that were embedded, in order of appearance.
    pub tables: Vec<String>,
}

/// Table named by each embed in `content`, with its byte range.
fn find_embeds(content: &str, default_table: &str) -> Vec<(std::ops::Range<usize>, String)> {
    let Some(re) = EMBED.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let table = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| default_table.to_string());
            Some((whole.range(), table))
        })
        .collect()
}

/// Replace every embed in `content`. Text around the embeds is kept verbatim.
///
/// `user` binds the anti-forgery token handed to each viewer.
pub async fn expand(state: &AppState, content: &str, user: &str) -> Expansion {
    let viewer = state.viewer();
    let embeds = find_embeds(content, viewer.default_table());
    if embeds.is_empty() {
        return Expansion {
            html: content.to_string(),
            tables: Vec::new(),
        };
    }

    if embeds.len() > MAX_EMBEDS {
        tracing::warn!(
            embeds = embeds.len(),
            limit = MAX_EMBEDS,
            "Too many embeds; expanding only the first ones"
        );
    }

    let nonce = state.nonces().create(ACTION_TABLE_DATA, user);
    let per_page = state.config().viewer.per_page;

    let mut resolved: HashMap<String, Option<TableName>> = HashMap::new();
    let mut html = String::with_capacity(content.len());
    let mut tables = Vec::new();
    let mut cursor = 0;
    for (index, (range, table)) in embeds.into_iter().enumerate() {
        html.push_str(&content[cursor..range.start]);
        cursor = range.end;

        if index >= MAX_EMBEDS {
            html.push_str(&render::table_error());
            continue;
        }

        let name = match resolved.get(&table).cloned() {
            Some(name) => name,
            None => {
                let name = viewer
                    .resolve_table(&table)
                    .await
                    .inspect_err(|e| {
                        tracing::debug!(table = %table, error = %e, "Embed names an unusable table")
                    })
                    .ok();
                resolved.insert(table, name.clone());
                name
            }
        };

        match name {
            Some(name) => {
                let id = format!("rowlens_table_{}", uuid::Uuid::new_v4().simple());
                html.push_str(&render::container(&id, name.as_str(), &nonce, per_page));
                tables.push(name.as_str().to_string());
            }
            None => html.push_str(&render::table_error()),
        }
    }
    html.push_str(&content[cursor..]);

    Expansion { html, tables }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonce::NonceIssuer;
    use crate::state::{AppState, test_state};
    use pretty_assertions::assert_eq;
    use rowlens_core::RowlensConfig;
    use rowlens_runtime::demo::sample_source;
    use rowlens_runtime::{MemorySource, TableViewer};
    use std::sync::Arc;

    fn counting_state() -> (AppState, Arc<MemorySource>) {
        let config = RowlensConfig::default();
        let source = Arc::new(sample_source("wp_"));
        let viewer = TableViewer::new(source.clone(), &config).unwrap();
        let state = AppState::with_nonces(
            config,
            Arc::new(viewer),
            NonceIssuer::new(b"test-secret".to_vec(), 86_400),
        );
        (state, source)
    }

    fn tables_in(content: &str) -> Vec<String> {
        find_embeds(content, "wp_options")
            .into_iter()
            .map(|(_, t)| t)
            .collect()
    }

    #[test]
    fn embed_forms() {
        assert_eq!(tables_in("[rowlens_table]"), vec!["wp_options"]);
        assert_eq!(tables_in("[rowlens_table table='wp_posts']"), vec!["wp_posts"]);
        assert_eq!(tables_in(r#"[rowlens_table table="wp_users"]"#), vec!["wp_users"]);
        assert_eq!(tables_in("[rowlens_table table=wp_posts ]"), vec!["wp_posts"]);
        assert_eq!(
            tables_in("a [rowlens_table] b [rowlens_table table='wp_users'] c"),
            vec!["wp_options", "wp_users"]
        );
        assert!(tables_in("[rowlens_tables] [other]").is_empty());
    }

    #[test]
    fn snippet_round_trips() {
        assert_eq!(tables_in(&snippet("wp_posts")), vec!["wp_posts"]);
    }

    #[tokio::test]
    async fn expands_known_tables_and_flags_unknown_ones() {
        let state = test_state();
        let out = expand(
            &state,
            "<p>Intro</p>[rowlens_table table='wp_posts']<p>Mid</p>[rowlens_table table='wp_missing']",
            "",
        )
        .await;

        assert_eq!(out.tables, vec!["wp_posts"]);
        assert!(out.html.starts_with("<p>Intro</p><div class=\"rowlens-table-container\""));
        assert!(out.html.contains(r#"data-table="wp_posts""#));
        assert!(out.html.contains("<p>Mid</p>"));
        assert!(out.html.contains(r#"data-testid="rowlens-table-error""#));
    }

    #[tokio::test]
    async fn foreign_prefix_is_an_error() {
        let state = test_state();
        let out = expand(&state, "[rowlens_table table='pg_authid']", "").await;
        assert!(out.tables.is_empty());
        assert!(out.html.contains(render::TABLE_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn repeated_tables_are_looked_up_once() {
        let (state, source) = counting_state();
        let content = "[rowlens_table table='wp_posts']".repeat(5) + "[rowlens_table table='wp_nope']";
        let out = expand(&state, &content, "").await;
        assert_eq!(out.tables, vec!["wp_posts"; 5]);
        assert_eq!(source.exists_lookups(), 2);
    }

    #[tokio::test]
    async fn embeds_past_the_limit_are_not_looked_up() {
        let (state, source) = counting_state();
        let content: String = (0..MAX_EMBEDS + 5)
            .map(|i| format!("[rowlens_table table='wp_t{i}']"))
            .collect();
        let out = expand(&state, &content, "").await;
        assert!(out.tables.is_empty());
        assert_eq!(source.exists_lookups(), MAX_EMBEDS);
        assert_eq!(
            out.html.matches(render::TABLE_ERROR_MESSAGE).count(),
            MAX_EMBEDS + 5
        );
    }

    #[tokio::test]
    async fn content_without_embeds_is_untouched() {
        let state = test_state();
        let out = expand(&state, "<b>plain</b>", "").await;
        assert_eq!(out.html, "<b>plain</b>");
    }
}
