//! Sample data for the `--demo` server and for tests.
//!
//! Every cell kind the formatter knows appears at least once.

use rowlens_core::{CellValue, ColumnInfo};

use crate::memory::MemorySource;
use crate::source::Row;

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn options() -> (Vec<ColumnInfo>, Vec<Row>) {
    let columns = vec![
        ColumnInfo::new("option_id", "bigint"),
        ColumnInfo::new("option_name", "character varying"),
        ColumnInfo::new("option_value", "text"),
        ColumnInfo::new("autoload", "character varying"),
    ];

    let fixed: Vec<(&str, CellValue)> = vec![
        ("siteurl", text("https://example.test")),
        ("blogname", text("Example <Blog>")),
        ("blogdescription", text("")),
        (
            "active_plugins",
            text(r#"a:3:{i:0;s:19:"akismet/akismet.php";i:1;s:9:"hello.php";i:2;s:26:"rowlens/rowlens-viewer.php";}"#),
        ),
        (
            "widget_settings",
            text(r#"O:8:"stdClass":2:{s:5:"title";s:6:"Recent";s:5:"count";i:5;}"#),
        ),
        (
            "theme_mods",
            text(r##"{"header_color":"#ffffff","sidebar":true,"menus":{"primary":3},"logo":null}"##),
        ),
        ("recent_ids", text("[4, 8, 15, 16, 23, 42]")),
        ("site_notice", text(LOREM)),
        ("db_version", text("i:57155;")),
        ("cron_lock", CellValue::Null),
        ("raw_blob", CellValue::Bytes(vec![0x89, 0x50, 0x4e, 0x47, 0x00, 0xff, 0x10])),
    ];

    let mut rows: Vec<Row> = fixed
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| {
            vec![
                text(&(i + 1).to_string()),
                text(name),
                value,
                text(if i % 2 == 0 { "yes" } else { "no" }),
            ]
        })
        .collect();

    let start = rows.len();
    for i in start..start + 34 {
        rows.push(vec![
            text(&(i + 1).to_string()),
            text(&format!("transient_{:03}", i)),
            text(&format!("value {}", i * 7)),
            text("no"),
        ]);
    }
    (columns, rows)
}

fn users() -> (Vec<ColumnInfo>, Vec<Row>) {
    let columns = vec![
        ColumnInfo::new("ID", "bigint"),
        ColumnInfo::new("user_login", "character varying"),
        ColumnInfo::new("user_email", "character varying"),
        ColumnInfo::new("display_name", "character varying"),
    ];
    let rows = [
        ("1", "admin", "admin@example.test", "Site Admin"),
        ("2", "editor", "editor@example.test", "Eddie Editor"),
        ("3", "author", "author@example.test", "Ann Author"),
    ]
    .iter()
    .map(|(id, login, email, name)| vec![text(id), text(login), text(email), text(name)])
    .collect();
    (columns, rows)
}

fn posts() -> (Vec<ColumnInfo>, Vec<Row>) {
    let columns = vec![
        ColumnInfo::new("ID", "bigint"),
        ColumnInfo::new("post_title", "text"),
        ColumnInfo::new("post_content", "text"),
        ColumnInfo::new("post_status", "character varying"),
    ];
    let rows = (1..=12)
        .map(|i| {
            vec![
                text(&i.to_string()),
                text(&format!("Post number {i}")),
                text(&format!("<p>{LOREM}</p>")),
                text(if i % 3 == 0 { "draft" } else { "publish" }),
            ]
        })
        .collect();
    (columns, rows)
}

/// A source with `<prefix>options`, `<prefix>posts`, `<prefix>users` and an
/// empty `<prefix>comments` table.
pub fn sample_source(prefix: &str) -> MemorySource {
    let (option_cols, option_rows) = options();
    let (user_cols, user_rows) = users();
    let (post_cols, post_rows) = posts();
    MemorySource::new()
        .with_table(format!("{prefix}options"), option_cols, option_rows)
        .with_table(format!("{prefix}users"), user_cols, user_rows)
        .with_table(format!("{prefix}posts"), post_cols, post_rows)
        .with_table(
            format!("{prefix}comments"),
            vec![
                ColumnInfo::new("comment_ID", "bigint"),
                ColumnInfo::new("comment_content", "text"),
            ],
            Vec::new(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TableSource;

    #[tokio::test]
    async fn sample_has_all_tables() {
        let source = sample_source("wp_");
        let tables = source.list_tables().await.unwrap();
        assert_eq!(tables, vec!["wp_comments", "wp_options", "wp_posts", "wp_users"]);
    }

    #[test]
    fn options_has_enough_rows_to_paginate() {
        let (_, rows) = options();
        assert_eq!(rows.len(), 45);
    }
}
