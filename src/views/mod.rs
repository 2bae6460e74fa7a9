use std::fmt::Write;

use serde::Deserialize;

use crate::services::DataResult;

pub mod categories;
pub mod products;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Notices(Vec<Notice>);

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        self.0.push(notice);
    }

    /// Unwraps a read, or records its error and falls back to an empty value.
    pub fn recover<T: Default>(&mut self, result: DataResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.push(Notice::new(Level::Error, err.to_string()));
                T::default()
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: Notices) {
        self.0.extend(other.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Products,
    Categories,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
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

const STYLE: &str = "body{font-family:sans-serif;max-width:1100px;margin:2rem auto;padding:0 1rem}\
nav a{margin-right:1rem;padding:.4rem .8rem;text-decoration:none;border-bottom:2px solid transparent}\
nav a.active{border-color:#333;font-weight:bold}\
table{border-collapse:collapse;width:100%}th,td{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}\
.notice{padding:.6rem;margin:.5rem 0;border-radius:4px}\
.success{background:#e6f4ea}.info{background:#e8f0fe}.warning{background:#fef7e0}.error{background:#fce8e6}\
.metrics{display:flex;gap:2rem;margin:1rem 0}.metric strong{display:block;font-size:1.4rem}\
form.inline{display:inline}fieldset{margin:1rem 0}";

pub(crate) fn layout(tab: Tab, notices: &Notices, body: &str) -> String {
    let mut html = String::new();
    let (products_class, categories_class) = match tab {
        Tab::Products => ("active", ""),
        Tab::Categories => ("", "active"),
    };
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Inventory</title><style>{STYLE}</style></head><body>\
         <h1>Inventory</h1>\
         <nav><a class=\"{products_class}\" href=\"/products\">Products</a>\
         <a class=\"{categories_class}\" href=\"/categories\">Categories</a></nav>"
    );
    for notice in notices.iter() {
        let _ = write!(
            html,
            "<div class=\"notice {}\" role=\"status\">{}</div>",
            notice.level.as_str(),
            escape(&notice.text)
        );
    }
    html.push_str(body);
    html.push_str("</body></html>");
    html
}
