//! Output formatting utilities

use amity_core::{FriendableRef, Friendship, PaginationInfo};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

pub fn to_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Left-aligned text columns
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.len());
                }
            }
        }

        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(self.headers.clone())];
        for row in &self.rows {
            out.push(line(row.iter().map(String::as_str).collect()));
        }
        out.join("\n")
    }
}

pub fn friendships_table(friendships: &[Friendship]) -> String {
    let mut table = Table::new(vec!["ID", "SENDER", "RECIPIENT", "STATUS", "UPDATED"]);
    for f in friendships {
        table.row(vec![
            f.id.to_string(),
            f.sender.to_string(),
            f.recipient.to_string(),
            f.status.to_string(),
            f.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table.render()
}

pub fn refs_list(refs: &[FriendableRef]) -> String {
    refs.iter()
        .map(|r| format!("  {}", r))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn page_footer(info: &PaginationInfo) -> Option<String> {
    if info.total_pages <= 1 {
        return None;
    }
    Some(format!(
        "Page {} of {} ({} total)",
        info.current_page + 1,
        info.total_pages,
        info.total_count
    ))
}
