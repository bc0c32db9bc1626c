//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use treehub_core::types::human_size;
use treehub_entity::matter::{Matter, MatterDetail};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Matter display row
#[derive(Debug, Serialize, Tabled)]
pub struct MatterRow {
    /// Matter ID
    id: String,
    /// File or directory
    kind: &'static str,
    /// Name
    name: String,
    /// Path from the user's root
    path: String,
    /// Human-readable size
    size: String,
    /// Private flag
    private: bool,
    /// Last update
    updated_at: String,
}

impl From<&Matter> for MatterRow {
    fn from(m: &Matter) -> Self {
        Self {
            id: m.id.to_string(),
            kind: if m.is_directory { "dir" } else { "file" },
            name: m.name.clone(),
            path: if m.is_root() {
                "/".to_string()
            } else {
                m.relative_path.clone()
            },
            size: if m.is_directory {
                "-".to_string()
            } else {
                human_size(m.size)
            },
            private: m.privacy,
            updated_at: m.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print the outcome of a mutation.
pub fn print_matter(matter: &Matter, msg: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table => print_success(&format!("{} (id: {})", msg, matter.id)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(matter).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a matter with its ancestor chain.
pub fn print_detail(detail: &MatterDetail, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let m = &detail.matter;
            print_kv("ID", &m.id.to_string());
            print_kv("Name", &m.name);
            print_kv("Path", &m.relative_path);
            print_kv("Kind", if m.is_directory { "directory" } else { "file" });
            print_kv("Size", &human_size(m.size));
            print_kv("Private", &m.privacy.to_string());
            print_kv("Owner", &format!("{} ({})", m.owner_name, m.owner_id));
            print_kv("Content hash", m.content_hash.as_deref().unwrap_or("-"));
            print_kv("Created", &m.created_at.to_rfc3339());
            print_kv("Updated", &m.updated_at.to_rfc3339());

            let chain: Vec<&str> = detail.ancestors.iter().map(|a| a.name.as_str()).collect();
            print_kv("Ancestors", &format!("/{}", chain.join("/")));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(detail).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", key), value);
}
