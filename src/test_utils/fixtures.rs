//! Sample dashboard snapshots for tests.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// A dashboard snapshot file written into a test directory.
#[derive(Clone, Debug)]
pub struct SnapshotFixture {
    pub name: String,
    pub content: String,
}

impl SnapshotFixture {
    /// `region` (custom) → `host` (query, multi-select) → `service` (query)
    pub fn chained() -> Self {
        Self {
            name: "chained".to_string(),
            content: r#"
[[variables]]
name = "region"
type = "custom"
custom_values = "eu, us"

[[variables]]
name = "host"
type = "query"
query_template = "hosts({{.region}})"
sort_mode = "lexical"
multi_select = true

[[variables]]
name = "service"
type = "query"
query_template = "services({{.host}})"

[fixtures]
"hosts(eu)" = ["h2", "h1"]
"hosts(us)" = ["h3"]
"services(h1,h2)" = ["api", "web"]
"services(h3)" = ["db"]
"#
            .trim()
            .to_string(),
        }
    }

    /// A textbox filtering a query, with a syntax error for the empty filter.
    pub fn with_textbox() -> Self {
        Self {
            name: "with_textbox".to_string(),
            content: r#"
[[variables]]
name = "search"
type = "textbox"

[[variables]]
name = "results"
type = "query"
query_template = "results({{.search}})"

[fixtures]
"results()" = { error = "Syntax error: empty filter" }
"results(web)" = ["web-1", "web-2"]
"#
            .trim()
            .to_string(),
        }
    }

    /// Two queries referencing each other.
    pub fn cyclic() -> Self {
        Self {
            name: "cyclic".to_string(),
            content: r#"
[[variables]]
name = "a"
type = "query"
query_template = "{{.b}}"

[[variables]]
name = "b"
type = "query"
query_template = "{{.a}}"
"#
            .trim()
            .to_string(),
        }
    }

    /// Writes the snapshot as `<name>.toml` in `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.toml", self.name));
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}
