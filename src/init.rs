//! Site scaffolding.
//!
//! Creates a new site skeleton: a specification file, a starter theme with
//! one layout, and a sample page.

use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Default specification filename
const SPEC_FILE: &str = "sitewright.json";

/// Default site directory structure
const SITE_DIRS: &[&str] = &[
    "content",
    "data",
    "themes/default/layouts",
    "themes/default/partials",
];

const DEFAULT_SPEC: &str = r#"{
  "name": "New Site",
  "baseUrl": "https://example.com",
  "collections": [
    { "name": "pages", "input": "*.md", "output": "/", "required": false }
  ],
  "nav": {
    "items": [
      { "title": "Home", "url": "/" }
    ]
  }
}
"#;

// The token value contains `"#`, which would close an r#""# literal.
const DEFAULT_MANIFEST: &str = r##"{
  "schemaVersion": 1,
  "name": "default",
  "engine": "tera",
  "defaultLayout": "page",
  "tokens": {
    "color": { "accent": "#0a7bbd" }
  }
}
"##;

const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ page.title }} | {{ site.name }}</title>
  <meta name="description" content="{{ page.title }}">
</head>
<body>
  <nav>
    {% for item in nav.items %}<a href="{{ item.url }}">{{ item.title }}</a>{% endfor %}
  </nav>
  <main>
    {{ content | safe }}
  </main>
</body>
</html>
"#;

const SAMPLE_PAGE: &str = r#"---
title: Home
---

# Welcome

Your site is ready. Edit `content/index.md` to get started.
"#;

/// Create a new site skeleton under `root`.
///
/// Without an explicit name the current directory is used and must be
/// completely empty.
pub fn scaffold(root: &Path, has_name: bool) -> Result<()> {
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `sitewright scaffold <NAME>` to create a subdirectory."
        );
    }
    if root.join(SPEC_FILE).exists() {
        bail!("`{SPEC_FILE}` already exists. Remove it or scaffold in a different path.");
    }

    for dir in SITE_DIRS {
        let path = root.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }

    fs::write(root.join(SPEC_FILE), DEFAULT_SPEC)?;
    fs::write(root.join("themes/default/theme.json"), DEFAULT_MANIFEST)?;
    fs::write(root.join("themes/default/layouts/page.html"), DEFAULT_LAYOUT)?;
    fs::write(root.join("content/index.md"), SAMPLE_PAGE)?;

    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}
