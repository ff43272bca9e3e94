use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Token replaced by the card's target URI.
pub const PLACEHOLDER: &str = "SPOTIFY_TRACK_URI";

const BUILTIN_STUB: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Now playing</title>
<style>
  body { font-family: Helvetica, Arial, sans-serif; text-align: center; margin-top: 30vh; }
  a { font-size: 1.4rem; }
</style>
</head>
<body>
<p>Opening the track&hellip;</p>
<p><a id="open" href="SPOTIFY_TRACK_URI">Tap here if nothing happens</a></p>
<script>
  window.location.replace("SPOTIFY_TRACK_URI");
</script>
</body>
</html>
"#;

/// HTML page each code points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubTemplate {
    pub name: String,
    body: String,
}

impl StubTemplate {
    /// Embedded redirect page.
    pub fn builtin() -> Self {
        Self {
            name: "builtin".to_string(),
            body: BUILTIN_STUB.to_string(),
        }
    }

    /// Read a template file. A template without the placeholder is accepted
    /// but every card renders the same page.
    pub fn load(path: &Path) -> Result<Self> {
        let body = fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?;
        let template = Self {
            name: path.display().to_string(),
            body,
        };
        if !template.has_placeholder() {
            warn!(template = %template.name, placeholder = PLACEHOLDER, "template has no placeholder");
        }
        Ok(template)
    }

    /// Use the file at `path` if given, otherwise the built-in page.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn has_placeholder(&self) -> bool {
        self.body.contains(PLACEHOLDER)
    }

    /// Substitute every occurrence of the placeholder with `uri`.
    pub fn render(&self, uri: &str) -> String {
        self.body.replace(PLACEHOLDER, uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn builtin_substitutes_every_occurrence() {
        let html = StubTemplate::builtin().render("spotify:track:3KkXRkHbMCARz0aVfEt68P");
        assert!(!html.contains(PLACEHOLDER));
        assert_eq!(html.matches("spotify:track:3KkXRkHbMCARz0aVfEt68P").count(), 2);
    }

    #[test]
    fn file_template_without_placeholder_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("card.html");
        fs::write(&path, "<p>static</p>").unwrap();
        let template = StubTemplate::resolve(Some(&path)).unwrap();
        assert!(!template.has_placeholder());
        assert_eq!(template.render("spotify:track:x"), "<p>static</p>");
    }

    #[test]
    fn missing_template_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(StubTemplate::load(&dir.path().join("nope.html")).is_err());
    }
}
