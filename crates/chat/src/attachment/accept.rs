/// File picker accept list, e.g. `image/*,video/*,audio/*`.
///
/// An empty filter accepts everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptFilter {
    patterns: Vec<String>,
}

impl AcceptFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().trim().to_ascii_lowercase())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        Self { patterns }
    }

    /// Parses the comma-separated form used by HTML file inputs.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        let mime_type = mime_type.trim().to_ascii_lowercase();
        self.patterns.iter().any(|pattern| {
            if pattern == "*/*" {
                return true;
            }
            match pattern.strip_suffix('*') {
                Some(prefix) => prefix.ends_with('/') && mime_type.starts_with(prefix),
                None => *pattern == mime_type,
            }
        })
    }
}

impl std::fmt::Display for AcceptFilter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.patterns.join(","))
    }
}
