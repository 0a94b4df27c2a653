use super::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub source_name: String,
    pub title: String,
    pub link: String,
}

impl Notification {
    pub fn from_entry(source_name: &str, entry: &Entry) -> Self {
        Self {
            source_name: source_name.to_string(),
            title: entry.title.clone(),
            link: entry.link.clone(),
        }
    }

    /// Format: "🔹 <b>{title}</b>\n{link}" with HTML-escaped fields
    pub fn format(&self) -> String {
        format!(
            "🔹 <b>{}</b>\n{}",
            escape_html(&self.title),
            escape_html(&self.link)
        )
    }

    /// Same as `format`, with the title cut to at most `max_chars` characters
    pub fn format_truncated(&self, max_chars: usize) -> String {
        let total = self.title.chars().count();
        if total <= max_chars {
            return self.format();
        }

        let mut title: String = self.title.chars().take(max_chars).collect();
        if max_chars > 0 {
            title.push('…');
        }

        Self {
            title,
            ..self.clone()
        }
        .format()
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
