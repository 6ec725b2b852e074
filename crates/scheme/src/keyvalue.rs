//! Minimal INI-style key/value file: `[Section]` headers and `Key=Value` lines.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn get(&self, key: &str) -> Option<&str> {
        // Last duplicate wins
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sectioned key/value document.
///
/// Sections and keys keep their file order. Lines starting with `#` or `;`
/// are comments. Keys outside any section and lines without `=` are dropped.
///
/// Values are escaped on output: `\\`, `\n`, `\r` and `\t`, plus `\s` for a
/// space at either end of the value. Unknown escapes are read literally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyValueFile {
    sections: Vec<Section>,
}

impl KeyValueFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text. Never fails; unusable lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut file = Self::new();
        let mut current: Option<usize> = None;

        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(file.section_index_or_insert(name.trim()));
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                log::debug!("Ignoring line {} without '=': {}", line_no + 1, line);
                continue;
            };

            match current {
                Some(index) => file.sections[index]
                    .entries
                    .push((key.trim().to_string(), unescape_value(value.trim()))),
                None => log::debug!("Ignoring key outside of a section on line {}", line_no + 1),
            }
        }

        file
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|s| s.name == section)
    }

    /// Value of `key` in `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .filter(|s| s.name == section)
            .find_map(|s| s.get(key))
    }

    /// Set `key` in `section`, creating the section at the end if needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let index = self.section_index_or_insert(section);
        let entries = &mut self.sections[index].entries;
        let value = value.into();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key.to_string(), value)),
        }
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(index) = self.sections.iter().position(|s| s.name == name) {
            return index;
        }
        self.sections.push(Section {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.sections.len() - 1
    }
}

impl fmt::Display for KeyValueFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{}={}", key, escape_value(value))?;
            }
        }
        Ok(())
    }
}

fn escape_value(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            ' ' if i == 0 || i == last => escaped.push_str("\\s"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some('s') => unescaped.push(' '),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

/// Parse a boolean the way scheme files spell them.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
