//! Escaping of characters that aren't allowed in file names on common platforms.

/// The reserved characters and their percent notations.
pub const RESERVED_CHARS: [(char, &str); 9] = [
    ('\\', "%5C"),
    ('/', "%2F"),
    ('<', "%3C"),
    ('>', "%3E"),
    (':', "%3A"),
    ('*', "%2A"),
    ('?', "%3F"),
    ('"', "%22"),
    ('|', "%7C"),
];

/// How reserved characters in an output file name are replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapePolicy {
    /// Removes them.
    Remove,
    /// Replaces each with a space.
    Space,
    /// Replaces each with its percent notation, e.g. `?` becomes `%3F`.
    Notation,
}

impl EscapePolicy {
    /// Escapes every reserved character in `name`.
    pub fn escape_file_name(self, name: &str) -> String {
        let mut escaped = String::with_capacity(name.len());
        for c in name.chars() {
            match RESERVED_CHARS.iter().find(|(reserved, _)| *reserved == c) {
                Some((_, notation)) => match self {
                    EscapePolicy::Remove => {}
                    EscapePolicy::Space => escaped.push(' '),
                    EscapePolicy::Notation => escaped.push_str(notation),
                },
                None => escaped.push(c),
            }
        }
        escaped
    }

    /// Escapes the final component of `path`, leaving its directory untouched.
    pub fn escape_path(self, path: &str) -> String {
        let (dir, name) = match path.rfind(std::path::is_separator) {
            Some(i) => path.split_at(i + 1),
            None => ("", path),
        };
        let mut escaped = String::with_capacity(path.len());
        escaped.push_str(dir);
        escaped.push_str(&self.escape_file_name(name));
        escaped
    }
}
