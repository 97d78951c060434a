use regex::Captures;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Group(usize),
}

/// Message reconstruction template with `{N}` capture group placeholders.
///
/// The template is split once at load time. Anything between braces that
/// is not a plain group number (`{abc}`, `{}`, an unclosed `{`) is kept as
/// literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
    parts: Vec<TemplatePart>,
}

impl MessageTemplate {
    pub fn parse(template: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let group = after.find('}').and_then(|close| {
                let digits = &after[..close];
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    digits.parse::<usize>().ok().map(|n| (n, close))
                } else {
                    None
                }
            });

            match group {
                Some((n, close)) => {
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Group(n));
                    rest = &after[close + 1..];
                }
                None => {
                    literal.push('{');
                    rest = after;
                }
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Self {
            source: template.to_string(),
            parts,
        }
    }

    /// Substitute each placeholder with its group text, or nothing when the
    /// group did not take part in the match
    pub fn render(&self, captures: &Captures) -> String {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Group(n) => {
                    if let Some(m) = captures.get(*n) {
                        out.push_str(m.as_str());
                    }
                }
            }
        }
        out
    }

    /// Highest group number referenced
    pub fn max_group(&self) -> Option<usize> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                TemplatePart::Group(n) => Some(*n),
                TemplatePart::Literal(_) => None,
            })
            .max()
    }
}
