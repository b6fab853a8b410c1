//! One output record: space-joined tokens plus an optional trailing comment.

/// A single line of G-code under construction.
///
/// Tokens are appended in call order; [`finish`](Line::finish) consumes the
/// line and returns its final text, so a line can only be finished once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    body: String,
    comment: Option<String>,
}

impl Line {
    /// Starts a line with `command` as its first token. The comment is
    /// trimmed; an empty comment is treated as no comment.
    pub fn new(command: &str, comment: Option<&str>) -> Self {
        Line {
            body: command.to_string(),
            comment: comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    /// A line with no command, only a comment.
    pub fn comment(text: &str) -> Self {
        Line::new("", Some(text))
    }

    /// An empty line.
    pub fn blank() -> Self {
        Line::default()
    }

    /// Appends `token`, separated from the existing body by one space.
    pub fn append(&mut self, token: &str) {
        if !self.body.is_empty() {
            self.body.push(' ');
        }
        self.body.push_str(token);
    }

    /// Appends a parameter word such as `X1.0000`.
    pub fn append_word(&mut self, letter: char, value: &str) {
        if !self.body.is_empty() {
            self.body.push(' ');
        }
        self.body.push(letter);
        self.body.push_str(value);
    }

    /// Body text without comment or line ending.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Final text: `"<body> ; <comment> \n"`, `"; <comment> \n"`,
    /// `"<body> \n"`, or `"\n"` for an empty line.
    pub fn finish(self) -> String {
        let Line { mut body, comment } = self;
        match comment {
            Some(text) => {
                if body.is_empty() {
                    body.push_str("; ");
                } else {
                    body.push_str(" ; ");
                }
                body.push_str(&text);
                body.push_str(" \n");
            }
            None if body.is_empty() => body.push('\n'),
            None => body.push_str(" \n"),
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_with_one_word() {
        let mut line = Line::new("G1", None);
        line.append("X1.0000");
        assert_eq!(line.finish(), "G1 X1.0000 \n");
    }

    #[test]
    fn comment_only_line() {
        assert_eq!(Line::comment("hi").finish(), "; hi \n");
    }

    #[test]
    fn command_with_comment() {
        let mut line = Line::new("G28", Some("Going to home position"));
        line.append_word('Z', "0.0000");
        assert_eq!(line.finish(), "G28 Z0.0000 ; Going to home position \n");
    }

    #[test]
    fn blank_line_is_bare_newline() {
        assert_eq!(Line::blank().finish(), "\n");
    }

    #[test]
    fn empty_comment_is_ignored() {
        assert_eq!(Line::new("G90", Some("")).finish(), "G90 \n");
    }

    #[test]
    fn comment_text_is_trimmed() {
        assert_eq!(Line::comment("  indented\t").finish(), "; indented \n");
        assert_eq!(Line::new("G90", Some("   ")).finish(), "G90 \n");
    }

    #[test]
    fn append_to_empty_body_has_no_leading_space() {
        let mut line = Line::new("", None);
        line.append_word('X', "1.0000");
        line.append_word('Y', "2.0000");
        assert_eq!(line.body(), "X1.0000 Y2.0000");
    }
}
