//! An append-only document of styled text spans, flattened into html or plain text at the end.
//!
//! The document never tracks a "current style" while it is being built. Style transitions only
//! happen when it is flattened, by folding over the recorded spans.

/// The categories text can be styled with
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Style {
    Text,
    Keyword,
    Type,
    Bytecode,
    Primitive,
    Argument,
    Void,
    /// names of static members
    Static,
}

impl Style {
    /// The html that opens a span of this style
    pub fn start(self) -> &'static str {
        match self {
            Style::Text => "",
            Style::Keyword => r#"<font color="blue">"#,
            Style::Type => r#"<font color="green">"#,
            Style::Bytecode => r#"<font color="red">"#,
            Style::Primitive => r##"<font color="#20B2AA">"##,
            Style::Argument => r##"<font color="#E6B62C">"##,
            Style::Void => r##"<font color="#9733DD">"##,
            Style::Static => "<i>",
        }
    }

    /// The html that closes a span of this style
    pub fn end(self) -> &'static str {
        match self {
            Style::Text => "",
            Style::Static => "</i>",
            _ => "</font>",
        }
    }
}

/// What a finished document is flattened into
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Styled markup with line numbers, for an html view
    #[default]
    Html,
    /// Just the text, indented with spaces
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Span(Style, String),
    /// markup passed through untouched, dropped from plain output
    Raw(String),
    LineBreak,
    /// indentation levels
    Padding(usize),
}

/// A position in a document that it can be rolled back to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    tokens: usize,
    indent: usize,
    lines: usize,
}

/// Styled text being built up, one span at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledDocument {
    tokens: Vec<Token>,
    indent: usize,
    lines: usize,
}

impl StyledDocument {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends text in the given style
    pub fn add<S: Into<String>>(&mut self, style: Style, text: S) {
        self.tokens.push(Token::Span(style, text.into()));
    }

    pub fn text<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Text, text)
    }

    pub fn keyword<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Keyword, text)
    }

    pub fn type_name<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Type, text)
    }

    pub fn bytecode<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Bytecode, text)
    }

    pub fn primitive<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Primitive, text)
    }

    pub fn argument<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Argument, text)
    }

    pub fn void<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Void, text)
    }

    pub fn static_name<S: Into<String>>(&mut self, text: S) {
        self.add(Style::Static, text)
    }

    /// Appends markup that is neither escaped nor styled, and only appears in html output
    pub fn raw<S: Into<String>>(&mut self, html: S) {
        self.tokens.push(Token::Raw(html.into()));
    }

    /// Starts a new line, indented to the current level
    pub fn new_line(&mut self) {
        self.new_lines(1)
    }

    /// Ends `count` lines. Only the last of them is indented.
    pub fn new_lines(&mut self, count: usize) {
        self.tokens.extend(std::iter::repeat(Token::LineBreak).take(count));
        self.tokens.push(Token::Padding(self.indent));
        self.lines += count;
    }

    pub fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// The number of the line currently being written, starting at 0
    pub fn current_line(&self) -> usize {
        self.lines
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            tokens: self.tokens.len(),
            indent: self.indent,
            lines: self.lines,
        }
    }

    /// Discards everything appended since the checkpoint was taken
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.tokens.truncate(checkpoint.tokens);
        self.indent = checkpoint.indent;
        self.lines = checkpoint.lines;
    }

    /// Flattens the document
    pub fn finish(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Html => self.to_html(),
            OutputFormat::Plain => self.to_plain(),
        }
    }

    fn to_html(&self) -> String {
        let mut html = HtmlWriter::default();
        for token in &self.tokens {
            match token {
                Token::Span(style, text) => {
                    html.change_style(*style);
                    if !html.numbered {
                        html.line_number();
                    }
                    html.out.push_str(&escape(text));
                }
                Token::Raw(raw) => html.out.push_str(raw),
                Token::LineBreak => {
                    html.line += 1;
                    html.out.push_str("<br>\n");
                    html.line_number();
                }
                Token::Padding(indent) => html.out.push_str(&"&nbsp;".repeat(indent * 4)),
            }
        }
        html.out.push_str(html.style.end());
        html.out
    }

    /// Indentation is only written once something follows it on the line
    fn to_plain(&self) -> String {
        let mut plain = String::new();
        let mut pending = 0;
        for token in &self.tokens {
            match token {
                Token::Span(_, text) => {
                    plain.push_str(&" ".repeat(pending * 4));
                    pending = 0;
                    plain.push_str(text);
                }
                Token::Raw(_) => {}
                Token::LineBreak => {
                    pending = 0;
                    plain.push('\n');
                }
                Token::Padding(indent) => pending += indent,
            }
        }
        plain
    }
}

struct HtmlWriter {
    out: String,
    style: Style,
    line: usize,
    numbered: bool,
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self {
            out: String::new(),
            style: Style::Text,
            line: 0,
            numbered: false,
        }
    }
}

impl HtmlWriter {
    fn change_style(&mut self, style: Style) {
        if self.style != style {
            self.out.push_str(self.style.end());
            self.out.push_str(style.start());
            self.style = style;
        }
    }

    /// Line numbers are always plain text, whatever style surrounds them
    fn line_number(&mut self) {
        self.numbered = true;
        let previous = self.style;
        self.change_style(Style::Text);
        let number = format!("{:<4}| ", self.line);
        self.out.push_str(&number.replace(' ', "&nbsp;"));
        self.change_style(previous);
    }
}

fn escape(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('<', "&#60;")
        .replace('>', "&#62;")
}

static_assertions::assert_impl_all!(StyledDocument: Send, Sync, Clone);
