//! Where `print` and echoed expressions go.
//!
//! - Stdout: the CLI
//! - Buffer: tests and embedders that want the printed lines back

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    Buffer(Vec<String>),
}

impl Output {
    pub fn buffer() -> Self {
        Output::Buffer(Vec::new())
    }

    /// Print a line (with newline).
    pub fn println(&mut self, line: &str) {
        match self {
            Output::Stdout => println!("{line}"),
            Output::Buffer(lines) => lines.push(line.to_string()),
        }
    }

    /// Captured lines so far; always empty for stdout.
    pub fn lines(&self) -> &[String] {
        match self {
            Output::Stdout => &[],
            Output::Buffer(lines) => lines,
        }
    }

    /// Drains the captured lines.
    pub fn take(&mut self) -> Vec<String> {
        match self {
            Output::Stdout => Vec::new(),
            Output::Buffer(lines) => std::mem::take(lines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_collects_lines_in_order() {
        let mut out = Output::buffer();
        out.println("one");
        out.println("two");
        assert_eq!(out.lines(), ["one", "two"]);
        assert_eq!(out.take(), vec!["one".to_string(), "two".to_string()]);
        assert!(out.lines().is_empty());
    }

    #[test]
    fn stdout_captures_nothing() {
        let out = Output::Stdout;
        assert!(out.lines().is_empty());
    }
}
