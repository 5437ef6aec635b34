//! Code writer with automatic indentation tracking for GDScript output.
//!
//! GDScript is indentation-structured: a block is a `header:` line
//! followed by an indented suite, and the Godot style guide indents with
//! tabs. This writer tracks the current suite depth and prefixes every
//! line accordingly.
//!
//! - **RAII-based indentation**: `indent()` returns a guard that holds
//!   the level while alive
//! - **No borrow checker fights**: the level lives in an `Rc<Cell<usize>>`
//!   so guards don't conflict with mutable writes
//! - **Suite helper**: `suite("func f() -> void", |w| ...)` writes the
//!   header, the colon, and the indented body
//! - **Format macros**: `cw_write!` and `cw_writeln!` for formatted output
//!
//! # Example
//!
//! ```
//! use gdconnect_codegen::code_writer::CodeWriter;
//!
//! let mut output = String::new();
//! let mut w = CodeWriter::new(&mut output);
//!
//! w.suite("func greet(name: String) -> void", |w| {
//!     w.writeln("print(name)")
//! }).unwrap();
//! assert_eq!(output, "func greet(name: String) -> void:\n\tprint(name)\n");
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A code writer that tracks indentation for an indentation-structured
/// language.
pub struct CodeWriter<W> {
    writer: W,
    indent_level: Rc<Cell<usize>>,
    indent_string: String,
    at_line_start: Cell<bool>,
}

impl<W: fmt::Write> CodeWriter<W> {
    /// Create a writer with tab indentation (the Godot convention).
    pub fn new(writer: W) -> Self {
        Self::with_indent_string(writer, "\t".to_string())
    }

    /// Create a writer with an explicit indent string.
    pub fn with_indent_string(writer: W, indent_string: String) -> Self {
        Self {
            writer,
            indent_level: Rc::new(Cell::new(0)),
            indent_string,
            at_line_start: Cell::new(true),
        }
    }

    /// Write text without a newline. Adds indentation if at line start.
    pub fn write(&mut self, text: &str) -> fmt::Result {
        if text.is_empty() {
            return Ok(());
        }

        if self.at_line_start.get() && !text.trim().is_empty() {
            for _ in 0..self.indent_level.get() {
                self.writer.write_str(&self.indent_string)?;
            }
            self.at_line_start.set(false);
        }

        self.writer.write_str(text)
    }

    /// Write text followed by a newline.
    pub fn writeln(&mut self, text: &str) -> fmt::Result {
        self.write(text)?;
        self.writer.write_char('\n')?;
        self.at_line_start.set(true);
        Ok(())
    }

    /// Write an empty line.
    pub fn blank_line(&mut self) -> fmt::Result {
        self.writer.write_char('\n')?;
        self.at_line_start.set(true);
        Ok(())
    }

    /// Write a `#` comment line.
    pub fn comment(&mut self, text: &str) -> fmt::Result {
        if text.is_empty() {
            self.writeln("#")
        } else {
            self.writeln(&format!("# {text}"))
        }
    }

    /// Create an indentation guard. Indentation increases while the guard
    /// is alive.
    pub fn indent(&mut self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// Write a suite: `header:` followed by the indented body.
    pub fn suite<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.writeln(&format!("{header}:"))?;
        let _indent = self.indent();
        body(self)
    }

    /// Write items separated by a delimiter (e.g. a parameter list).
    pub fn write_separated<I, F>(
        &mut self,
        items: I,
        separator: &str,
        mut write_item: F,
    ) -> fmt::Result
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item) -> fmt::Result,
    {
        let mut first = true;
        for item in items {
            if !first {
                self.write(separator)?;
            }
            write_item(self, item)?;
            first = false;
        }
        Ok(())
    }

    /// Get the current indentation level.
    pub fn indent_level(&self) -> usize {
        self.indent_level.get()
    }

    /// Consume the writer and return the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write formatted text (like the `write!` macro).
    ///
    /// Use `cw_write!` instead of calling this directly.
    #[doc(hidden)]
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        let formatted = format!("{args}");
        self.write(&formatted)
    }

    /// Write formatted text with a newline (like the `writeln!` macro).
    ///
    /// Use `cw_writeln!` instead of calling this directly.
    #[doc(hidden)]
    pub fn writeln_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        let formatted = format!("{args}");
        self.writeln(&formatted)
    }
}

/// RAII guard that maintains indentation level.
pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        let current = self.indent_level.get();
        self.indent_level.set(current.saturating_sub(1));
    }
}

/// Write formatted text to a [`CodeWriter`].
#[macro_export]
macro_rules! cw_write {
    ($writer:expr, $($arg:tt)*) => {
        $writer.write_fmt(format_args!($($arg)*))
    };
}

/// Write formatted text with a newline to a [`CodeWriter`].
#[macro_export]
macro_rules! cw_writeln {
    ($writer:expr, $($arg:tt)*) => {
        $writer.writeln_fmt(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_writing() {
        let mut output = String::new();
        let mut w = CodeWriter::new(&mut output);

        w.writeln("extends Node").unwrap();
        w.writeln("var base_url = \"\"").unwrap();

        assert_eq!(output, "extends Node\nvar base_url = \"\"\n");
    }

    #[test]
    fn indentation_uses_tabs() {
        let mut output = String::new();
        let mut w = CodeWriter::new(&mut output);

        w.writeln("func a() -> void:").unwrap();
        {
            let _indent = w.indent();
            w.writeln("pass").unwrap();
            {
                let _indent = w.indent();
                w.writeln("pass").unwrap();
            }
            w.writeln("pass").unwrap();
        }
        w.writeln("func b() -> void:").unwrap();

        assert_eq!(
            output,
            "func a() -> void:\n\tpass\n\t\tpass\n\tpass\nfunc b() -> void:\n"
        );
    }

    #[test]
    fn suite_helper_nests() {
        let mut output = String::new();
        let mut w = CodeWriter::new(&mut output);

        w.suite("func f(x: int) -> void", |w| {
            w.suite("if x != 0", |w| w.writeln("print(x)"))?;
            w.writeln("return")
        })
        .unwrap();

        assert_eq!(
            output,
            "func f(x: int) -> void:\n\tif x != 0:\n\t\tprint(x)\n\treturn\n"
        );
    }

    #[test]
    fn comments() {
        let mut output = String::new();
        let mut w = CodeWriter::new(&mut output);

        w.comment("Generated file").unwrap();
        w.comment("").unwrap();

        assert_eq!(output, "# Generated file\n#\n");
    }

    #[test]
    fn blank_lines_carry_no_indent() {
        let mut output = String::new();
        let mut w = CodeWriter::new(&mut output);

        w.suite("func f() -> void", |w| {
            w.writeln("pass")?;
            w.blank_line()?;
            w.writeln("pass")
        })
        .unwrap();

        assert_eq!(output, "func f() -> void:\n\tpass\n\n\tpass\n");
    }

    #[test]
    fn write_separated_builds_parameter_lists() {
        let mut output = String::new();
        let mut w = CodeWriter::new(&mut output);

        w.write("func f(").unwrap();
        w.write_separated(["a: int", "b: String"], ", ", |w, item| w.write(item))
            .unwrap();
        w.write(")").unwrap();

        assert_eq!(output, "func f(a: int, b: String)");
    }

    #[test]
    fn format_macros() {
        let mut output = String::new();
        let mut w = CodeWriter::new(&mut output);

        cw_writeln!(w, "var {} = {}", "count", 3).unwrap();
        cw_write!(w, "var name").unwrap();
        cw_writeln!(w, " = \"{}\"", "gd").unwrap();

        assert_eq!(output, "var count = 3\nvar name = \"gd\"\n");
    }
}
