//! The indentation advisor.
//!
//! Consulted by the editing surface on newline, tab, and backspace key
//! events. Both operations are pure lookups against the line text and the
//! language's indent rules; applying the result to the buffer is the
//! caller's job.

use crate::language::LanguageDefinition;

/// Width in bytes of a line's leading whitespace.
pub fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Indentation for a fresh line inserted after `previous_line`.
///
/// Starts from the previous line's own indentation and adds one indent unit
/// for every trigger pattern the previous line matches (a `def foo():` line
/// both matches the function trigger and keeps its own leading whitespace).
pub fn indent_for(previous_line: &str, def: &LanguageDefinition) -> usize {
    let mut width = leading_whitespace(previous_line);
    for trigger in def.indent_triggers() {
        if trigger.regex().is_match(previous_line) {
            width += def.indent_width();
        }
    }
    width
}

/// Characters to remove for a backspace at `cursor_offset` inside the leading
/// whitespace of `current_line`.
///
/// Snaps back to the previous indent stop: a cursor off-grid removes
/// `cursor_offset % indent_width`, an on-grid cursor removes a whole unit.
/// Returns 0 when the cursor sits past the indentation (an ordinary backspace
/// applies) and never removes more than the cursor column.
pub fn dedent_on(current_line: &str, cursor_offset: usize, def: &LanguageDefinition) -> usize {
    let indent = leading_whitespace(current_line);
    if indent == 0 || cursor_offset > indent {
        return 0;
    }
    let partial = cursor_offset % def.indent_width();
    let amount = if partial == 0 {
        def.indent_width()
    } else {
        partial
    };
    amount.min(cursor_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageDefinition;

    fn python() -> LanguageDefinition {
        LanguageDefinition::python().unwrap()
    }

    #[test]
    fn test_indent_after_if() {
        let def = python();
        assert_eq!(indent_for("if x:", &def), 4);
        assert_eq!(indent_for("    if x:", &def), 8);
    }

    #[test]
    fn test_indent_after_def_and_class() {
        let def = python();
        assert_eq!(indent_for("def foo():", &def), 4);
        assert_eq!(indent_for("class Foo:", &def), 4);
        assert_eq!(indent_for("        def bar(self):", &def), 12);
    }

    #[test]
    fn test_no_trigger_keeps_indent() {
        let def = python();
        assert_eq!(indent_for("x = 1", &def), 0);
        assert_eq!(indent_for("    x = 1", &def), 4);
    }

    #[test]
    fn test_elif_counts_once() {
        let def = python();
        // `elif x:` must not match both the if and elif triggers.
        assert_eq!(indent_for("elif x:", &def), 4);
    }

    #[test]
    fn test_dedent_full_unit_on_grid() {
        let def = python();
        assert_eq!(dedent_on("        x", 8, &def), 4);
        assert_eq!(dedent_on("    x", 4, &def), 4);
    }

    #[test]
    fn test_dedent_partial_off_grid() {
        let def = python();
        assert_eq!(dedent_on("      x", 6, &def), 2);
        assert_eq!(dedent_on("  x", 1, &def), 1);
    }

    #[test]
    fn test_dedent_ignores_cursor_past_indent() {
        let def = python();
        assert_eq!(dedent_on("    x = 1", 7, &def), 0);
        assert_eq!(dedent_on("x = 1", 3, &def), 0);
    }

    #[test]
    fn test_dedent_never_underflows() {
        let def = python();
        assert_eq!(dedent_on("    x", 0, &def), 0);
        assert_eq!(dedent_on("", 0, &def), 0);
    }

    #[test]
    fn test_generic_brace_trigger() {
        let def = LanguageDefinition::generic().unwrap();
        assert_eq!(indent_for("for (;;) {", &def), 4);
        assert_eq!(indent_for("  done();", &def), 2);
    }
}
