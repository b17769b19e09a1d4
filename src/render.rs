// Turns a problem into markdown and prints markdown to the terminal.

use std::fmt;
use std::io::{self, Write};

use crossterm::style::{style, Stylize};

use crate::api::Problem;

/// Markdown document for a problem: title, limits, statement sections,
/// sample groups and notes.
pub fn problem_to_markdown(problem: &Problem) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail.
    if write_markdown(&mut md, problem).is_err() {
        log::warn!("markdown for problem {} is incomplete", problem.id);
    }
    md
}

/// Write the markdown document for `problem` into any `fmt::Write` sink.
pub fn write_markdown<W: fmt::Write>(md: &mut W, problem: &Problem) -> fmt::Result {
    writeln!(md, "# {}\n", problem.title)?;

    writeln!(md, "- **Problem ID:** {}  ", problem.id)?;
    writeln!(md, "- **Time limit:** {} ms  ", problem.time_limit)?;
    writeln!(md, "- **Memory limit:** {} MB  ", problem.memory_limit)?;
    writeln!(md, "- **Difficulty:** {}  ", problem.difficulty)?;
    if !problem.author.display_name.is_empty() {
        writeln!(md, "- **Author:** {}  ", problem.author.display_name)?;
    }
    if !problem.tags.is_empty() {
        let tags: Vec<&str> = problem.tags.iter().map(|t| t.name.as_str()).collect();
        writeln!(md, "- **Tags:** {}  ", tags.join(", "))?;
    }
    if !problem.allowed_languages.is_empty() {
        let langs: Vec<String> = problem
            .allowed_languages
            .iter()
            .map(|l| format!("{} (`{}`)", l.name, l.value))
            .collect();
        writeln!(md, "- **Languages:** {}  ", langs.join(", "))?;
    }
    if !problem.allow_submit {
        md.write_str("- **Submissions are currently closed**  \n")?;
    }
    md.write_char('\n')?;

    if !problem.description.is_empty() {
        writeln!(md, "## Description\n\n{}\n", problem.description)?;
    }

    for section in problem.ordered_sections() {
        writeln!(md, "## {}\n\n{}\n", section.title, section.content)?;
    }

    // Group numbers keep their position in the served list, so empty groups
    // leave gaps rather than renumbering the rest.
    for (i, group) in problem.test_cases.iter().enumerate() {
        if group.test_cases.is_empty() {
            continue;
        }
        writeln!(md, "## Sample Testcase Group {}\n", i)?;
        for (j, case) in group.test_cases.iter().enumerate() {
            writeln!(md, "### Testcase {}.{}\n", i, j)?;
            if !case.input.is_empty() {
                writeln!(md, "#### Input\n\n```\n{}\n```\n", case.input)?;
            }
            if !case.output.is_empty() {
                writeln!(md, "#### Output\n\n```\n{}\n```\n", case.output)?;
            }
        }
    }

    if !problem.notes.is_empty() {
        writeln!(md, "## Notes\n\n{}\n", problem.notes)?;
    }

    Ok(())
}

/// Print markdown to stdout with headings, emphasis and code blocks styled.
pub fn print_markdown(markdown: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_styled(&mut out, markdown)?;
    out.flush()
}

fn write_styled<W: Write>(out: &mut W, markdown: &str) -> io::Result<()> {
    let mut in_code = false;
    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            writeln!(out, "    {}", style(line).yellow())?;
            continue;
        }

        if let Some(text) = line.strip_prefix("# ") {
            writeln!(out, "{}", style(text).bold().underlined().magenta())?;
        } else if let Some(text) = line.strip_prefix("## ") {
            writeln!(out, "{}", style(text).bold().cyan())?;
        } else if let Some(text) = line
            .strip_prefix("#### ")
            .or_else(|| line.strip_prefix("### "))
        {
            writeln!(out, "{}", style(text).bold())?;
        } else {
            write_inline(out, line.trim_end())?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// `**bold**` and `code` spans; anything else is copied through.
fn write_inline<W: Write>(out: &mut W, line: &str) -> io::Result<()> {
    let mut rest = line;
    while !rest.is_empty() {
        let bold = rest.find("**");
        let code = rest.find('`');
        let (start, marker) = match (bold, code) {
            (Some(b), Some(c)) if c < b => (c, "`"),
            (Some(b), _) => (b, "**"),
            (None, Some(c)) => (c, "`"),
            (None, None) => break,
        };
        let after = &rest[start + marker.len()..];
        let Some(end) = after.find(marker) else {
            break;
        };
        write!(out, "{}", &rest[..start])?;
        let span = &after[..end];
        if marker == "**" {
            write!(out, "{}", style(span).bold())?;
        } else {
            write!(out, "{}", style(span).yellow())?;
        }
        rest = &after[end + marker.len()..];
    }
    write!(out, "{}", rest)
}
