//! RcDoc-based pretty-printer with termcolor annotations for derivation trees.
//!
//! Role
//! - Convert a [`TreeNode`] into an annotated, indented document.
//! - Provide colored output for terminals (TTY-aware) and plain strings for logs/tests.
//!
//! Layout: one node per line, children indented by two columns below their
//! parent. Recipe lines start with `=`, cut-off nodes with `!`.
//!
//! ```text
//! Lava
//!   = Fire + Earth
//!     Fire
//!     Earth
//! ```

use std::io::{self, Write};

use pretty::{FmtWrite, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::node::{NodeKind, TreeNode};

/// Styles used to annotate parts of the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct,
    Element,
    BaseElement,
    Recipe,
    Error,
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Punct => {
                s.set_dimmed(true);
            }
            Style::Element => {
                s.set_fg(Some(Color::Green)).set_bold(true);
            }
            Style::BaseElement => {
                s.set_fg(Some(Color::Cyan));
            }
            Style::Recipe => {
                s.set_fg(Some(Color::Yellow));
            }
            Style::Error => {
                s.set_fg(Some(Color::Red)).set_bold(true);
            }
        }
        s
    }
}

fn line_doc(node: &TreeNode) -> RcDoc<'static, Style> {
    match &node.kind {
        NodeKind::Element { base: false } => RcDoc::as_string(&node.name).annotate(Style::Element),
        NodeKind::Element { base: true } => {
            RcDoc::as_string(&node.name).annotate(Style::BaseElement)
        }
        NodeKind::Recipe(_) => RcDoc::text("= ")
            .annotate(Style::Punct)
            .append(RcDoc::as_string(&node.name).annotate(Style::Recipe)),
        NodeKind::Error { .. } => RcDoc::text("! ")
            .annotate(Style::Punct)
            .append(RcDoc::as_string(&node.name).annotate(Style::Error)),
    }
}

fn to_doc(node: &TreeNode) -> RcDoc<'static, Style> {
    let children = RcDoc::concat(
        node.children
            .iter()
            .map(|child| RcDoc::hardline().append(to_doc(child))),
    );
    line_doc(node).append(children.nest(2))
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

/// Convenience: retrieve the width of the terminal, or 80 if it cannot be determined.
fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Pretty-printing conveniences for trees.
pub trait PrettyTree {
    /// Build an RcDoc representation of this tree with style annotations.
    fn pretty_doc(&self) -> RcDoc<'static, Style>;

    /// Render this tree with colors to any termcolor writer.
    fn pretty_render_to<W: WriteColor + Write>(&self, out: &mut W) -> io::Result<()>;

    /// Print this tree to stdout with colors (TTY-aware).
    fn pretty_print(&self) -> io::Result<()>;

    /// Format this tree into a plain string (no colors).
    fn pretty_string(&self) -> String;
}

impl PrettyTree for TreeNode {
    #[inline]
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        to_doc(self)
    }

    fn pretty_render_to<W: WriteColor + Write>(&self, out: &mut W) -> io::Result<()> {
        let mut cw = ColorWriter { out };
        self.pretty_doc().render_raw(terminal_width(), &mut cw)?;
        writeln!(cw.out)
    }

    fn pretty_print(&self) -> io::Result<()> {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        self.pretty_render_to(&mut stdout)
    }

    fn pretty_string(&self) -> String {
        let mut buf = String::new();
        let _ = self.pretty_doc().render_fmt(80, &mut buf);
        buf
    }
}

impl std::fmt::Display for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut w = FmtWrite::new(f);
        self.pretty_doc().render_raw(80, &mut w)
    }
}
