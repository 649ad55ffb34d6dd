//! HTML printer.
//!
//! Writes a [`Node`] tree back as markup. Childless elements are written as
//! `<tag/>`, which the parser reads back as the same tree.

use std::io::Write;

use quick_xml::escape::{escape, partial_escape};

use crate::node::{Element, Node};

/// Options for HTML printing.
#[derive(Debug, Clone, Default)]
pub struct HtmlPrinterOptions {
    /// Put every tag and text run on its own indented line.
    ///
    /// The added whitespace becomes part of the text when the output is
    /// parsed again, so pretty output is for reading only.
    pub pretty_print: bool,
}

/// Streams node trees to a writer.
pub struct HtmlPrinter<W: Write> {
    writer: W,
    options: HtmlPrinterOptions,
    indent: usize,
}

impl<W: Write> HtmlPrinter<W> {
    /// Creates a compact printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, HtmlPrinterOptions::default())
    }

    /// Creates a printer with the given options.
    pub fn with_options(writer: W, options: HtmlPrinterOptions) -> Self {
        HtmlPrinter {
            writer,
            options,
            indent: 0,
        }
    }

    /// Prints a tree.
    pub fn print(&mut self, node: &Node) -> std::io::Result<()> {
        self.print_node(node)?;
        self.writer.flush()
    }

    fn print_node(&mut self, node: &Node) -> std::io::Result<()> {
        match node {
            Node::Text(text) => {
                self.write_indent()?;
                write!(self.writer, "{}", partial_escape(text))?;
                self.end_line()
            }
            Node::Element(element) => self.print_element(element),
        }
    }

    fn print_element(&mut self, element: &Element) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{}", element.tag_name)?;
        for (name, value) in &element.attributes {
            write!(self.writer, " {}=\"{}\"", name, escape(value.as_str()))?;
        }

        if element.children.is_empty() {
            write!(self.writer, "/>")?;
            return self.end_line();
        }

        write!(self.writer, ">")?;
        self.end_line()?;

        self.indent += 1;
        for child in &element.children {
            self.print_node(child)?;
        }
        self.indent -= 1;

        self.write_indent()?;
        write!(self.writer, "</{}>", element.tag_name)?;
        self.end_line()
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        if self.options.pretty_print {
            write!(self.writer, "{}", "  ".repeat(self.indent))?;
        }
        Ok(())
    }

    fn end_line(&mut self) -> std::io::Result<()> {
        if self.options.pretty_print {
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

fn print_with(node: &Node, options: HtmlPrinterOptions) -> String {
    let mut output = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = HtmlPrinter::with_options(&mut output, options).print(node);
    String::from_utf8_lossy(&output).into_owned()
}

/// Prints a tree as compact markup.
pub fn print_to_string(node: &Node) -> String {
    print_with(node, HtmlPrinterOptions::default())
}

/// Prints a tree with one tag or text run per line.
pub fn print_to_string_pretty(node: &Node) -> String {
    print_with(node, HtmlPrinterOptions { pretty_print: true })
}

/// Prints a single element as compact markup.
pub fn print_element(element: &Element) -> String {
    let mut output = Vec::new();
    let _ = HtmlPrinter::new(&mut output).print_element(element);
    String::from_utf8_lossy(&output).into_owned()
}
