//! HTML parsing and output.
//!
//! Markup enters and leaves the library here; everything else works on
//! [`Node`](crate::Node) trees.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str, HtmlParser};
pub use printer::{
    print_element, print_to_string, print_to_string_pretty, HtmlPrinter, HtmlPrinterOptions,
};
