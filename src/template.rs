//! Wrapping the rendered table into a complete HTML page, or a
//! fragment for inclusion into an existing page.

use std::path::{Path, PathBuf};

pub const BUILTIN_TEMPLATE: &str = include_str!("../support/template.html");
pub const BUILTIN_STYLESHEET: &str = include_str!("../support/style.css");

pub const STYLESHEET_PLACEHOLDER: &str = "%{{ stylesheet }}";
pub const CONTENT_PLACEHOLDER: &str = "%{{ table-content }}";

/// Replace the placeholders in `template`. `content` is not searched
/// for placeholders.
pub fn fill_template(template: &str, style: &str, content: &str) -> String {
    template
        .replace(STYLESHEET_PLACEHOLDER, style)
        .replace(CONTENT_PLACEHOLDER, content)
}

pub fn make_partial(style: &str, content: &str) -> String {
    format!("<style>{style}</style>\
             <div id=\"tbldis-gen-holder\" class=\"tbldis-gen-holder\">{content}</div>")
}

/// Where partial output goes when the output path `path` is given:
/// the same path with `-partial` appended.
pub fn partial_output_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push("-partial");
    PathBuf::from(s)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_fill_template() {
        assert_eq!(fill_template("<style>%{{ stylesheet }}</style><body>%{{ table-content }}</body>",
                                 "td {}", "<table></table>"),
                   "<style>td {}</style><body><table></table></body>");
        let s = fill_template(BUILTIN_TEMPLATE, BUILTIN_STYLESHEET, "CONTENT");
        assert!(s.contains("CONTENT"));
        assert!(s.contains(".tbldis-gen-tooltop"));
        assert!(!s.contains("%{{"));
    }

    #[test]
    fn t_make_partial() {
        assert_eq!(make_partial("a {}", "<table></table>"),
                   "<style>a {}</style><div id=\"tbldis-gen-holder\" \
                    class=\"tbldis-gen-holder\"><table></table></div>");
    }

    #[test]
    fn t_partial_output_path() {
        assert_eq!(partial_output_path(Path::new("out/t.html")),
                   PathBuf::from("out/t.html-partial"));
    }
}
