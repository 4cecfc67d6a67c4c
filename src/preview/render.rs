//! Per-format rendering of text content into display markup.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use serde::Serialize;

use super::format::extension;
use super::{escape_html, markdown, notebook};

/// Display markup produced by the renderer (an HTML fragment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Markup(String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendering strategy, chosen once from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Json,
    Csv,
    Html,
    Xml,
    Yaml,
    Spreadsheet,
    Notebook,
    Plain,
}

impl Format {
    pub fn from_file_name(file_name: &str) -> Self {
        match extension(file_name).as_deref() {
            Some("md") => Format::Markdown,
            Some("json") => Format::Json,
            Some("csv") => Format::Csv,
            Some("html") => Format::Html,
            Some("xml") => Format::Xml,
            Some("yaml") | Some("yml") => Format::Yaml,
            Some("xlsx") => Format::Spreadsheet,
            Some("ipynb") => Format::Notebook,
            _ => Format::Plain,
        }
    }

    pub fn render(self, content: &str) -> Markup {
        let html = match self {
            Format::Markdown => markdown::render(content),
            Format::Json => render_json(content),
            Format::Csv => render_csv(content),
            Format::Html => render_html(content),
            Format::Xml => render_xml(content),
            Format::Yaml => format!("<pre class=\"yaml-rendered\">{}</pre>", escape_html(content)),
            Format::Spreadsheet => render_spreadsheet(),
            Format::Notebook => notebook::render(content),
            Format::Plain => format!("<pre>{}</pre>", escape_html(content)),
        };
        Markup(html)
    }
}

/// Render `content` according to the format implied by `file_name`.
pub fn render(content: &str, file_name: &str) -> Markup {
    Format::from_file_name(file_name).render(content)
}

pub(crate) fn error_marker(message: &str) -> String {
    format!("<div class=\"error\">{}</div>", escape_html(message))
}

fn render_json(content: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(content)
        .and_then(|value| serde_json::to_string_pretty(&value))
    {
        Ok(pretty) => format!("<pre class=\"json-rendered\">{}</pre>", escape_html(&pretty)),
        Err(_) => error_marker("Invalid JSON format"),
    }
}

/// Naive comma-separated table: the first non-blank line is the header, quote
/// characters are stripped rather than interpreted.
fn render_csv(content: &str) -> String {
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return error_marker("Empty CSV file");
    }

    let joined = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(joined.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(lines.len());
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(
                record
                    .iter()
                    .map(|cell| cell.trim().replace('"', ""))
                    .collect(),
            ),
            Err(_) => return error_marker("Invalid CSV format"),
        }
    }

    let mut rows = rows.into_iter();
    let header = rows.next().unwrap_or_default();

    let mut html = String::from("<table class=\"csv-table\"><thead><tr>");
    for cell in &header {
        html.push_str(&format!("<th>{}</th>", escape_html(cell)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in &row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn render_html(content: &str) -> String {
    format!("<div class=\"html-rendered\">{}</div>", ammonia::clean(content))
}

/// Parse the document and re-serialize it with two-space indentation.
fn render_xml(content: &str) -> String {
    match reformat_xml(content) {
        Some(formatted) => format!("<pre class=\"xml-rendered\">{}</pre>", escape_html(&formatted)),
        None => format!(
            "{}<pre class=\"xml-raw\">{}</pre>",
            error_marker("Invalid XML format"),
            escape_html(content)
        ),
    }
}

fn reformat_xml(content: &str) -> Option<String> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().ok()?;
        match &event {
            Event::Eof => break,
            Event::Start(_) => {
                depth += 1;
                saw_root = true;
            }
            Event::End(_) => depth = depth.checked_sub(1)?,
            Event::Empty(_) => saw_root = true,
            _ => {}
        }
        writer.write_event(event).ok()?;
    }

    if depth != 0 || !saw_root {
        return None;
    }
    String::from_utf8(writer.into_inner()).ok()
}

fn render_spreadsheet() -> String {
    "<div class=\"xlsx-info\">\
     <h3>Excel File (.xlsx)</h3>\
     <p>Excel files cannot be rendered directly in the browser.</p>\
     <p>Please download the file to view its contents.</p>\
     </div>"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    fn inner<'a>(markup: &'a str, open: &str) -> &'a str {
        markup
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix("</pre>"))
            .unwrap()
    }

    #[test]
    fn test_format_dispatch() {
        assert_eq!(Format::from_file_name("README.md"), Format::Markdown);
        assert_eq!(Format::from_file_name("conf.YML"), Format::Yaml);
        assert_eq!(Format::from_file_name("book.xlsx"), Format::Spreadsheet);
        assert_eq!(Format::from_file_name("nb.ipynb"), Format::Notebook);
        assert_eq!(Format::from_file_name("main.rs"), Format::Plain);
        assert_eq!(Format::from_file_name("noext"), Format::Plain);
    }

    #[test]
    fn test_json_round_trip() {
        let inputs = [
            r#"{"name":"a <b> & \"c\"","list":[1,2.5,null,true],"nested":{"k":"v"}}"#,
            "[]",
            "\"just a string\"",
            "42",
        ];
        for input in inputs {
            let markup = render(input, "data.json");
            let pretty = unescape(inner(markup.as_str(), "<pre class=\"json-rendered\">"));
            let reparsed: serde_json::Value = serde_json::from_str(&pretty).unwrap();
            let original: serde_json::Value = serde_json::from_str(input).unwrap();
            assert_eq!(reparsed, original);
        }
    }

    #[test]
    fn test_invalid_json_marker() {
        assert_eq!(
            render("{not json", "x.json").as_str(),
            "<div class=\"error\">Invalid JSON format</div>"
        );
    }

    #[test]
    fn test_csv_row_counts() {
        for n in 0..5 {
            let mut content = String::from("name,age\n");
            for i in 0..n {
                content.push_str(&format!("person{},{}\n", i, i));
            }
            let markup = render(&content, "people.csv");
            let html = markup.as_str();
            assert_eq!(html.matches("<tr>").count(), n + 1, "n = {}", n);
            assert_eq!(html.matches("<th>").count(), 2);
        }
    }

    #[test]
    fn test_csv_empty_file_marker() {
        assert_eq!(
            render("  \n\n", "empty.csv").as_str(),
            "<div class=\"error\">Empty CSV file</div>"
        );
    }

    #[test]
    fn test_csv_strips_quotes_and_skips_blank_lines() {
        let markup = render("\"a\", b \n\n\"1\",2\r\n", "q.csv");
        assert_eq!(
            markup.as_str(),
            "<table class=\"csv-table\"><thead><tr><th>a</th><th>b</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_csv_quoted_commas_are_split() {
        let markup = render("h\n\"x,y\"", "q.csv");
        assert!(markup.as_str().contains("<td>x</td><td>y</td>"));
    }

    #[test]
    fn test_xml_reformatted() {
        let markup = render("<root><a>1</a><b/></root>", "doc.xml");
        let body = unescape(inner(markup.as_str(), "<pre class=\"xml-rendered\">"));
        assert_eq!(body, "<root>\n  <a>1</a>\n  <b/>\n</root>");
    }

    #[test]
    fn test_xml_fallback() {
        for bad in ["<root><a></root>", "<root>", "no markup here"] {
            let markup = render(bad, "doc.xml");
            assert!(
                markup.as_str().starts_with("<div class=\"error\">Invalid XML format</div>"),
                "input: {}",
                bad
            );
        }
    }

    #[test]
    fn test_yaml_and_plain_are_escaped_verbatim() {
        assert_eq!(
            render("a: <b>", "c.yaml").as_str(),
            "<pre class=\"yaml-rendered\">a: &lt;b&gt;</pre>"
        );
        assert_eq!(render("x < y", "main.rs").as_str(), "<pre>x &lt; y</pre>");
    }

    #[test]
    fn test_html_is_sanitized() {
        let markup = render("<p>hi</p><script>alert(1)</script>", "page.html");
        assert!(markup.as_str().contains("<p>hi</p>"));
        assert!(!markup.as_str().contains("<script>"));
    }

    #[test]
    fn test_spreadsheet_placeholder() {
        let markup = render("PK\u{3}\u{4}binary", "book.xlsx");
        assert!(markup.as_str().contains("cannot be rendered"));
        assert!(markup.as_str().contains("download"));
    }
}
