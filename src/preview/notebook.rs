//! Jupyter notebook rendering, cell by cell.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;

use super::render::error_marker;
use super::{escape_html, markdown};

#[derive(Debug, Deserialize)]
struct Notebook {
    cells: Option<Value>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// A notebook `source`/`text` field is either a string or a list of lines.
fn joined(value: Option<&Value>, separator: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(separator),
        _ => String::new(),
    }
}

pub fn render(content: &str) -> String {
    let notebook: Notebook = match serde_json::from_str(content) {
        Ok(notebook) => notebook,
        Err(e) => return error_marker(&format!("Invalid Jupyter Notebook format: {}", e)),
    };
    let cells = match notebook.cells {
        Some(Value::Array(cells)) => cells,
        _ => return error_marker("Invalid Jupyter Notebook format"),
    };

    let metadata = notebook.metadata.unwrap_or(Value::Null);
    let kernel = metadata
        .get("kernelspec")
        .and_then(|spec| spec.get("display_name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown Kernel");
    let language = metadata
        .get("kernelspec")
        .and_then(|spec| spec.get("language"))
        .or_else(|| metadata.get("language_info").and_then(|info| info.get("name")))
        .and_then(Value::as_str)
        .unwrap_or("python");

    let mut html = String::from("<div class=\"jupyter-notebook\">");
    html.push_str(&format!(
        "<div class=\"notebook-header\"><h2>Jupyter Notebook</h2>\
         <div class=\"notebook-info\"><span class=\"cell-count\">{} cells</span>\
         <span class=\"kernel-info\">{}</span></div></div>",
        cells.len(),
        escape_html(kernel)
    ));

    for (index, cell) in cells.iter().enumerate() {
        render_cell(&mut html, index, cell, language);
    }

    html.push_str("</div>");
    html
}

fn render_cell(html: &mut String, index: usize, cell: &Value, language: &str) {
    let cell_type = cell
        .get("cell_type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let source = joined(cell.get("source"), "");
    let css_type = escape_html(cell_type);

    html.push_str(&format!(
        "<div class=\"notebook-cell {0}-cell\"><div class=\"cell-header\">\
         <span class=\"cell-type\">{1}</span><span class=\"cell-number\">[{2}]</span></div>\
         <div class=\"cell-content\">",
        css_type,
        escape_html(&cell_type.to_uppercase()),
        index + 1
    ));

    match cell_type {
        "code" => {
            html.push_str(&format!(
                "<pre class=\"code-input\"><code class=\"language-{}\">{}</code></pre>",
                escape_html(language),
                escape_html(&source)
            ));
            if let Some(outputs) = cell.get("outputs").and_then(Value::as_array) {
                if !outputs.is_empty() {
                    html.push_str("<div class=\"cell-outputs\">");
                    for output in outputs {
                        render_output(html, output);
                    }
                    html.push_str("</div>");
                }
            }
        }
        "markdown" => {
            html.push_str("<div class=\"markdown-content\">");
            html.push_str(&markdown::render(&source));
            html.push_str("</div>");
        }
        "raw" => {
            html.push_str(&format!("<pre class=\"raw-content\">{}</pre>", escape_html(&source)));
        }
        _ => {
            html.push_str(&format!(
                "<pre class=\"unknown-content\">{}</pre>",
                escape_html(&source)
            ));
        }
    }

    html.push_str("</div></div>");
}

fn render_output(html: &mut String, output: &Value) {
    match output.get("output_type").and_then(Value::as_str) {
        Some("stream") => {
            let text = joined(output.get("text"), "");
            html.push_str(&format!(
                "<pre class=\"output-stream\">{}</pre>",
                escape_html(&strip_ansi(&text))
            ));
        }
        Some("execute_result") | Some("display_data") => {
            let Some(data) = output.get("data") else {
                return;
            };
            let plain = joined(data.get("text/plain"), "");
            if !plain.is_empty() {
                html.push_str(&format!(
                    "<pre class=\"output-result\">{}</pre>",
                    escape_html(&plain)
                ));
            }
            let rich = joined(data.get("text/html"), "");
            if !rich.is_empty() {
                html.push_str(&format!(
                    "<div class=\"output-html\">{}</div>",
                    ammonia::clean(&rich)
                ));
            }
            if let Some(image) = data.get("image/png").and_then(Value::as_str) {
                // Notebooks wrap long base64 payloads across lines.
                let compact: String = image.chars().filter(|c| !c.is_whitespace()).collect();
                if STANDARD.decode(&compact).is_ok() {
                    html.push_str(&format!(
                        "<img class=\"output-image\" src=\"data:image/png;base64,{}\" alt=\"Output image\" />",
                        compact
                    ));
                }
            }
        }
        Some("error") => {
            let name = output.get("ename").and_then(Value::as_str).unwrap_or("");
            let value = output.get("evalue").and_then(Value::as_str).unwrap_or("");
            let traceback = joined(output.get("traceback"), "\n");
            html.push_str(&format!(
                "<pre class=\"output-error\">{}</pre>",
                escape_html(&strip_ansi(&format!("{}: {}\n{}", name, value, traceback)))
            ));
        }
        _ => {}
    }
}

/// Remove terminal colour sequences (`ESC [ ... letter`) from kernel output.
fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}
