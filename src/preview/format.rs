//! File kind detection by extension.

use serde::{Deserialize, Serialize};

/// Coarse classification of a file, used for icons and preview decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Document,
    Spreadsheet,
    Presentation,
    Archive,
    Audio,
    Code,
    Notebook,
    Other,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Document => "document",
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::Presentation => "presentation",
            FileKind::Archive => "archive",
            FileKind::Audio => "audio",
            FileKind::Code => "code",
            FileKind::Notebook => "notebook",
            FileKind::Other => "other",
        };
        f.write_str(label)
    }
}

const KIND_TABLE: &[(&str, FileKind)] = &[
    ("jpg", FileKind::Image),
    ("jpeg", FileKind::Image),
    ("png", FileKind::Image),
    ("gif", FileKind::Image),
    ("bmp", FileKind::Image),
    ("svg", FileKind::Image),
    ("webp", FileKind::Image),
    ("mp4", FileKind::Video),
    ("avi", FileKind::Video),
    ("mov", FileKind::Video),
    ("wmv", FileKind::Video),
    ("flv", FileKind::Video),
    ("webm", FileKind::Video),
    ("mkv", FileKind::Video),
    ("m4v", FileKind::Video),
    ("3gp", FileKind::Video),
    ("ogv", FileKind::Video),
    ("pdf", FileKind::Document),
    ("doc", FileKind::Document),
    ("docx", FileKind::Document),
    ("txt", FileKind::Document),
    ("rtf", FileKind::Document),
    ("xls", FileKind::Spreadsheet),
    ("xlsx", FileKind::Spreadsheet),
    ("csv", FileKind::Spreadsheet),
    ("ppt", FileKind::Presentation),
    ("pptx", FileKind::Presentation),
    ("zip", FileKind::Archive),
    ("rar", FileKind::Archive),
    ("7z", FileKind::Archive),
    ("tar", FileKind::Archive),
    ("gz", FileKind::Archive),
    ("mp3", FileKind::Audio),
    ("wav", FileKind::Audio),
    ("flac", FileKind::Audio),
    ("aac", FileKind::Audio),
    ("ogg", FileKind::Audio),
    ("js", FileKind::Code),
    ("ts", FileKind::Code),
    ("html", FileKind::Code),
    ("css", FileKind::Code),
    ("json", FileKind::Code),
    ("xml", FileKind::Code),
    ("py", FileKind::Code),
    ("java", FileKind::Code),
    ("ipynb", FileKind::Notebook),
];

/// Extensions whose bodies are downloaded as text for preview.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "xml", "csv", "log", "yaml", "yml", "ini", "cfg", "conf", "js", "ts",
    "jsx", "tsx", "html", "css", "scss", "sass", "py", "java", "cpp", "c", "h", "php", "rb", "go",
    "rs", "sh", "sql", "xlsx", "ipynb",
];

/// Extensions with a rendered view in addition to the source view.
const RENDERABLE_EXTENSIONS: &[&str] = &[
    "md", "json", "csv", "html", "xml", "yaml", "yml", "xlsx", "ipynb",
];

const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c", "c"),
    ("h", "c"),
    ("php", "php"),
    ("rb", "ruby"),
    ("go", "go"),
    ("rs", "rust"),
    ("sh", "bash"),
    ("sql", "sql"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("json", "json"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("md", "markdown"),
    ("csv", "csv"),
    ("xlsx", "excel"),
    ("ipynb", "jupyter"),
];

/// Lowercased text after the last `.` of the final path segment.
///
/// A name without a dot, or ending in one, has no extension.
pub fn extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    let (_, ext) = base.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_lowercase())
}

pub fn detect_kind(file_name: &str) -> FileKind {
    extension(file_name)
        .and_then(|ext| {
            KIND_TABLE
                .iter()
                .find(|(candidate, _)| *candidate == ext)
                .map(|(_, kind)| *kind)
        })
        .unwrap_or(FileKind::Other)
}

fn extension_in(file_name: &str, table: &[&str]) -> bool {
    extension(file_name).is_some_and(|ext| table.contains(&ext.as_str()))
}

pub fn is_text_file(file_name: &str) -> bool {
    extension_in(file_name, TEXT_EXTENSIONS)
}

pub fn is_renderable_file(file_name: &str) -> bool {
    extension_in(file_name, RENDERABLE_EXTENSIONS)
}

fn is_pdf_file(file_name: &str) -> bool {
    extension(file_name).as_deref() == Some("pdf")
}

/// Whether the browser can show anything beyond a download prompt.
pub fn is_previewable_file(file_name: &str) -> bool {
    matches!(
        detect_kind(file_name),
        FileKind::Image | FileKind::Video | FileKind::Notebook
    ) || is_pdf_file(file_name)
        || is_text_file(file_name)
}

/// Syntax-highlighting language for the source view.
pub fn language_for(file_name: &str) -> &'static str {
    extension(file_name)
        .and_then(|ext| {
            LANGUAGE_TABLE
                .iter()
                .find(|(candidate, _)| *candidate == ext)
                .map(|(_, lang)| *lang)
        })
        .unwrap_or("text")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind_table() {
        assert_eq!(detect_kind("photo.JPG"), FileKind::Image);
        assert_eq!(detect_kind("clip.3gp"), FileKind::Video);
        assert_eq!(detect_kind("report.pdf"), FileKind::Document);
        assert_eq!(detect_kind("data.csv"), FileKind::Spreadsheet);
        assert_eq!(detect_kind("deck.pptx"), FileKind::Presentation);
        assert_eq!(detect_kind("backup.tar.gz"), FileKind::Archive);
        assert_eq!(detect_kind("song.flac"), FileKind::Audio);
        assert_eq!(detect_kind("main.py"), FileKind::Code);
        assert_eq!(detect_kind("analysis.ipynb"), FileKind::Notebook);
    }

    #[test]
    fn test_unknown_extensions_are_other() {
        assert_eq!(detect_kind("binary.exe"), FileKind::Other);
        assert_eq!(detect_kind("Makefile"), FileKind::Other);
        assert_eq!(detect_kind("trailing."), FileKind::Other);
        assert_eq!(detect_kind(""), FileKind::Other);
        assert_eq!(detect_kind("zip"), FileKind::Other);
    }

    #[test]
    fn test_detection_is_deterministic() {
        for (ext, kind) in KIND_TABLE {
            let name = format!("file.{}", ext);
            assert_eq!(detect_kind(&name), *kind);
            assert_eq!(detect_kind(&name.to_uppercase()), *kind);
        }
    }

    #[test]
    fn test_extension_uses_last_segment() {
        assert_eq!(extension("dir.v2/readme"), None);
        assert_eq!(extension("dir/notes.MD").as_deref(), Some("md"));
    }

    #[test]
    fn test_text_and_renderable() {
        assert!(is_text_file("notes.md"));
        assert!(is_text_file("script.rs"));
        assert!(!is_text_file("photo.png"));
        assert!(is_renderable_file("table.csv"));
        assert!(!is_renderable_file("main.rs"));
    }

    #[test]
    fn test_previewable() {
        assert!(is_previewable_file("a.png"));
        assert!(is_previewable_file("a.pdf"));
        assert!(is_previewable_file("a.log"));
        assert!(!is_previewable_file("a.zip"));
    }

    #[test]
    fn test_language_for() {
        assert_eq!(language_for("lib.rs"), "rust");
        assert_eq!(language_for("x.yml"), "yaml");
        assert_eq!(language_for("README"), "text");
    }
}
