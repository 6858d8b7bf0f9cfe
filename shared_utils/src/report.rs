//! Report Module
//!
//! Console output for the batch scanner: header, per-file lines, final tally.
//! Every function writes to the given sink; the scanner passes locked stdout.

use crate::batch::BatchResult;
use crate::resize_4k::TARGET_SIZE_LABEL;
use console::style;
use std::io::{self, Write};
use std::path::Path;

pub const RULE: &str = "============================================================";

pub fn print_no_images<W: Write>(out: &mut W, extensions: &[&str]) -> io::Result<()> {
    writeln!(out, "No images found in the input folder!")?;
    let dotted: Vec<String> = extensions.iter().map(|e| format!(".{}", e)).collect();
    writeln!(out, "Supported formats: {}", dotted.join(", "))
}

pub fn print_batch_header<W: Write>(
    out: &mut W,
    count: usize,
    tool_name: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "Found {} image(s) to process", count)?;
    match tool_name {
        Some(name) => {
            writeln!(out, "Tool name: {}", name)?;
            writeln!(
                out,
                "Output format: {0}_image_001.jpg, {0}_image_002.jpg, etc.\n",
                name
            )?;
        }
        None => writeln!(out, "Output format: 001.jpg, 002.jpg, etc.\n")?,
    }
    writeln!(out, "{}", RULE)
}

pub fn print_file_start<W: Write>(out: &mut W, name: &str) -> io::Result<()> {
    writeln!(out, "Processing: {}", name)
}

/// Printed as soon as the source decodes, before the conversion outcome.
pub fn print_original_size<W: Write>(out: &mut W, original_size: &str) -> io::Result<()> {
    writeln!(out, "  Original size: {}", original_size)
}

pub fn print_file_success<W: Write>(out: &mut W, output_name: &str) -> io::Result<()> {
    writeln!(
        out,
        "  {} Saved to: {} (4K: {})",
        style("✓").green(),
        output_name,
        TARGET_SIZE_LABEL
    )
}

pub fn print_file_failure<W: Write>(out: &mut W, name: &str, message: &str) -> io::Result<()> {
    writeln!(
        out,
        "  {} Error processing {}: {}",
        style("✗").red(),
        name,
        message
    )
}

pub fn print_batch_summary<W: Write>(
    out: &mut W,
    result: &BatchResult,
    output_dir: &Path,
) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "\n{}", style("Batch conversion complete!").bold())?;
    writeln!(
        out,
        "  {} Successfully converted: {}",
        style("✓").green(),
        result.succeeded
    )?;
    if result.failed > 0 {
        writeln!(out, "  {} Failed: {}", style("✗").red(), result.failed)?;
    }
    let location = std::path::absolute(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    writeln!(out, "\nOutput location: {}", location.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned()
    }

    #[test]
    fn test_header_with_and_without_label() {
        let labelled = render(|out| print_batch_header(out, 3, Some("demo")));
        assert!(labelled.starts_with("Found 3 image(s) to process\nTool name: demo\n"));
        assert!(labelled.contains("demo_image_001.jpg, demo_image_002.jpg, etc."));
        assert!(labelled.ends_with(&format!("{}\n", RULE)));

        let plain = render(|out| print_batch_header(out, 1, None));
        assert!(plain.contains("Output format: 001.jpg, 002.jpg, etc."));
        assert!(!plain.contains("Tool name"));
    }

    #[test]
    fn test_per_file_lines() {
        let text = render(|out| {
            print_file_start(out, "a.png")?;
            print_original_size(out, "40x30")?;
            print_file_success(out, "001.jpg")
        });
        assert_eq!(
            text,
            "Processing: a.png\n  Original size: 40x30\n  ✓ Saved to: 001.jpg (4K: 3840x2160)\n"
        );

        let failed = render(|out| print_file_failure(out, "b.jpg", "boom"));
        assert_eq!(failed, "  ✗ Error processing b.jpg: boom\n");
    }

    #[test]
    fn test_summary_mentions_failures_only_when_present() {
        let mut result = BatchResult::new();
        result.success();
        let clean = render(|out| print_batch_summary(out, &result, Path::new("outputs")));
        assert!(clean.contains("Successfully converted: 1"));
        assert!(!clean.contains("Failed:"));
        assert!(clean.contains("Output location: "));

        result.fail("x.png", &AppError::Encode("e".to_string()));
        let dirty = render(|out| print_batch_summary(out, &result, Path::new("outputs")));
        assert!(dirty.contains("Failed: 1"));
    }

    #[test]
    fn test_no_images_lists_extensions() {
        let text = render(|out| print_no_images(out, &["png", "gif"]));
        assert_eq!(
            text,
            "No images found in the input folder!\nSupported formats: .png, .gif\n"
        );
    }
}
