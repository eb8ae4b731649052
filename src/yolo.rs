/// YOLO label files
///
/// One box per line: `<class_id> <cx> <cy> <w> <h>`, whitespace separated,
/// values normalized to the image size. Values are not range checked on
/// read; writing always uses six decimals.
use std::fs;
use std::path::Path;

#[allow(unused_imports)]
use log::{debug, info, warn};

use crate::errors::{LabelError, Result};
use crate::geometry::NormalizedBox;

/// Parse a single non-empty label line. `line_no` is 1-based and only used
/// for error reporting.
pub fn parse_line(line: &str, origin: &str, line_no: usize) -> Result<NormalizedBox> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(LabelError::malformed(
            origin,
            Some(line_no),
            format!("expected 5 fields, got {}", fields.len()),
        ));
    }
    if fields.len() > 5 {
        debug!("{}:{} has {} fields, using the first 5", origin, line_no, fields.len());
    }

    let class_id = fields[0].parse::<u32>().map_err(|e| {
        LabelError::malformed(origin, Some(line_no), format!("bad class id '{}': {}", fields[0], e))
    })?;

    let mut values = [0.0f64; 4];
    for (slot, raw) in values.iter_mut().zip(&fields[1..5]) {
        *slot = raw.parse::<f64>().map_err(|e| {
            LabelError::malformed(origin, Some(line_no), format!("bad number '{}': {}", raw, e))
        })?;
    }

    let [cx, cy, w, h] = values;
    Ok(NormalizedBox { class_id, cx, cy, w, h })
}

/// Parse the full contents of a label file. Blank lines are skipped.
pub fn parse_labels(content: &str, origin: &str) -> Result<Vec<NormalizedBox>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line, origin, idx + 1))
        .collect()
}

pub fn format_line(nbox: &NormalizedBox) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        nbox.class_id, nbox.cx, nbox.cy, nbox.w, nbox.h
    )
}

/// Render boxes as label file contents, one newline-terminated line each.
pub fn format_labels(boxes: &[NormalizedBox]) -> String {
    let mut out = String::new();
    for nbox in boxes {
        out.push_str(&format_line(nbox));
        out.push('\n');
    }
    out
}

pub fn read_labels(path: &Path) -> Result<Vec<NormalizedBox>> {
    let content = fs::read_to_string(path).map_err(|e| LabelError::io(path, e))?;
    let origin = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    parse_labels(&content, &origin)
}

pub fn write_labels(path: &Path, boxes: &[NormalizedBox]) -> Result<()> {
    fs::write(path, format_labels(boxes)).map_err(|e| LabelError::io(path, e))
}
