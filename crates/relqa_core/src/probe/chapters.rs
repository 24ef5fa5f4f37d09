//! Matroska chapter editions via mkvextract.
//!
//! ffprobe flattens every edition into one chapter list. mkvextract's XML
//! keeps editions apart, so each `EditionEntry` becomes its own chapter
//! track.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::tools::run_tool;

use super::types::{normalize_marks, ProbeError, ProbeResult};

/// Read chapter tracks from a Matroska file.
///
/// Returns an empty list when the file has no chapters.
pub fn extract_chapter_editions(
    mkvextract: &str,
    path: &Path,
    timeout: Duration,
) -> ProbeResult<Vec<Vec<u64>>> {
    let mut cmd = Command::new(mkvextract);
    cmd.arg(path).arg("chapters").arg("-");

    let output = run_tool(cmd, timeout)?;

    // mkvextract exits 1 on warnings but still writes the XML
    let warned = output.status.code() == Some(1) && !output.stdout.is_empty();
    let output = if warned {
        output
    } else {
        output.require_success()?
    };

    let xml = String::from_utf8_lossy(&output.stdout);
    let xml = xml.trim();
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);

    if xml.is_empty() {
        return Ok(Vec::new());
    }

    parse_chapter_editions(xml)
}

/// Parse Matroska chapter XML into one mark list per edition.
///
/// Hidden or disabled atoms are skipped. Editions left without marks are
/// dropped.
pub fn parse_chapter_editions(xml: &str) -> ProbeResult<Vec<Vec<u64>>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ProbeError::ChapterXml(format!("XML parse error: {}", e)))?;

    let root = doc.root_element();
    if root.tag_name().name() != "Chapters" {
        return Err(ProbeError::ChapterXml(
            "Root element must be <Chapters>".to_string(),
        ));
    }

    let editions = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "EditionEntry")
        .map(|edition| {
            let marks = edition
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "ChapterAtom")
                .filter_map(|atom| parse_atom_start(&atom))
                .collect();
            normalize_marks(marks)
        })
        .filter(|marks: &Vec<u64>| !marks.is_empty())
        .collect();

    Ok(editions)
}

/// Start time of a visible, enabled atom in milliseconds.
fn parse_atom_start(atom: &roxmltree::Node) -> Option<u64> {
    let mut start_ms = None;
    let mut hidden = false;
    let mut enabled = true;

    for child in atom.children().filter(|n| n.is_element()) {
        let text = child.text().map(str::trim).unwrap_or("");
        match child.tag_name().name() {
            "ChapterTimeStart" => start_ms = parse_timestamp_ms(text),
            "ChapterFlagHidden" => hidden = text == "1",
            "ChapterFlagEnabled" => enabled = text == "1",
            _ => {}
        }
    }

    if hidden || !enabled {
        return None;
    }
    start_ms
}

/// Parse `HH:MM:SS.nnnnnnnnn` to milliseconds, rounded to the nearest ms.
pub fn parse_timestamp_ms(time_str: &str) -> Option<u64> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;

    let (secs, frac) = parts[2].split_once('.').unwrap_or((parts[2], ""));
    let seconds: u64 = secs.parse().ok()?;
    let nanos: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<9}", frac);
        padded[..9].parse().ok()?
    };

    let total_ns = (hours * 3600 + minutes * 60 + seconds) * 1_000_000_000 + nanos;
    Some((total_ns + 500_000) / 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_EDITIONS: &str = r#"<?xml version="1.0"?>
<Chapters>
  <EditionEntry>
    <EditionFlagDefault>1</EditionFlagDefault>
    <ChapterAtom>
      <ChapterTimeStart>00:01:00.000000000</ChapterTimeStart>
    </ChapterAtom>
    <ChapterAtom>
      <ChapterTimeStart>00:00:00.000000000</ChapterTimeStart>
    </ChapterAtom>
    <ChapterAtom>
      <ChapterTimeStart>00:00:30.000000000</ChapterTimeStart>
      <ChapterFlagHidden>1</ChapterFlagHidden>
    </ChapterAtom>
  </EditionEntry>
  <EditionEntry>
    <ChapterAtom>
      <ChapterTimeStart>00:00:00.000000000</ChapterTimeStart>
    </ChapterAtom>
    <ChapterAtom>
      <ChapterTimeStart>00:02:05.500000000</ChapterTimeStart>
    </ChapterAtom>
    <ChapterAtom>
      <ChapterTimeStart>00:03:00.000000000</ChapterTimeStart>
      <ChapterFlagEnabled>0</ChapterFlagEnabled>
    </ChapterAtom>
  </EditionEntry>
</Chapters>"#;

    #[test]
    fn each_edition_is_a_track() {
        let editions = parse_chapter_editions(TWO_EDITIONS).unwrap();
        assert_eq!(editions, vec![vec![0, 60_000], vec![0, 125_500]]);
    }

    #[test]
    fn empty_editions_are_dropped() {
        let xml = "<Chapters><EditionEntry></EditionEntry></Chapters>";
        assert!(parse_chapter_editions(xml).unwrap().is_empty());
    }

    #[test]
    fn wrong_root_is_rejected() {
        assert!(matches!(
            parse_chapter_editions("<Tags/>"),
            Err(ProbeError::ChapterXml(_))
        ));
        assert!(parse_chapter_editions("<Chapters>").is_err());
    }

    #[test]
    fn timestamps_round_to_milliseconds() {
        assert_eq!(parse_timestamp_ms("00:00:00.000000000"), Some(0));
        assert_eq!(parse_timestamp_ms("00:00:01.0015"), Some(1002));
        assert_eq!(parse_timestamp_ms("01:01:01"), Some(3_661_000));
        assert_eq!(parse_timestamp_ms("bogus"), None);
    }
}
