//! Match plan CSV table.
//!
//! ```text
//! "group_id","subgroup_tag","enabled_flag","item_path"
//! "001","1","","/old/ep01.mkv"
//! "001","2","","/new/ep01.mkv"
//! "","","","/new/extra.mkv"
//! ```
//!
//! UTF-8 with a BOM so spreadsheet tools pick the right encoding. Rows with
//! an empty `group_id` are the unmatched bucket: written for the reviewer,
//! never reloaded.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;

use crate::models::{EnabledFlag, GroupMember, MatchGroup, MatchPlan};

/// Column names, in order.
pub const PLAN_HEADER: [&str; 4] = ["group_id", "subgroup_tag", "enabled_flag", "item_path"];

const BOM: &str = "\u{feff}";

/// Errors from reading or writing a plan table.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to access plan file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to write plan: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed plan{}: {message}", line_suffix(.line))]
    Malformed { line: Option<u64>, message: String },
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl PlanError {
    fn malformed(line: Option<u64>, message: impl Into<String>) -> Self {
        PlanError::Malformed {
            line,
            message: message.into(),
        }
    }
}

/// Result type for plan persistence.
pub type PlanResult<T> = Result<T, PlanError>;

/// Write `plan` as CSV: committed groups in order, then the bucket.
pub fn write_plan_to<W: Write>(plan: &MatchPlan, mut writer: W) -> PlanResult<()> {
    writer.write_all(BOM.as_bytes())?;

    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);
    csv.write_record(PLAN_HEADER)?;

    for group in plan.groups().iter().chain(std::iter::once(plan.unmatched())) {
        for member in &group.members {
            let path = member.path.to_string_lossy();
            csv.write_record([
                group.group_id.as_str(),
                member.subgroup_tag.as_str(),
                member.enabled.as_token(),
                &*path,
            ])?;
        }
    }

    csv.flush()?;
    Ok(())
}

/// Write `plan` to `path` atomically (temp file, then rename).
pub fn write_plan(plan: &MatchPlan, path: &Path) -> PlanResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("csv.tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        write_plan_to(plan, &mut file)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;

    tracing::info!(
        "Wrote plan with {} group(s) and {} unmatched item(s) to {}",
        plan.groups().len(),
        plan.unmatched().members.len(),
        path.display()
    );
    Ok(())
}

/// Parse a plan table. Any structural problem fails the whole reload.
pub fn read_plan_from<R: Read>(mut reader: R) -> PlanResult<MatchPlan> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let content = content.strip_prefix(BOM).unwrap_or(&content);

    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(content.as_bytes());

    let header = csv
        .headers()
        .map_err(|e| PlanError::malformed(Some(1), e.to_string()))?;
    if header.len() != PLAN_HEADER.len()
        || header.iter().zip(PLAN_HEADER).any(|(got, want)| got.trim() != want)
    {
        return Err(PlanError::malformed(
            Some(1),
            format!("expected header {}", PLAN_HEADER.join(",")),
        ));
    }

    let mut plan = MatchPlan::new();
    let mut groups: Vec<MatchGroup> = Vec::new();

    for record in csv.records() {
        let record = record.map_err(|e| {
            let line = e.position().map(|p| p.line());
            PlanError::malformed(line, e.to_string())
        })?;
        let Some((group_id, member)) = parse_row(&record)? else {
            continue;
        };

        match groups.iter_mut().find(|g| g.group_id == group_id) {
            Some(group) => group.push(member),
            None => {
                let mut group = MatchGroup::new(group_id);
                group.push(member);
                groups.push(group);
            }
        }
    }

    for group in groups {
        plan.push_group(group);
    }
    Ok(plan)
}

/// Read a plan table from disk.
pub fn read_plan(path: &Path) -> PlanResult<MatchPlan> {
    let file = fs::File::open(path)?;
    let plan = read_plan_from(file)?;
    tracing::info!("Loaded {} group(s) from {}", plan.groups().len(), path.display());
    Ok(plan)
}

/// One data row; `None` for unmatched-bucket rows.
fn parse_row(record: &StringRecord) -> PlanResult<Option<(String, GroupMember)>> {
    let line = record.position().map(|p| p.line());

    let enabled_token = &record[2];
    let enabled = EnabledFlag::parse(enabled_token).ok_or_else(|| {
        PlanError::malformed(line, format!("unrecognized enabled flag '{}'", enabled_token))
    })?;

    let group_id = record[0].trim();
    if group_id.is_empty() {
        return Ok(None);
    }

    let path = &record[3];
    if path.trim().is_empty() {
        return Err(PlanError::malformed(line, "empty item_path"));
    }

    let member = GroupMember::new(record[1].trim(), path).with_enabled(enabled);
    Ok(Some((group_id.to_string(), member)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample_plan() -> MatchPlan {
        let mut plan = MatchPlan::new();

        let mut g1 = MatchGroup::new("001");
        g1.push(GroupMember::new("1", "/old/ep01.mkv"));
        g1.push(GroupMember::new("2", "/new/ep01.mkv"));
        plan.push_group(g1);

        let mut g2 = MatchGroup::new("002");
        g2.push(GroupMember::new("1", "/old/00_Menu.mkv"));
        g2.push(GroupMember::new("2.1", "/new/00_Menu_a.mkv"));
        g2.push(GroupMember::new("2.2", "/new/menu, \"b\".mkv"));
        plan.push_group(g2);

        plan.push_unmatched("/new/extra.mkv");
        plan
    }

    fn to_string(plan: &MatchPlan) -> String {
        let mut buf = Vec::new();
        write_plan_to(plan, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_bom_header_and_quoted_fields() {
        let text = to_string(&sample_plan());

        assert!(text.starts_with('\u{feff}'));
        let mut lines = text.trim_start_matches('\u{feff}').lines();
        assert_eq!(
            lines.next(),
            Some(r#""group_id","subgroup_tag","enabled_flag","item_path""#)
        );
        assert_eq!(lines.next(), Some(r#""001","1","","/old/ep01.mkv""#));
        assert!(text
            .trim_end()
            .ends_with(r#""","","","/new/extra.mkv""#));
    }

    #[test]
    fn reload_keeps_groups_and_skips_bucket() {
        let plan = sample_plan();
        let reloaded = read_plan_from(to_string(&plan).as_bytes()).unwrap();

        assert_eq!(reloaded.groups(), plan.groups());
        assert!(reloaded.unmatched().members.is_empty());
        assert_eq!(
            reloaded.get("002").unwrap().members[2].path,
            PathBuf::from("/new/menu, \"b\".mkv")
        );
    }

    #[test]
    fn reads_without_bom_and_groups_by_first_appearance() {
        let text = "group_id,subgroup_tag,enabled_flag,item_path\n\
                    B,1,,b1.mkv\n\
                    A,1,,a1.mkv\n\
                    B,2,,b2.mkv\n\
                    A,2,,a2.mkv\n";
        let plan = read_plan_from(text.as_bytes()).unwrap();

        let ids: Vec<&str> = plan.groups().iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(plan.get("B").unwrap().members.len(), 2);
    }

    #[test]
    fn enabled_tokens_resolve_after_reload() {
        let text = "group_id,subgroup_tag,enabled_flag,item_path\n\
                    001,1,Yes,a.mkv\n\
                    001,2,,b.mkv\n\
                    001,2,x,c.mkv\n\
                    002,1,,d.mkv\n\
                    002,2,N,e.mkv\n\
                    002,2,,f.mkv\n";
        let plan = read_plan_from(text.as_bytes()).unwrap();

        let enabled = |id: &str| -> Vec<String> {
            plan.get(id)
                .unwrap()
                .enabled_members()
                .iter()
                .map(|m| m.path.display().to_string())
                .collect()
        };
        assert_eq!(enabled("001"), vec!["a.mkv", "c.mkv"]);
        assert_eq!(enabled("002"), vec!["d.mkv", "f.mkv"]);
    }

    #[test]
    fn unknown_enabled_token_is_malformed() {
        let text = "group_id,subgroup_tag,enabled_flag,item_path\n001,1,maybe,a.mkv\n";
        match read_plan_from(text.as_bytes()) {
            Err(PlanError::Malformed { line, message }) => {
                assert_eq!(line, Some(2));
                assert!(message.contains("maybe"));
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn wrong_column_count_is_malformed() {
        let text = "group_id,subgroup_tag,enabled_flag,item_path\n001,1,a.mkv\n";
        assert!(matches!(
            read_plan_from(text.as_bytes()),
            Err(PlanError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_header_is_malformed() {
        assert!(matches!(
            read_plan_from("001,1,,a.mkv\n".as_bytes()),
            Err(PlanError::Malformed { .. })
        ));
        assert!(matches!(
            read_plan_from("".as_bytes()),
            Err(PlanError::Malformed { .. })
        ));
    }

    #[test]
    fn file_round_trip_is_atomic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plans").join("plan.csv");

        write_plan(&sample_plan(), &path).unwrap();

        assert!(!path.with_extension("csv.tmp").exists());
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(read_plan(&path).unwrap().groups().len(), 2);
    }
}
