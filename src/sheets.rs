//! Remote training-sheet collaborators: the published-CSV row source and the
//! tabular write-back.

use anyhow::{Context, Result};
use tracing::info;

use crate::mapper::Log10Process;
use crate::tabular::Table;

/// Column order of the write-back payload.
pub const RESULT_HEADERS: [&str; 6] = [
    "Process_Name",
    "URL_Module",
    "Start_Tab",
    "Video_Link",
    "Platform",
    "Active",
];

/// One row of the training input sheet.
#[derive(Debug, Clone)]
pub struct TrainingRow {
    pub process_name: String,
    pub ppt_link: String,
    pub video_link: String,
}

/// Fetch the training input rows from the published-sheet CSV.
pub async fn fetch_training_rows(
    client: &reqwest::Client,
    csv_url: &str,
) -> Result<Vec<TrainingRow>> {
    info!("fetching training rows");
    let text = client
        .get(csv_url)
        .send()
        .await?
        .error_for_status()
        .context("training sheet request failed")?
        .text()
        .await
        .context("failed to read training sheet body")?;
    let rows = rows_from_csv(&text);
    info!("retrieved {} training rows", rows.len());
    Ok(rows)
}

/// Parse sheet CSV text into training rows. Unknown columns are ignored,
/// missing ones read as empty.
pub fn rows_from_csv(text: &str) -> Vec<TrainingRow> {
    let table = Table::parse(text);
    table
        .rows
        .iter()
        .map(|row| TrainingRow {
            process_name: field(&table, row, "process_name"),
            ppt_link: field(&table, row, "ppt_link"),
            video_link: field(&table, row, "video_link"),
        })
        .collect()
}

fn field(table: &Table, row: &[String], name: &str) -> String {
    table.field(row, name).unwrap_or("").trim().to_string()
}

/// Replace the remote results tab with the extracted Log10 processes,
/// posted as a header row plus one row per process.
pub async fn push_results(
    client: &reqwest::Client,
    webhook_url: &str,
    processes: &[Log10Process],
) -> Result<()> {
    let rows: Vec<Vec<String>> = processes.iter().map(result_row).collect();
    let payload = serde_json::json!({
        "headers": RESULT_HEADERS,
        "rows": rows,
    });

    client
        .post(webhook_url)
        .json(&payload)
        .send()
        .await?
        .error_for_status()
        .context("sheet write-back rejected")?;

    info!("pushed {} processes to the results sheet", processes.len());
    Ok(())
}

fn result_row(proc: &Log10Process) -> Vec<String> {
    vec![
        proc.process_name.clone(),
        proc.url_module.clone().unwrap_or_default(),
        proc.start_tab.clone(),
        proc.video_link.clone(),
        proc.platform.clone(),
        "TRUE".to_string(),
    ]
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_from_published_csv() {
        let csv = "\u{feff}process_name,ppt_link,video_link\n\
                   RTO Bagging,https://drive.google.com/file/d/abc/view,https://videos.example/rto\n\
                   ,https://drive.google.com/open?id=def,\n";
        let rows = rows_from_csv(csv);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].process_name, "RTO Bagging");
        assert_eq!(rows[0].video_link, "https://videos.example/rto");
        assert!(rows[1].process_name.is_empty());
        assert_eq!(rows[1].ppt_link, "https://drive.google.com/open?id=def");
    }

    #[test]
    fn missing_columns_read_as_empty() {
        let rows = rows_from_csv("process_name\nRTO Bagging\n");
        assert_eq!(rows[0].process_name, "RTO Bagging");
        assert!(rows[0].ppt_link.is_empty());
        assert!(rows[0].video_link.is_empty());
    }

    #[test]
    fn result_row_order_matches_headers() {
        let proc = Log10Process {
            process_name: "RTO Bagging".into(),
            platform: "log10".into(),
            start_tab: "RTO".into(),
            url_module: Some("rto".into()),
            steps: vec!["RTO".into()],
            video_link: "https://videos.example/rto".into(),
            needs_review: false,
        };
        let row = result_row(&proc);
        assert_eq!(row.len(), RESULT_HEADERS.len());
        assert_eq!(row[0], "RTO Bagging");
        assert_eq!(row[1], "rto");
        assert_eq!(row[2], "RTO");
        assert_eq!(row[3], "https://videos.example/rto");
        assert_eq!(row[4], "log10");
        assert_eq!(row[5], "TRUE");
    }
}
