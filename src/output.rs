use crate::error::Result;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PublisherRankingRow;

    #[test]
    fn csv_and_json_writers_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("rows.csv");
        let json_path = dir.path().join("value.json");

        let rows = vec![PublisherRankingRow {
            publisher: "Marvel".into(),
            films: 2,
            films_with_roi: 2,
            mean_roi: "3.1812".into(),
            median_recent_roi: "3.1812".into(),
        }];
        write_csv(csv_path.to_str().unwrap(), &rows).unwrap();
        let written = std::fs::read_to_string(&csv_path).unwrap();
        assert!(written.starts_with("Publisher,Films,FilmsWithROI,MeanROI,MedianRecentROI"));
        assert!(written.contains("Marvel,2,2,3.1812,3.1812"));

        write_json(json_path.to_str().unwrap(), &rows).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json[0]["Publisher"], "Marvel");
    }
}
