//! CSV rendering of matrices and swing points.

use std::io::Write;

use crate::domain::error::BarmatrixError;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::key_to_date;
use crate::domain::swing::SwingPoint;

fn csv_error(e: csv::Error) -> BarmatrixError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => BarmatrixError::Io(io),
        other => BarmatrixError::Data {
            reason: format!("CSV write error: {:?}", other),
        },
    }
}

/// Row keys are rendered as dates; keys outside the calendar range are
/// written as plain integers.
fn format_key(key: i64) -> String {
    key_to_date(key)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| key.to_string())
}

/// Writes the full matrix: a `date` column, one column per header and a
/// trailing `comment` column when any row carries one.
pub fn write_matrix<W: Write>(matrix: &Matrix, out: W) -> Result<(), BarmatrixError> {
    let mut wtr = csv::Writer::from_writer(out);
    let with_comments = matrix.rows().iter().any(|r| !r.comment().is_empty());

    let mut header = vec!["date".to_string()];
    header.extend(
        matrix
            .headers()
            .iter()
            .enumerate()
            .map(|(i, h)| if h.is_empty() { format!("col{}", i) } else { h.clone() }),
    );
    if with_comments {
        header.push("comment".to_string());
    }
    wtr.write_record(&header).map_err(csv_error)?;

    for row in matrix.rows() {
        let mut record = vec![format_key(row.key())];
        record.extend(row.values().iter().map(|v| v.to_string()));
        if with_comments {
            record.push(row.comment().to_string());
        }
        wtr.write_record(&record).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_swings<W: Write>(points: &[SwingPoint], out: W) -> Result<(), BarmatrixError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "date", "index", "base", "kind", "value", "price", "delta", "broken",
    ])
    .map_err(csv_error)?;

    for p in points {
        wtr.write_record([
            format_key(p.timestamp),
            p.index.to_string(),
            p.base_type.to_string(),
            p.kind.to_string(),
            p.value.to_string(),
            p.price.to_string(),
            p.delta.to_string(),
            p.broken.to_string(),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::swing::{SwingBase, SwingKind};
    use chrono::NaiveDate;

    fn day_key(day: u32) -> i64 {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn matrix_renders_dates_headers_and_values() {
        let mut m = Matrix::with_headers(["Close", ""]);
        m.add_row(day_key(1)).set(0, 1.5).set(1, 2.0);
        m.add_row(day_key(2)).set(0, 3.0);

        let mut out = Vec::new();
        write_matrix(&m, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,Close,col1");
        assert_eq!(lines[1], "2024-05-01,1.5,2");
        assert_eq!(lines[2], "2024-05-02,3,0");
    }

    #[test]
    fn comments_add_trailing_column() {
        let mut m = Matrix::with_headers(["Close"]);
        m.add_row(day_key(1)).set(0, 1.0).set_comment("gap up");
        m.add_row(day_key(2)).set(0, 2.0);

        let mut out = Vec::new();
        write_matrix(&m, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,Close,comment");
        assert_eq!(lines[1], "2024-05-01,1,gap up");
        assert_eq!(lines[2], "2024-05-02,2,");
    }

    #[test]
    fn swings_render_one_line_each() {
        let points = vec![SwingPoint {
            timestamp: day_key(3),
            base_type: SwingBase::High,
            kind: SwingKind::HigherHigh,
            value: 12.5,
            price: 12.0,
            index: 2,
            delta: 0.0,
            broken: true,
        }];
        let mut out = Vec::new();
        write_swings(&points, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2024-05-03,2,High,HH,12.5,12,0,true");
    }
}
