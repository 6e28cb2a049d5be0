//! Contact time reports: two whitespace-separated numeric columns per
//! line, no header.

use crate::record::ContactTimeRow;

use super::ParseError;

#[derive(Debug, PartialEq)]
pub enum ContactTimeLine {
    Row(ContactTimeRow),
    Blank,
}

pub fn parse_line(line: &str, lineno: usize) -> Result<ContactTimeLine, ParseError> {
    let mut columns = line.split_whitespace();
    match (columns.next(), columns.next(), columns.next()) {
        (None, _, _) => Ok(ContactTimeLine::Blank),
        (Some(time), Some(contact_time), None) => {
            match (time.parse::<f64>(), contact_time.parse::<f64>()) {
                (Ok(time), Ok(contact_time)) => Ok(ContactTimeLine::Row(ContactTimeRow {
                    time,
                    contact_time,
                })),
                _ => Err(ParseError::ContactTimeRow {
                    lineno,
                    line: line.into(),
                }),
            }
        }
        _ => Err(ParseError::ContactTimeRow {
            lineno,
            line: line.into(),
        }),
    }
}

pub fn parse_str(s: &str) -> Result<Vec<ContactTimeRow>, ParseError> {
    let mut rows = Vec::new();
    for (lineno0, line) in s.lines().enumerate() {
        match parse_line(line, lineno0 + 1)? {
            ContactTimeLine::Row(row) => rows.push(row),
            ContactTimeLine::Blank => (),
        }
    }
    Ok(rows)
}
