use chrono::{NaiveDate, NaiveTime};
use model::{
    core::value::Value,
    records::row::{SourceField, SourceRow},
};
use mysql_async::{Row, Value as MySqlValue};

pub(crate) fn to_source_row(row: Row) -> SourceRow {
    let columns = row.columns();
    let values = row.unwrap();
    let fields = columns
        .iter()
        .zip(values)
        .map(|(col, value)| SourceField {
            name: col.name_str().to_string(),
            value: to_value(value),
        })
        .collect();
    SourceRow::new(fields)
}

pub(crate) fn to_value(value: MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(bytes) => Value::String(decode_text(bytes)),
        MySqlValue::Int(i) => Value::Int(i),
        MySqlValue::UInt(u) => match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(u as f64),
        },
        MySqlValue::Float(f) => Value::Float(f as f64),
        MySqlValue::Double(f) => Value::Float(f),
        MySqlValue::Date(y, m, d, hh, mm, ss, us) => {
            let Some(date) = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32) else {
                return Value::Null;
            };
            if (hh, mm, ss, us) == (0, 0, 0, 0) {
                return Value::Date(date);
            }
            NaiveTime::from_hms_micro_opt(hh as u32, mm as u32, ss as u32, us)
                .map(|t| Value::Timestamp(date.and_time(t)))
                .unwrap_or(Value::Date(date))
        }
        MySqlValue::Time(neg, days, hh, mm, ss, us) => {
            let sign = if neg { "-" } else { "" };
            let hours = days * 24 + hh as u32;
            Value::String(format!("{sign}{hours:02}:{mm:02}:{ss:02}.{us:06}"))
        }
    }
}

/// Text columns arrive as raw bytes. Legacy data is not always UTF-8, so
/// anything that fails to decode is read as Latin-1, one char per byte.
pub(crate) fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}
