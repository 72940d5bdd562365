//! Binds model values to the parameter types a prepared statement expects.

use chrono::{NaiveDate, NaiveDateTime};
use model::core::value::Value;
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_postgres::types::{ToSql, Type};

pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    fn of<T: ToSql + Sync + Send + 'static>(value: Option<T>) -> Self {
        PgParam(Box::new(value))
    }

    /// Converts `value` into the Rust type that `ty` accepts.
    pub fn coerce(value: Value, ty: &Type) -> Result<Self, String> {
        let mismatch = |v: &Value| format!("cannot bind {} value '{v}' as {ty}", v.type_name());

        let param = match *ty {
            Type::BOOL => PgParam::of(match &value {
                Value::Null => None,
                Value::Boolean(b) => Some(*b),
                Value::Int(i) => Some(*i != 0),
                Value::String(s) => Some(parse_flag(s).ok_or_else(|| mismatch(&value))?),
                other => return Err(mismatch(other)),
            }),
            Type::INT2 => PgParam::of(integer(&value, &mismatch)?
                .map(i16::try_from)
                .transpose()
                .map_err(|_| mismatch(&value))?),
            Type::INT4 => PgParam::of(integer(&value, &mismatch)?
                .map(i32::try_from)
                .transpose()
                .map_err(|_| mismatch(&value))?),
            Type::INT8 => PgParam::of(integer(&value, &mismatch)?),
            Type::FLOAT4 => PgParam::of(float(&value, &mismatch)?.map(|f| f as f32)),
            Type::FLOAT8 => PgParam::of(float(&value, &mismatch)?),
            Type::NUMERIC => PgParam::of(match &value {
                Value::Null => None,
                Value::Int(i) => Some(Decimal::from(*i)),
                other => Some(
                    other
                        .as_text()
                        .and_then(|s| Decimal::from_str(s.trim()).ok())
                        .ok_or_else(|| mismatch(other))?,
                ),
            }),
            Type::DATE => PgParam::of(match &value {
                Value::Null => None,
                Value::Date(d) => Some(*d),
                Value::Timestamp(ts) => Some(ts.date()),
                Value::String(s) => Some(
                    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| mismatch(&value))?,
                ),
                other => return Err(mismatch(other)),
            }),
            Type::TIMESTAMP | Type::TIMESTAMPTZ => {
                let naive = timestamp(&value).map_err(|_| mismatch(&value))?;
                if *ty == Type::TIMESTAMPTZ {
                    PgParam::of(naive.map(|n| n.and_utc()))
                } else {
                    PgParam::of(naive)
                }
            }
            Type::BYTEA => PgParam::of(match value {
                Value::Null => None,
                Value::Bytes(b) => Some(b),
                other => other.as_text().map(String::into_bytes),
            }),
            // text, varchar, bpchar, name and anything else text-like
            _ => PgParam::of(value.as_text()),
        };
        Ok(param)
    }
}

fn integer(value: &Value, mismatch: &dyn Fn(&Value) -> String) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        other => other.as_i64().map(Some).ok_or_else(|| mismatch(other)),
    }
}

fn float(value: &Value, mismatch: &dyn Fn(&Value) -> String) -> Result<Option<f64>, String> {
    match value {
        Value::Null => Ok(None),
        other => other.as_f64().map(Some).ok_or_else(|| mismatch(other)),
    }
}

fn timestamp(value: &Value) -> Result<Option<NaiveDateTime>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Timestamp(ts) => Ok(Some(*ts)),
        Value::Date(d) => Ok(d.and_hms_opt(0, 0, 0)),
        Value::String(s) => NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
            .map(Some)
            .map_err(|_| ()),
        _ => Err(()),
    }
}

/// Legacy flags come as `S`/`N` as often as `true`/`false`.
fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_uppercase().as_str() {
        "S" | "Y" | "T" | "TRUE" | "1" => Some(true),
        "N" | "F" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    /// Pairs each value with the statement's declared parameter type.
    pub fn coerce(values: Vec<Value>, types: &[Type]) -> Result<Self, String> {
        if values.len() != types.len() {
            return Err(format!(
                "statement expects {} parameters, got {}",
                types.len(),
                values.len()
            ));
        }
        let params = values
            .into_iter()
            .zip(types)
            .map(|(value, ty)| PgParam::coerce(value, ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { params })
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }
}
