use anyhow::{Result, anyhow};
use fraction::{Fraction, ToPrimitive};
use serde_yaml::{Mapping, Sequence, Value};

use crate::pdfa_framework::pdfa_error::PdfaError;

pub fn read_field_integer(yaml: &Value, field: &str) -> Result<i64, PdfaError> {
    read_integer(&yaml[field]).map_err(|e| PdfaError::format(field, e))
}

pub fn read_field_probability(yaml: &Value, field: &str) -> Result<f64, PdfaError> {
    read_probability(&yaml[field]).map_err(|e| PdfaError::format(field, e))
}

pub fn read_field_bool(yaml: &Value, field: &str) -> Result<bool, PdfaError> {
    read_bool(&yaml[field]).map_err(|e| PdfaError::format(field, e))
}

pub fn read_field_string(yaml: &Value, field: &str) -> Result<String, PdfaError> {
    read_string(&yaml[field]).map_err(|e| PdfaError::format(field, e))
}

pub fn read_field_list<'a>(yaml: &'a Value, field: &str) -> Result<&'a Sequence, PdfaError> {
    read_list(&yaml[field]).map_err(|e| PdfaError::format(field, e))
}

pub fn read_field_mapping<'a>(yaml: &'a Value, field: &str) -> Result<&'a Mapping, PdfaError> {
    read_mapping(&yaml[field]).map_err(|e| PdfaError::format(field, e))
}

/**
 * Reads a field that may be absent or null. Such a field yields None.
 */
pub fn read_optional_field<'a, T>(
    yaml: &'a Value,
    field: &str,
    reader: impl FnOnce(&'a Value) -> Result<T>,
) -> Result<Option<T>, PdfaError> {
    match &yaml[field] {
        Value::Null => Ok(None),
        value => reader(value)
            .map(Some)
            .map_err(|e| PdfaError::format(field, e)),
    }
}

pub fn read_integer(yaml: &Value) -> Result<i64> {
    match yaml {
        Value::Null => Err(anyhow!("field not found")),
        Value::Bool(_) => Err(anyhow!("field is a boolean, where integer expected")),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| anyhow!("number {} is not an integer", n)),
        Value::String(s) => Ok(s
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("literal `{}` is not an integer", s))?),
        Value::Sequence(_) => Err(anyhow!("field is a list, where integer expected")),
        Value::Mapping(_) => Err(anyhow!("field is an object, where integer expected")),
        Value::Tagged(_) => Err(anyhow!("field is a tagged value, where integer expected")),
    }
}

/**
 * Reads a real number. Besides plain numbers, a literal holding a decimal ("0.25") or a
 * fraction ("1/4") is accepted. Bounds are not checked here.
 */
pub fn read_probability(yaml: &Value) -> Result<f64> {
    match yaml {
        Value::Null => Err(anyhow!("field not found")),
        Value::Bool(_) => Err(anyhow!("field is a boolean, where number expected")),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow!("number {} cannot be represented", n)),
        Value::String(s) => parse_probability(s),
        Value::Sequence(_) => Err(anyhow!("field is a list, where number expected")),
        Value::Mapping(_) => Err(anyhow!("field is an object, where number expected")),
        Value::Tagged(_) => Err(anyhow!("field is a tagged value, where number expected")),
    }
}

fn parse_probability(s: &str) -> Result<f64> {
    let s = s.trim();
    let fraction = s
        .parse::<Fraction>()
        .map_err(|_| anyhow!("literal `{}` is not a number", s))?;
    if fraction.is_nan() || fraction.is_infinite() {
        return Err(anyhow!("literal `{}` is not a finite number", s));
    }
    fraction
        .to_f64()
        .ok_or_else(|| anyhow!("literal `{}` cannot be represented", s))
}

pub fn read_bool(yaml: &Value) -> Result<bool> {
    match yaml {
        Value::Null => Err(anyhow!("field not found")),
        Value::Bool(b) => Ok(*b),
        Value::Number(_) => Err(anyhow!("field is a number, where boolean expected")),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(anyhow!("literal `{}` is not a boolean", s)),
        },
        Value::Sequence(_) => Err(anyhow!("field is a list, where boolean expected")),
        Value::Mapping(_) => Err(anyhow!("field is an object, where boolean expected")),
        Value::Tagged(_) => Err(anyhow!("field is a tagged value, where boolean expected")),
    }
}

/**
 * Reads a literal. Numbers and booleans are coerced to their textual form, as symbols and state
 * identifiers are often written unquoted.
 */
pub fn read_string(yaml: &Value) -> Result<String> {
    match yaml {
        Value::Null => Err(anyhow!("field not found")),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.to_string()),
        Value::Sequence(_) => Err(anyhow!("field is a list, where literal expected")),
        Value::Mapping(_) => Err(anyhow!("field is an object, where literal expected")),
        Value::Tagged(_) => Err(anyhow!("field is a tagged value, where literal expected")),
    }
}

pub fn read_list(yaml: &Value) -> Result<&Sequence> {
    match yaml {
        Value::Null => Err(anyhow!("field not found")),
        Value::Bool(_) => Err(anyhow!("field is a boolean, where list expected")),
        Value::Number(_) => Err(anyhow!("field is a number, where list expected")),
        Value::String(_) => Err(anyhow!("field is a literal, where list expected")),
        Value::Sequence(list) => Ok(list),
        Value::Mapping(_) => Err(anyhow!("field is an object, where list expected")),
        Value::Tagged(_) => Err(anyhow!("field is a tagged value, where list expected")),
    }
}

pub fn read_mapping(yaml: &Value) -> Result<&Mapping> {
    match yaml {
        Value::Null => Err(anyhow!("field not found")),
        Value::Bool(_) => Err(anyhow!("field is a boolean, where object expected")),
        Value::Number(_) => Err(anyhow!("field is a number, where object expected")),
        Value::String(_) => Err(anyhow!("field is a literal, where object expected")),
        Value::Sequence(_) => Err(anyhow!("field is a list, where object expected")),
        Value::Mapping(mapping) => Ok(mapping),
        Value::Tagged(_) => Err(anyhow!("field is a tagged value, where object expected")),
    }
}
