use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Normalises a value about to be stored as a unit input or weight.
///
/// NaN is the only non-numeric `f64`; it becomes 0.  Infinities are kept, they
/// are numbers.
pub fn to_number(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

/// Parses one text field into a number, coercing anything unparseable to 0.
///
/// Surrounding whitespace is ignored and an empty field reads as 0, the same
/// way a partially typed form field would.
pub fn parse_value(s: &str) -> f64 {
    s.trim().parse::<f64>().map(to_number).unwrap_or(0.0)
}

/// Parses a comma-separated list such as `"0.05, 0.1"` into numbers.
///
/// Every entry that is not a number becomes 0; the number of entries is always
/// one more than the number of commas.
pub fn parse_values(s: &str) -> Vec<f64> {
    s.split(',').map(parse_value).collect()
}

/// Parses a comma-separated list of layer sizes.  Entries that are not
/// non-negative integers become 0.
pub fn parse_counts(s: &str) -> Vec<usize> {
    s.split(',')
        .map(|part| part.trim().parse::<usize>().unwrap_or(0))
        .collect()
}

/// Coerces an arbitrary JSON value to a number.
pub fn value_to_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().map(to_number).unwrap_or(0.0),
        Value::String(s) => parse_value(s),
        Value::Bool(b) => if *b { 1.0 } else { 0.0 },
        _ => 0.0,
    }
}

/// Coerces a JSON value to a list of numbers.
///
/// Arrays are coerced entry by entry, a string is read as a comma-separated
/// list, `null` is empty and any other scalar is a one-element list.
pub fn numbers_from_value(v: &Value) -> Vec<f64> {
    match v {
        Value::Array(items) => items.iter().map(value_to_number).collect(),
        Value::String(s) => parse_values(s),
        Value::Null => Vec::new(),
        other => vec![value_to_number(other)],
    }
}

/// serde helper: a sequence whose non-numeric entries are read as 0.
pub fn lenient_numbers<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(numbers_from_value(&raw))
}

/// serde helper: a scalar that is read as 0 when it is not a number.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(value_to_number(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_values_coerces_garbage_to_zero() {
        assert_eq!(parse_values("0.05, 0.1"), vec![0.05, 0.1]);
        assert_eq!(parse_values("1,abc, ,2"), vec![1.0, 0.0, 0.0, 2.0]);
        assert_eq!(parse_values(""), vec![0.0]);
        assert_eq!(parse_values("NaN,3"), vec![0.0, 3.0]);
    }

    #[test]
    fn parse_counts_reads_sizes() {
        assert_eq!(parse_counts("2, 5,3"), vec![2, 5, 3]);
        assert_eq!(parse_counts("2,x"), vec![2, 0]);
    }

    #[test]
    fn lenient_numbers_accepts_mixed_json() {
        #[derive(Deserialize)]
        struct Doc {
            #[serde(deserialize_with = "lenient_numbers")]
            weights: Vec<f64>,
            #[serde(deserialize_with = "lenient_number")]
            bias: f64,
        }
        let doc: Doc = serde_json::from_str(r#"{"weights":[0.5,"0.25",null,"x",true],"bias":"oops"}"#).unwrap();
        assert_eq!(doc.weights, vec![0.5, 0.25, 0.0, 0.0, 1.0]);
        assert_eq!(doc.bias, 0.0);
    }

    #[test]
    fn comma_separated_strings_are_lists() {
        assert_eq!(numbers_from_value(&Value::from("0.5, 1")), vec![0.5, 1.0]);
        assert_eq!(numbers_from_value(&Value::Null), Vec::<f64>::new());
        assert_eq!(numbers_from_value(&Value::from(2.5)), vec![2.5]);
    }

    #[test]
    fn to_number_keeps_infinities() {
        assert_eq!(to_number(f64::NAN), 0.0);
        assert_eq!(to_number(f64::INFINITY), f64::INFINITY);
    }
}
