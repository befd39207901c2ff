//! Serde helpers for `f64` fields that may hold `±∞` or NaN
//!
//! JSON has no literal for non-finite numbers, so they are written as the
//! strings `"inf"`, `"-inf"` and `"NaN"`. Finite values stay plain numbers.
//! Reading accepts either form.

use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if value.is_sign_positive() {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_str("-inf")
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(value) => Ok(value),
        Repr::Text(text) => text
            .parse::<f64>()
            .map_err(|_| SerdeError::custom(format!("invalid float '{}'", text))),
    }
}

#[derive(Serialize, Deserialize)]
struct Float(#[serde(with = "super::non_finite")] f64);

/// Same encoding for every element of a `Vec<f64>`
pub mod vec {
    use super::Float;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(|&v| Float(v)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<Float>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|Float(v)| v).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Scores {
        #[serde(with = "super")]
        value: f64,
        #[serde(with = "super::vec")]
        samples: Vec<f64>,
    }

    #[test]
    fn test_non_finite_values_survive_json() {
        let scores = Scores {
            value: f64::INFINITY,
            samples: vec![1.5, f64::NEG_INFINITY, f64::NAN],
        };
        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"value":"inf","samples":[1.5,"-inf","NaN"]}"#);

        let back: Scores = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, f64::INFINITY);
        assert_eq!(back.samples[0], 1.5);
        assert_eq!(back.samples[1], f64::NEG_INFINITY);
        assert!(back.samples[2].is_nan());
    }

    #[test]
    fn test_rejects_garbage_text() {
        let result = serde_json::from_str::<Scores>(r#"{"value":"lots","samples":[]}"#);
        assert!(result.is_err());
    }
}
