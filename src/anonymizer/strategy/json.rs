//! JSON document randomization: structure and keys kept, values scrambled.

use super::numeric::scramble_digits;
use super::scramble::scramble_str;
use super::{Strategy, TypeClass, ValueError};
use rand::{Rng, RngCore};
use serde_json::{Map, Number, Value};

/// Randomize every value of a JSON object, recursing into nested objects and
/// arrays. Keys are never changed.
///
/// A value that does not look like an object is scrambled as plain text. A
/// value that starts with `{` but is not valid JSON is an error rather than
/// being passed through.
#[derive(Debug, Clone, Default)]
pub struct JsonStrategy;

impl JsonStrategy {
    fn randomize_object(
        &self,
        object: Map<String, Value>,
        rng: &mut dyn RngCore,
    ) -> Result<Map<String, Value>, ValueError> {
        object
            .into_iter()
            .map(|(key, value)| Ok((key, self.randomize_value(value, rng)?)))
            .collect()
    }

    fn randomize_value(&self, value: Value, rng: &mut dyn RngCore) -> Result<Value, ValueError> {
        Ok(match value {
            Value::Null => Value::Null,
            Value::Bool(_) => Value::Bool(rng.random()),
            Value::Number(n) => Value::Number(randomize_number(&n, rng)?),
            Value::String(s) => Value::String(scramble_str(&s, rng)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.randomize_value(item, rng))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(object) => Value::Object(self.randomize_object(object, rng)?),
        })
    }
}

/// Scramble the mantissa digits of a number. The exponent is kept, and a
/// mantissa that pushes the value past the `f64` range is clamped to
/// `f64::MAX` with the original sign.
fn randomize_number(n: &Number, rng: &mut dyn RngCore) -> Result<Number, ValueError> {
    let scrambled = scramble_digits(&n.to_string(), rng);
    match serde_json::from_str::<Number>(&scrambled) {
        Ok(number) => Ok(number),
        Err(e) => match scrambled.parse::<f64>() {
            Ok(v) if v.is_infinite() => Number::from_f64(f64::MAX.copysign(v)).ok_or_else(|| {
                ValueError::new(TypeClass::Json, "number out of range")
            }),
            _ => Err(ValueError::new(
                TypeClass::Json,
                format!("number re-parse failed: {}", e),
            )),
        },
    }
}

impl Strategy for JsonStrategy {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        if !value.trim_start().starts_with('{') {
            return Ok(scramble_str(value, rng));
        }

        let object: Map<String, Value> = serde_json::from_str(value)
            .map_err(|e| ValueError::new(TypeClass::Json, format!("invalid JSON object: {}", e)))?;

        let randomized = self.randomize_object(object, rng)?;
        serde_json::to_string(&randomized)
            .map_err(|e| ValueError::new(TypeClass::Json, format!("serialization failed: {}", e)))
    }

    fn class(&self) -> TypeClass {
        TypeClass::Json
    }
}
