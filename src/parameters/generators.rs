//! Value generators for parameter sweeps
//!
//! A generator is itself a parameter holder: its settings (e.g. the bounds
//! of a sequence) are edited like any other parameters before the values
//! are produced.

use std::fmt::Display;

use num_traits::{NumCast, ToPrimitive, Zero};

use super::descriptor::{FieldType, ParameterDescriptor};
use super::events::ParameterEvents;
use super::holder::ParameterHolder;
use super::value::ParameterValue;
use crate::error::{McatError, Result};

/// Produces a list of values for one field type
pub trait ParameterGenerator: ParameterHolder {
    /// Field type of the produced values
    fn field_type(&self) -> FieldType;

    fn generate(&self) -> Result<Vec<ParameterValue>>;
}

/// Largest number of values a single sequence may produce
pub const MAX_GENERATED_VALUES: u64 = 1_000_000;

/// Numbers a [`NumberSequenceGenerator`] can step through
pub trait SequenceNumber: Copy + PartialOrd + Display + NumCast + Zero + 'static {
    const FIELD_TYPE: FieldType;

    /// Number of whole `step`s from `from` to at most `to`, for
    /// `from <= to` and a positive `step`; None if it is not representable
    fn steps_between(from: Self, to: Self, step: Self) -> Option<u64>;

    /// `from + n * step`, or None on overflow
    fn nth(from: Self, step: Self, n: u64) -> Option<Self>;

    fn to_value(self) -> ParameterValue {
        match Self::FIELD_TYPE {
            FieldType::Int => ParameterValue::Int(self.to_i64().unwrap_or_default()),
            _ => ParameterValue::Double(self.to_f64().unwrap_or_default()),
        }
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Int(i) => NumCast::from(*i),
            ParameterValue::Double(d) => NumCast::from(*d),
            _ => None,
        }
    }
}

// Integers are stepped exactly in i128, which holds any i64 span.
macro_rules! integer_sequence {
    ($($t:ty),*) => {$(
        impl SequenceNumber for $t {
            const FIELD_TYPE: FieldType = FieldType::Int;

            fn steps_between(from: Self, to: Self, step: Self) -> Option<u64> {
                let span = <i128 as From<_>>::from(to) - <i128 as From<_>>::from(from);
                u64::try_from(span / <i128 as From<_>>::from(step)).ok()
            }

            fn nth(from: Self, step: Self, n: u64) -> Option<Self> {
                let offset = <i128 as From<_>>::from(step).checked_mul(<i128 as From<_>>::from(n))?;
                Self::try_from(<i128 as From<_>>::from(from).checked_add(offset)?).ok()
            }
        }
    )*};
}

// Counting steps instead of accumulating them avoids drift.
macro_rules! float_sequence {
    ($($t:ty),*) => {$(
        impl SequenceNumber for $t {
            const FIELD_TYPE: FieldType = FieldType::Double;

            fn steps_between(from: Self, to: Self, step: Self) -> Option<u64> {
                let count = (<f64 as From<_>>::from(to) - <f64 as From<_>>::from(from)) / <f64 as From<_>>::from(step) + 1e-9;
                count.floor().to_u64()
            }

            fn nth(from: Self, step: Self, n: u64) -> Option<Self> {
                let value = <f64 as From<_>>::from(from) + <f64 as From<_>>::from(step) * n.to_f64()?;
                if value.is_finite() {
                    NumCast::from(value)
                } else {
                    None
                }
            }
        }
    )*};
}

integer_sequence!(i32, i64);
float_sequence!(f32, f64);

/// Inclusive arithmetic sequence `from, from + step, ..., <= to`
#[derive(Debug, Clone)]
pub struct NumberSequenceGenerator<T: SequenceNumber> {
    pub from: T,
    pub to: T,
    pub step: T,
    events: ParameterEvents,
}

impl<T: SequenceNumber> NumberSequenceGenerator<T> {
    pub fn new(from: T, to: T, step: T) -> Self {
        Self {
            from,
            to,
            step,
            events: ParameterEvents::new(),
        }
    }

    fn descriptors() -> Vec<ParameterDescriptor> {
        vec![
            ParameterDescriptor::new("from", T::FIELD_TYPE)
                .with_name("From")
                .with_description("First generated value"),
            ParameterDescriptor::new("to", T::FIELD_TYPE)
                .with_name("To")
                .with_description("Upper bound, included if reached"),
            ParameterDescriptor::new("step", T::FIELD_TYPE)
                .with_name("Step")
                .with_description("Distance between consecutive values; must be positive"),
        ]
    }
}

impl<T: SequenceNumber> Default for NumberSequenceGenerator<T> {
    fn default() -> Self {
        let zero = T::zero();
        let one = NumCast::from(1).unwrap_or(zero);
        Self::new(zero, zero, one)
    }
}

impl<T: SequenceNumber> ParameterHolder for NumberSequenceGenerator<T> {
    fn holder_name(&self) -> String {
        "Number sequence".to_string()
    }

    fn holder_description(&self) -> String {
        "Generates evenly spaced numbers".to_string()
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        Self::descriptors()
    }

    fn read_parameter(&self, key: &str) -> Option<ParameterValue> {
        match key {
            "from" => Some(self.from.to_value()),
            "to" => Some(self.to.to_value()),
            "step" => Some(self.step.to_value()),
            _ => None,
        }
    }

    fn write_parameter(&mut self, key: &str, value: ParameterValue) -> bool {
        let Some(number) = T::from_value(&value) else {
            return false;
        };
        match key {
            "from" => self.from = number,
            "to" => self.to = number,
            "step" if number > T::zero() => self.step = number,
            _ => return false,
        }
        true
    }
}

impl<T: SequenceNumber> ParameterGenerator for NumberSequenceGenerator<T> {
    fn field_type(&self) -> FieldType {
        T::FIELD_TYPE
    }

    fn generate(&self) -> Result<Vec<ParameterValue>> {
        if self.step <= T::zero() {
            return Err(McatError::InvalidValue {
                field_type: T::FIELD_TYPE,
                input: format!("step {}", self.step),
            });
        }
        if self.from > self.to {
            return Ok(Vec::new());
        }

        let count = T::steps_between(self.from, self.to, self.step)
            .filter(|count| *count < MAX_GENERATED_VALUES)
            .ok_or_else(|| McatError::InvalidValue {
                field_type: T::FIELD_TYPE,
                input: format!(
                    "{}..={} by {} (at most {} values)",
                    self.from, self.to, self.step, MAX_GENERATED_VALUES
                ),
            })?;

        (0..=count)
            .map(|i| {
                T::nth(self.from, self.step, i)
                    .map(T::to_value)
                    .ok_or_else(|| McatError::InvalidValue {
                        field_type: T::FIELD_TYPE,
                        input: format!("{} + {} * {}", self.from, i, self.step),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integer_sequence_is_inclusive() {
        let generator = NumberSequenceGenerator::new(2i32, 8, 3);
        let values = generator.generate().unwrap();
        assert_eq!(
            values,
            vec![
                ParameterValue::Int(2),
                ParameterValue::Int(5),
                ParameterValue::Int(8)
            ]
        );
    }

    #[test]
    fn test_double_sequence() {
        let generator = NumberSequenceGenerator::new(0.0f64, 1.0, 0.25);
        let values = generator.generate().unwrap();
        assert_eq!(values.len(), 5);
        assert_relative_eq!(values[4].as_double().unwrap(), 1.0);
    }

    #[test]
    fn test_empty_when_from_exceeds_to() {
        let generator = NumberSequenceGenerator::new(5i64, 1, 1);
        assert!(generator.generate().unwrap().is_empty());
    }

    #[test]
    fn test_non_positive_step_is_refused() {
        let mut generator = NumberSequenceGenerator::<i32>::default();
        assert!(!generator.set_value("step", ParameterValue::Int(0)));
        assert_eq!(generator.step, 1);

        generator.step = -1;
        assert!(generator.generate().is_err());
    }

    #[test]
    fn test_bounds_are_parameters() {
        let mut generator = NumberSequenceGenerator::<f64>::default();
        assert!(generator.set_value("to", ParameterValue::Int(2)));
        assert!(generator.set_value("step", ParameterValue::Double(1.0)));
        assert_eq!(generator.generate().unwrap().len(), 3);
    }

    #[test]
    fn test_large_integers_stay_exact() {
        let generator = NumberSequenceGenerator::new(
            9_007_199_254_740_993i64,
            9_007_199_254_740_993,
            1,
        );
        assert_eq!(
            generator.generate().unwrap(),
            vec![ParameterValue::Int(9_007_199_254_740_993)]
        );
    }

    #[test]
    fn test_sequence_ending_at_type_maximum() {
        let generator = NumberSequenceGenerator::new(i32::MAX - 2, i32::MAX, 1);
        let values = generator.generate().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], ParameterValue::Int(<i64 as From<i32>>::from(i32::MAX)));
    }

    #[test]
    fn test_oversized_sequence_is_refused() {
        let generator = NumberSequenceGenerator::new(i64::MIN, i64::MAX, 1);
        let err = generator.generate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_VALUE");

        let generator = NumberSequenceGenerator::new(0.0f64, 1e12, 1.0);
        assert!(generator.generate().is_err());
    }
}
