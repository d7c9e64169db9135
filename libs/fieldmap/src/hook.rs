use crate::error::BoxError;
use crate::value::Value;

/// Custom encode hook: replaces default extraction of a field's type.
///
/// A failing hook does not fail the extraction; the field is reported as
/// `Value::Null` instead.
pub trait MapEncode {
    fn map_encode(&self) -> Result<Value, BoxError>;
}

/// Custom decode hook: absorbs a dynamic value into a zero value of the
/// field's type. A failure is fatal to that field.
pub trait MapDecode {
    fn map_decode(&mut self, value: Value) -> Result<(), BoxError>;
}

/// Implement `FieldValue` for a non-record type through its hooks.
///
/// The type must implement `MapEncode`, `MapDecode` and `Default`. With
/// `column` it must also implement `Column`, and the row adapter will scan
/// into it directly.
///
/// ```ignore
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Celsius(f64);
///
/// impl MapEncode for Celsius { /* ... */ }
/// impl MapDecode for Celsius { /* ... */ }
///
/// fieldmap::custom_field!(Celsius);
/// ```
#[macro_export]
macro_rules! custom_field {
    (@impl $ty:ty, $column:expr) => {
        impl $crate::FieldValue for $ty {
            fn kind() -> $crate::Kind {
                $crate::Kind::Custom(::core::stringify!($ty))
            }

            fn zero() -> Self {
                ::core::default::Default::default()
            }

            fn to_value(&self, _scheme: &str) -> $crate::Value {
                $crate::extract::encode_hook(self)
            }

            fn exact(value: $crate::Value) -> $crate::Step<Self> {
                $crate::Step::Next(value)
            }

            fn decode(value: $crate::Value) -> $crate::Step<Self> {
                $crate::coerce::decode_hook(value)
            }

            fn column() -> ::core::option::Option<::std::boxed::Box<dyn $crate::Column>> {
                $column
            }
        }
    };
    ($ty:ty, column) => {
        $crate::custom_field!(
            @impl $ty,
            ::core::option::Option::Some(
                ::std::boxed::Box::new(<$ty as $crate::FieldValue>::zero())
                    as ::std::boxed::Box<dyn $crate::Column>
            )
        );
    };
    ($ty:ty) => {
        $crate::custom_field!(@impl $ty, ::core::option::Option::None);
    };
}

#[cfg(test)]
mod tests {
    use crate::coerce::{Step, coerce};
    use crate::error::{BoxError, Reason};
    use crate::field::FieldValue;
    use crate::value::Value;

    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Celsius(f64);

    impl MapEncode for Celsius {
        fn map_encode(&self) -> Result<Value, BoxError> {
            if self.0.is_nan() {
                return Err("not a temperature".into());
            }
            Ok(Value::Str(format!("{}C", self.0)))
        }
    }

    impl MapDecode for Celsius {
        fn map_decode(&mut self, value: Value) -> Result<(), BoxError> {
            match value {
                Value::Str(s) => {
                    let digits = s.strip_suffix('C').ok_or("missing unit")?;
                    self.0 = digits.parse()?;
                    Ok(())
                }
                Value::F64(v) => {
                    self.0 = v;
                    Ok(())
                }
                other => Err(format!("cannot decode {} as Celsius", other.type_name()).into()),
            }
        }
    }

    crate::custom_field!(Celsius);

    #[test]
    fn encode_hook_drives_extraction() {
        assert_eq!(Celsius(21.5).to_value(""), Value::Str("21.5C".into()));
    }

    #[test]
    fn failing_encode_hook_degrades_to_nil() {
        assert_eq!(Celsius(f64::NAN).to_value(""), Value::Null);
    }

    #[test]
    fn decode_hook_runs_on_raw_value() {
        let c: Celsius = coerce(Value::from("18C"), "").unwrap();
        assert_eq!(c, Celsius(18.0));
        let c: Option<Celsius> = coerce(Value::F64(3.0), "").unwrap();
        assert_eq!(c, Some(Celsius(3.0)));
    }

    #[test]
    fn decode_hook_failure_is_verbatim() {
        let err = coerce::<Celsius>(Value::from("18F"), "").unwrap_err();
        assert!(matches!(err, Reason::Hook(_)));
        assert_eq!(err.to_string(), "missing unit");
        assert!(matches!(Celsius::exact(Value::F64(1.0)), Step::Next(_)));
    }
}
