//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Adapter for `#[graphql(with = ..)]` attribute, representing a GraphQL
/// scalar as a string via the [`FromStr`] and [`Display`] impls of the `As`
/// domain type.
///
/// The scalar itself must wrap `As`, being convertible from it with
/// [`TryFrom`] and exposing it with [`AsRef`].
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Outputs the `value` as a string scalar.
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::scalar(value.as_ref().to_string())
    }

    /// Parses the `input` string into `As`, and then converts it into the
    /// scalar.
    ///
    /// # Errors
    ///
    /// If the `input` is not a string, or it's not a valid `As`, or `As` is
    /// not a valid scalar value.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("<unnamed>");
        let fail = |reason: &dyn fmt::Display| {
            format!("Cannot parse input scalar `{name}`: {reason}")
        };

        let Some(s) = input.as_string_value() else {
            return Err(fail(&format_args!(
                "expected string input value, found: {input}",
            )));
        };
        let value = s.parse::<As>().map_err(|e| {
            fail(&format_args!("\"{s}\" string is invalid: {e}"))
        })?;
        T::try_from(value).map_err(|e| fail(&e))
    }

    /// Parses the provided [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};
    use service::domain;

    use crate::api::user;

    use super::Via;

    type Name = Via<domain::user::Name>;

    #[test]
    fn parses_valid_string() {
        let name = Name::from_input::<user::Name, DefaultScalarValue>(
            &InputValue::scalar("John Doe".to_owned()),
        )
        .unwrap();

        assert_eq!(name.to_string(), "John Doe");
    }

    #[test]
    fn rejects_invalid_string() {
        let err = Name::from_input::<user::Name, DefaultScalarValue>(
            &InputValue::scalar(" John ".to_owned()),
        )
        .unwrap_err();

        assert!(err.contains("UserName"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_non_string_input() {
        let err = Name::from_input::<user::Name, DefaultScalarValue>(
            &InputValue::scalar(42),
        )
        .unwrap_err();

        assert!(err.contains("expected string"), "unexpected error: {err}");
    }
}
