//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, marker::PhantomData, str::FromStr};

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::Month;

use crate::DateTime;

/// Untyped calendar date.
pub type Date = DateOf;

/// Calendar date without a time zone.
///
/// Similarly to [`DateTimeOf`], the `Of` type parameter describes the meaning
/// of the value only.
///
/// [`DateTimeOf`]: crate::DateTimeOf
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Returns the current UTC date.
    #[must_use]
    pub fn today() -> Self {
        DateTime::now().date()
    }

    /// Creates a new [`Date`] out of the provided calendar components.
    ///
    /// # Errors
    ///
    /// If any of the components is out of range.
    pub fn from_calendar_date(
        year: i32,
        month: u8,
        day: u8,
    ) -> Result<Self, time::error::ComponentRange> {
        let month = Month::try_from(month)?;
        time::Date::from_calendar_date(year, month, day).map(Self::from)
    }

    /// Returns the next calendar day, if representable.
    #[must_use]
    pub fn next_day(self) -> Option<Self> {
        self.inner.next_day().map(Self::from)
    }

    /// Returns the previous calendar day, if representable.
    #[must_use]
    pub fn previous_day(self) -> Option<Self> {
        self.inner.previous_day().map(Self::from)
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(date: DateOf<Of>) -> Self {
        date.inner
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.inner.year(),
            u8::from(self.inner.month()),
            self.inner.day(),
        )
    }
}

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = ParseError;

    /// Parses a `YYYY-MM-DD` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParseError as E;

        let mut parts = s.splitn(3, '-');
        let (Some(year), Some(month), Some(day)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(E::Format);
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(E::Format);
        }

        Self::from_calendar_date(
            year.parse().map_err(|_| E::Format)?,
            month.parse().map_err(|_| E::Format)?,
            day.parse().map_err(|_| E::Format)?,
        )
        .map_err(E::ComponentRange)
    }
}

/// Error of parsing [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ParseError {
    /// The string is not in a `YYYY-MM-DD` format.
    #[display("expected `YYYY-MM-DD` format")]
    Format,

    /// Parsed [`Date`] has an out of range component.
    ComponentRange(time::error::ComponentRange),
}

crate::tagged::impl_tagged!(DateOf);

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self::from)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in a `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = crate::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use time::macros::date;

    use super::Date;

    #[test]
    fn from_str() {
        assert_eq!(
            "2024-02-29".parse::<Date>().unwrap(),
            Date::from(date!(2024 - 02 - 29)),
        );
        assert_eq!(
            "0999-01-05".parse::<Date>().unwrap(),
            Date::from_calendar_date(999, 1, 5).unwrap(),
        );

        assert!("2023-02-29".parse::<Date>().is_err());
        assert!("2024-13-01".parse::<Date>().is_err());
        assert!("2024-1-01".parse::<Date>().is_err());
        assert!("24-01-01".parse::<Date>().is_err());
        assert!("2024-01".parse::<Date>().is_err());
        assert!("2024/01/01".parse::<Date>().is_err());
        assert!("".parse::<Date>().is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Date::from(date!(2024 - 02 - 29)).to_string(), "2024-02-29");
        assert_eq!(
            Date::from_calendar_date(999, 1, 5).unwrap().to_string(),
            "0999-01-05",
        );
    }

    #[test]
    fn neighbour_days() {
        let leap = Date::from(date!(2024 - 02 - 28));

        assert_eq!(leap.next_day().unwrap().to_string(), "2024-02-29");
        assert_eq!(
            leap.next_day().unwrap().next_day().unwrap().to_string(),
            "2024-03-01",
        );
        assert_eq!(leap.previous_day().unwrap().to_string(), "2024-02-27");
        assert!(leap < leap.next_day().unwrap());
    }
}
