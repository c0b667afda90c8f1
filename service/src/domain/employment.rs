//! [`Employment`] definitions.

use std::fmt;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateOf, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{client, user};
#[cfg(doc)]
use crate::domain::{Client, User};

/// Period of work of a [`User`], optionally engaged at a [`Client`].
#[derive(Clone, Debug)]
pub struct Employment {
    /// ID of this [`Employment`].
    pub id: Id,

    /// [`Terms`] of this [`Employment`].
    pub terms: Terms,

    /// [`Status`] of this [`Employment`].
    pub status: Status,

    /// [`DateTime`] when this [`Employment`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Employment`] was modified the last time.
    pub updated_at: UpdateDateTime,
}

impl Employment {
    /// Returns whether this [`Employment`] is [`Status::Active`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

/// Every field of an [`Employment`] except its [`Status`] and system-managed
/// timestamps.
///
/// While an [`Employment`] is [`Status::Active`], its [`Terms`] are frozen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Terms {
    /// ID of the employed [`User`].
    pub user_id: user::Id,

    /// ID of the [`Client`] the [`User`] is engaged at, if any.
    pub client_id: Option<client::Id>,

    /// [`Position`] the [`User`] is employed at.
    pub position: Position,

    /// [`Date`] the [`User`] was hired at.
    pub hire_date: HireDate,

    /// [`Salary`] of the [`User`], if known.
    pub salary: Option<Salary>,

    /// [`WorkLocation`] of the [`User`], if known.
    pub work_location: Option<WorkLocation>,

    /// [`Date`] these [`Terms`] take effect at.
    pub effective_date: EffectiveDate,

    /// [`Date`] these [`Terms`] stop having effect at, if any.
    pub end_date: Option<EndDate>,
}

impl Terms {
    /// Returns the [`Field`]s differing between these [`Terms`] and the
    /// `other` ones, in the declaration order.
    #[must_use]
    pub fn changed_fields(&self, other: &Self) -> Vec<Field> {
        let Self {
            user_id,
            client_id,
            position,
            hire_date,
            salary,
            work_location,
            effective_date,
            end_date,
        } = self;

        [
            (Field::UserId, *user_id != other.user_id),
            (Field::ClientId, *client_id != other.client_id),
            (Field::Position, *position != other.position),
            (Field::HireDate, *hire_date != other.hire_date),
            (Field::Salary, *salary != other.salary),
            (Field::WorkLocation, *work_location != other.work_location),
            (Field::EffectiveDate, *effective_date != other.effective_date),
            (Field::EndDate, *end_date != other.end_date),
        ]
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
    }

    /// Validates these [`Terms`] against the provided `today`'s [`Date`].
    ///
    /// # Errors
    ///
    /// - [`Invalid::HireDateInFuture`] if the [`HireDate`] is after `today`.
    /// - [`Invalid::Period`] if the [`EndDate`] is not strictly after the
    ///   [`EffectiveDate`].
    pub fn validate(&self, today: Date) -> Result<(), Invalid> {
        if self.hire_date > today.coerce() {
            return Err(Invalid::HireDateInFuture(self.hire_date));
        }
        if let Some(end_date) = self.end_date {
            if end_date.coerce() <= self.effective_date {
                return Err(Invalid::Period {
                    effective_date: self.effective_date,
                    end_date,
                });
            }
        }
        Ok(())
    }
}

/// Field of [`Terms`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Field {
    /// [`Terms::user_id`].
    #[display("userId")]
    UserId,

    /// [`Terms::client_id`].
    #[display("clientId")]
    ClientId,

    /// [`Terms::position`].
    #[display("position")]
    Position,

    /// [`Terms::hire_date`].
    #[display("hireDate")]
    HireDate,

    /// [`Terms::salary`].
    #[display("salary")]
    Salary,

    /// [`Terms::work_location`].
    #[display("workLocation")]
    WorkLocation,

    /// [`Terms::effective_date`].
    #[display("effectiveDate")]
    EffectiveDate,

    /// [`Terms::end_date`].
    #[display("endDate")]
    EndDate,
}

/// Reason of [`Terms`] being invalid.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum Invalid {
    /// [`HireDate`] is in the future.
    #[display("Hire date `{_0}` is in the future")]
    HireDateInFuture(#[error(not(source))] HireDate),

    /// [`EndDate`] is not strictly after the [`EffectiveDate`].
    #[display(
        "End date `{end_date}` must be after effective date `{effective_date}`"
    )]
    Period {
        /// [`EffectiveDate`] of the [`Terms`].
        effective_date: EffectiveDate,

        /// [`EndDate`] of the [`Terms`].
        end_date: EndDate,
    },
}

/// ID of an [`Employment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of an [`Employment`]."]
    enum Status {
        #[doc = "The [`Employment`] is ongoing."]
        Active = 1,

        #[doc = "The [`Employment`] is paused."]
        Inactive = 2,

        #[doc = "The [`Employment`] is over."]
        Terminated = 3,
    }
}

/// Job title of an [`Employment`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Position(String);

impl Position {
    /// Creates a new [`Position`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        check_text(&title).then_some(Self(title))
    }
}

impl FromStr for Position {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Position`")
    }
}

/// Place where the work of an [`Employment`] is done.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct WorkLocation(String);

impl WorkLocation {
    /// Creates a new [`WorkLocation`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        check_text(&location).then_some(Self(location))
    }
}

impl FromStr for WorkLocation {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `WorkLocation`")
    }
}

/// Checks whether the given `text` is trimmed, not empty and at most 255
/// characters long.
fn check_text(text: &str) -> bool {
    text.trim() == text && !text.is_empty() && text.chars().count() <= 255
}

/// Salary amount of an [`Employment`] in the employer's currency.
///
/// Always non-negative and has at most 2 decimal places.
#[derive(AsRef, Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Salary(Decimal);

impl Salary {
    /// Creates a new [`Salary`] if the given `amount` is valid.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        let amount = amount.normalize();
        Self::check(amount).then_some(Self(amount))
    }

    /// Checks whether the given `amount` is a valid [`Salary`].
    fn check(amount: Decimal) -> bool {
        // Fits into `NUMERIC(12, 2)`.
        let max = Decimal::from(10_000_000_000_u64);

        !amount.is_sign_negative() && amount.scale() <= 2 && amount < max
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Salary {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Decimal>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Salary`")
    }
}

/// Marker type indicating hiring of a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Hire;

/// [`Date`] when a [`User`] was hired.
pub type HireDate = DateOf<(Employment, Hire)>;

/// [`Date`] when [`Terms`] of an [`Employment`] take effect.
pub type EffectiveDate = DateOf<(Employment, unit::Effect)>;

/// [`Date`] when [`Terms`] of an [`Employment`] stop having effect.
pub type EndDate = DateOf<(Employment, unit::Termination)>;

/// [`DateTime`] when an [`Employment`] was created.
pub type CreationDateTime = DateTimeOf<(Employment, unit::Creation)>;

/// [`DateTime`] when an [`Employment`] was modified.
pub type UpdateDateTime = DateTimeOf<(Employment, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::{client, user};

    use super::{
        Field, Invalid, Position, Salary, Status, Terms, WorkLocation,
    };

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn terms() -> Terms {
        Terms {
            user_id: user::Id::new(),
            client_id: None,
            position: Position::new("Developer").unwrap(),
            hire_date: date("2023-01-10").coerce(),
            salary: Some("1500.50".parse().unwrap()),
            work_location: None,
            effective_date: date("2023-02-01").coerce(),
            end_date: None,
        }
    }

    #[test]
    fn identical_terms_have_no_changes() {
        let terms = terms();

        assert!(terms.changed_fields(&terms.clone()).is_empty());
    }

    #[test]
    fn reports_every_changed_field() {
        let old = terms();
        let mut new = old.clone();
        new.position = Position::new("Senior Developer").unwrap();
        new.client_id = Some(client::Id::new());
        new.end_date = Some(date("2024-01-01").coerce());

        assert_eq!(
            old.changed_fields(&new),
            [Field::ClientId, Field::Position, Field::EndDate],
        );
        assert_eq!(
            new.changed_fields(&old),
            [Field::ClientId, Field::Position, Field::EndDate],
        );
    }

    #[test]
    fn salary_scale_does_not_count_as_change() {
        let old = terms();
        let mut new = old.clone();
        new.salary = Some("1500.5".parse().unwrap());

        assert!(old.changed_fields(&new).is_empty());
    }

    #[test]
    fn validates_hire_date() {
        let terms = terms();

        assert!(terms.validate(date("2023-01-10")).is_ok());
        assert!(terms.validate(date("2030-01-01")).is_ok());
        assert!(matches!(
            terms.validate(date("2023-01-09")),
            Err(Invalid::HireDateInFuture(_)),
        ));
    }

    #[test]
    fn validates_period() {
        let mut terms = terms();
        let today = date("2024-06-01");

        terms.end_date = Some(date("2023-02-02").coerce());
        assert!(terms.validate(today).is_ok());

        terms.end_date = Some(date("2023-02-01").coerce());
        assert!(matches!(
            terms.validate(today),
            Err(Invalid::Period { .. }),
        ));

        terms.end_date = Some(date("2023-01-31").coerce());
        assert!(matches!(
            terms.validate(today),
            Err(Invalid::Period { .. }),
        ));
    }

    #[test]
    fn salary() {
        assert_eq!("1500".parse::<Salary>().unwrap().to_string(), "1500.00");
        assert_eq!("0.5".parse::<Salary>().unwrap().to_string(), "0.50");
        assert_eq!(
            "12.340".parse::<Salary>().unwrap(),
            "12.34".parse::<Salary>().unwrap(),
        );
        assert!("0".parse::<Salary>().is_ok());
        assert!("9999999999.99".parse::<Salary>().is_ok());

        assert!("-1".parse::<Salary>().is_err());
        assert!("1.001".parse::<Salary>().is_err());
        assert!("10000000000".parse::<Salary>().is_err());
        assert!("abc".parse::<Salary>().is_err());
    }

    #[test]
    fn texts() {
        assert!(Position::new("Developer").is_some());
        assert!(Position::new("").is_none());
        assert!(Position::new(" Developer").is_none());
        assert!(Position::new("ä".repeat(255)).is_some());
        assert!(Position::new("a".repeat(256)).is_none());

        assert!(WorkLocation::new("Remote").is_some());
        assert!(WorkLocation::new("Remote\n").is_none());
    }

    #[test]
    fn status_representation() {
        assert_eq!(Status::Active.u8(), 1);
        assert_eq!(Status::from_u8(3), Some(Status::Terminated));
        assert_eq!(Status::Inactive.to_string(), "INACTIVE");
        assert_eq!("TERMINATED".parse::<Status>(), Ok(Status::Terminated));
    }
}
