//! [`Employment`] read model definition.

#[cfg(doc)]
use crate::domain::Employment;

/// Wrapper around an [`Employment`] indicating that it [`is_active()`].
///
/// [`is_active()`]: Employment::is_active
#[derive(Clone, Copy, Debug)]
pub struct Active<T>(pub T);

pub mod list {
    //! [`Employment`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{client, employment, user, Employment};
    #[cfg(doc)]
    use crate::domain::{Client, User};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = employment::Id;

    /// Cursor pointing to a specific [`Employment`] in a list.
    pub type Cursor = employment::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the [`User`] to list [`Employment`]s of.
        pub user_id: Option<user::Id>,

        /// ID of the [`Client`] to list [`Employment`]s at.
        pub client_id: Option<client::Id>,

        /// [`employment::Status`] to list [`Employment`]s with.
        pub status: Option<employment::Status>,

        /// [`employment::Position`] (or its part) to fuzzy search for.
        pub position: Option<employment::Position>,
    }

    impl Filter {
        /// Checks whether the provided [`Employment`] satisfies this
        /// [`Filter`].
        ///
        /// [`Filter::position`] is matched case-insensitively by any of its
        /// words.
        #[must_use]
        pub fn matches(&self, employment: &Employment) -> bool {
            let Self {
                user_id,
                client_id,
                status,
                position,
            } = self;
            let terms = &employment.terms;

            user_id.map_or(true, |id| id == terms.user_id)
                && client_id.map_or(true, |id| Some(id) == terms.client_id)
                && status.map_or(true, |s| s == employment.status)
                && position.as_ref().map_or(true, |p| {
                    let haystack =
                        AsRef::<str>::as_ref(&terms.position).to_lowercase();
                    AsRef::<str>::as_ref(p)
                        .split_whitespace()
                        .any(|word| haystack.contains(&word.to_lowercase()))
                })
        }
    }

    /// Total count of [`Employment`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
