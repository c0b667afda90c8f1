//! Relay-style cursor pagination primitives.

use std::fmt;

/// Single page of nodes selected by some [`Arguments`].
#[derive(Clone, Debug)]
pub struct Page<C, N> {
    /// [`Edge`]s of this [`Page`] in the order of the pagination [`Kind`].
    pub edges: Vec<Edge<C, N>>,

    /// [`Kind`] of pagination this [`Page`] was selected with.
    pub kind: Kind,

    /// Whether more nodes exist beyond this [`Page`] in the pagination
    /// direction.
    pub has_more: bool,
}

impl<C, N> Page<C, N> {
    /// Assembles a [`Page`] out of the selected `edges`.
    ///
    /// `has_more` is expected to be detected by selecting one node over the
    /// [`Arguments::limit()`].
    #[must_use]
    pub fn new<E>(
        arguments: &Arguments<C>,
        edges: impl IntoIterator<Item = E>,
        has_more: bool,
    ) -> Self
    where
        E: Into<Edge<C, N>>,
    {
        Self {
            edges: edges.into_iter().map(E::into).collect(),
            kind: arguments.kind(),
            has_more,
        }
    }

    /// Describes the neighbours of this [`Page`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo {
        let forward = self.kind.is_forward();
        PageInfo {
            has_next_page: forward && self.has_more,
            has_previous_page: !forward && self.has_more,
        }
    }
}

/// Neighbourhood of a [`Page`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PageInfo {
    /// Whether a next [`Page`] exists.
    pub has_next_page: bool,

    /// Whether a previous [`Page`] exists.
    pub has_previous_page: bool,
}

/// Node of a [`Page`] along with its cursor.
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, N> {
    /// Cursor pointing to the `node`.
    pub cursor: C,

    /// The node itself.
    pub node: N,
}

impl<C, N> From<(C, N)> for Edge<C, N> {
    fn from((cursor, node): (C, N)) -> Self {
        Self { cursor, node }
    }
}

/// Normalized pagination arguments.
#[derive(Clone, Copy, Debug)]
pub struct Arguments<C> {
    /// Maximum number of nodes to select.
    limit: usize,

    /// Cursor to start selecting from.
    cursor: Option<C>,

    /// [`Kind`] of pagination.
    kind: Kind,
}

impl<C> Arguments<C> {
    /// Normalizes Relay-style `first`/`after` and `last`/`before` arguments.
    ///
    /// Only one direction may be requested at a time. The `default` limit is
    /// used when neither `first` nor `last` is provided.
    ///
    /// Equal `after` and `before` cursors point to the cursor itself, so it
    /// gets included into the selection (alone, unless `first` or `last`
    /// widens it).
    ///
    /// Returns [`None`] if the arguments are ambiguous or a limit doesn't fit
    /// into [`usize`].
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        last: Option<Num>,
        before: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        C: PartialEq + fmt::Debug,
        Num: TryInto<usize> + fmt::Debug,
    {
        let limit = |n: Num| -> Option<usize> { n.try_into().ok() };

        let pinned = match (&after, &before) {
            (Some(a), Some(b)) if a != b => return None,
            (Some(_), Some(_)) => true,
            _ => false,
        };

        let (kind, limit, cursor) = match (first, last) {
            (Some(_), Some(_)) => return None,
            (None, None) if pinned => (Kind::ForwardIncluding, 1, after),
            (None, None) if after.is_some() || before.is_some() => {
                return None;
            }
            (None, None) => (Kind::Forward, limit(default)?, None),
            (Some(first), None) if pinned => {
                (Kind::ForwardIncluding, limit(first)?, after)
            }
            (Some(_), None) if before.is_some() => return None,
            (Some(first), None) => (Kind::Forward, limit(first)?, after),
            (None, Some(last)) if pinned => {
                (Kind::BackwardIncluding, limit(last)?, before)
            }
            (None, Some(_)) if after.is_some() => return None,
            (None, Some(last)) => (Kind::Backward, limit(last)?, before),
        };

        Some(Self {
            limit,
            cursor,
            kind,
        })
    }

    /// Cursor the selection starts from, if any.
    #[must_use]
    pub const fn cursor(&self) -> Option<&C> {
        self.cursor.as_ref()
    }

    /// [`Kind`] of the requested pagination.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Maximum number of nodes to select.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

/// [`Arguments`] paired with a filter narrowing the selection.
#[derive(Clone, Copy, Debug)]
pub struct Selector<C, F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Filter the nodes must satisfy.
    pub filter: F,
}

/// Direction of pagination relative to its cursor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Nodes strictly after the cursor.
    Forward,

    /// The cursor node and the ones after it.
    ForwardIncluding,

    /// Nodes strictly before the cursor.
    Backward,

    /// The cursor node and the ones before it.
    BackwardIncluding,
}

impl Kind {
    /// Whether this [`Kind`] walks in the ascending direction.
    #[must_use]
    pub const fn is_forward(&self) -> bool {
        matches!(self, Self::Forward | Self::ForwardIncluding)
    }

    /// Whether this [`Kind`] walks in the descending direction.
    #[must_use]
    pub const fn is_backward(&self) -> bool {
        !self.is_forward()
    }

    /// Comparison operator a node's cursor must satisfy against the
    /// requested cursor.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Forward => ">",
            Self::ForwardIncluding => ">=",
            Self::Backward => "<",
            Self::BackwardIncluding => "<=",
        }
    }

    /// [`Order`] nodes are selected in.
    #[must_use]
    pub const fn order(&self) -> Order {
        if self.is_forward() {
            Order::Ascending
        } else {
            Order::Descending
        }
    }
}

/// Sorting order of a selection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Smallest cursors first.
    Ascending,

    /// Largest cursors first.
    Descending,
}

#[cfg(feature = "postgres")]
impl Order {
    /// SQL keyword of this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Declares pagination type aliases for the provided cursor, node and filter.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "Node of a [`Page`] along with its cursor."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "Single page of the selected nodes."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "Neighbourhood of a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo;

        #[doc = "Arguments selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Arguments`] paired with a filter."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Kind, Page};

    #[test]
    fn defaults_to_first_page() {
        let args = Arguments::<u8>::new(None, None, None, None, 10).unwrap();

        assert_eq!(args.kind(), Kind::Forward);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.cursor(), None);
    }

    #[test]
    fn resolves_forward_and_backward() {
        let args = Arguments::new(Some(3), Some(7_u8), None, None, 10).unwrap();
        assert_eq!(args.kind(), Kind::Forward);
        assert_eq!(args.limit(), 3);
        assert_eq!(args.cursor(), Some(&7));

        let args = Arguments::new(None, None, Some(2), Some(7_u8), 10).unwrap();
        assert_eq!(args.kind(), Kind::Backward);
        assert_eq!(args.limit(), 2);
        assert_eq!(args.cursor(), Some(&7));
    }

    #[test]
    fn equal_cursors_include_the_cursor() {
        let args = Arguments::new(None, Some(7_u8), None, Some(7), 10).unwrap();
        assert_eq!(args.kind(), Kind::ForwardIncluding);
        assert_eq!(args.limit(), 1);

        let args =
            Arguments::new(Some(5), Some(7_u8), None, Some(7), 10).unwrap();
        assert_eq!(args.kind(), Kind::ForwardIncluding);
        assert_eq!(args.limit(), 5);

        let args =
            Arguments::new(None, Some(7_u8), Some(4), Some(7), 10).unwrap();
        assert_eq!(args.kind(), Kind::BackwardIncluding);
        assert_eq!(args.limit(), 4);
    }

    #[test]
    fn rejects_ambiguous_arguments() {
        assert!(
            Arguments::<u8>::new(Some(1), None, Some(1), None, 10).is_none()
        );
        assert!(
            Arguments::new(Some(1), Some(1_u8), None, Some(2), 10).is_none()
        );
        assert!(Arguments::new(None, Some(1_u8), None, None, 10).is_none());
        assert!(Arguments::new(Some(1), None, None, Some(1_u8), 10).is_none());
        assert!(Arguments::<u8>::new(Some(-1), None, None, None, 10).is_none());
    }

    #[test]
    fn page_info_follows_direction() {
        let forward = Arguments::<u8>::new(Some(2), None, None, None, 10)
            .unwrap();
        let page = Page::<u8, ()>::new(&forward, [(1_u8, ()), (2, ())], true);
        assert_eq!(page.edges.len(), 2);
        assert!(page.page_info().has_next_page);
        assert!(!page.page_info().has_previous_page);

        let backward = Arguments::<u8>::new(None, None, Some(2), None, 10)
            .unwrap();
        let page = Page::<u8, ()>::new(&backward, [(2_u8, ())], true);
        assert!(!page.page_info().has_next_page);
        assert!(page.page_info().has_previous_page);
    }

    #[test]
    fn kind_maps_to_operator_and_order() {
        assert_eq!(Kind::Forward.operator(), ">");
        assert_eq!(Kind::BackwardIncluding.operator(), "<=");
        assert!(Kind::ForwardIncluding.is_forward());
        assert!(Kind::Backward.is_backward());
        assert_ne!(Kind::Forward.order(), Kind::Backward.order());
    }
}
