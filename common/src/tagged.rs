//! Helpers for values tagged with a phantom `Of` type parameter.

/// Implements comparison, copying and tag coercion for a `$name<Of>` value
/// consisting of an `inner` field and an `_of` [`PhantomData`].
///
/// Deriving these traits would require the `Of` tag to implement them too.
///
/// [`PhantomData`]: std::marker::PhantomData
macro_rules! impl_tagged {
    ($name:ident) => {
        impl<Of: ?Sized> $name<Of> {
            /// Changes the tag of this value, keeping the value itself.
            #[must_use]
            pub fn coerce<NewOf: ?Sized>(self) -> $name<NewOf> {
                $name {
                    inner: self.inner,
                    _of: ::std::marker::PhantomData,
                }
            }
        }

        impl<Of: ?Sized> Copy for $name<Of> {}
        impl<Of: ?Sized> Clone for $name<Of> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<Of: ?Sized> Eq for $name<Of> {}
        impl<Of: ?Sized> PartialEq for $name<Of> {
            fn eq(&self, other: &Self) -> bool {
                self.inner == other.inner
            }
        }

        impl<Of: ?Sized> Ord for $name<Of> {
            fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                self.inner.cmp(&other.inner)
            }
        }
        impl<Of: ?Sized> PartialOrd for $name<Of> {
            fn partial_cmp(
                &self,
                other: &Self,
            ) -> Option<::std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<Of: ?Sized> ::std::hash::Hash for $name<Of> {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                self.inner.hash(state);
            }
        }
    };
}

pub(crate) use impl_tagged;
