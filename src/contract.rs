//! The contract shared by every collection in this family: a comparison
//! strategy fixed at construction time, an optional element finalizer, the
//! status-flag taxonomy and the [`OrderedSet`] operation set implemented by
//! both tree engines.

use std::cmp::Ordering;

/// Status flag reported by a collection handle.
///
/// Operations signal success or failure through their return value; the flag
/// explains *why* the last failure happened. It is a side channel on the
/// handle, not an error return: a flagged handle stays fully usable, and the
/// next successful operation of the same class resets the flag to [`Flag::Ok`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Flag {
    /// No error.
    #[default]
    Ok,
    /// Node allocation failed; the structure was left as it was before the
    /// failed operation.
    Alloc,
    /// A query needed an element but the structure is empty.
    Empty,
    /// Index out of bounds. Raised by the indexed peer collections, never by
    /// the trees; part of the shared taxonomy.
    Bounds,
    /// Invalid argument, such as a pop-style operation on an element that is
    /// not present. Part of the shared taxonomy.
    Arg,
    /// A function required by the operation was not supplied. Part of the
    /// shared taxonomy; tree construction makes the comparator a type
    /// parameter, so the trees cannot raise it.
    Func,
}

/// Comparison strategy deciding the order of two elements.
///
/// A result of [`Ordering::Less`] means `a` precedes `b`, i.e. `a` has the
/// higher priority. The strategy is supplied at construction time and is the
/// only notion of equality the trees know: two elements comparing equal are
/// the same element as far as set membership is concerned.
pub trait Compare<T> {
    /// Order `a` relative to `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Comparator using the element type's own [`Ord`] instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Natural;

impl<T: Ord> Compare<T> for Natural {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Any ordering closure is a comparator.
impl<T, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Finalizer run on each element as it leaves a collection.
///
/// When set, removal, clearing and dropping the collection hand every evicted
/// element to the finalizer instead of dropping it in place. When absent,
/// elements are simply dropped.
pub type Destroyer<T> = Box<dyn FnMut(T)>;

/// Operation set common to the two tree engines.
///
/// Both [`BTree`](crate::BTree) and [`RbTree`](crate::RbTree) expose exactly
/// this contract: an ordered collection of unique elements with logarithmic
/// point operations, a side-channel [`Flag`] and a swappable [`Destroyer`].
/// Code generic over the contract runs unchanged on either engine.
pub trait OrderedSet<T> {
    /// Number of elements in the set.
    fn len(&self) -> usize;

    /// Does the set hold no elements?
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert an element. Returns `false`, leaving the set unchanged, if an
    /// equal element is already present or if node allocation fails (which
    /// also sets [`Flag::Alloc`]). A rejected element is dropped.
    fn insert(&mut self, elem: T) -> bool;

    /// Reference to the stored element comparing equal to `elem`.
    fn get(&self, elem: &T) -> Option<&T>;

    /// Is an element comparing equal to `elem` present?
    fn contains(&self, elem: &T) -> bool {
        self.get(elem).is_some()
    }

    /// Remove the element comparing equal to `elem`, routing it through the
    /// destroyer. Returns `false` if no such element is present.
    fn remove(&mut self, elem: &T) -> bool;

    /// Element with the minimum priority, i.e. the one that orders last
    /// under the comparator. Returns `None` and sets [`Flag::Empty`] on an
    /// empty set.
    fn min(&self) -> Option<&T>;

    /// Element with the maximum priority, i.e. the one that orders first
    /// under the comparator. Returns `None` and sets [`Flag::Empty`] on an
    /// empty set.
    fn max(&self) -> Option<&T>;

    /// Remove every element, routing each through the destroyer.
    fn clear(&mut self);

    /// Replace the element finalizer.
    fn set_destroyer(&mut self, destroyer: Option<Destroyer<T>>);

    /// Current status flag.
    fn flag(&self) -> Flag;
}
