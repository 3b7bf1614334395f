//! Ordered set backed by a binary red-black search tree.
//!
//! Each node carries one element and a color. The root is black, a red node
//! never has a red child, and every path from a node down to an absent child
//! position crosses the same number of black nodes, so the height is bounded
//! by twice the logarithm of the size. Absent children count as black; they
//! are never materialized.
//!
//! Insertion attaches a red leaf and repairs any double-red violation by
//! recoloring upward or by a trinode restructuring. Removal promotes the
//! unlinked node's child and repairs a double-black deficit by rotations and
//! recoloring, walking up the tree when a recoloring alone cannot absorb it.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Debug;
use std::iter::FusedIterator;
use std::mem;

use crate::arena::{Arena, NodeId};
use crate::contract::{Compare, Destroyer, Flag, Natural, OrderedSet};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

struct RbNode<T> {
    elem: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    color: Color,
}

impl<T> RbNode<T> {
    /// New nodes join the tree red.
    fn new(elem: T, parent: Option<NodeId>) -> Self {
        Self {
            elem,
            parent,
            left: None,
            right: None,
            color: Color::Red,
        }
    }
}

/// Ordered set of unique elements stored in a red-black tree.
///
/// The comparator is the type parameter `C`, defaulting to the element's own
/// ordering via [`Natural`]. Errors are reported through the handle's
/// [`Flag`] alongside the `bool`/`Option` result of each call. Dropping the
/// tree destroys every node, routing elements through the destroyer when one
/// is set.
///
/// # Example
///
/// ```
///     use ordset::RbTree;
///     let mut set = RbTree::new(ordset::Natural);
///     set.insert("London");
///     set.insert("Paris");
///     assert!(set.contains(&"Paris"));
/// ```
pub struct RbTree<T, C = Natural> {
    arena: Arena<RbNode<T>>,
    root: Option<NodeId>,
    len: usize,
    cmp: C,
    destroyer: Option<Destroyer<T>>,
    flag: Cell<Flag>,
}

impl<T, C: Compare<T>> RbTree<T, C> {
    /// Returns a new, empty set ordered by `cmp`.
    #[must_use]
    pub fn new(cmp: C) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
            cmp,
            destroyer: None,
            flag: Cell::new(Flag::Ok),
        }
    }

    /// Like [`Self::new`], with an element finalizer installed from the
    /// start.
    #[must_use]
    pub fn with_destroyer(cmp: C, destroyer: Destroyer<T>) -> Self {
        let mut set = Self::new(cmp);
        set.destroyer = Some(destroyer);
        set
    }

    /// Number of elements in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the set empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current status flag.
    #[must_use]
    pub fn flag(&self) -> Flag {
        self.flag.get()
    }

    /// Replace the element finalizer invoked on removal, clearing and drop.
    pub fn set_destroyer(&mut self, destroyer: Option<Destroyer<T>>) {
        self.destroyer = destroyer;
    }

    /// Bound the number of live nodes. Allocation past the bound fails the
    /// mutating operation with [`Flag::Alloc`], leaving the tree unchanged.
    pub fn set_node_limit(&mut self, limit: Option<usize>) {
        self.arena.set_limit(limit);
    }

    fn color(&self, id: Option<NodeId>) -> Color {
        match id {
            Some(id) => self.arena[id].color,
            None => Color::Black,
        }
    }

    fn paint(&mut self, id: Option<NodeId>, color: Color) {
        if let Some(id) = id {
            self.arena[id].color = color;
        }
    }

    /// Reference to the stored element comparing equal to `elem`.
    #[must_use]
    pub fn get(&self, elem: &T) -> Option<&T> {
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.cmp.compare(elem, &self.arena[id].elem) {
                Ordering::Equal => return Some(&self.arena[id].elem),
                Ordering::Less => cur = self.arena[id].left,
                Ordering::Greater => cur = self.arena[id].right,
            }
        }
        None
    }

    /// Is an element comparing equal to `elem` present?
    #[must_use]
    pub fn contains(&self, elem: &T) -> bool {
        self.get(elem).is_some()
    }

    /// Insert an element. Returns `false`, leaving the set unchanged, if an
    /// equal element is present or if node allocation fails (which also sets
    /// [`Flag::Alloc`]). A rejected element is dropped.
    pub fn insert(&mut self, elem: T) -> bool {
        let Some(root) = self.root else {
            return match self.arena.try_alloc(RbNode::new(elem, None)) {
                Ok(id) => {
                    self.arena[id].color = Color::Black;
                    self.root = Some(id);
                    self.len = 1;
                    self.flag.set(Flag::Ok);
                    true
                }
                Err(_) => {
                    self.flag.set(Flag::Alloc);
                    false
                }
            };
        };

        // Descend to the attachment point, or bail on an equal element.
        let mut parent = root;
        let side_left = loop {
            match self.cmp.compare(&elem, &self.arena[parent].elem) {
                Ordering::Equal => return false,
                Ordering::Less => match self.arena[parent].left {
                    Some(l) => parent = l,
                    None => break true,
                },
                Ordering::Greater => match self.arena[parent].right {
                    Some(r) => parent = r,
                    None => break false,
                },
            }
        };

        let id = match self.arena.try_alloc(RbNode::new(elem, Some(parent))) {
            Ok(id) => id,
            Err(_) => {
                self.flag.set(Flag::Alloc);
                return false;
            }
        };
        if side_left {
            self.arena[parent].left = Some(id);
        } else {
            self.arena[parent].right = Some(id);
        }
        self.fix_double_red(id);
        self.len += 1;
        self.flag.set(Flag::Ok);
        true
    }

    /// Repair a red child under a red parent, working upward from `child`.
    fn fix_double_red(&mut self, mut child: NodeId) {
        loop {
            let Some(parent) = self.arena[child].parent else {
                return;
            };
            if self.arena[child].color == Color::Black
                || self.arena[parent].color == Color::Black
            {
                return;
            }
            // A red parent is never the root, so the grandparent exists.
            let grand = self.arena[parent].parent.unwrap();
            let uncle = if self.arena[grand].left == Some(parent) {
                self.arena[grand].right
            } else {
                self.arena[grand].left
            };

            if self.color(uncle) == Color::Black {
                // Trinode restructuring: one rotation for a straight line,
                // two for a zig-zag. The riser goes black with red children
                // and the violation is gone.
                let riser = if self.arena[grand].left == Some(parent) {
                    if self.arena[parent].right == Some(child) {
                        self.rotate_left(parent);
                    }
                    self.rotate_right(grand)
                } else {
                    if self.arena[parent].left == Some(child) {
                        self.rotate_right(parent);
                    }
                    self.rotate_left(grand)
                };
                self.arena[riser].color = Color::Black;
                self.paint(self.arena[riser].left, Color::Red);
                self.paint(self.arena[riser].right, Color::Red);
                return;
            }

            // Red uncle: push the grandparent's blackness down and retry
            // one level higher.
            self.arena[parent].color = Color::Black;
            self.paint(uncle, Color::Black);
            if Some(grand) != self.root {
                self.arena[grand].color = Color::Red;
            }
            child = grand;
        }
    }

    /// Remove the element comparing equal to `elem`, routing it through the
    /// destroyer. Returns `false` if no such element is present.
    pub fn remove(&mut self, elem: &T) -> bool {
        let mut cur = self.root;
        let mut node = loop {
            let Some(id) = cur else { return false };
            match self.cmp.compare(elem, &self.arena[id].elem) {
                Ordering::Equal => break id,
                Ordering::Less => cur = self.arena[id].left,
                Ordering::Greater => cur = self.arena[id].right,
            }
        };

        // A node with two children trades elements with its in-order
        // predecessor, the rightmost node of its left subtree, which has at
        // most one child; the predecessor is then the one unlinked.
        if self.arena[node].left.is_some() && self.arena[node].right.is_some() {
            let mut pred = self.arena[node].left.unwrap();
            while let Some(r) = self.arena[pred].right {
                pred = r;
            }
            let (a, b) = self.arena.get2_mut(node, pred);
            mem::swap(&mut a.elem, &mut b.elem);
            node = pred;
        }

        let child = self.arena[node].left.or(self.arena[node].right);

        match self.arena[node].parent {
            None => {
                // Unlinking the root: its only child, if any, takes over
                // and is painted black.
                self.root = child;
                if let Some(c) = child {
                    self.arena[c].parent = None;
                    self.arena[c].color = Color::Black;
                }
            }
            Some(parent) => {
                // A black non-root node always has a sibling.
                let sibling = if self.arena[parent].left == Some(node) {
                    self.arena[parent].right
                } else {
                    self.arena[parent].left
                };
                if self.arena[parent].left == Some(node) {
                    self.arena[parent].left = child;
                } else {
                    self.arena[parent].right = child;
                }
                if let Some(c) = child {
                    self.arena[c].parent = Some(parent);
                }
                if self.arena[node].color == Color::Black {
                    if self.color(child) == Color::Red {
                        self.paint(child, Color::Black);
                    } else {
                        self.fix_double_black(parent, sibling.unwrap());
                    }
                }
            }
        }

        let freed = self.arena.release(node);
        self.dispose(freed.elem);
        self.len -= 1;
        true
    }

    /// Repair the black deficit left under `parent` after a black node was
    /// unlinked from the side opposite `sibling`.
    fn fix_double_black(&mut self, mut parent: NodeId, mut sibling: NodeId) {
        loop {
            if self.arena[sibling].color == Color::Red {
                // A red sibling rises over the parent so the remaining
                // cases see a black sibling.
                self.arena[sibling].color = Color::Black;
                self.arena[parent].color = Color::Red;
                if self.arena[parent].left == Some(sibling) {
                    self.rotate_right(parent);
                    sibling = self.arena[parent].left.unwrap();
                } else {
                    self.rotate_left(parent);
                    sibling = self.arena[parent].right.unwrap();
                }
            }

            if self.color(self.arena[sibling].left) == Color::Red {
                // Trinode restructuring absorbs the deficit: the riser
                // takes the parent's color, its children go black.
                let pcolor = self.arena[parent].color;
                let riser = if self.arena[parent].right == Some(sibling) {
                    self.rotate_right(sibling);
                    self.rotate_left(parent)
                } else {
                    self.rotate_right(parent)
                };
                self.arena[riser].color = pcolor;
                self.paint(self.arena[riser].left, Color::Black);
                self.paint(self.arena[riser].right, Color::Black);
                return;
            }
            if self.color(self.arena[sibling].right) == Color::Red {
                let pcolor = self.arena[parent].color;
                let riser = if self.arena[parent].left == Some(sibling) {
                    self.rotate_left(sibling);
                    self.rotate_right(parent)
                } else {
                    self.rotate_left(parent)
                };
                self.arena[riser].color = pcolor;
                self.paint(self.arena[riser].left, Color::Black);
                self.paint(self.arena[riser].right, Color::Black);
                return;
            }

            // Both of the sibling's children are black: recolor the sibling
            // red. A red or root parent absorbs the deficit; otherwise the
            // parent becomes the new double-black and the loop climbs.
            self.arena[sibling].color = Color::Red;
            if self.arena[parent].color == Color::Red || self.arena[parent].parent.is_none() {
                self.arena[parent].color = Color::Black;
                return;
            }
            let node = parent;
            parent = self.arena[node].parent.unwrap();
            sibling = if self.arena[parent].left == Some(node) {
                self.arena[parent].right
            } else {
                self.arena[parent].left
            }
            .unwrap();
        }
    }

    /// Rotate the subtree at `node` to the left: its right child rises into
    /// its place (updating the root handle if `node` was the root) and
    /// `node` becomes the riser's left child. Returns the riser.
    fn rotate_left(&mut self, node: NodeId) -> NodeId {
        let riser = self.arena[node].right.unwrap();
        let inner = self.arena[riser].left;

        let parent = self.arena[node].parent;
        self.arena[riser].parent = parent;
        match parent {
            None => self.root = Some(riser),
            Some(p) => {
                if self.arena[p].left == Some(node) {
                    self.arena[p].left = Some(riser);
                } else {
                    self.arena[p].right = Some(riser);
                }
            }
        }

        self.arena[riser].left = Some(node);
        self.arena[node].parent = Some(riser);

        self.arena[node].right = inner;
        if let Some(k) = inner {
            self.arena[k].parent = Some(node);
        }
        riser
    }

    /// Mirror image of [`Self::rotate_left`].
    fn rotate_right(&mut self, node: NodeId) -> NodeId {
        let riser = self.arena[node].left.unwrap();
        let inner = self.arena[riser].right;

        let parent = self.arena[node].parent;
        self.arena[riser].parent = parent;
        match parent {
            None => self.root = Some(riser),
            Some(p) => {
                if self.arena[p].left == Some(node) {
                    self.arena[p].left = Some(riser);
                } else {
                    self.arena[p].right = Some(riser);
                }
            }
        }

        self.arena[riser].right = Some(node);
        self.arena[node].parent = Some(riser);

        self.arena[node].left = inner;
        if let Some(k) = inner {
            self.arena[k].parent = Some(node);
        }
        riser
    }

    /// Element with the minimum priority, i.e. the one that orders last
    /// under the comparator: the rightmost node. Returns `None` and sets
    /// [`Flag::Empty`] on an empty set.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        let Some(mut id) = self.root else {
            self.flag.set(Flag::Empty);
            return None;
        };
        while let Some(r) = self.arena[id].right {
            id = r;
        }
        self.flag.set(Flag::Ok);
        Some(&self.arena[id].elem)
    }

    /// Element with the maximum priority, i.e. the one that orders first
    /// under the comparator: the leftmost node. Returns `None` and sets
    /// [`Flag::Empty`] on an empty set.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        let Some(mut id) = self.root else {
            self.flag.set(Flag::Empty);
            return None;
        };
        while let Some(l) = self.arena[id].left {
            id = l;
        }
        self.flag.set(Flag::Ok);
        Some(&self.arena[id].elem)
    }

    /// Structural copy cloning every element and preserving node colors.
    /// For shared-handle element types this aliases the underlying data,
    /// matching a shallow copy. Returns `None` and sets [`Flag::Alloc`] if
    /// the copy runs into the node limit. The copy starts without a
    /// destroyer.
    #[must_use]
    pub fn copy(&self) -> Option<Self>
    where
        T: Clone,
        C: Clone,
    {
        self.copy_impl(&mut |e: &T| Some(e.clone()))
    }

    /// Deep copy through `copier`, preserving shape and colors. A `None`
    /// from the copier counts as allocation failure: the partial copy is
    /// discarded, [`Flag::Alloc`] is set on `self` and `None` is returned.
    /// The copy starts without a destroyer.
    #[must_use]
    pub fn copy_with<F>(&self, mut copier: F) -> Option<Self>
    where
        F: FnMut(&T) -> Option<T>,
        C: Clone,
    {
        self.copy_impl(&mut copier)
    }

    fn copy_impl(&self, copier: &mut dyn FnMut(&T) -> Option<T>) -> Option<Self>
    where
        C: Clone,
    {
        let mut out = Self {
            arena: Arena::with_limit(self.arena.limit()),
            root: None,
            len: self.len,
            cmp: self.cmp.clone(),
            destroyer: None,
            flag: Cell::new(Flag::Ok),
        };
        if let Some(root) = self.root {
            match self.copy_node(root, None, &mut out, copier) {
                Some(id) => out.root = Some(id),
                None => {
                    self.flag.set(Flag::Alloc);
                    return None;
                }
            }
        }
        self.flag.set(Flag::Ok);
        Some(out)
    }

    fn copy_node(
        &self,
        src: NodeId,
        parent: Option<NodeId>,
        out: &mut Self,
        copier: &mut dyn FnMut(&T) -> Option<T>,
    ) -> Option<NodeId> {
        let elem = copier(&self.arena[src].elem)?;
        let mut node = RbNode::new(elem, parent);
        node.color = self.arena[src].color;
        let id = out.arena.try_alloc(node).ok()?;
        if let Some(l) = self.arena[src].left {
            let copied = self.copy_node(l, Some(id), out, copier)?;
            out.arena[id].left = Some(copied);
        }
        if let Some(r) = self.arena[src].right {
            let copied = self.copy_node(r, Some(id), out, copier)?;
            out.arena[id].right = Some(copied);
        }
        Some(id)
    }

    /// Iterator over the elements in ascending comparator order. The walk
    /// follows in-order successors through the parent back-references.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, C> {
        let mut next = self.root;
        if let Some(mut id) = next {
            while let Some(l) = self.arena[id].left {
                id = l;
            }
            next = Some(id);
        }
        Iter {
            tree: self,
            next,
            remaining: self.len,
        }
    }
} // End impl RbTree

impl<T, C> RbTree<T, C> {
    /// Remove every element, routing each through the destroyer. Nodes are
    /// freed bottom-up in post order.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            self.drop_subtree(root);
        }
        self.len = 0;
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let node = self.arena.release(id);
        if let Some(l) = node.left {
            self.drop_subtree(l);
        }
        if let Some(r) = node.right {
            self.drop_subtree(r);
        }
        self.dispose(node.elem);
    }

    fn dispose(&mut self, elem: T) {
        match &mut self.destroyer {
            Some(f) => f(elem),
            None => drop(elem),
        }
    }
}

impl<T, C> Drop for RbTree<T, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, C: Compare<T> + Default> Default for RbTree<T, C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<T: Debug, C: Compare<T>> Debug for RbTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for RbTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        for elem in iter {
            set.insert(elem);
        }
        set
    }
}

impl<T, C: Compare<T>> Extend<T> for RbTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<'a, T, C: Compare<T>> IntoIterator for &'a RbTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Iter<'a, T, C> {
        self.iter()
    }
}

impl<T, C: Compare<T>> OrderedSet<T> for RbTree<T, C> {
    fn len(&self) -> usize {
        RbTree::len(self)
    }

    fn insert(&mut self, elem: T) -> bool {
        RbTree::insert(self, elem)
    }

    fn get(&self, elem: &T) -> Option<&T> {
        RbTree::get(self, elem)
    }

    fn remove(&mut self, elem: &T) -> bool {
        RbTree::remove(self, elem)
    }

    fn min(&self) -> Option<&T> {
        RbTree::min(self)
    }

    fn max(&self) -> Option<&T> {
        RbTree::max(self)
    }

    fn clear(&mut self) {
        RbTree::clear(self);
    }

    fn set_destroyer(&mut self, destroyer: Option<Destroyer<T>>) {
        RbTree::set_destroyer(self, destroyer);
    }

    fn flag(&self) -> Flag {
        RbTree::flag(self)
    }
}

/// Iterator returned by [`RbTree::iter`], yielding elements in ascending
/// comparator order.
pub struct Iter<'a, T, C = Natural> {
    tree: &'a RbTree<T, C>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let tree = self.tree;
        let id = self.next?;
        self.next = match tree.arena[id].right {
            Some(mut r) => {
                while let Some(l) = tree.arena[r].left {
                    r = l;
                }
                Some(r)
            }
            None => {
                // Climb while coming out of a right subtree; the first
                // ancestor entered from the left is the successor.
                let mut cur = id;
                loop {
                    match tree.arena[cur].parent {
                        Some(p) if tree.arena[p].right == Some(cur) => cur = p,
                        other => break other,
                    }
                }
            }
        };
        self.remaining -= 1;
        Some(&tree.arena[id].elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, C> ExactSizeIterator for Iter<'_, T, C> {}
impl<T, C> FusedIterator for Iter<'_, T, C> {}

#[cfg(feature = "serde")]
use serde::{
    de::{SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};

#[cfg(feature = "serde")]
impl<T: Serialize, C: Compare<T>> Serialize for RbTree<T, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for elem in self {
            seq.serialize_element(elem)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct RbTreeVisitor<T, C> {
    marker: std::marker::PhantomData<fn() -> RbTree<T, C>>,
}

#[cfg(feature = "serde")]
impl<'de, T, C> Visitor<'de> for RbTreeVisitor<T, C>
where
    T: Deserialize<'de>,
    C: Compare<T> + Default,
{
    type Value = RbTree<T, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of set elements")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut set = RbTree::default();
        while let Some(elem) = seq.next_element()? {
            set.insert(elem);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> Deserialize<'de> for RbTree<T, C>
where
    T: Deserialize<'de>,
    C: Compare<T> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(RbTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

#[cfg(test)]
impl<T, C: Compare<T>> RbTree<T, C> {
    /// Validate every structural invariant, panicking on the first
    /// violation.
    pub(crate) fn check(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0);
            assert_eq!(self.arena.live(), 0);
            return;
        };
        assert!(self.arena[root].parent.is_none());
        assert_eq!(self.arena[root].color, Color::Black);
        let mut count = 0;
        self.check_node(root, None, None, &mut count);
        assert_eq!(count, self.len);
        assert_eq!(count, self.arena.live());
        let elems: Vec<&T> = self.iter().collect();
        assert_eq!(elems.len(), self.len);
        for w in elems.windows(2) {
            assert_eq!(self.cmp.compare(w[0], w[1]), Ordering::Less);
        }
    }

    /// Returns the black-height of the subtree so sibling heights can be
    /// compared.
    fn check_node(&self, id: NodeId, lo: Option<&T>, hi: Option<&T>, count: &mut usize) -> usize {
        let node = &self.arena[id];
        *count += 1;
        if let Some(lo) = lo {
            assert_eq!(self.cmp.compare(lo, &node.elem), Ordering::Less);
        }
        if let Some(hi) = hi {
            assert_eq!(self.cmp.compare(&node.elem, hi), Ordering::Less);
        }
        if node.color == Color::Red {
            assert_eq!(self.color(node.left), Color::Black);
            assert_eq!(self.color(node.right), Color::Black);
        }
        let lh = match node.left {
            Some(l) => {
                assert_eq!(self.arena[l].parent, Some(id));
                self.check_node(l, lo, Some(&node.elem), count)
            }
            None => 0,
        };
        let rh = match node.right {
            Some(r) => {
                assert_eq!(self.arena[r].parent, Some(id));
                self.check_node(r, Some(&node.elem), hi, count)
            }
            None => 0,
        };
        assert_eq!(lh, rh);
        lh + usize::from(node.color == Color::Black)
    }

    /// In-order `(element, is_red)` pairs.
    pub(crate) fn dump(&self) -> Vec<(T, bool)>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.len);
        self.dump_node(self.root, &mut out);
        out
    }

    fn dump_node(&self, id: Option<NodeId>, out: &mut Vec<(T, bool)>)
    where
        T: Clone,
    {
        if let Some(id) = id {
            self.dump_node(self.arena[id].left, out);
            out.push((
                self.arena[id].elem.clone(),
                self.arena[id].color == Color::Red,
            ));
            self.dump_node(self.arena[id].right, out);
        }
    }
}
