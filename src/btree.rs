//! Ordered set backed by a multi-way balanced search tree.
//!
//! Every node stores up to `order - 1` elements and, unless it is a leaf,
//! one more child than elements. All leaves sit at the same depth and every
//! non-root node stays at or above a minimum fill derived from the order, so
//! insert, search and remove are logarithmic for any operation sequence.
//!
//! Rebalancing is structural surgery on whole nodes: an overfull node splits
//! around its median and pushes the median up, possibly all the way to a new
//! root; an underfull node borrows an element through its parent from a
//! sibling, or fuses with one, pulling a separator down and cascading the
//! deficit upward.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Debug;
use std::iter::FusedIterator;
use std::mem;

use crate::arena::{Arena, NodeId};
use crate::contract::{Compare, Destroyer, Flag, Natural, OrderedSet};
use crate::DEFAULT_ORDER;

/// Stack of positions on a root-to-leaf path. Every internal node has at
/// least two children, so the height of any addressable tree stays well
/// under this capacity.
type PathVec<T> = arrayvec::ArrayVec<T, 80>;

struct BNode<T> {
    parent: Option<NodeId>,
    elems: Vec<T>,
    kids: Vec<NodeId>,
}

impl<T> BNode<T> {
    /// One spare element slot so a full node can take the incoming element
    /// while it is being split.
    fn new(max: usize) -> Self {
        Self {
            parent: None,
            elems: Vec::with_capacity(max + 1),
            kids: Vec::with_capacity(max + 2),
        }
    }

    fn is_leaf(&self) -> bool {
        self.kids.is_empty()
    }
}

/// Ordered set of unique elements stored in a B-tree.
///
/// The branching factor is chosen at construction time; the comparator is
/// the type parameter `C`, defaulting to the element's own ordering via
/// [`Natural`]. Errors are reported through the handle's [`Flag`] alongside
/// the `bool`/`Option` result of each call. Dropping the tree destroys every
/// node, routing elements through the destroyer when one is set.
///
/// # Example
///
/// ```
///     use ordset::BTree;
///     let mut set = BTree::new(8, ordset::Natural).unwrap();
///     set.insert(3);
///     set.insert(1);
///     assert!(set.contains(&1));
///     assert_eq!(set.iter().copied().collect::<Vec<i32>>(), vec![1, 3]);
/// ```
pub struct BTree<T, C = Natural> {
    arena: Arena<BNode<T>>,
    root: Option<NodeId>,
    len: usize,
    min: usize,
    max: usize,
    cmp: C,
    destroyer: Option<Destroyer<T>>,
    flag: Cell<Flag>,
}

impl<T, C: Compare<T>> BTree<T, C> {
    /// Returns a new, empty set with branching factor `order` (a node holds
    /// at most `order` children and `order - 1` elements), or `None` if
    /// `order < 3`.
    pub fn new(order: usize, cmp: C) -> Option<Self> {
        if order < 3 {
            return None;
        }
        Some(Self::with_order(order, cmp))
    }

    /// Like [`Self::new`], with an element finalizer installed from the
    /// start.
    pub fn with_destroyer(order: usize, cmp: C, destroyer: Destroyer<T>) -> Option<Self> {
        let mut set = Self::new(order, cmp)?;
        set.destroyer = Some(destroyer);
        Some(set)
    }

    fn with_order(order: usize, cmp: C) -> Self {
        let max = order - 1;
        // A fusion nets 2 * min keys (two minimal nodes plus the separator,
        // minus the removed key), so min stays low enough to fit in max; the
        // floor of one keeps every node non-empty.
        let min = match max % 2 {
            1 => max / 2,
            _ => (max / 2 - 1).max(1),
        };
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
            min,
            max,
            cmp,
            destroyer: None,
            flag: Cell::new(Flag::Ok),
        }
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

    /// Binary search for `x` among a node's elements: `Ok` means present,
    /// `Err` holds the child index to descend into (equally, the insertion
    /// index).
    fn position(&self, id: NodeId, x: &T) -> Result<usize, usize> {
        let elems = &self.arena[id].elems;
        let (mut i, mut j) = (0, elems.len());
        while i < j {
            let m = (i + j) / 2;
            match self.cmp.compare(x, &elems[m]) {
                Ordering::Equal => return Ok(m),
                Ordering::Greater => i = m + 1,
                Ordering::Less => j = m,
            }
        }
        Err(i)
    }

    fn insert_index(&self, id: NodeId, x: &T) -> usize {
        match self.position(id, x) {
            Ok(i) | Err(i) => i,
        }
    }

    /// Reference to the stored element comparing equal to `elem`.
    #[must_use]
    pub fn get(&self, elem: &T) -> Option<&T> {
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.position(id, elem) {
                Ok(i) => return Some(&self.arena[id].elems[i]),
                Err(i) => cur = self.arena[id].kids.get(i).copied(),
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
            let mut node = BNode::new(self.max);
            node.elems.push(elem);
            return match self.arena.try_alloc(node) {
                Ok(id) => {
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

        // Descend to the leaf where the element belongs, checking every
        // visited node for an equal element.
        let mut cur = root;
        let mut at = loop {
            match self.position(cur, &elem) {
                Ok(_) => return false,
                Err(i) => {
                    if self.arena[cur].is_leaf() {
                        break i;
                    }
                    cur = self.arena[cur].kids[i];
                }
            }
        };

        if self.arena[cur].elems.len() < self.max {
            self.arena[cur].elems.insert(at, elem);
            self.len += 1;
            self.flag.set(Flag::Ok);
            return true;
        }

        // The leaf is full. Every full node on the path up splits in two,
        // and if the cascade consumes the root a new root is created above
        // it. Reserve every node the cascade will need before touching the
        // tree, so a failed allocation leaves it exactly as it was.
        let mut needed = 0;
        let mut probe = Some(cur);
        loop {
            match probe {
                Some(id) if self.arena[id].elems.len() == self.max => {
                    needed += 1;
                    probe = self.arena[id].parent;
                }
                Some(_) => break,
                None => {
                    needed += 1;
                    break;
                }
            }
        }
        let mut fresh: PathVec<NodeId> = PathVec::new();
        for _ in 0..needed {
            match self.arena.try_alloc(BNode::new(self.max)) {
                Ok(id) => fresh.push(id),
                Err(_) => {
                    for id in fresh {
                        self.arena.release(id);
                    }
                    self.flag.set(Flag::Alloc);
                    return false;
                }
            }
        }

        // Iterative upward split. `carry` is the element moving up, with
        // the two halves of the node it rose out of on either side.
        let mut carry = elem;
        let mut halves: Option<(NodeId, NodeId)> = None;
        let mut node = Some(cur);
        loop {
            let Some(id) = node else {
                // The old root split: the last reserved node becomes the
                // new root with the two halves as its only children.
                let rid = fresh.pop().unwrap();
                let (left, right) = halves.unwrap();
                {
                    let r = &mut self.arena[rid];
                    r.elems.push(carry);
                    r.kids.push(left);
                    r.kids.push(right);
                }
                self.arena[left].parent = Some(rid);
                self.arena[right].parent = Some(rid);
                self.root = Some(rid);
                break;
            };

            let was_full = self.arena[id].elems.len() == self.max;
            self.arena[id].elems.insert(at, carry);
            if let Some((_, right)) = halves {
                self.arena[id].kids.insert(at + 1, right);
                self.arena[right].parent = Some(id);
            }
            if !was_full {
                break;
            }

            // Transiently one element over: split around the right-biased
            // median. The node keeps the left half, the reserved node takes
            // everything past the median.
            let mid = self.max / 2;
            let rid = fresh.pop().unwrap();
            let parent = self.arena[id].parent;
            let (med, tail_elems, tail_kids) = {
                let n = &mut self.arena[id];
                let tail_elems = n.elems.split_off(mid + 1);
                let med = n.elems.pop().unwrap();
                let tail_kids = if n.is_leaf() {
                    Vec::new()
                } else {
                    n.kids.split_off(mid + 1)
                };
                (med, tail_elems, tail_kids)
            };
            {
                let r = &mut self.arena[rid];
                r.parent = parent;
                r.elems = tail_elems;
                r.kids = tail_kids;
            }
            for i in 0..self.arena[rid].kids.len() {
                let kid = self.arena[rid].kids[i];
                self.arena[kid].parent = Some(rid);
            }

            carry = med;
            halves = Some((id, rid));
            node = parent;
            if let Some(p) = parent {
                at = self.insert_index(p, &carry);
            }
        }
        debug_assert!(fresh.is_empty());

        self.len += 1;
        self.flag.set(Flag::Ok);
        true
    }

    /// Remove the element comparing equal to `elem`, routing it through the
    /// destroyer. Returns `false` if no such element is present.
    pub fn remove(&mut self, elem: &T) -> bool {
        let mut cur = self.root;
        let (mut node, mut at) = loop {
            let Some(id) = cur else { return false };
            match self.position(id, elem) {
                Ok(i) => break (id, i),
                Err(i) => cur = self.arena[id].kids.get(i).copied(),
            }
        };

        // Physical removal always happens at a leaf: an internal slot first
        // trades places with its in-order predecessor, the rightmost element
        // of its left subtree.
        if !self.arena[node].is_leaf() {
            let mut leaf = self.arena[node].kids[at];
            while !self.arena[leaf].is_leaf() {
                leaf = *self.arena[leaf].kids.last().unwrap();
            }
            let last = self.arena[leaf].elems.len() - 1;
            let (a, b) = self.arena.get2_mut(node, leaf);
            mem::swap(&mut a.elems[at], &mut b.elems[last]);
            node = leaf;
            at = last;
        }

        let victim = if Some(node) == self.root || self.arena[node].elems.len() > self.min {
            self.arena[node].elems.remove(at)
        } else {
            self.fix_underflow(node, at)
        };

        self.len -= 1;
        if self.len == 0 {
            // The root is an empty leaf now.
            let id = self.root.take().unwrap();
            self.arena.release(id);
        } else if let Some(rid) = self.root {
            if self.arena[rid].elems.is_empty() {
                // A fusion cascade emptied the root; its sole remaining
                // child takes over.
                let child = self.arena[rid].kids[0];
                self.arena[child].parent = None;
                self.root = Some(child);
                self.arena.release(rid);
            }
        }
        self.dispose(victim);
        true
    }

    /// Remove and return the element at `at` of a minimally filled non-root
    /// node, restoring the fill bound with a sibling transfer or a fusion.
    /// For an internal node the child link just right of the removed element
    /// goes with it.
    fn fix_underflow(&mut self, node: NodeId, at: usize) -> T {
        let parent = self.arena[node].parent.unwrap();
        let pos = self.child_index(parent, node);

        if pos > 0 {
            let left = self.arena[parent].kids[pos - 1];
            if self.arena[left].elems.len() > self.min {
                return self.transfer_from_left(parent, pos - 1, at);
            }
        }
        if pos < self.arena[parent].elems.len() {
            let right = self.arena[parent].kids[pos + 1];
            if self.arena[right].elems.len() > self.min {
                return self.transfer_from_right(parent, pos, at);
            }
            return self.fuse(parent, pos, at, true);
        }
        self.fuse(parent, pos - 1, at, false)
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> usize {
        let kids = &self.arena[parent].kids;
        kids.iter().position(|&k| k == child).unwrap()
    }

    /// Rotate one element through the parent from the left sibling into the
    /// node at `left_index + 1`, removing that node's element at `at`.
    fn transfer_from_left(&mut self, parent: NodeId, left_index: usize, at: usize) -> T {
        let left = self.arena[parent].kids[left_index];
        let right = self.arena[parent].kids[left_index + 1];

        let moved = self.arena[left].elems.pop().unwrap();
        let moved_kid = if self.arena[left].is_leaf() {
            None
        } else {
            self.arena[left].kids.pop()
        };
        let sep = mem::replace(&mut self.arena[parent].elems[left_index], moved);

        let victim = self.arena[right].elems.remove(at);
        self.arena[right].elems.insert(0, sep);
        if let Some(kid) = moved_kid {
            self.arena[right].kids.remove(at + 1);
            self.arena[right].kids.insert(0, kid);
            self.arena[kid].parent = Some(right);
        }
        victim
    }

    /// Rotate one element through the parent from the right sibling into the
    /// node at `left_index`, removing that node's element at `at`.
    fn transfer_from_right(&mut self, parent: NodeId, left_index: usize, at: usize) -> T {
        let left = self.arena[parent].kids[left_index];
        let right = self.arena[parent].kids[left_index + 1];

        let victim = self.arena[left].elems.remove(at);
        let moved = self.arena[right].elems.remove(0);
        let moved_kid = if self.arena[right].is_leaf() {
            None
        } else {
            Some(self.arena[right].kids.remove(0))
        };
        let sep = mem::replace(&mut self.arena[parent].elems[left_index], moved);
        self.arena[left].elems.push(sep);
        if let Some(kid) = moved_kid {
            self.arena[left].kids.remove(at + 1);
            self.arena[left].kids.push(kid);
            self.arena[kid].parent = Some(left);
        }
        victim
    }

    /// Merge the two children either side of the parent's separator at
    /// `left_index` into the left one, pulling the separator down, and
    /// remove the element at `at` of the side `del_from_left` points at.
    /// Pulling the separator out of a minimally filled parent recurses
    /// upward, cascading the underflow.
    fn fuse(&mut self, parent: NodeId, left_index: usize, at: usize, del_from_left: bool) -> T {
        let left = self.arena[parent].kids[left_index];
        let right = self.arena[parent].kids[left_index + 1];

        let sep = if self.arena[parent].elems.len() == self.min && Some(parent) != self.root {
            self.fix_underflow(parent, left_index)
        } else {
            self.arena[parent].kids.remove(left_index + 1);
            self.arena[parent].elems.remove(left_index)
        };

        let victim = if del_from_left {
            let v = self.arena[left].elems.remove(at);
            if !self.arena[left].is_leaf() {
                self.arena[left].kids.remove(at + 1);
            }
            v
        } else {
            let v = self.arena[right].elems.remove(at);
            if !self.arena[right].is_leaf() {
                self.arena[right].kids.remove(at + 1);
            }
            v
        };

        // Fold the right node into the left one.
        let mut gone = self.arena.release(right);
        {
            let l = &mut self.arena[left];
            l.elems.push(sep);
            l.elems.append(&mut gone.elems);
            l.kids.extend(gone.kids.iter().copied());
        }
        for &kid in &gone.kids {
            self.arena[kid].parent = Some(left);
        }
        victim
    }

    /// Element with the minimum priority, i.e. the one that orders last
    /// under the comparator: the rightmost element of the rightmost leaf.
    /// Returns `None` and sets [`Flag::Empty`] on an empty set.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        let Some(mut id) = self.root else {
            self.flag.set(Flag::Empty);
            return None;
        };
        while !self.arena[id].is_leaf() {
            id = *self.arena[id].kids.last().unwrap();
        }
        self.flag.set(Flag::Ok);
        self.arena[id].elems.last()
    }

    /// Element with the maximum priority, i.e. the one that orders first
    /// under the comparator: the leftmost element of the leftmost leaf.
    /// Returns `None` and sets [`Flag::Empty`] on an empty set.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        let Some(mut id) = self.root else {
            self.flag.set(Flag::Empty);
            return None;
        };
        while !self.arena[id].is_leaf() {
            id = self.arena[id].kids[0];
        }
        self.flag.set(Flag::Ok);
        self.arena[id].elems.first()
    }

    /// Structural copy cloning every element. For shared-handle element
    /// types this aliases the underlying data, matching a shallow copy.
    /// Returns `None` and sets [`Flag::Alloc`] if the copy runs into the
    /// node limit. The copy starts without a destroyer.
    #[must_use]
    pub fn copy(&self) -> Option<Self>
    where
        T: Clone,
        C: Clone,
    {
        self.copy_impl(&mut |e: &T| Some(e.clone()))
    }

    /// Deep copy through `copier`, preserving the tree shape. A `None` from
    /// the copier counts as allocation failure: the partial copy is
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
            min: self.min,
            max: self.max,
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
        let mut node = BNode::new(self.max);
        node.parent = parent;
        for e in &self.arena[src].elems {
            node.elems.push(copier(e)?);
        }
        let id = out.arena.try_alloc(node).ok()?;
        for i in 0..self.arena[src].kids.len() {
            let kid = self.arena[src].kids[i];
            let copied = self.copy_node(kid, Some(id), out, copier)?;
            out.arena[id].kids.push(copied);
        }
        Some(id)
    }

    /// Iterator over the elements in ascending comparator order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, C> {
        let mut stack = PathVec::new();
        if let Some(mut id) = self.root {
            loop {
                stack.push((id, 0));
                if self.arena[id].is_leaf() {
                    break;
                }
                id = self.arena[id].kids[0];
            }
        }
        Iter {
            tree: self,
            stack,
            remaining: self.len,
        }
    }
} // End impl BTree

impl<T, C> BTree<T, C> {
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
        for kid in node.kids {
            self.drop_subtree(kid);
        }
        for elem in node.elems {
            self.dispose(elem);
        }
    }

    fn dispose(&mut self, elem: T) {
        match &mut self.destroyer {
            Some(f) => f(elem),
            None => drop(elem),
        }
    }
}

impl<T, C> Drop for BTree<T, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, C: Compare<T> + Default> Default for BTree<T, C> {
    fn default() -> Self {
        Self::with_order(DEFAULT_ORDER, C::default())
    }
}

impl<T: Debug, C: Compare<T>> Debug for BTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for BTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        for elem in iter {
            set.insert(elem);
        }
        set
    }
}

impl<T, C: Compare<T>> Extend<T> for BTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<'a, T, C: Compare<T>> IntoIterator for &'a BTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Iter<'a, T, C> {
        self.iter()
    }
}

impl<T, C: Compare<T>> OrderedSet<T> for BTree<T, C> {
    fn len(&self) -> usize {
        BTree::len(self)
    }

    fn insert(&mut self, elem: T) -> bool {
        BTree::insert(self, elem)
    }

    fn get(&self, elem: &T) -> Option<&T> {
        BTree::get(self, elem)
    }

    fn remove(&mut self, elem: &T) -> bool {
        BTree::remove(self, elem)
    }

    fn min(&self) -> Option<&T> {
        BTree::min(self)
    }

    fn max(&self) -> Option<&T> {
        BTree::max(self)
    }

    fn clear(&mut self) {
        BTree::clear(self);
    }

    fn set_destroyer(&mut self, destroyer: Option<Destroyer<T>>) {
        BTree::set_destroyer(self, destroyer);
    }

    fn flag(&self) -> Flag {
        BTree::flag(self)
    }
}

/// Iterator returned by [`BTree::iter`], yielding elements in ascending
/// comparator order.
pub struct Iter<'a, T, C = Natural> {
    tree: &'a BTree<T, C>,
    stack: PathVec<(NodeId, usize)>,
    remaining: usize,
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let tree = self.tree;
        loop {
            let &(id, i) = self.stack.last()?;
            let node = &tree.arena[id];
            if i == node.elems.len() {
                self.stack.pop();
                continue;
            }
            *self.stack.last_mut().unwrap() = (id, i + 1);
            if !node.is_leaf() {
                // Descend to the leftmost leaf of the subtree between this
                // element and the next.
                let mut kid = node.kids[i + 1];
                loop {
                    let leaf = tree.arena[kid].is_leaf();
                    self.stack.push((kid, 0));
                    if leaf {
                        break;
                    }
                    kid = tree.arena[kid].kids[0];
                }
            }
            self.remaining -= 1;
            return Some(&node.elems[i]);
        }
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
impl<T: Serialize, C: Compare<T>> Serialize for BTree<T, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for elem in self {
            seq.serialize_element(elem)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct BTreeVisitor<T, C> {
    marker: std::marker::PhantomData<fn() -> BTree<T, C>>,
}

#[cfg(feature = "serde")]
impl<'de, T, C> Visitor<'de> for BTreeVisitor<T, C>
where
    T: Deserialize<'de>,
    C: Compare<T> + Default,
{
    type Value = BTree<T, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of set elements")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut set = BTree::default();
        while let Some(elem) = seq.next_element()? {
            set.insert(elem);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> Deserialize<'de> for BTree<T, C>
where
    T: Deserialize<'de>,
    C: Compare<T> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(BTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

#[cfg(test)]
impl<T, C: Compare<T>> BTree<T, C> {
    /// Validate every structural invariant, panicking on the first
    /// violation.
    pub(crate) fn check(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0);
            assert_eq!(self.arena.live(), 0);
            return;
        };
        assert!(self.arena[root].parent.is_none());
        let mut count = 0;
        let mut nodes = 0;
        self.check_node(root, true, None, None, &mut count, &mut nodes);
        assert_eq!(count, self.len);
        assert_eq!(nodes, self.arena.live());
        let elems: Vec<&T> = self.iter().collect();
        assert_eq!(elems.len(), self.len);
        for w in elems.windows(2) {
            assert_eq!(self.cmp.compare(w[0], w[1]), Ordering::Less);
        }
    }

    /// Returns the subtree depth so sibling depths can be compared.
    fn check_node(
        &self,
        id: NodeId,
        is_root: bool,
        lo: Option<&T>,
        hi: Option<&T>,
        count: &mut usize,
        nodes: &mut usize,
    ) -> usize {
        let node = &self.arena[id];
        *nodes += 1;
        *count += node.elems.len();
        assert!(node.elems.len() <= self.max);
        if is_root {
            assert!(!node.elems.is_empty());
        } else {
            assert!(node.elems.len() >= self.min);
        }
        for w in node.elems.windows(2) {
            assert_eq!(self.cmp.compare(&w[0], &w[1]), Ordering::Less);
        }
        if let Some(lo) = lo {
            assert_eq!(self.cmp.compare(lo, &node.elems[0]), Ordering::Less);
        }
        if let Some(hi) = hi {
            assert_eq!(
                self.cmp.compare(node.elems.last().unwrap(), hi),
                Ordering::Less
            );
        }
        if node.is_leaf() {
            return 1;
        }
        assert_eq!(node.kids.len(), node.elems.len() + 1);
        let mut depth = None;
        for (i, &kid) in node.kids.iter().enumerate() {
            assert_eq!(self.arena[kid].parent, Some(id));
            let lo = if i == 0 { lo } else { Some(&node.elems[i - 1]) };
            let hi = if i == node.elems.len() {
                hi
            } else {
                Some(&node.elems[i])
            };
            let d = self.check_node(kid, false, lo, hi, count, nodes);
            match depth {
                None => depth = Some(d),
                Some(prev) => assert_eq!(prev, d),
            }
        }
        depth.unwrap() + 1
    }

    pub(crate) fn root_elems(&self) -> Vec<T>
    where
        T: Clone,
    {
        match self.root {
            Some(id) => self.arena[id].elems.clone(),
            None => Vec::new(),
        }
    }

    pub(crate) fn height(&self) -> usize {
        let mut h = 0;
        let mut cur = self.root;
        while let Some(id) = cur {
            h += 1;
            cur = self.arena[id].kids.first().copied();
        }
        h
    }
}
