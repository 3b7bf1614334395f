use crate::*;

use rand::seq::SliceRandom;
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::rc::Rc;

fn counting_destroyer<T: 'static>(counter: &Rc<Cell<usize>>) -> Destroyer<T> {
    let counter = Rc::clone(counter);
    Box::new(move |_| counter.set(counter.get() + 1))
}

fn exercise_contract<S: OrderedSet<i32>>(set: &mut S) {
    assert!(set.is_empty());
    assert_eq!(set.min(), None);
    assert_eq!(set.flag(), Flag::Empty);
    assert_eq!(set.max(), None);
    assert_eq!(set.flag(), Flag::Empty);

    for i in 0..20 {
        assert!(set.insert(i));
    }
    assert_eq!(set.flag(), Flag::Ok);
    assert_eq!(set.len(), 20);

    // Duplicates are rejected without touching size or contents.
    assert!(!set.insert(10));
    assert_eq!(set.len(), 20);

    assert_eq!(set.get(&5), Some(&5));
    assert!(set.contains(&19));
    assert!(!set.contains(&20));

    // Lower comparison order means higher priority, so min is the element
    // that orders last.
    assert_eq!(set.min(), Some(&19));
    assert_eq!(set.max(), Some(&0));

    assert!(set.remove(&7));
    assert!(!set.remove(&7));
    assert_eq!(set.len(), 19);

    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.min(), None);
    assert_eq!(set.flag(), Flag::Empty);

    // A flagged handle stays usable.
    assert!(set.insert(1));
    assert_eq!(set.flag(), Flag::Ok);
}

#[test]
fn contract_both_engines() {
    exercise_contract(&mut BTree::new(4, Natural).unwrap());
    exercise_contract(&mut RbTree::new(Natural));
}

#[test]
fn btree_rejects_tiny_order() {
    assert!(BTree::<i32>::new(2, Natural).is_none());
    assert!(BTree::<i32>::new(0, Natural).is_none());
    assert!(BTree::<i32>::new(3, Natural).is_some());
}

#[test]
fn btree_split_chain() {
    // Order 3 means at most two elements per node: ascending inserts force
    // a split at every other step, finishing with a lone median at the top.
    let mut t = BTree::new(3, Natural).unwrap();
    for i in 1..=7 {
        assert!(t.insert(i));
        t.check();
    }
    assert_eq!(t.len(), 7);
    assert_eq!(t.height(), 3);
    assert_eq!(t.root_elems(), vec![4]);
    let all: Vec<i32> = t.iter().copied().collect();
    assert_eq!(all, (1..=7).collect::<Vec<i32>>());
}

#[test]
fn btree_fusion_cascade() {
    let mut t = BTree::new(3, Natural).unwrap();
    for i in 1..=7 {
        assert!(t.insert(i));
    }
    for i in 1..=3 {
        assert!(t.remove(&i));
        t.check();
    }
    assert_eq!(t.len(), 4);
    let all: Vec<i32> = t.iter().copied().collect();
    assert_eq!(all, vec![4, 5, 6, 7]);
}

#[test]
fn btree_min_max_convention() {
    let mut t = BTree::new(5, Natural).unwrap();
    for i in 1..=9 {
        t.insert(i);
    }
    assert_eq!(t.min(), Some(&9));
    assert_eq!(t.max(), Some(&1));
    assert_eq!(t.flag(), Flag::Ok);
}

#[test]
fn btree_empty_queries_flag() {
    let t = BTree::<i32>::new(3, Natural).unwrap();
    assert_eq!(t.min(), None);
    assert_eq!(t.flag(), Flag::Empty);
    assert_eq!(t.max(), None);
    assert_eq!(t.flag(), Flag::Empty);
    assert_eq!(t.get(&1), None);
}

#[test]
fn btree_alloc_failure_is_atomic() {
    let mut t = BTree::new(3, Natural).unwrap();
    for i in 1..=7 {
        assert!(t.insert(i));
    }

    // Freeze the arena at its current occupancy. An insert that fits in an
    // existing leaf still succeeds; one that needs a split must fail whole.
    t.set_node_limit(Some(0));
    assert!(t.insert(8)); // leaf had room, no allocation
    assert_eq!(t.flag(), Flag::Ok);
    let before: Vec<i32> = t.iter().copied().collect();
    let len = t.len();

    assert!(!t.insert(9)); // leaf full, split cannot allocate
    assert_eq!(t.flag(), Flag::Alloc);
    assert_eq!(t.len(), len);
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), before);
    t.check();

    // Lifting the limit makes the same insert succeed and clears the flag.
    t.set_node_limit(None);
    assert!(t.insert(9));
    assert_eq!(t.flag(), Flag::Ok);
    t.check();
}

#[test]
fn btree_alloc_failure_on_empty() {
    let mut t = BTree::<i32>::new(3, Natural).unwrap();
    t.set_node_limit(Some(0));
    assert!(!t.insert(1));
    assert_eq!(t.flag(), Flag::Alloc);
    assert!(t.is_empty());
    t.check();
}

#[test]
fn btree_copy_roundtrip() {
    let mut rng = rand::rng();
    let mut vals: Vec<u32> = (0..200).collect();
    vals.shuffle(&mut rng);

    let mut t = BTree::new(4, Natural).unwrap();
    for &v in &vals {
        t.insert(v);
    }

    let mut c = t.copy().unwrap();
    c.check();
    assert_eq!(t.flag(), Flag::Ok);
    assert_eq!(
        t.iter().collect::<Vec<&u32>>(),
        c.iter().collect::<Vec<&u32>>()
    );

    // Mutating the copy leaves the original alone.
    for v in 0..100 {
        c.remove(&v);
    }
    c.insert(1000);
    c.check();
    assert_eq!(t.len(), 200);
    assert!(!t.contains(&1000));
    t.check();
}

#[test]
fn btree_deep_copy_failure_discards_partial() {
    let mut t = BTree::new(3, Natural).unwrap();
    for i in 0..50 {
        t.insert(i);
    }

    let calls = Rc::new(Cell::new(0));
    let calls2 = Rc::clone(&calls);
    let copied = t.copy_with(move |e: &i32| {
        calls2.set(calls2.get() + 1);
        if calls2.get() > 20 {
            None
        } else {
            Some(*e)
        }
    });
    assert!(copied.is_none());
    assert_eq!(t.flag(), Flag::Alloc);
    assert!(calls.get() > 20);

    // The source is untouched and usable.
    assert_eq!(t.len(), 50);
    t.check();
    assert!(t.copy_with(|e| Some(*e)).is_some());
    assert_eq!(t.flag(), Flag::Ok);
}

#[test]
fn copy_aliases_shared_elements() {
    let mut t = RbTree::new(Natural);
    for i in 0..10 {
        t.insert(Rc::new(i));
    }
    let one = t.get(&Rc::new(3)).cloned().unwrap();
    assert_eq!(Rc::strong_count(&one), 2);

    let c = t.copy().unwrap();
    assert_eq!(Rc::strong_count(&one), 3);
    drop(c);
    assert_eq!(Rc::strong_count(&one), 2);
}

#[test]
fn destroyer_runs_on_remove_clear_and_drop() {
    let destroyed = Rc::new(Cell::new(0));

    let mut t = BTree::with_destroyer(4, Natural, counting_destroyer(&destroyed)).unwrap();
    for i in 0..50 {
        t.insert(i);
    }
    assert_eq!(destroyed.get(), 0);

    // A rejected duplicate is dropped, not destroyed.
    assert!(!t.insert(7));
    assert_eq!(destroyed.get(), 0);

    for i in 0..10 {
        assert!(t.remove(&i));
    }
    assert_eq!(destroyed.get(), 10);

    t.clear();
    assert_eq!(destroyed.get(), 50);

    for i in 0..5 {
        t.insert(i);
    }
    // Swapping the destroyer out stops the routing.
    t.set_destroyer(None);
    assert!(t.remove(&0));
    assert_eq!(destroyed.get(), 50);
    t.set_destroyer(Some(counting_destroyer(&destroyed)));
    drop(t);
    assert_eq!(destroyed.get(), 54);

    let mut r = RbTree::with_destroyer(Natural, counting_destroyer(&destroyed));
    for i in 0..50 {
        r.insert(i);
    }
    for i in 0..10 {
        assert!(r.remove(&i));
    }
    assert_eq!(destroyed.get(), 64);
    drop(r);
    assert_eq!(destroyed.get(), 104);
}

#[test]
fn btree_random_differential() {
    let mut rng = rand::rng();
    for order in [3, 4, 7, 16] {
        let mut t = BTree::new(order, Natural).unwrap();
        let mut reference = BTreeSet::new();

        let mut vals: Vec<u32> = (0..300).collect();
        vals.shuffle(&mut rng);
        for &v in &vals {
            assert_eq!(t.insert(v), reference.insert(v));
            t.check();
        }
        assert!(!t.insert(vals[0]));

        vals.shuffle(&mut rng);
        for &v in vals.iter().take(150) {
            assert_eq!(t.remove(&v), reference.remove(&v));
            t.check();
        }
        assert!(!t.remove(&1000));

        assert_eq!(t.len(), reference.len());
        assert_eq!(
            t.iter().copied().collect::<Vec<u32>>(),
            reference.iter().copied().collect::<Vec<u32>>()
        );

        for &v in &vals {
            assert_eq!(t.remove(&v), reference.remove(&v));
        }
        t.check();
        assert!(t.is_empty());
    }
}

#[test]
fn btree_bulk_sequential() {
    let n = 10_000;
    let mut t: BTree<usize> = BTree::default();
    for i in 0..n {
        t.insert(i);
    }
    t.check();
    assert_eq!(t.len(), n);

    for i in (0..n).rev() {
        assert!(t.contains(&i));
    }
    for i in (0..n).step_by(2) {
        assert!(t.remove(&i));
    }
    t.check();
    assert_eq!(t.len(), n / 2);
    for (got, want) in t.iter().zip((0..n).filter(|i| i % 2 == 1)) {
        assert_eq!(*got, want);
    }
}

#[test]
fn btree_from_iter_and_extend() {
    let t: BTree<u32> = (0..50).rev().collect();
    t.check();
    assert_eq!(t.len(), 50);
    assert_eq!(t.iter().count(), 50);

    let mut t2 = BTree::new(3, Natural).unwrap();
    t2.extend([5, 1, 4, 1, 3]);
    assert_eq!(t2.len(), 4);
    assert_eq!(t2.iter().copied().collect::<Vec<i32>>(), vec![1, 3, 4, 5]);
}

#[test]
fn btree_iter_is_exact() {
    let mut t = BTree::new(3, Natural).unwrap();
    for i in 0..100 {
        t.insert(i);
    }
    let mut it = t.iter();
    assert_eq!(it.len(), 100);
    it.next();
    assert_eq!(it.len(), 99);
    assert_eq!(it.size_hint(), (99, Some(99)));
    assert_eq!(it.count(), 99);
}

#[test]
fn rbt_insert_restructures() {
    // Ascending inserts force a trinode restructuring: the middle element
    // rises to a black root with red children.
    let mut t = RbTree::new(Natural);
    for i in [10, 20, 30] {
        assert!(t.insert(i));
    }
    t.check();
    assert_eq!(t.dump(), vec![(10, true), (20, false), (30, true)]);
}

#[test]
fn rbt_remove_black_node_fixup() {
    let mut t = RbTree::new(Natural);
    for i in [10, 20, 30, 40, 50] {
        assert!(t.insert(i));
        t.check();
    }
    assert!(t.remove(&20));
    t.check();
    assert_eq!(
        t.iter().copied().collect::<Vec<i32>>(),
        vec![10, 30, 40, 50]
    );
}

#[test]
fn rbt_red_sibling_then_restructure() {
    // Removing 20 hits a red sibling first (rotation at the root), then a
    // restructuring one level down; the root handle must survive both.
    let mut t = RbTree::new(Natural);
    for i in [50, 20, 80, 70, 90, 60] {
        assert!(t.insert(i));
    }
    t.check();
    assert!(t.remove(&20));
    t.check();
    assert_eq!(
        t.iter().copied().collect::<Vec<i32>>(),
        vec![50, 60, 70, 80, 90]
    );
}

#[test]
fn rbt_min_max_convention() {
    let mut t = RbTree::new(Natural);
    for i in 1..=9 {
        t.insert(i);
    }
    assert_eq!(t.min(), Some(&9));
    assert_eq!(t.max(), Some(&1));
    assert_eq!(t.flag(), Flag::Ok);
}

#[test]
fn rbt_empty_queries_flag() {
    let t = RbTree::<i32>::new(Natural);
    assert_eq!(t.min(), None);
    assert_eq!(t.flag(), Flag::Empty);
    assert_eq!(t.max(), None);
    assert_eq!(t.flag(), Flag::Empty);
}

#[test]
fn rbt_alloc_failure_is_atomic() {
    let mut t = RbTree::new(Natural);
    for i in 0..20 {
        assert!(t.insert(i));
    }
    t.set_node_limit(Some(0));
    assert!(!t.insert(20));
    assert_eq!(t.flag(), Flag::Alloc);
    assert_eq!(t.len(), 20);
    t.check();

    t.set_node_limit(None);
    assert!(t.insert(20));
    assert_eq!(t.flag(), Flag::Ok);
    t.check();
}

#[test]
fn rbt_random_differential() {
    let mut rng = rand::rng();
    for _rep in 0..4 {
        let mut t = RbTree::new(Natural);
        let mut reference = BTreeSet::new();

        let mut vals: Vec<u32> = (0..300).collect();
        vals.shuffle(&mut rng);
        for &v in &vals {
            assert_eq!(t.insert(v), reference.insert(v));
            t.check();
        }

        vals.shuffle(&mut rng);
        for &v in vals.iter().take(150) {
            assert_eq!(t.remove(&v), reference.remove(&v));
            t.check();
        }
        assert!(!t.remove(&1000));

        assert_eq!(t.len(), reference.len());
        assert_eq!(
            t.iter().copied().collect::<Vec<u32>>(),
            reference.iter().copied().collect::<Vec<u32>>()
        );

        for &v in &vals {
            assert_eq!(t.remove(&v), reference.remove(&v));
        }
        t.check();
        assert!(t.is_empty());
    }
}

#[test]
fn rbt_bulk_sequential() {
    let n = 10_000;
    let mut t = RbTree::new(Natural);
    for i in 0..n {
        t.insert(i);
    }
    t.check();
    assert_eq!(t.len(), n);

    for i in (0..n).step_by(2) {
        assert!(t.remove(&i));
    }
    t.check();
    assert_eq!(t.len(), n / 2);
    for (got, want) in t.iter().zip((0..n).filter(|i| i % 2 == 1)) {
        assert_eq!(*got, want);
    }
}

#[test]
fn rbt_copy_preserves_colors() {
    let mut rng = rand::rng();
    let mut vals: Vec<u32> = (0..200).collect();
    vals.shuffle(&mut rng);

    let mut t = RbTree::new(Natural);
    for &v in &vals {
        t.insert(v);
    }

    let c = t.copy().unwrap();
    c.check();
    assert_eq!(t.dump(), c.dump());

    let deep = t.copy_with(|e| Some(*e)).unwrap();
    deep.check();
    assert_eq!(t.dump(), deep.dump());
}

#[test]
fn custom_comparator_reverses_order() {
    let rev = |a: &i32, b: &i32| b.cmp(a);

    let mut t = RbTree::new(rev);
    t.extend([1, 2, 3]);
    t.check();
    assert_eq!(t.iter().copied().collect::<Vec<i32>>(), vec![3, 2, 1]);
    assert_eq!(t.min(), Some(&1));
    assert_eq!(t.max(), Some(&3));

    let mut b = BTree::new(3, rev).unwrap();
    b.extend(0..100);
    b.check();
    assert_eq!(b.iter().next(), Some(&99));
    assert_eq!(b.min(), Some(&0));
    assert_eq!(b.max(), Some(&99));
}

#[test]
fn clear_then_reuse() {
    let mut t = BTree::new(3, Natural).unwrap();
    for i in 0..100 {
        t.insert(i);
    }
    t.clear();
    t.check();
    assert!(t.is_empty());
    for i in 0..100 {
        assert!(t.insert(i));
    }
    t.check();
    assert_eq!(t.len(), 100);

    let mut r = RbTree::new(Natural);
    for i in 0..100 {
        r.insert(i);
    }
    r.clear();
    r.check();
    for i in 0..100 {
        assert!(r.insert(i));
    }
    r.check();
}

fn compare_orderings(a: &u32, b: &u32) -> Ordering {
    a.cmp(b)
}

#[test]
fn fn_pointer_comparator() {
    let mut t = BTree::new(4, compare_orderings as fn(&u32, &u32) -> Ordering).unwrap();
    for i in 0..20 {
        assert!(t.insert(i));
    }
    t.check();
    assert_eq!(t.len(), 20);
}
