// Property-based tests for binding chains
//
// These tests verify:
// 1. size() sums the local entries of every frame, shadowed ones included
// 2. get() returns the value of the nearest frame binding the variable
// 3. contains() agrees with get()
// 4. vars() is parent-first, not deduplicated, and restartable
// 5. adding no value never changes a binding
// 6. same() ignores frame shape

use std::sync::Arc;
use std::thread;

use bindchain_engine::{
    output::ResultRow, same, Binding, CheckPolicy, Frame, SingleStorage, Term, Var,
};
use proptest::prelude::*;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

type Shape = Vec<Vec<(usize, u8)>>;

fn shape() -> impl Strategy<Value = Shape> {
    prop::collection::vec(
        prop::collection::vec((0..NAMES.len(), any::<u8>()), 0..4),
        1..6,
    )
}

fn build(shape: &Shape) -> Arc<Frame> {
    let mut current: Option<Arc<Frame>> = None;
    for entries in shape {
        let mut frame = match &current {
            Some(parent) => Frame::extend(parent),
            None => Frame::root_with_policy(CheckPolicy::unchecked()),
        };
        for (idx, value) in entries {
            frame
                .add(Var::new(NAMES[*idx]), Term::integer(i64::from(*value)))
                .unwrap();
        }
        current = Some(frame.seal());
    }
    current.unwrap()
}

/// Local entries per frame, root first, as a multi-assignment frame keeps them:
/// one entry per variable, first position, last value.
fn model(shape: &Shape) -> Vec<Vec<(&'static str, Term)>> {
    shape
        .iter()
        .map(|entries| {
            let mut frame: Vec<(&'static str, Term)> = Vec::new();
            for (idx, value) in entries {
                let term = Term::integer(i64::from(*value));
                match frame.iter_mut().find(|(name, _)| *name == NAMES[*idx]) {
                    Some(slot) => slot.1 = term,
                    None => frame.push((NAMES[*idx], term)),
                }
            }
            frame
        })
        .collect()
}

fn lit(s: &str) -> Term {
    Term::literal(s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn size_counts_every_frame(shape in shape()) {
        let chain = build(&shape);
        let expected: usize = model(&shape).iter().map(Vec::len).sum();
        prop_assert_eq!(chain.size(), expected);
        prop_assert_eq!(chain.is_empty(), expected == 0);
    }

    #[test]
    fn get_returns_nearest(shape in shape()) {
        let chain = build(&shape);
        let frames = model(&shape);
        for name in NAMES {
            let expected = frames
                .iter()
                .rev()
                .find_map(|frame| frame.iter().find(|(n, _)| *n == name).map(|(_, t)| t));
            prop_assert_eq!(chain.get(&Var::new(name)), expected);
        }
    }

    #[test]
    fn contains_agrees_with_get(shape in shape()) {
        let chain = build(&shape);
        for name in NAMES.iter().chain(["unused"].iter()) {
            let var = Var::new(*name);
            prop_assert_eq!(chain.contains(&var), chain.get(&var).is_some());
        }
    }

    #[test]
    fn vars_parent_first_and_restartable(shape in shape()) {
        let chain = build(&shape);
        let expected: Vec<&str> = model(&shape)
            .iter()
            .flat_map(|frame| frame.iter().map(|(name, _)| *name))
            .collect();
        let first: Vec<&str> = chain.vars().map(Var::name).collect();
        let second: Vec<&str> = chain.vars().map(Var::name).collect();
        prop_assert_eq!(&first, &expected);
        prop_assert_eq!(first, second);
        prop_assert_eq!(chain.vars().count(), chain.size());
    }

    #[test]
    fn add_nothing_changes_nothing(shape in shape(), idx in 0..NAMES.len()) {
        let parent = build(&shape);
        let var = Var::new(NAMES[idx]);
        let mut frame = Frame::extend(&parent);
        let before = (frame.size(), frame.contains(&var), frame.get(&var).cloned());
        frame.add(var.clone(), None::<Term>).unwrap();
        prop_assert_eq!(
            (frame.size(), frame.contains(&var), frame.get(&var).cloned()),
            before
        );
    }

    #[test]
    fn same_ignores_shape(shape in shape()) {
        let chain = build(&shape);
        let row = ResultRow::flatten(&chain);

        // Re-bind the visible values as a chain of single-assignment frames, in reverse.
        let mut rebuilt = Frame::root_with_policy(CheckPolicy::unchecked()).seal();
        let entries: Vec<_> = row.iter().map(|(v, t)| (v.clone(), t.clone())).collect();
        for (var, value) in entries.into_iter().rev() {
            rebuilt = Frame::extend_one(&rebuilt, var, value).unwrap();
        }

        prop_assert!(same(&chain, &row));
        prop_assert!(same(&row, &chain));
        prop_assert!(same(&chain, &rebuilt));
        prop_assert!(same(&rebuilt, &chain));
    }
}

#[test]
fn test_same_different_shapes() {
    let mut a = Frame::root_with_policy(CheckPolicy::unchecked());
    a.add(Var::new("x"), lit("1")).unwrap();
    a.add(Var::new("y"), lit("2")).unwrap();

    let mut parent = Frame::root_with_policy(CheckPolicy::unchecked());
    parent.add(Var::new("y"), lit("2")).unwrap();
    let parent = parent.seal();
    let mut b = Frame::extend(&parent);
    b.add(Var::new("x"), lit("1")).unwrap();

    assert!(same(&a, &b));
}

#[test]
fn test_same_different_values() {
    let mut a = Frame::root_with_policy(CheckPolicy::unchecked());
    a.add(Var::new("x"), lit("1")).unwrap();
    let mut b = Frame::root_with_policy(CheckPolicy::unchecked());
    b.add(Var::new("x"), lit("2")).unwrap();
    assert!(!same(&a, &b));
}

#[test]
fn test_same_needs_both_traversals() {
    // The left side's variables all agree; only walking the right side's own
    // variables notices ?z.
    let mut a = Frame::root_with_policy(CheckPolicy::unchecked());
    a.add(Var::new("x"), lit("1")).unwrap();
    let mut b = Frame::root_with_policy(CheckPolicy::unchecked());
    b.add(Var::new("x"), lit("1")).unwrap();
    b.add(Var::new("z"), lit("3")).unwrap();
    assert!(!same(&a, &b));
    assert!(!same(&b, &a));

    let empty = Frame::root_with_policy(CheckPolicy::unchecked());
    assert!(same(&empty, &Frame::root_with_policy(CheckPolicy::unchecked())));
    assert!(!same(&empty, &a));
}

#[test]
fn test_shadowed_child() {
    let mut parent = Frame::root_with_policy(CheckPolicy::unchecked());
    parent.add(Var::new("x"), lit("5")).unwrap();
    let parent = parent.seal();
    let mut child = Frame::extend(&parent);
    child.add(Var::new("x"), lit("9")).unwrap();

    assert_eq!(child.get(&Var::new("x")), Some(&lit("9")));
    assert_eq!(child.size(), 2);
}

#[test]
fn test_three_level_vars_keep_repeats() {
    let mut root = Frame::root_with_policy(CheckPolicy::unchecked());
    root.add(Var::new("x"), lit("1")).unwrap();
    let root = root.seal();
    let middle = Frame::extend_one(&root, Var::new("y"), lit("2")).unwrap();
    let leaf = Frame::extend_one(&middle, Var::new("x"), lit("3")).unwrap();

    let names: Vec<_> = leaf.vars().map(Var::name).collect();
    assert_eq!(names, vec!["x", "y", "x"]);
    assert_eq!(leaf.depth(), 2);
    assert_eq!(
        leaf.parent().map(|p| p.size()),
        Some(2),
        "parent sees only its own path"
    );
}

#[test]
fn test_shared_prefix_branches() {
    let mut prefix = Frame::root_with_policy(CheckPolicy::default());
    prefix.add(Var::new("s"), Term::iri("http://ex.org/s")).unwrap();
    let prefix = prefix.seal();

    let branches: Vec<_> = (0..3)
        .map(|i| Frame::extend_one(&prefix, Var::new("o"), Term::integer(i)).unwrap())
        .collect();

    assert_eq!(prefix.children().len(), 3);
    for (i, branch) in branches.iter().enumerate() {
        assert_eq!(branch.get(&Var::new("o")), Some(&Term::integer(i as i64)));
        assert_eq!(branch.get(&Var::new("s")), prefix.get(&Var::new("s")));
    }
    assert!(!prefix.contains(&Var::new("o")));

    drop(branches);
    assert!(prefix.children().is_empty());
}

#[test]
fn test_parent_outlives_its_handle() {
    let leaf = {
        let mut root = Frame::root_with_policy(CheckPolicy::unchecked());
        root.add(Var::new("x"), lit("1")).unwrap();
        let root = root.seal();
        Frame::extend_one(&root, Var::new("y"), lit("2")).unwrap()
    };
    assert_eq!(leaf.get(&Var::new("x")), Some(&lit("1")));
    assert_eq!(leaf.parent_frame().unwrap().children().len(), 1);
}

#[test]
fn test_single_storage_chain_matches_multi() {
    let root = Frame::root_with_policy(CheckPolicy::unchecked()).seal();
    let mut single = Frame::extend_with_storage(&root, SingleStorage::new());
    single.add(Var::new("x"), lit("1")).unwrap();
    let mut multi = Frame::extend(&root);
    multi.add(Var::new("x"), lit("1")).unwrap();
    assert!(same(&single, &multi));
    assert_eq!(single.size(), multi.size());
}

#[test]
fn test_concurrent_readers() {
    let mut current = Frame::root_with_policy(CheckPolicy::unchecked()).seal();
    for i in 0..50 {
        let var = Var::new(format!("v{}", i));
        current = Frame::extend_one(&current, var, Term::integer(i)).unwrap();
    }
    let chain = current;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let chain = Arc::clone(&chain);
            thread::spawn(move || {
                for i in 0..50 {
                    let var = Var::new(format!("v{}", i));
                    assert_eq!(chain.get(&var), Some(&Term::integer(i)));
                    assert!(chain.contains(&var));
                }
                (chain.size(), chain.vars().count())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (50, 50));
    }
}
