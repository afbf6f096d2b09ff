//! Assertion primitive semantics: counters, pass rules and report lines.

use std::collections::LinkedList;
use std::io;

use dogwatch::sample::RatioError;
use dogwatch::{shared_sink, Ledger, OutputBuffer};

fn ledger() -> (Ledger, OutputBuffer) {
    let buffer = OutputBuffer::new();
    (Ledger::new(shared_sink(buffer.clone())), buffer)
}

#[cfg(test)]
mod boolean_tests {
    use super::*;

    #[test]
    fn true_and_false() {
        let (ledger, buffer) = ledger();
        assert!(ledger.assert_true(true, "t1"));
        assert!(!ledger.assert_true(false, "t2"));
        assert!(ledger.assert_false(false, "f1"));
        assert!(!ledger.assert_false(true, "f2"));

        assert_eq!(ledger.counts(), (2, 2));
        assert_eq!(
            buffer.lines(),
            vec![
                "\ttest t1 passed.",
                "\ttest t2 failed expected true but got false",
                "\ttest f1 passed.",
                "\ttest f2 failed expected false but got true",
            ]
        );
    }

    #[test]
    fn empty_name_still_emits_a_line() {
        let (ledger, buffer) = ledger();
        ledger.pass("");
        ledger.fail("");
        assert_eq!(buffer.lines(), vec!["\ttest  passed.", "\ttest  failed"]);
    }

    #[test]
    fn pass_and_fail_are_unconditional() {
        let (ledger, _buffer) = ledger();
        assert!(ledger.pass("p"));
        assert!(!ledger.fail("f"));
        assert_eq!((ledger.passed(), ledger.failed()), (1, 1));
    }
}

#[cfg(test)]
mod equality_tests {
    use super::*;

    #[test]
    fn structural_equality() {
        let (ledger, buffer) = ledger();
        assert!(ledger.assert_equal(vec![1, 2], vec![1, 2], "vec"));
        assert!(ledger.assert_equal("a", "a", "str"));
        assert!(!ledger.assert_equal(1, 2, "int"));
        assert!(ledger.assert_not_equal(1, 2, "ne"));
        assert!(!ledger.assert_not_equal("x", "x", "ne same"));

        assert_eq!(ledger.counts(), (3, 2));
        let lines = buffer.lines();
        assert_eq!(lines[2], "\ttest int failed expected 1 but got 2");
        assert_eq!(lines[4], "\ttest ne same failed \"x\" was not expected");
    }

    #[test]
    fn precision_is_strict_on_both_sides() {
        let (ledger, _buffer) = ledger();
        // 0.5 is exact in binary, so the delta is exactly the precision.
        assert!(!ledger.assert_equal_within(1.0, 1.5, 0.5, "eq at boundary"));
        assert!(!ledger.assert_not_equal_within(1.0, 1.5, 0.5, "ne at boundary"));
        assert_eq!(ledger.counts(), (0, 2));
    }

    #[test]
    fn precision_inside_and_outside() {
        let (ledger, _buffer) = ledger();
        assert!(ledger.assert_equal_within(0.5, 0.500_000_01, 1e-7, "close"));
        assert!(!ledger.assert_equal_within(0.5, 0.6, 1e-7, "far"));
        assert!(ledger.assert_not_equal_within(0.5, 0.6, 1e-7, "far enough"));
        assert!(!ledger.assert_not_equal_within(0.5, 0.500_000_01, 1e-7, "too close"));
        assert_eq!(ledger.counts(), (2, 2));
    }

    #[test]
    fn nan_never_equals() {
        let (ledger, _buffer) = ledger();
        assert!(!ledger.assert_equal_within(f64::NAN, 1.0, 1.0, "nan"));
        assert!(!ledger.assert_equal(f64::NAN, f64::NAN, "nan eq"));
    }
}

#[cfg(test)]
mod throws_tests {
    use super::*;

    #[test]
    fn exact_kind_passes() {
        let (ledger, buffer) = ledger();
        let pass = ledger.assert_throws::<RatioError>(|| Err(RatioError::DivideByZero.into()), "div");
        assert!(pass);
        assert_eq!(buffer.lines(), vec!["\ttest div passed."]);
    }

    #[test]
    fn other_kind_fails() {
        let (ledger, buffer) = ledger();
        let pass = ledger.assert_throws::<RatioError>(
            || Err(io::Error::new(io::ErrorKind::Other, "disk").into()),
            "io",
        );
        assert!(!pass);
        let lines = buffer.lines();
        assert!(lines[0].starts_with("\ttest io failed"));
        assert!(lines[0].contains("unexpected error: disk"));
    }

    #[test]
    fn nothing_raised_fails() {
        let (ledger, buffer) = ledger();
        assert!(!ledger.assert_throws::<RatioError>(|| Ok(()), "quiet"));
        assert!(buffer.contents().contains("nothing was raised"));
    }

    #[test]
    fn panics_are_matched_by_payload() {
        let (ledger, _buffer) = ledger();
        assert!(ledger.assert_throws::<RatioError>(
            || std::panic::panic_any(RatioError::DivideByZero),
            "typed panic",
        ));
        assert!(!ledger.assert_throws::<RatioError>(|| panic!("plain panic"), "string panic"));
        assert_eq!(ledger.counts(), (1, 1));
    }
}

#[cfg(test)]
mod collection_tests {
    use super::*;

    #[test]
    fn containment_by_linear_scan() {
        let (ledger, buffer) = ledger();
        let values = vec![1, 2, 3];
        let list: LinkedList<i32> = values.iter().copied().collect();

        assert!(ledger.assert_contains(&values, &2, "in vec"));
        assert!(ledger.assert_contains(&list, &3, "in list"));
        assert!(ledger.assert_contains([7, 8].iter(), &8, "in array"));
        assert!(!ledger.assert_contains(&values, &9, "missing"));
        assert!(ledger.assert_not_contains(&values, &9, "absent"));
        assert!(!ledger.assert_not_contains(&list, &1, "present"));

        assert_eq!(ledger.counts(), (4, 2));
        let lines = buffer.lines();
        assert_eq!(lines[3], "\ttest missing failed element not found");
        assert_eq!(lines[5], "\ttest present failed element found");
    }

    #[test]
    fn empty_sequence_contains_nothing() {
        let (ledger, _buffer) = ledger();
        let empty: Vec<i32> = Vec::new();
        assert!(!ledger.assert_contains(&empty, &0, "empty"));
        assert!(ledger.assert_not_contains(&empty, &0, "empty not"));
    }

    #[test]
    fn collections_of_different_containers() {
        let (ledger, buffer) = ledger();
        let vector = vec!["a", "b", "c"];
        let list: LinkedList<&str> = vector.iter().copied().collect();
        let shorter = vec!["a", "b"];
        let different = vec!["a", "x", "c"];

        assert!(ledger.assert_collection_equals(&vector, &list, "same"));
        assert!(!ledger.assert_collection_equals(&vector, &shorter, "length"));
        assert!(!ledger.assert_collection_equals(&shorter, &vector, "length reversed"));
        assert!(!ledger.assert_collection_equals(&vector, &different, "element"));
        assert!(ledger.assert_collection_equals(&Vec::<&str>::new(), &LinkedList::new(), "both empty"));

        assert_eq!(ledger.counts(), (2, 3));
        let lines = buffer.lines();
        assert_eq!(
            lines[1],
            "\ttest length failed collections differ in length after 2 elements"
        );
        assert_eq!(lines[3], "\ttest element failed collections differ at index 1");
    }
}

#[cfg(test)]
mod presence_and_type_tests {
    use super::*;

    #[test]
    fn null_checks() {
        let (ledger, buffer) = ledger();
        let none: Option<Box<u8>> = None;
        let some = Some(Box::new(1u8));
        assert!(ledger.assert_null(&none, "none"));
        assert!(ledger.assert_not_null(&some, "some"));
        assert!(!ledger.assert_null(&some, "some is null"));
        assert!(!ledger.assert_not_null(&none, "none is not null"));

        assert_eq!(ledger.counts(), (2, 2));
        let lines = buffer.lines();
        assert_eq!(lines[2], "\ttest some is null failed value is not null");
        assert_eq!(lines[3], "\ttest none is not null failed value is null");
    }

    #[test]
    fn type_identity() {
        let (ledger, _buffer) = ledger();
        assert!(ledger.assert_same_type(&1u32, &2u32, "u32"));
        assert!(!ledger.assert_same_type(&1u32, &2i32, "u32 vs i32"));
        assert!(ledger.assert_not_same_type(&"str", &String::new(), "str vs String"));
        assert!(!ledger.assert_not_same_type(&vec![1], &vec![2], "vec"));
        assert_eq!(ledger.counts(), (2, 2));
    }
}

#[cfg(test)]
mod accounting_tests {
    use super::*;

    #[test]
    fn every_call_moves_exactly_one_counter() {
        let (ledger, buffer) = ledger();
        let mut calls = 0;
        for i in 0..10 {
            ledger.assert_equal(i % 3, 0, "mod");
            ledger.assert_true(i % 2 == 0, "even");
            calls += 2;
        }
        let (passed, failed) = ledger.counts();
        assert_eq!(passed + failed, calls);
        assert_eq!(buffer.lines().len(), calls);
    }

    #[test]
    fn sealed_ledger_ignores_checks() {
        let (ledger, buffer) = ledger();
        ledger.pass("before");
        ledger.seal();
        assert!(ledger.is_sealed());
        ledger.pass("after");
        ledger.fail("after");
        assert_eq!(ledger.counts(), (1, 0));
        assert_eq!(buffer.lines(), vec!["\ttest before passed."]);
    }
}
