//! The sample Ratio domain and the bundled suites.

use std::time::Duration;

use dogwatch::sample::{Ratio, RatioError, RatioSuite, SleepySuite};
use dogwatch::{Outcome, OutputBuffer, TestRunner};

#[cfg(test)]
mod ratio_tests {
    use super::*;

    #[test]
    fn zero_denominator_is_rejected() {
        assert_eq!(Ratio::new(1, 0).unwrap_err(), RatioError::DivideByZero);
    }

    #[test]
    fn addition_and_value_equality() {
        let sum = Ratio::new(1, 2).unwrap() + Ratio::new(3, 5).unwrap();
        assert_eq!(sum.numerator(), 11);
        assert_eq!(sum.denominator(), 10);
        assert_eq!(sum, Ratio::new(22, 20).unwrap());
        assert!((sum.to_f64() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn large_values_compare_without_overflow() {
        let big = Ratio::new(i64::MAX, 2).unwrap();
        assert_eq!(big, Ratio::new(i64::MAX, 2).unwrap());
        assert_ne!(big, Ratio::new(i64::MAX - 1, 2).unwrap());
    }

    #[test]
    fn addition_reduces_when_the_product_overflows() {
        let tiny = Ratio::new(1, 1 << 40).unwrap();
        let sum = tiny + tiny;
        assert_eq!(sum.numerator(), 1);
        assert_eq!(sum.denominator(), 1 << 39);
    }

    #[test]
    fn checked_add_reports_unrepresentable_sums() {
        let a = Ratio::new(1, i64::MAX).unwrap();
        let b = Ratio::new(1, i64::MAX - 1).unwrap();
        assert_eq!(a.checked_add(b), None);
        assert_eq!(
            Ratio::new(1, 2).unwrap().checked_add(Ratio::new(1, 3).unwrap()),
            Some(Ratio::new(5, 6).unwrap())
        );
    }

    #[test]
    #[should_panic(expected = "with overflow")]
    fn plain_addition_panics_on_unrepresentable_sums() {
        let _ = Ratio::new(1, i64::MAX).unwrap() + Ratio::new(1, i64::MAX - 1).unwrap();
    }

    #[test]
    fn default_and_display() {
        assert_eq!(Ratio::default().to_string(), "0/1");
        assert_eq!(Ratio::new(3, 5).unwrap().to_string(), "3/5");
    }
}

#[cfg(test)]
mod suite_tests {
    use super::*;

    #[test]
    fn ratio_suite_passes_every_check() {
        let buffer = OutputBuffer::new();
        let report = TestRunner::new(RatioSuite, buffer.clone())
            .with_poll_interval(10)
            .run();
        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!((report.passed, report.failed), (13, 0));

        let text = buffer.contents();
        for name in ["create", "exception divide 0", "vector and list", "different types"] {
            assert!(
                text.contains(&format!("\ttest {} passed.", name)),
                "missing {}",
                name
            );
        }
    }

    #[test]
    fn sleepy_suite_completes() {
        let report = TestRunner::new(SleepySuite::new(Duration::from_millis(30)), OutputBuffer::new())
            .with_poll_interval(10)
            .run();
        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!((report.passed, report.failed), (2, 0));
        assert!(report.elapsed_ms >= 30.0);
    }
}
