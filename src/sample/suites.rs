//! Ready-made suites used by the `dogwatch` binary and the integration tests.

use std::collections::LinkedList;
use std::hint;
use std::thread;
use std::time::Duration;

use crate::runner::{Suite, SuiteResult, TestContext};
use crate::sample::ratio::{Ratio, RatioError};

/// Exercises every assertion primitive against [`Ratio`]. All 13 checks pass.
#[derive(Debug, Default)]
pub struct RatioSuite;

impl RatioSuite {
    fn test_create(&self, t: &TestContext) -> SuiteResult {
        let r = Ratio::new(1, 2)?;
        t.assert_equal_within(0.5, r.to_f64(), 1e-7, "create");
        t.assert_throws::<RatioError>(
            || {
                Ratio::new(1, 0)?;
                Ok(())
            },
            "exception divide 0",
        );
        Ok(())
    }

    fn test_add(&self, t: &TestContext) -> SuiteResult {
        let r1 = Ratio::new(1, 2)?;
        let r2 = Ratio::new(3, 5)?;
        // 1/2 + 3/5 = 5/10 + 6/10 = 11/10
        let r3 = r1 + r2;
        let expected = Ratio::new(11, 10)?;
        t.assert_equal_within(11.0 / 10.0, r3.to_f64(), 1e-7, "add");
        t.assert_equal(expected, r3, "equals after add");
        Ok(())
    }

    fn test_to_string(&self, t: &TestContext) -> SuiteResult {
        let r = Ratio::new(3, 5)?;
        t.assert_equal("3/5".to_string(), r.to_string(), "output to string");
        Ok(())
    }

    fn test_collections(&self, t: &TestContext) -> SuiteResult {
        let r1 = Ratio::new(1, 2)?;
        let r2 = Ratio::new(3, 5)?;
        let r3 = Ratio::default();

        let ratios = vec![r1, r2];
        t.assert_contains(&ratios, &r1, "value in vector");
        t.assert_not_contains(&ratios, &r3, "value not in vector");

        let ratios2: LinkedList<Ratio> = [r1, r2].into_iter().collect();
        t.assert_contains(&ratios2, &r1, "value in list");
        t.assert_collection_equals(&ratios, &ratios2, "vector and list");
        Ok(())
    }

    fn test_nulls(&self, t: &TestContext) -> SuiteResult {
        let missing: Option<Box<Ratio>> = None;
        let present = Some(Box::new(Ratio::new(1, 2)?));
        t.assert_null(&missing, "value is null");
        t.assert_not_null(&present, "value is not null");
        Ok(())
    }

    fn test_types(&self, t: &TestContext) -> SuiteResult {
        let r1 = Ratio::new(1, 2)?;
        let r2 = Ratio::new(3, 5)?;
        t.assert_same_type(&r1, &r2, "type comparison");
        t.assert_not_same_type(&r1, &r1.to_f64(), "different types");
        Ok(())
    }
}

impl Suite for RatioSuite {
    fn test_code(&self, t: &TestContext) -> SuiteResult {
        self.test_create(t)?;
        self.test_add(t)?;
        self.test_to_string(t)?;
        self.test_collections(t)?;
        self.test_nulls(t)?;
        self.test_types(t)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "ratio"
    }
}

/// Passes, sleeps, passes again: finishes well before any sane timeout.
#[derive(Debug)]
pub struct SleepySuite {
    pause: Duration,
}

impl SleepySuite {
    pub fn new(pause: Duration) -> Self {
        Self { pause }
    }
}

impl Suite for SleepySuite {
    fn test_code(&self, t: &TestContext) -> SuiteResult {
        t.pass("good test");
        thread::sleep(self.pause);
        t.assert_equal(1, 1, "another good test");
        Ok(())
    }

    fn name(&self) -> &str {
        "sleepy"
    }
}

/// Records one passing check, then spins forever.
///
/// A cooperative instance leaves the loop once the watchdog cancels the run;
/// a non-cooperative one never does and is abandoned by the runner.
#[derive(Debug)]
pub struct LoopingSuite {
    cooperative: bool,
}

impl LoopingSuite {
    pub fn new(cooperative: bool) -> Self {
        Self { cooperative }
    }
}

impl Suite for LoopingSuite {
    fn test_code(&self, t: &TestContext) -> SuiteResult {
        t.assert_true(true, "first fake test");
        loop {
            if self.cooperative {
                t.checkpoint()?;
            }
            hint::spin_loop();
        }
    }

    fn name(&self) -> &str {
        "looping"
    }
}
