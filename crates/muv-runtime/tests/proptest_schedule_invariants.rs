//! Property tests for the rate limiter: FIFO delivery, exactly-once
//! execution, interval spacing, and no stranded work.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use muv_runtime::{LabClock, RateLimiter, TimeSource};
use proptest::prelude::*;
use web_time::Instant;

fn lab() -> (RateLimiter, LabClock) {
    let clock = LabClock::new();
    (RateLimiter::new(TimeSource::Lab(clock.clone())), clock)
}

/// Advance deadline to deadline until nothing is parked.
fn drain(limiter: &RateLimiter, clock: &LabClock) {
    while let Some(deadline) = limiter.next_deadline() {
        let now = clock.now();
        if deadline > now {
            clock.advance(deadline.duration_since(now));
        }
        limiter.tick();
    }
}

proptest! {
    #[test]
    fn every_callback_runs_exactly_once_in_fifo_order(
        interval_ms in 0u64..400,
        gaps in prop::collection::vec(0u64..300, 1..20),
    ) {
        let (limiter, clock) = lab();
        let log: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let interval = Duration::from_millis(interval_ms);

        for (n, gap) in gaps.iter().enumerate() {
            clock.advance(Duration::from_millis(*gap));
            limiter.tick();
            let log = Rc::clone(&log);
            limiter.schedule("k", interval, Box::new(move || log.borrow_mut().push(n)));
        }
        drain(&limiter, &clock);

        let expected: Vec<usize> = (0..gaps.len()).collect();
        prop_assert_eq!(&*log.borrow(), &expected);
    }

    #[test]
    fn executions_are_spaced_at_least_the_interval(
        interval_ms in 1u64..400,
        gaps in prop::collection::vec(0u64..300, 2..20),
    ) {
        let (limiter, clock) = lab();
        let stamps: Rc<RefCell<Vec<Instant>>> = Rc::new(RefCell::new(Vec::new()));
        let interval = Duration::from_millis(interval_ms);

        for gap in &gaps {
            clock.advance(Duration::from_millis(*gap));
            limiter.tick();
            let stamps = Rc::clone(&stamps);
            let probe = clock.clone();
            limiter.schedule("k", interval, Box::new(move || {
                stamps.borrow_mut().push(probe.now());
            }));
        }
        drain(&limiter, &clock);

        let stamps = stamps.borrow();
        prop_assert_eq!(stamps.len(), gaps.len());
        for pair in stamps.windows(2) {
            prop_assert!(
                pair[1].duration_since(pair[0]) >= interval,
                "executions {:?} apart, interval {:?}",
                pair[1].duration_since(pair[0]),
                interval
            );
        }
    }

    #[test]
    fn executed_never_exceeds_scheduled(
        interval_ms in 0u64..400,
        steps in prop::collection::vec((0u64..150, prop::bool::ANY), 1..30),
    ) {
        let (limiter, clock) = lab();
        let ran = Rc::new(RefCell::new(0usize));
        let interval = Duration::from_millis(interval_ms);
        let mut scheduled = 0usize;

        for (advance_ms, do_schedule) in steps {
            clock.advance(Duration::from_millis(advance_ms));
            limiter.tick();
            if do_schedule {
                scheduled += 1;
                let ran = Rc::clone(&ran);
                limiter.schedule("k", interval, Box::new(move || *ran.borrow_mut() += 1));
            }
            prop_assert!(*ran.borrow() <= scheduled);
        }
        drain(&limiter, &clock);
        prop_assert_eq!(*ran.borrow(), scheduled, "no work may strand");
    }

    #[test]
    fn keys_do_not_interfere(
        interval_ms in 1u64..400,
        count_a in 1usize..10,
        count_b in 1usize..10,
    ) {
        let (limiter, clock) = lab();
        let interval = Duration::from_millis(interval_ms);
        let ran_a = Rc::new(RefCell::new(0usize));
        let ran_b = Rc::new(RefCell::new(0usize));

        for _ in 0..count_a {
            let ran = Rc::clone(&ran_a);
            limiter.schedule("a", interval, Box::new(move || *ran.borrow_mut() += 1));
        }
        for _ in 0..count_b {
            let ran = Rc::clone(&ran_b);
            limiter.schedule("b", interval, Box::new(move || *ran.borrow_mut() += 1));
        }
        drain(&limiter, &clock);

        prop_assert_eq!(*ran_a.borrow(), count_a);
        prop_assert_eq!(*ran_b.borrow(), count_b);
    }
}
