use std::thread;

use firline::ring::SampleRing;

#[test]
fn test_spsc_cross_thread_fifo() {
    const COUNT: u32 = 200_000;

    let (mut tx, mut rx) = SampleRing::<u32>::with_capacity(64).unwrap();

    let producer = thread::spawn(move || {
        for value in 0..COUNT {
            // Spin until the consumer makes room; every value must arrive
            // exactly once.
            while tx.put(value).is_err() {
                std::hint::spin_loop();
            }
        }
    });

    let mut next = 0u32;
    while next < COUNT {
        match rx.get() {
            Ok(value) => {
                assert_eq!(value, next, "out-of-order or duplicated sample");
                next += 1;
            }
            Err(_) => std::hint::spin_loop(),
        }
    }

    producer.join().unwrap();
    assert!(rx.get().is_err(), "ring should be empty after the stream");
}

#[test]
fn test_spsc_drop_on_overflow_preserves_order() {
    const COUNT: u32 = 50_000;

    let (mut tx, mut rx) = SampleRing::<u32>::with_capacity(16).unwrap();

    let producer = thread::spawn(move || {
        let mut dropped = 0u32;
        for value in 0..COUNT {
            // No retry: backpressure policy is drop-newest.
            if tx.put(value).is_err() {
                dropped += 1;
            }
        }
        dropped
    });

    // Deliberately slow consumer so overflow actually happens.
    let mut received = Vec::new();
    loop {
        match rx.get() {
            Ok(value) => received.push(value),
            Err(_) => {
                if producer.is_finished() && rx.is_empty() {
                    break;
                }
                thread::yield_now();
            }
        }
    }

    let dropped = producer.join().unwrap();
    assert_eq!(received.len() as u32 + dropped, COUNT);

    // Whatever survived must be strictly increasing: samples may be lost to
    // backpressure, never reordered or duplicated.
    for pair in received.windows(2) {
        assert!(pair[0] < pair[1], "order violated: {} then {}", pair[0], pair[1]);
    }
}
