//! Shared car state for HTTP handlers.
//!
//! `SharedCar` wraps a single [`Car`] in a mutex so every request handler
//! drives the same controller. It is handed to the router through `Arc`
//! instead of living in a global.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use m1_car::services::SharedCar;
//!
//! let state = Arc::new(SharedCar::new(car));
//! let ok = state.dispatch("forward");
//! let on = state.with_car(|car| car.is_on());
//! ```

use core::fmt;
use std::sync::{Mutex, PoisonError};

use crate::car::Car;
use crate::traits::PinDriver;

/// Thread-safe handle to one car.
///
/// Uses a `Mutex` (not `RwLock`): nearly every request writes pins, and
/// holding the lock for a whole action keeps the four writes of one request
/// from interleaving with another's.
pub struct SharedCar<D: PinDriver> {
    car: Mutex<Car<D>>,
}

impl<D: PinDriver> SharedCar<D> {
    /// Wrap a car.
    pub fn new(car: Car<D>) -> Self {
        Self {
            car: Mutex::new(car),
        }
    }

    /// Run `f` with exclusive access to the car.
    pub fn with_car<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Car<D>) -> R,
    {
        let mut guard = self.car.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Dispatch a named request (see [`Car::dispatch`]).
    pub fn dispatch(&self, name: &str) -> bool
    where
        D::Error: fmt::Display,
    {
        self.with_car(|car| car.dispatch(name))
    }

    /// Whether the car is powered on.
    pub fn is_on(&self) -> bool {
        self.with_car(|car| car.is_on())
    }

    /// Unwrap the car.
    pub fn into_inner(self) -> Car<D> {
        self.car.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockPins;
    use std::sync::Arc;

    fn shared() -> SharedCar<MockPins> {
        SharedCar::new(Car::new(MockPins::new()).with_step_delay_ms(0))
    }

    #[test]
    fn dispatch_goes_to_the_wrapped_car() {
        let state = shared();
        assert!(state.dispatch("on"));
        assert!(state.is_on());
        assert!(state.dispatch("forward"));
        let writes = state.with_car(|car| car.driver().writes.len());
        assert_eq!(writes, 8);
    }

    #[test]
    fn concurrent_requests_do_not_interleave_writes() {
        let state = Arc::new(shared());
        state.dispatch("on");

        let handles: Vec<_> = ["forward", "backward", "left", "right"]
            .into_iter()
            .map(|name| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || state.dispatch(name))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let car = Arc::try_unwrap(state).ok().unwrap().into_inner();
        let writes = &car.driver().writes;
        assert_eq!(writes.len(), 32);
        // Each action is 4 writes; chunks of 4 must each follow the pin order
        for chunk in writes.chunks(4) {
            let pins: Vec<i32> = chunk.iter().map(|(pin, _)| *pin).collect();
            assert_eq!(pins, vec![11, 13, 15, 16]);
        }
    }
}
