//! GPIO output abstraction
//!
//! The reader drives a single discrete output: the EFI warning lamp.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lamp(bool);

    impl OutputPin for Lamp {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_set_state_dispatches() {
        let mut lamp = Lamp(false);
        lamp.set_state(true);
        assert!(lamp.is_set_high());
        lamp.set_state(false);
        assert!(!lamp.is_set_high());
    }
}
