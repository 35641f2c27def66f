//! source.rs
//! Common capability implemented by the live pipeline and the replay
//! engine. The sensor task holds exactly one source, selected once at
//! startup.

pub trait ThrottleSource: Send {
    /// Next validated throttle value in the scaled output range.
    fn next_throttle(&mut self) -> u32;
}

impl ThrottleSource for Box<dyn ThrottleSource + Send> {
    fn next_throttle(&mut self) -> u32 {
        self.as_mut().next_throttle()
    }
}
