use foundation::time::Millis;

/// Outcome of a parked operation once the gate resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// The gate cleared in time; the operation may proceed.
    Passed(T),
    /// The gate stayed closed past the operation's deadline.
    TimedOut(T),
}

/// Loading gate for operations that must not run against in-flight data.
///
/// While the gate is loading, submitted operations park with a deadline;
/// `poll` releases them all once the gate clears, or fails the ones whose
/// deadline has passed. Submissions against an open gate pass straight
/// through.
#[derive(Debug)]
pub struct LoadGate<T> {
    timeout_ms: u64,
    loading: bool,
    parked: Vec<(T, Millis)>,
}

impl<T> LoadGate<T> {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            loading: false,
            parked: Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn parked_len(&self) -> usize {
        self.parked.len()
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    pub fn clear_loading(&mut self) {
        self.loading = false;
    }

    /// Submits an operation; returns it immediately when the gate is open.
    pub fn submit(&mut self, value: T, now: Millis) -> Option<T> {
        if !self.loading {
            return Some(value);
        }
        self.parked.push((value, now.after(self.timeout_ms)));
        None
    }

    /// Resolves parked operations, in submission order.
    pub fn poll(&mut self, now: Millis) -> Vec<GateOutcome<T>> {
        if !self.loading {
            return self
                .parked
                .drain(..)
                .map(|(v, _)| GateOutcome::Passed(v))
                .collect();
        }
        let mut out = Vec::new();
        let mut kept = Vec::new();
        for (value, deadline) in self.parked.drain(..) {
            if deadline <= now {
                out.push(GateOutcome::TimedOut(value));
            } else {
                kept.push((value, deadline));
            }
        }
        self.parked = kept;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{GateOutcome, LoadGate};
    use foundation::time::Millis;

    #[test]
    fn open_gate_passes_through() {
        let mut gate = LoadGate::new(5000);
        assert_eq!(gate.submit("update", Millis(0)), Some("update"));
    }

    #[test]
    fn parked_operation_passes_once_cleared() {
        let mut gate = LoadGate::new(5000);
        gate.begin_loading();
        assert_eq!(gate.submit("update", Millis(0)), None);
        assert!(gate.poll(Millis(100)).is_empty());
        gate.clear_loading();
        assert_eq!(
            gate.poll(Millis(200)),
            vec![GateOutcome::Passed("update")]
        );
    }

    #[test]
    fn parked_operation_times_out() {
        let mut gate = LoadGate::new(5000);
        gate.begin_loading();
        gate.submit("update", Millis(0));
        assert!(gate.poll(Millis(4999)).is_empty());
        assert_eq!(
            gate.poll(Millis(5000)),
            vec![GateOutcome::TimedOut("update")]
        );
        assert_eq!(gate.parked_len(), 0);
    }
}
