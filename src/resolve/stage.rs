//! Ordered fallback chains.
//!
//! A chain is a list of [`Stage`]s tried in order. A stage runs only when
//! its precondition holds, and its output is used only when accepted; the
//! first accepted output wins.

/// One step of a fallback chain over input `C` producing `T`.
pub struct Stage<C, T> {
    /// Stage name, reported for the winning stage
    pub name: &'static str,

    /// Whether the stage should run at all
    pub applies: fn(&C) -> bool,

    /// Produce a candidate
    pub extract: fn(&C) -> T,

    /// Whether the candidate is good enough to stop the chain
    pub accept: fn(&C, &T) -> bool,
}

/// Run stages in order and return the first accepted candidate with the
/// name of the stage that produced it.
pub fn run_chain<C, T>(stages: &[Stage<C, T>], input: &C) -> Option<(&'static str, T)> {
    for stage in stages {
        if !(stage.applies)(input) {
            log::trace!("stage {}: not applicable", stage.name);
            continue;
        }

        let candidate = (stage.extract)(input);
        if (stage.accept)(input, &candidate) {
            log::debug!("stage {}: accepted", stage.name);
            return Some((stage.name, candidate));
        }
        log::trace!("stage {}: rejected", stage.name);
    }
    None
}
