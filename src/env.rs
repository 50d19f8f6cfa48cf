/// The service whose capacity is being scaled, as seen by the agent
///
/// The agent only ever asks for the current utilization. Any closure returning `f64`
/// is a service, which is convenient for drivers that track utilization themselves.
pub trait Service {
    /// Current utilization reading, nominally in `[0, 1]`
    fn utilization(&self) -> f64;
}

impl<F> Service for F
where
    F: Fn() -> f64,
{
    fn utilization(&self) -> f64 {
        self()
    }
}
