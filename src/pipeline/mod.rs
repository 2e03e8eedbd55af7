// Model selection: per-K sweeps and the policies that read their curves.

pub mod selection;
pub mod sweep;

pub use selection::{ArgMax, ArgMin, ElbowPolicy, SelectionPolicy, SelectionSummary};
pub use sweep::{
    sweep_coherence, sweep_log_likelihood, EvaluationPoint, Metric, SweepConfig, SweepReport,
    SweepState, SweepWarning,
};
