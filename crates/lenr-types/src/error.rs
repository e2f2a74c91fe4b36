use thiserror::Error;

#[derive(Error, Debug)]
pub enum LenrError {
    #[error("Integration failed at tau={tau:.6}: {message}")]
    IntegrationFailure { tau: f64, message: String },

    #[error("Integration exceeded its budget of {max_steps} steps at tau={tau:.6}")]
    StepBudgetExceeded { max_steps: usize, tau: f64 },

    #[error("Root finding did not converge after {iterations} iterations: x={x}, residual={residual:e}")]
    RootNotConverged {
        iterations: usize,
        x: f64,
        residual: f64,
    },

    #[error("Root finding converged outside the physical domain: x={root}, lower bound={lower_bound}")]
    RootOutsideDomain { root: f64, lower_bound: f64 },

    #[error("Numeric domain error: {0}")]
    NumericDomain(String),

    #[error("Failed to write artifact '{path}': {message}")]
    ArtifactWrite { path: String, message: String },

    #[error("Sweep point detune={detune:.4} failed: {source}")]
    SweepPointFailed {
        detune: f64,
        #[source]
        source: Box<LenrError>,
    },

    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: &'static str,
        #[source]
        source: Box<LenrError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LenrError {
    /// Wrap an error with the name of the scenario stage that produced it.
    pub fn in_stage(self, stage: &'static str) -> Self {
        LenrError::StageFailed {
            stage,
            source: Box::new(self),
        }
    }

    /// Innermost error, unwrapping stage and sweep-point context.
    pub fn root_cause(&self) -> &LenrError {
        match self {
            LenrError::StageFailed { source, .. } | LenrError::SweepPointFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

pub type LenrResult<T> = Result<T, LenrError>;
