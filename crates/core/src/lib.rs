pub mod auth;
pub mod config;
pub mod credits;
pub mod encoder;
pub mod filtergraph;
pub mod job;
pub mod metrics;
pub mod settings;
pub mod testing;
pub mod transform;
pub mod uploader;
pub mod worker;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, AuthMethod, Config,
    ConfigError, SanitizedConfig,
};
pub use credits::{create_credit_gate, ChargePoint, CreditError, CreditGate};
pub use encoder::{EncodeJob, EncodeResult, Encoder, EncoderError, FfmpegEncoder};
pub use filtergraph::{build_graph, GraphError, GraphSpec};
pub use job::{EnqueueRequest, Job, JobError, JobState, JobStore, SqliteJobStore};
pub use settings::{AspectRatio, Background, Position, SettingsError, StudioSettings};
pub use transform::{resolve, ResolvedBackground, ResolvedPlan};
pub use uploader::{create_uploader, Uploader, UploaderError};
pub use worker::{JobWorker, WorkerStatus};
