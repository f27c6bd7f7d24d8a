use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AppError {
    #[snafu(display("failed to read from stdin on `{stage}`: {source}"))]
    ReadStdin {
        stage: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("failed to write to stdout on `{stage}`: {source}"))]
    WriteStdout {
        stage: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("failed to read attachment {path:?} on `{stage}`: {source}"))]
    ReadAttachment {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;
