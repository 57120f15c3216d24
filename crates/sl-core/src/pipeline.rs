//! End-to-end run: provider → engine → writer.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sl_config::{ErrorPolicy, MappingConfig, PipelineSettings};
use sl_provider::{ProviderRegistry, Quarantine};
use sl_redact::Strategy;
use tracing::{info, warn};

use crate::engine::{EngineStats, SanitizationEngine};
use crate::error::PipelineError;
use crate::exit_codes::ExitCode;
use crate::writer::RecordWriter;

/// What a finished run reports. Counts and paths only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: u64,
    pub sanitized: u64,
    pub failed: u64,
    pub quarantined: u64,
    pub strategy: String,
    pub error_policy: ErrorPolicy,
    pub policy_hash: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<String>,
}

impl RunSummary {
    pub fn exit_code(&self) -> ExitCode {
        if self.failed > 0 {
            ExitCode::RecordsFailed
        } else {
            ExitCode::Ok
        }
    }
}

/// A configured pipeline, ready to run against one input.
pub struct Pipeline {
    settings: PipelineSettings,
    strategy: Strategy,
    registry: ProviderRegistry,
}

impl Pipeline {
    /// Pipeline with the strategy named in `settings` over `mapping`.
    pub fn new(settings: PipelineSettings, mapping: MappingConfig) -> Self {
        let strategy = Strategy::from_kind(settings.strategy, mapping);
        Self {
            settings,
            strategy,
            registry: ProviderRegistry::with_defaults(),
        }
    }

    /// Replace the strategy (for example a deep strategy with a custom
    /// recognizer).
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Sanitize `input` into `output`.
    ///
    /// On abort the partial output stays in its temporary file and `output`
    /// is left untouched.
    pub fn run(self, input: &Path, output: &Path) -> Result<RunSummary, PipelineError> {
        let mut provider = self
            .registry
            .create_for_path(input, self.settings.input_format)?;
        if let Some(path) = &self.settings.quarantine_path {
            provider.set_quarantine(Quarantine::file(path)?);
        }
        provider.connect()?;

        let audit_path: Option<PathBuf> = self.settings.audit_path_for(output);
        let mut writer = RecordWriter::create(output)?;
        if let Some(path) = &audit_path {
            writer = writer.with_audit(path)?;
        }

        let mut engine = SanitizationEngine::new(self.strategy, self.settings.error_policy);
        info!(
            provider = provider.provider_id(),
            input = %input.display(),
            output = %output.display(),
            "Pipeline started"
        );

        let outcome = {
            let stream = provider.stream_records()?;
            let mut outcome = Ok(());
            for item in engine.process_stream(stream) {
                match item {
                    Ok(record) => {
                        if let Err(e) = writer.write(&record) {
                            outcome = Err(PipelineError::from(e));
                            break;
                        }
                    }
                    Err(e) => {
                        outcome = Err(PipelineError::from(e));
                        break;
                    }
                }
            }
            outcome
        };

        let metadata = provider.fetch_metadata();
        provider.close();
        let quarantined = provider.take_quarantine().map(|q| q.len()).unwrap_or(0);
        let EngineStats {
            processed,
            sanitized,
            failed,
        } = engine.stats();

        if let Err(err) = outcome {
            warn!(
                processed,
                failed,
                written = writer.records_written(),
                partial = %writer.temp_path().display(),
                "Pipeline stopped before completion"
            );
            return Err(err);
        }

        let written = writer.finish()?;
        info!(
            processed,
            sanitized,
            failed,
            quarantined,
            records_yielded = metadata.records_yielded,
            "Pipeline finished"
        );

        Ok(RunSummary {
            processed,
            sanitized,
            failed,
            quarantined,
            strategy: engine.strategy().name().to_string(),
            error_policy: engine.error_policy(),
            policy_hash: engine.policy_hash().to_string(),
            output: written.output.display().to_string(),
            audit: written.audit.map(|p| p.display().to_string()),
        })
    }
}
