// In: src/bridge/session.rs

//! The stateful layer: a validated session and the method-id commander.
//!
//! `Session` owns one validated schema and one calculation binding, and runs
//! the decode -> call -> encode cycle. `Bridge` wraps a session together with
//! the scripting runtime that produces the binding, and maps the host's numeric
//! method ids onto session operations.

use std::path::Path;

use crate::bridge::{decoder, encoder};
use crate::buffer::FlatWriter;
use crate::config::BridgeConfig;
use crate::error::GspyError;
use crate::observability;
use crate::schema::{self, Schema};
use crate::types::StructuredValue;
use crate::{VERSION, VERSION_NUMBER};

//==================================================================================
// I. External Boundaries
//==================================================================================

/// The external calculation: positional arguments in, positional results out.
pub trait Calculation {
    fn call(&mut self, args: &[StructuredValue]) -> Result<Vec<StructuredValue>, GspyError>;
}

impl<F> Calculation for F
where
    F: FnMut(&[StructuredValue]) -> Result<Vec<StructuredValue>, GspyError>,
{
    fn call(&mut self, args: &[StructuredValue]) -> Result<Vec<StructuredValue>, GspyError> {
        self(args)
    }
}

/// The scripting runtime that hosts the calculation.
///
/// Bootstrapping the interpreter happens behind this trait. The bridge only
/// asks it for a binding and tells it when to shut down.
pub trait ScriptRuntime {
    type Binding: Calculation;

    /// Starts the runtime if needed and resolves the configured function.
    fn load(&mut self, config: &BridgeConfig) -> Result<Self::Binding, GspyError>;

    /// Called after every binding has been dropped.
    fn shutdown(&mut self);
}

//==================================================================================
// II. Session
//==================================================================================

/// A validated schema bound to a calculation.
pub struct Session<C> {
    schema: Schema,
    calculation: C,
    input_size: i64,
    output_size: i64,
}

impl<C: Calculation> Session<C> {
    /// Validates `schema` and computes its buffer sizes.
    pub fn new(schema: Schema, calculation: C) -> Result<Self, GspyError> {
        schema::validate(&schema)?;
        Ok(Self::from_validated(schema, calculation))
    }

    /// Builds a session over a schema that already passed [`schema::validate`].
    fn from_validated(schema: Schema, calculation: C) -> Self {
        let input_size = schema::input_size(&schema);
        let output_size = schema::output_size(&schema);
        log::info!(
            "Session ready: {} input(s) (size {}), {} output(s) (size {}).",
            schema.inputs.len(),
            input_size,
            schema.outputs.len(),
            output_size
        );
        Self {
            schema,
            calculation,
            input_size,
            output_size,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Input buffer length, or `-1` if it varies per call.
    pub fn input_size(&self) -> i64 {
        self.input_size
    }

    pub fn output_size(&self) -> i64 {
        self.output_size
    }

    /// Runs one step. Returns the number of doubles written to `outargs`.
    ///
    /// A failure here leaves the session usable for the next call.
    pub fn calculate(&mut self, inargs: &[f64], outargs: &mut [f64]) -> Result<usize, GspyError> {
        log::info!("Calculation step started.");
        let args: Vec<StructuredValue> = decoder::decode(inargs, &self.schema.inputs)?
            .into_iter()
            .map(|(_, value)| value)
            .collect();

        let results = self.calculation.call(&args).map_err(|e| match e {
            GspyError::Calculation(_) => e,
            other => GspyError::Calculation(other.to_string()),
        })?;

        let written = encoder::encode(&results, &self.schema.outputs, outargs)?;
        log::info!("Calculation step finished: {} value(s) written.", written);
        Ok(written)
    }
}

//==================================================================================
// III. Commander
//==================================================================================

/// Operations the host can request by numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Calculate,
    ReportVersion,
    ReportArguments,
    Cleanup,
}

impl TryFrom<i32> for Method {
    type Error = GspyError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Self::Initialize),
            1 => Ok(Self::Calculate),
            2 => Ok(Self::ReportVersion),
            3 => Ok(Self::ReportArguments),
            99 => Ok(Self::Cleanup),
            other => Err(GspyError::UnknownMethod(other)),
        }
    }
}

/// The status reported back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    /// The host should read the message from [`Bridge::last_error`].
    FatalWithMessage,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::FatalWithMessage => -1,
        }
    }
}

/// The host-facing commander.
pub struct Bridge<R: ScriptRuntime> {
    config: BridgeConfig,
    runtime: R,
    session: Option<Session<R::Binding>>,
    last_error: Option<String>,
}

impl<R: ScriptRuntime> Bridge<R> {
    pub fn new(config: BridgeConfig, runtime: R) -> Self {
        Self {
            config,
            runtime,
            session: None,
            last_error: None,
        }
    }

    /// Loads the config file and installs the logger it describes.
    pub fn from_config_path(path: impl AsRef<Path>, runtime: R) -> Result<Self, GspyError> {
        let config = BridgeConfig::from_path(path)?;
        observability::init_logging(&config.log_settings());
        Ok(Self::new(config, runtime))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session<R::Binding>> {
        self.session.as_ref()
    }

    /// The message of the most recent failed dispatch.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Builds and validates the schema, then loads the binding. A second call
    /// is a no-op.
    pub fn initialize(&mut self) -> Result<(), GspyError> {
        if self.session.is_some() {
            log::debug!("Initialize requested on an initialized bridge; skipping.");
            return Ok(());
        }
        log::info!("Initializing bridge v{}.", VERSION);

        let schema = self.config.schema()?;
        // Validated before loading so an invalid schema never starts the runtime.
        schema::validate(&schema)?;
        let binding = self.runtime.load(&self.config)?;
        self.session = Some(Session::from_validated(schema, binding));
        Ok(())
    }

    pub fn calculate(&mut self, inargs: &[f64], outargs: &mut [f64]) -> Result<usize, GspyError> {
        let session = self.session.as_mut().ok_or(GspyError::NotInitialized)?;
        session.calculate(inargs, outargs)
    }

    pub fn report_version(&self, outargs: &mut [f64]) -> Result<(), GspyError> {
        FlatWriter::new(outargs).write_one(VERSION_NUMBER)?;
        Ok(())
    }

    /// Writes `[input_size, output_size]`, initializing first if needed.
    pub fn report_arguments(&mut self, outargs: &mut [f64]) -> Result<(), GspyError> {
        self.initialize()?;
        let session = self.session.as_ref().ok_or(GspyError::NotInitialized)?;
        let sizes = [session.input_size() as f64, session.output_size() as f64];
        FlatWriter::new(outargs).write_slice(&sizes)?;
        Ok(())
    }

    /// Drops the binding, then shuts the runtime down.
    pub fn finalize(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("Finalizing bridge.");
            drop(session);
            self.runtime.shutdown();
        }
    }

    /// Runs the operation named by `method_id` and maps the outcome to a status.
    pub fn dispatch(&mut self, method_id: i32, inargs: &[f64], outargs: &mut [f64]) -> Status {
        let method = match Method::try_from(method_id) {
            Ok(method) => method,
            Err(e) => {
                log::error!("{}", e);
                self.last_error = Some(e.to_string());
                return Status::Failure;
            }
        };

        let result = match method {
            Method::Initialize => self.initialize(),
            Method::Calculate => self.calculate(inargs, outargs).map(|_| ()),
            Method::ReportVersion => self.report_version(outargs),
            Method::ReportArguments => self.report_arguments(outargs),
            Method::Cleanup => {
                self.finalize();
                Ok(())
            }
        };

        match result {
            Ok(()) => Status::Success,
            Err(e) => {
                log::error!("{:?} failed: {}", method, e);
                self.last_error = Some(e.to_string());
                Status::FatalWithMessage
            }
        }
    }
}

impl<R: ScriptRuntime> Drop for Bridge<R> {
    fn drop(&mut self) {
        self.finalize();
    }
}
