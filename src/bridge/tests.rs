use super::*;
use crate::config::BridgeConfig;
use crate::error::{EncodeError, GspyError};
use crate::kernels::time_series;
use crate::types::{LookupTable, ParameterDescriptor as P, StructuredValue, TimeSeries};
use std::cell::RefCell;
use std::rc::Rc;

type EventLog = Rc<RefCell<Vec<&'static str>>>;

/// A runtime whose binding echoes its arguments back as results.
struct FakeRuntime {
    events: EventLog,
    loads: usize,
}

struct EchoBinding {
    events: EventLog,
}

impl Calculation for EchoBinding {
    fn call(&mut self, args: &[StructuredValue]) -> Result<Vec<StructuredValue>, GspyError> {
        Ok(args.to_vec())
    }
}

impl Drop for EchoBinding {
    fn drop(&mut self) {
        self.events.borrow_mut().push("binding dropped");
    }
}

impl ScriptRuntime for FakeRuntime {
    type Binding = EchoBinding;

    fn load(&mut self, _config: &BridgeConfig) -> Result<EchoBinding, GspyError> {
        self.loads += 1;
        self.events.borrow_mut().push("loaded");
        Ok(EchoBinding {
            events: self.events.clone(),
        })
    }

    fn shutdown(&mut self) {
        self.events.borrow_mut().push("shutdown");
    }
}

const ECHO_CONFIG: &str = r#"{
    "script_path": "echo.py",
    "function_name": "process_data",
    "inputs": [
        { "name": "x", "type": "scalar" },
        { "name": "v", "type": "vector", "dimensions": [2] }
    ],
    "outputs": [
        { "name": "y", "type": "scalar" },
        { "name": "w", "type": "vector", "dimensions": [2] }
    ]
}"#;

fn create_echo_bridge(json: &str) -> (Bridge<FakeRuntime>, EventLog) {
    let events = EventLog::default();
    let runtime = FakeRuntime {
        events: events.clone(),
        loads: 0,
    };
    let config = BridgeConfig::from_json_str(json).unwrap();
    (Bridge::new(config, runtime), events)
}

//==================================================================================
// Wire-format scenarios
//==================================================================================

#[test]
fn test_scalar_passthrough() {
    let inputs = vec![P::scalar("x")];
    let outputs = vec![P::scalar("y")];

    let decoded = decode(&[3.5], &inputs).unwrap();
    assert_eq!(decoded, vec![("x".to_string(), StructuredValue::Scalar(3.5))]);

    let mut out = [0.0];
    assert_eq!(encode(&[StructuredValue::Scalar(7.0)], &outputs, &mut out), Ok(1));
    assert_eq!(out, [7.0]);
}

#[test]
fn test_dynamic_vector_decode() {
    let inputs = vec![P::scalar("n"), P::dynamic_vector("v", "n")];
    let decoded = decode(&[3.0, 1.0, 2.0, 3.0], &inputs).unwrap();

    assert_eq!(decoded[0].1, StructuredValue::Scalar(3.0));
    let v = decoded[1].1.as_array().unwrap();
    assert_eq!(v.shape(), &[3]);
    assert_eq!(v.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_scalar_time_series_encode() {
    let ts = TimeSeries::scalar(0.0, 1.0, vec![0.0, 1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0, 40.0]);
    let outputs = vec![P::time_series("ts", 4, vec![])];
    let mut out = vec![0.0; 16];

    assert_eq!(encode(&[ts.into()], &outputs, &mut out), Ok(16));
    assert_eq!(
        out,
        vec![
            20.0, -3.0, 0.0, 1.0, 0.0, 0.0, 1.0, 4.0, 0.0, 1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 40.0
        ]
    );
}

#[test]
fn test_one_d_table_encode() {
    let table = LookupTable::one_d(vec![0.0, 1.0, 2.0], vec![5.0, 6.0, 7.0]);
    let outputs = vec![P::table("t", 8)];
    let mut out = vec![0.0; 8];

    assert_eq!(encode(&[table.into()], &outputs, &mut out), Ok(8));
    assert_eq!(out, vec![1.0, 3.0, 0.0, 1.0, 2.0, 5.0, 6.0, 7.0]);
}

#[test]
fn test_invalid_table_dims_leave_field_untouched() {
    let mut table = LookupTable::one_d(vec![0.0, 1.0], vec![5.0, 6.0]);
    table.dims = 5;
    let outputs = vec![P::scalar("first"), P::table("t", 6)];
    let mut out = vec![-1.0; 7];

    let err = encode(&[StructuredValue::Scalar(9.0), table.into()], &outputs, &mut out);
    assert_eq!(err, Err(EncodeError::InvalidDimensionCount(5)));
    assert_eq!(out[0], 9.0);
    assert!(out[1..].iter().all(|&v| v == -1.0));
}

#[test]
fn test_matrix_time_series_round_trip() {
    let timestamps = vec![0.0, 0.5, 1.0];
    let data: Vec<f64> = (0..18).map(|i| i as f64 * 1.5).collect();
    let ts = TimeSeries::with_shape(1.0, 2.0, timestamps, &[2, 3, 3], data).unwrap();

    let outputs = vec![P::time_series("ts", 3, vec![2, 3])];
    let mut wire = vec![0.0; time_series::encoded_len(&ts)];
    encode(&[ts.clone().into()], &outputs, &mut wire).unwrap();

    let inputs = vec![P::time_series("ts", 3, vec![2, 3])];
    let decoded = decode(&wire, &inputs).unwrap();
    assert_eq!(decoded[0].1, StructuredValue::TimeSeries(ts));
}

//==================================================================================
// Commander
//==================================================================================

#[test]
fn test_dispatch_full_lifecycle() {
    let (mut bridge, events) = create_echo_bridge(ECHO_CONFIG);

    // Version is reported without initialization.
    let mut out = [0.0; 3];
    assert_eq!(bridge.dispatch(2, &[], &mut out), Status::Success);
    assert_eq!(out[0], crate::VERSION_NUMBER);
    assert!(!bridge.is_initialized());

    // Report arguments initializes first.
    assert_eq!(bridge.dispatch(3, &[], &mut out), Status::Success);
    assert_eq!(&out[..2], &[3.0, 3.0]);
    assert!(bridge.is_initialized());

    // Initialize is idempotent.
    assert_eq!(bridge.dispatch(0, &[], &mut out), Status::Success);
    assert_eq!(bridge.runtime().loads, 1);

    assert_eq!(bridge.dispatch(1, &[1.0, 2.0, 3.0], &mut out), Status::Success);
    assert_eq!(out, [1.0, 2.0, 3.0]);

    assert_eq!(bridge.dispatch(99, &[], &mut out), Status::Success);
    assert!(!bridge.is_initialized());
    assert_eq!(
        *events.borrow(),
        vec!["loaded", "binding dropped", "shutdown"]
    );
}

#[test]
fn test_unknown_method_reports_failure() {
    let (mut bridge, _) = create_echo_bridge(ECHO_CONFIG);
    let status = bridge.dispatch(42, &[], &mut []);
    assert_eq!(status.code(), 1);
    assert!(bridge.last_error().unwrap().contains("42"));
}

#[test]
fn test_failed_calculate_keeps_bridge_alive() {
    let (mut bridge, _) = create_echo_bridge(ECHO_CONFIG);
    bridge.initialize().unwrap();

    let mut out = [0.0; 3];
    let status = bridge.dispatch(1, &[1.0], &mut out);
    assert_eq!(status, Status::FatalWithMessage);
    assert!(bridge.last_error().unwrap().contains("underrun"));
    assert!(bridge.is_initialized());

    assert_eq!(bridge.dispatch(1, &[4.0, 5.0, 6.0], &mut out), Status::Success);
    assert_eq!(out, [4.0, 5.0, 6.0]);
}

#[test]
fn test_calculate_before_initialize() {
    let (mut bridge, _) = create_echo_bridge(ECHO_CONFIG);
    assert!(matches!(
        bridge.calculate(&[1.0, 2.0, 3.0], &mut [0.0; 3]),
        Err(GspyError::NotInitialized)
    ));
}

#[test]
fn test_invalid_schema_never_loads_runtime() {
    let (mut bridge, events) = create_echo_bridge(
        r#"{
            "inputs": [
                { "name": "v", "type": "vector", "dimensions_from": ["n"] },
                { "name": "n", "type": "scalar" }
            ],
            "outputs": []
        }"#,
    );
    let status = bridge.dispatch(0, &[], &mut []);
    assert_eq!(status, Status::FatalWithMessage);
    assert!(bridge.last_error().unwrap().contains("Schema validation failed"));
    assert_eq!(bridge.runtime().loads, 0);
    assert!(events.borrow().is_empty());
}

#[test]
fn test_report_arguments_for_dynamic_inputs() {
    let (mut bridge, _) = create_echo_bridge(
        r#"{
            "inputs": [
                { "name": "n", "type": "scalar" },
                { "name": "v", "type": "vector", "dimensions_from": ["n"] }
            ],
            "outputs": [
                { "name": "series", "type": "timeseries", "dimensions": [2, 3], "max_points": 10 }
            ]
        }"#,
    );
    let mut out = [0.0; 2];
    bridge.report_arguments(&mut out).unwrap();
    assert_eq!(out, [-1.0, 78.0]);
}

#[test]
fn test_drop_finalizes_initialized_bridge() {
    let (mut bridge, events) = create_echo_bridge(ECHO_CONFIG);
    bridge.initialize().unwrap();
    drop(bridge);
    assert_eq!(
        *events.borrow(),
        vec!["loaded", "binding dropped", "shutdown"]
    );
}
