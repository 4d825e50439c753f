use anyhow::Result;
use moveable_common::{
    Carton, Moveable,
    testing::{Arg, Call, MockMoveable, Times},
};
use tracing::{debug, info, instrument, trace};

mod demo_config;
mod error;

pub use demo_config::{ConfigMockBehavior, DemoConfig, ResponsesConfig};
pub use error::ScenarioError;

/// Observed outcome of one scenario run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub move_once: Vec<i32>,
    pub move_to: i32,
    pub move_exactly_to: i32,
    pub invocations: usize,
}

#[instrument(skip_all, name = "start_demo")]
pub fn start() -> Result<ScenarioReport> {
    trace!("Starting carton demo");

    let config =
        DemoConfig::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    info!(behavior = ?config.behavior, "Loaded demo configuration");

    let report = run_scenario(&config)?;
    info!(
        move_once = ?report.move_once,
        move_to = report.move_to,
        move_exactly_to = report.move_exactly_to,
        invocations = report.invocations,
        "Scenario verified"
    );

    Ok(report)
}

/// Program a substitute from `config`, drive it through a [`Carton`] and
/// verify every response, failure and call count.
#[instrument(skip_all)]
pub fn run_scenario(config: &DemoConfig) -> Result<ScenarioReport, ScenarioError> {
    let responses = &config.responses;
    let mock = MockMoveable::new(config.behavior.into());
    mock.setup(Call::MoveOnce)
        .returns(responses.move_once)
        .verifiable();
    mock.setup(Call::MoveTo(Arg::is(config.move_to_target)))
        .returns(responses.move_to)
        .verifiable();
    mock.setup(Call::MoveExactlyTo(Arg::any()))
        .returns(responses.move_exactly_to)
        .verifiable();
    mock.setup(Call::Fail).fails().verifiable();

    // The carton owns one handle; `mock` stays behind for verification
    let carton = Carton::new(mock.clone());

    let move_once = (0..config.move_once_calls)
        .map(|_| carton.moveable.move_once())
        .collect::<Vec<_>>();
    for actual in &move_once {
        expect_value("move_once()", responses.move_once, *actual)?;
    }

    let move_to = carton.moveable.move_to(config.move_to_target);
    expect_value(
        &format!("move_to({})", config.move_to_target),
        responses.move_to,
        move_to,
    )?;

    let move_exactly_to = carton.moveable.move_exactly_to(config.probe_target);
    expect_value(
        &format!("move_exactly_to({})", config.probe_target),
        responses.move_exactly_to,
        move_exactly_to,
    )?;

    if carton.fail().is_ok() {
        return Err(ScenarioError::MissingFailure("Carton::fail"));
    }
    if carton.moveable.fail().is_ok() {
        return Err(ScenarioError::MissingFailure("Moveable::fail"));
    }

    mock.verify(Call::MoveOnce, Times::AtLeast(config.move_once_calls))?;
    mock.verify_verifiable()?;
    debug!("All verifiable setups were invoked");

    Ok(ScenarioReport {
        move_once,
        move_to,
        move_exactly_to,
        invocations: mock.invocation_count(),
    })
}

fn expect_value(operation: &str, expected: i32, actual: i32) -> Result<(), ScenarioError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ScenarioError::UnexpectedValue {
            operation: operation.to_string(),
            expected,
            actual,
        })
    }
}
