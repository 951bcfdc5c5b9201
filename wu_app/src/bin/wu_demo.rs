use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use wu_app::cli;
use wu_app::config_loader;
use wu_app::config_loader::DemoConfigFile;
use wu_app::tracing_setup;
use wu_app::tracing_setup::LogOutput;
use wu_throttle::CallOutcome;
use wu_timer::Scheduler;
use wu_timer::TokioScheduler;
use wu_timer::duration_as_millis;
use wu_util::Element;
use wu_util::MutationRecord;

const DEFAULT_CONFIG_PATH: &str = "config/demo.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _guard = tracing_setup::init("wu_demo", "./logs", tracing::Level::INFO, LogOutput::FileAndStdout);

    let config_path = cli::config_path(DEFAULT_CONFIG_PATH);
    let config = config_loader::load_demo_config_or_default(&config_path);
    info!(
        "Demo config: throttle={}ms (immediate={}), debounce={}ms, burst={} calls every {}ms",
        config.throttle.delay_ms,
        config.throttle.immediate,
        config.debounce.delay_ms,
        config.burst_calls,
        config.call_interval_ms
    );

    let scheduler = Arc::new(TokioScheduler::current()?);

    run_burst(&config, Arc::clone(&scheduler)).await?;
    run_helpers();

    let leftover = scheduler.cancel_all();
    if leftover > 0 {
        info!("Cancelled {leftover} timers still pending at shutdown");
    }

    Ok(())
}

/// Fire the same burst of calls at a throttle and a debouncer
async fn run_burst(config: &DemoConfigFile, scheduler: Arc<TokioScheduler>) -> anyhow::Result<()> {
    let clock = Arc::clone(&scheduler);
    let throttle = config.throttle.to_builder()?.scheduler_arc(scheduler.clone()).build(move |(seq, id): (u32, String)| {
        info!("throttled call #{seq} ({id}) ran at {:.1}ms", duration_as_millis(clock.now()));
    })?;

    let clock = Arc::clone(&scheduler);
    let debounce = config.debounce.to_builder()?.scheduler_arc(scheduler.clone()).build(move |seq: u32| {
        info!("debounced call #{seq} ran at {:.1}ms", duration_as_millis(clock.now()));
    })?;

    let interval = Duration::from_millis(config.call_interval_ms);
    for seq in 0..config.burst_calls {
        let outcome = throttle.call((seq, wu_util::pseudo_uuid(true)));
        if outcome == CallOutcome::Dropped {
            debug!("throttled call #{seq} dropped");
        }
        debounce.call(seq);
        tokio::time::sleep(interval).await;
    }

    // Closed throttles forward every call straight away
    throttle.close();
    for seq in config.burst_calls..config.burst_calls + 3 {
        throttle.call((seq, wu_util::pseudo_uuid(false)));
    }
    throttle.open();

    let settle = throttle.delay().max(debounce.delay()) + interval;
    tokio::time::sleep(settle).await;

    throttle.call((u32::MAX, wu_util::pseudo_uuid(true)));
    throttle.destroy();

    let stats = throttle.stats();
    info!(
        "Throttle stats: invocations={}, scheduled={}, fired={}, dropped={}, passed_through={}, cancelled={}",
        stats.invocations(),
        stats.scheduled,
        stats.fired,
        stats.dropped,
        stats.passed_through,
        stats.cancelled
    );

    let stats = debounce.stats();
    info!("Debounce stats: invocations={}, scheduled={}, cancelled={}", stats.invocations(), stats.scheduled, stats.cancelled);

    Ok(())
}

/// Exercise the stateless helpers
fn run_helpers() {
    let roll = wu_util::random_int(1, 6);
    let distance = wu_util::point_distance([0.0, 0.0], [3.0, 4.0]);
    info!("random_int(1, 6) = {roll}, point_distance([0,0], [3,4]) = {distance}");

    let element = Element::new();
    let observer = wu_util::observe_style_changes(&element, |records: &[MutationRecord]| {
        for record in records {
            info!("style changed (was {:?})", record.old_value);
        }
    });

    element.set_attribute("style", "width: 100px");
    element.set_attribute("style", "width: 240px");
    element.set_attribute("class", "wide");
    observer.disconnect();
}
