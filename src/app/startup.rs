//! Application startup and the demo run

use crate::app::cli::args::Args;
use crate::app::cli::display::{print_summary, RunOutcome};
use crate::app::workload::{produce, Workload};
use crate::core::error_handling::{log_error_with_context, user_facing_message};
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::notifications::api::{EventFilter, EventReceiver, QueueEventType};
use crate::queue::api::{ProducerConsumerQueue, QueueConfig};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;

pub const EXIT_CONFIG_ERROR: i32 = 1;

const EXCEPTION_SUBSCRIBER: &str = "cli-exceptions";

/// Run the application and return its exit code
pub fn startup() -> i32 {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not start async runtime ({})", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    runtime.block_on(run(args))
}

async fn run(mut args: Args) -> i32 {
    let config_file = args.config_file.clone();
    let loaded_from = match Args::parse_config_file(&mut args, config_file).await {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}", user_facing_message(&e, "Loading configuration"));
            return EXIT_CONFIG_ERROR;
        }
    };

    let use_color = args.use_color();
    let log_file = args.log_file_str();
    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: could not initialise logging ({})", e);
        return EXIT_CONFIG_ERROR;
    }
    if let Some(path) = loaded_from {
        log::debug!("Loaded configuration from {}", path.display());
    }

    let queue_config = match args.queue_config() {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Queue configuration");
            eprintln!("{}", user_facing_message(&e, "Queue configuration"));
            return EXIT_CONFIG_ERROR;
        }
    };
    let workload = Workload::from_args(&args);

    let (coordinator, shutdown_rx) = ShutdownCoordinator::new();
    coordinator.install_signal_handlers();

    let outcome = match run_workload(&queue_config, &workload, &coordinator, shutdown_rx, use_color).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log_error_with_context(&e, "Queue startup");
            eprintln!("{}", user_facing_message(&e, "Queue startup"));
            return EXIT_CONFIG_ERROR;
        }
    };

    outcome.exit_code()
}

async fn run_workload(
    queue_config: &QueueConfig,
    workload: &Workload,
    coordinator: &ShutdownCoordinator,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
    use_color: bool,
) -> Result<RunOutcome, crate::queue::api::QueueError> {
    let queue = Arc::new(ProducerConsumerQueue::with_config(
        queue_config,
        workload.handler(),
    )?);
    log::info!(
        "Queue '{}': {} item(s) from {} producer(s) into {} worker(s)",
        queue.name(),
        workload.items,
        workload.producers,
        queue.max_concurrency_level()
    );

    let exceptions = tokio::spawn(count_exceptions(
        queue.subscribe(EXCEPTION_SUBSCRIBER, EventFilter::ExceptionsOnly),
    ));
    let started = Instant::now();

    let producers: Vec<_> = (0..workload.producers)
        .map(|index| {
            let producer = queue.producer();
            let ids: Vec<usize> = workload.items_for(index).collect();
            let token = coordinator.token();
            tokio::task::spawn_blocking(move || produce(producer, ids.into_iter(), token))
        })
        .collect();

    let drain = {
        let queue = Arc::clone(&queue);
        async move {
            for handle in producers {
                match handle.await {
                    Ok(Ok(accepted)) => log::debug!("Producer finished after {} item(s)", accepted),
                    Ok(Err(e)) => log::warn!("Producer stopped: {}", e),
                    Err(e) => log::error!("Producer task failed: {}", e),
                }
            }
            queue.complete_adding()?;
            Ok::<bool, crate::queue::api::QueueError>(queue.completion().await)
        }
    };

    let outcome = tokio::select! {
        drained = drain => {
            if drained? { RunOutcome::Drained } else { RunOutcome::Disposed }
        }
        _ = shutdown_rx.recv() => RunOutcome::Interrupted,
    };

    if outcome == RunOutcome::Interrupted || coordinator.is_shutdown_requested() {
        log::info!("Shutting down queue '{}'", queue.name());
        let disposing = Arc::clone(&queue);
        if let Err(e) = tokio::task::spawn_blocking(move || disposing.dispose()).await {
            log::error!("Dispose task failed: {}", e);
        }
    }

    queue.unsubscribe(EXCEPTION_SUBSCRIBER);
    let observed = exceptions.await.unwrap_or_default();
    let stats = queue.stats();
    log::debug!("Exception events observed: {}", observed);
    if outcome == RunOutcome::Drained && stats.failed as usize != workload.expected_failures() {
        log::warn!(
            "Expected {} failure(s), saw {}",
            workload.expected_failures(),
            stats.failed
        );
    }

    print_summary(queue.name(), &stats, outcome, started.elapsed(), use_color);
    Ok(outcome)
}

/// Count exception events until the subscription is closed
async fn count_exceptions(mut receiver: EventReceiver) -> usize {
    let mut count = 0;
    while let Some(event) = receiver.recv().await {
        if let Some(exception) = &event.exception {
            let kind = match event.event_type {
                QueueEventType::AddFailed => "enqueue",
                _ => "handler",
            };
            log::debug!("{} exception: {}", kind, exception.inner());
        }
        count += 1;
    }
    count
}
