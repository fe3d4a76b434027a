mod end_to_end;
mod executor;
mod timeout_scheduler;

//local shortcuts

//third-party shortcuts

//standard shortcuts


//-------------------------------------------------------------------------------------------------------------------

/// Install a test-friendly tracing subscriber (only the first call in the test binary takes effect).
pub(crate) fn prepare_tracing()
{
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

//-------------------------------------------------------------------------------------------------------------------
